use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use dioxus::prelude::*;
use serde_json::{json, Value};

use crate::io::json_io;
use crate::io::store::{FileStore, MemoryStore, SharedStore};
use crate::state::column::{Align, ColumnDef};
use crate::state::config::{Density, TableConfig};
use crate::state::data_model::{self, Row};
use crate::state::edit::{EditorKind, SaveError};
use crate::state::filter::FilterType;
use crate::state::grouping::GroupBy;
use crate::state::table_state::TableState;
use crate::ui::cell::{CellSave, SaveHandler};
use crate::ui::table::DataTable;

const STYLES: Asset = asset!("/assets/styles.css");
const PAGE_SIZE: usize = 50;
const CATALOG_SIZE: usize = 400;

const ARTISTS: &[&str] = &["Nova Reyes", "The Lanterns", "Kid Meridian", "Sola", "Harbor Lights"];
const STATUSES: &[&str] = &["draft", "mastering", "scheduled", "released"];
const GENRES: &[&str] = &["pop", "indie", "electronic", "hip-hop", "folk", "soul"];

#[component]
pub fn App() -> Element {
    let opened = use_hook(load_opened_rows);
    let store = use_hook(open_store);
    let config = use_hook(|| TableConfig {
        density: Density::Normal,
        virtualize: true,
        persistence_key: Some(if opened.is_some() { "file" } else { "catalog" }.to_string()),
        persist_filters: true,
        ..TableConfig::default()
    });

    let mut rows = use_signal({
        let opened = opened.clone();
        move || opened.unwrap_or_else(|| catalog_page(0))
    });
    let state = use_signal({
        let config = config.clone();
        let columns = match &opened {
            Some(rows) => columns_for(rows),
            None => catalog_columns(),
        };
        move || TableState::with_config(columns, &config, Some(store))
    });
    let mut is_fetching = use_signal(|| false);
    let mut group_choice = use_signal(String::new);

    let has_next_page = opened.is_none() && rows.read().len() < CATALOG_SIZE;

    let on_save = use_hook(|| {
        SaveHandler::new(move |save: CellSave| async move {
            tokio::time::sleep(Duration::from_millis(250)).await;
            let blank = save.value.as_str().map(str::trim).unwrap_or("").is_empty();
            if save.column_id == "title" && blank {
                return Err(SaveError::new("title cannot be empty"));
            }
            let mut rows = rows;
            rows.with_mut(|rows| {
                if let Some(row) = rows.get_mut(save.row_index) {
                    row.insert(save.column_id.clone(), save.value.clone());
                }
            });
            log::info!("saved row {} {} = {}", save.row_index, save.column_id, save.value);
            Ok(())
        })
    });

    let fetch_next_page = move |_: ()| {
        if *is_fetching.read() {
            return;
        }
        is_fetching.set(true);
        spawn(async move {
            tokio::time::sleep(Duration::from_millis(400)).await;
            let start = rows.read().len();
            rows.with_mut(|rows| rows.extend(catalog_page(start)));
            is_fetching.set(false);
        });
    };

    rsx! {
        document::Stylesheet { href: STYLES }
        div { class: "app",
            div { class: "app-header",
                h1 { "Release catalog" }
                label { class: "group-select",
                    "Group by "
                    select {
                        value: "{group_choice}",
                        onchange: move |evt| {
                            let choice = evt.value();
                            let mut state = state;
                            state.with_mut(|s| {
                                s.set_group_by(if choice.is_empty() {
                                    None
                                } else {
                                    Some(GroupBy::Column(choice.clone()))
                                })
                            });
                            group_choice.set(choice);
                        },
                        option { value: "", "Nothing" }
                        option { value: "artist", "Artist" }
                        option { value: "status", "Status" }
                    }
                }
            }
            DataTable {
                state,
                rows,
                config: config.clone(),
                has_next_page,
                is_fetching: is_fetching(),
                on_save: on_save.clone(),
                on_fetch_next_page: fetch_next_page,
            }
        }
    }
}

fn open_store() -> SharedStore {
    match std::env::var("TABULA_STATE") {
        Ok(path) => Arc::new(FileStore::new(PathBuf::from(path))),
        Err(_) => MemoryStore::new().shared(),
    }
}

fn load_opened_rows() -> Option<Vec<Row>> {
    let path = PathBuf::from(std::env::var("TABULA_OPEN").ok()?);
    match json_io::load_json(&path) {
        Ok(rows) => {
            log::info!("loaded {} rows from {}", rows.len(), path.display());
            Some(rows)
        }
        Err(err) => {
            log::error!("could not open {}: {err}", path.display());
            None
        }
    }
}

/// Plain text columns for an arbitrary JSON file.
fn columns_for(rows: &[Row]) -> Vec<ColumnDef<Row>> {
    data_model::derive_columns(rows)
        .into_iter()
        .map(|key| {
            ColumnDef::new(key)
                .sortable()
                .filterable(FilterType::Text)
                .editable(EditorKind::Text)
        })
        .collect()
}

fn catalog_columns() -> Vec<ColumnDef<Row>> {
    vec![
        ColumnDef::new("id").header("#").sortable().width(60).align(Align::Right),
        ColumnDef::new("title")
            .header("Title")
            .sortable()
            .filterable(FilterType::Text)
            .editable(EditorKind::Text),
        ColumnDef::new("artist")
            .header("Artist")
            .sortable()
            .filterable(FilterType::Select)
            .filter_options(ARTISTS.iter().copied())
            .editable(EditorKind::select(ARTISTS.iter().copied(), false)),
        ColumnDef::new("status")
            .header("Status")
            .sortable()
            .filterable(FilterType::MultiSelect)
            .filter_options(STATUSES.iter().copied())
            .editable_when(EditorKind::select(STATUSES.iter().copied(), false), |row: &Row| {
                row.get("status").and_then(Value::as_str) != Some("released")
            }),
        ColumnDef::new("genres")
            .header("Genres")
            .filterable(FilterType::MultiSelect)
            .filter_options(GENRES.iter().copied())
            .editable(EditorKind::multi_select(GENRES.iter().copied(), 2)),
        ColumnDef::new("release_date")
            .header("Release")
            .sortable()
            .filterable(FilterType::DateRange)
            .editable(EditorKind::Date),
        ColumnDef::new("streams")
            .header("Streams")
            .sortable()
            .align(Align::Right)
            .filterable(FilterType::NumberRange)
            .editable(EditorKind::Number),
        ColumnDef::new("explicit")
            .header("Explicit")
            .align(Align::Center)
            .editable(EditorKind::Checkbox),
        ColumnDef::new("label")
            .header("Label")
            .accessor_fn(|row: &Row| {
                let artist = row.get("artist").and_then(Value::as_str).unwrap_or("");
                let label = if artist.starts_with("The ") { "Northside" } else { "Independent" };
                Value::String(label.to_string())
            }),
    ]
}

/// Deterministic demo rows `start..start + PAGE_SIZE`.
fn catalog_page(start: usize) -> Vec<Row> {
    (start..(start + PAGE_SIZE).min(CATALOG_SIZE))
        .map(|i| {
            let value = json!({
                "id": i + 1,
                "title": format!("Track {:03}", i + 1),
                "artist": ARTISTS[i % ARTISTS.len()],
                "status": STATUSES[(i / 3) % STATUSES.len()],
                "genres": [GENRES[i % GENRES.len()], GENRES[(i * 7 + 1) % GENRES.len()]],
                "release_date": format!("2024-{:02}-{:02}", i % 12 + 1, i % 28 + 1),
                "streams": (i * 7919) % 250_000,
                "explicit": i % 5 == 0,
            });
            match value {
                Value::Object(map) => map.into_iter().collect(),
                _ => Row::new(),
            }
        })
        .collect()
}
