use std::rc::Rc;

use dioxus::prelude::*;

use crate::state::column::{ColumnDef, Editable};
use crate::state::config::TableConfig;
use crate::state::data_model::Row;
use crate::state::infinite::{InfiniteScroll, ScrollMetrics};
use crate::state::table_state::{TableBody, TableState};
use crate::state::virtualizer::Virtualizer;
use crate::ui::cell::{DisplayCell, EditableCell, SaveHandler};
use crate::ui::header::HeaderCell;

const SENTINEL_HEIGHT: f64 = 1.0;

/// One row group as rendered: header plus member rows when expanded.
#[derive(Clone, PartialEq)]
struct GroupSection {
    key: String,
    label: String,
    count: usize,
    is_expanded: bool,
    indices: Vec<usize>,
}

#[component]
pub fn DataTable(
    state: Signal<TableState<Row>>,
    rows: ReadOnlySignal<Vec<Row>>,
    #[props(default)] config: TableConfig,
    #[props(default)] is_loading: bool,
    #[props(default)] has_next_page: bool,
    #[props(default)] is_fetching: bool,
    on_save: Option<SaveHandler>,
    on_fetch_next_page: Option<EventHandler<()>>,
) -> Element {
    let dragging = use_signal::<Option<String>>(|| None);
    let virtualizer = use_signal({
        let options = config.virtualizer_options(0);
        move || Virtualizer::new(options)
    });
    let infinite = use_signal({
        let options = config.infinite_scroll.clone();
        move || InfiniteScroll::new(options)
    });

    let container = use_signal::<Option<Rc<MountedData>>>(|| None);

    // A fetch may start and finish without any scroll event in between.
    let row_count = rows.read().len();
    use_effect(use_reactive!(|(has_next_page, is_fetching, row_count)| {
        let mut infinite = infinite;
        infinite.with_mut(|s| {
            s.sync(has_next_page, is_fetching);
            s.sync_rows(row_count);
        });
    }));

    // A short page never scrolls, so the sentinel is re-checked once new rows land.
    use_effect(use_reactive!(|(row_count, on_fetch_next_page)| {
        let _ = row_count;
        let Some(element) = container.peek().clone() else {
            return;
        };
        spawn(async move {
            if let Some(metrics) = container_metrics(&element).await {
                check_sentinel(metrics, virtualizer, infinite, on_fetch_next_page);
            }
        });
    }));

    let (columns, body, is_empty) = {
        let rows = rows.read();
        let state = state.read();
        let view = state.view(&rows);
        let columns: Vec<ColumnDef<Row>> = view.columns.iter().map(|c| (*c).clone()).collect();
        let body = match &view.body {
            TableBody::Flat(indices) => Body::Flat(indices.clone()),
            TableBody::Grouped(groups) => Body::Grouped(
                groups
                    .iter()
                    .map(|group| GroupSection {
                        key: group.key.clone(),
                        label: group.label.clone(),
                        count: group.len(),
                        is_expanded: group.is_expanded,
                        indices: group.indices.clone(),
                    })
                    .collect(),
            ),
        };
        (columns, body, view.is_empty())
    };

    let flat_count = match &body {
        Body::Flat(indices) => indices.len(),
        Body::Grouped(_) => 0,
    };
    // Row measurements are only accepted for indices below the count.
    use_effect(use_reactive!(|flat_count| {
        let mut virtualizer = virtualizer;
        virtualizer.with_mut(|v| v.set_count(flat_count));
    }));

    let column_count = columns.len().max(1);
    let density_class = config.density.class();

    let onscroll = move |evt: ScrollEvent| {
        let data = evt.data();
        let metrics = ScrollMetrics {
            scroll_top: data.scroll_top() as f64,
            client_height: data.client_height() as f64,
            scroll_height: data.scroll_height() as f64,
        };
        let mut virtualizer = virtualizer;
        virtualizer.with_mut(|v| v.set_count(flat_count));
        check_sentinel(metrics, virtualizer, infinite, on_fetch_next_page);
    };

    let onmounted = move |evt: MountedEvent| async move {
        let element = evt.data();
        let mut container = container;
        container.set(Some(element.clone()));
        if let Some(metrics) = container_metrics(&element).await {
            check_sentinel(metrics, virtualizer, infinite, on_fetch_next_page);
        }
    };

    let body_rows = if is_loading && rows.read().is_empty() {
        rsx! {
            for i in 0..config.skeleton_rows {
                tr { key: "skeleton-{i}", class: "skeleton-row",
                    for c in 0..column_count {
                        td { key: "{c}", div { class: "skeleton" } }
                    }
                }
            }
        }
    } else if is_empty {
        rsx! {
            tr { class: "empty-row",
                td {
                    colspan: "{column_count}",
                    class: "empty-message",
                    id: "empty-message",
                    "No results."
                }
            }
        }
    } else {
        match body {
            Body::Flat(indices) => {
                let mut window = virtualizer.read().clone();
                window.set_count(indices.len());
                let visible = window.visible_data(&indices);
                let padding_top = window.padding_top();
                let padding_bottom = window.padding_bottom();
                let rows_read = rows.read();
                rsx! {
                    if padding_top > 0.0 {
                        tr { class: "virtual-spacer",
                            td { colspan: "{column_count}", style: "height: {padding_top}px;" }
                        }
                    }
                    for visible_row in visible {
                        if let Some(row) = rows_read.get(*visible_row.item) {
                            BodyRow {
                                key: "{visible_row.item}",
                                columns: columns.clone(),
                                row: row.clone(),
                                row_index: *visible_row.item,
                                display_index: visible_row.index,
                                virtualizer: window.is_enabled().then_some(virtualizer),
                                on_save: on_save.clone(),
                            }
                        }
                    }
                    if padding_bottom > 0.0 {
                        tr { class: "virtual-spacer",
                            td { colspan: "{column_count}", style: "height: {padding_bottom}px;" }
                        }
                    }
                }
            }
            Body::Grouped(groups) => {
                let rows_read = rows.read();
                rsx! {
                    for group in groups {
                        tr { key: "group-{group.key}", class: "group-header",
                            td { colspan: "{column_count}",
                                button {
                                    class: "group-toggle",
                                    onclick: {
                                        let key = group.key.clone();
                                        move |_| {
                                            let mut state = state;
                                            state.with_mut(|s| s.toggle_group(&key));
                                        }
                                    },
                                    span { class: "group-caret",
                                        if group.is_expanded { "▾" } else { "▸" }
                                    }
                                    " {group.label} "
                                    span { class: "group-count", "({group.count})" }
                                }
                            }
                        }
                        if group.is_expanded {
                            for (display_index, row_index) in group.indices.iter().enumerate() {
                                if let Some(row) = rows_read.get(*row_index) {
                                    BodyRow {
                                        key: "{row_index}",
                                        columns: columns.clone(),
                                        row: row.clone(),
                                        row_index: *row_index,
                                        display_index,
                                        virtualizer: None,
                                        on_save: on_save.clone(),
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    };

    rsx! {
        div { class: "data-table {density_class}",
            TableToolbar { state, rows }
            div {
                class: "table-container",
                id: "table-container",
                onscroll,
                onmounted,
                table {
                    thead {
                        tr {
                            for column in columns.iter() {
                                HeaderCell {
                                    key: "{column.id}",
                                    state,
                                    column: column.clone(),
                                    dragging,
                                }
                            }
                        }
                    }
                    tbody { {body_rows} }
                }
                if is_fetching {
                    div { class: "loading-more", "Loading more..." }
                }
                div { class: "sentinel", style: "height: {SENTINEL_HEIGHT}px;" }
            }
        }
    }
}

async fn container_metrics(element: &MountedData) -> Option<ScrollMetrics> {
    let rect = element.get_client_rect().await.ok()?;
    let offset = element.get_scroll_offset().await.ok()?;
    let size = element.get_scroll_size().await.ok()?;
    Some(ScrollMetrics {
        scroll_top: offset.y,
        client_height: rect.size.height,
        scroll_height: size.height,
    })
}

/// Feeds container metrics to the virtualizer and the sentinel, firing the
/// fetch handler when the sentinel comes into view.
fn check_sentinel(
    metrics: ScrollMetrics,
    mut virtualizer: Signal<Virtualizer>,
    mut infinite: Signal<InfiniteScroll>,
    on_fetch_next_page: Option<EventHandler<()>>,
) {
    virtualizer.with_mut(|v| {
        v.set_viewport(metrics.client_height);
        v.on_scroll(metrics.scroll_top);
    });
    let trigger = infinite.with_mut(|s| {
        let ratio = s.sentinel_ratio(metrics, SENTINEL_HEIGHT);
        s.on_intersect(ratio)
    });
    if trigger {
        if let Some(handler) = on_fetch_next_page {
            handler.call(());
        }
    }
}

#[derive(Clone, PartialEq)]
enum Body {
    Flat(Vec<usize>),
    Grouped(Vec<GroupSection>),
}

#[component]
fn BodyRow(
    columns: Vec<ColumnDef<Row>>,
    row: Row,
    row_index: usize,
    display_index: usize,
    virtualizer: Option<Signal<Virtualizer>>,
    on_save: Option<SaveHandler>,
) -> Element {
    let row_class = if display_index % 2 == 0 { "even" } else { "odd" };

    let onmounted = move |evt: MountedEvent| async move {
        let Some(mut virtualizer) = virtualizer else {
            return;
        };
        if let Ok(rect) = evt.get_client_rect().await {
            virtualizer.with_mut(|v| v.measure(display_index, rect.size.height));
        }
    };

    rsx! {
        tr { class: row_class, id: format!("row-{row_index}"), onmounted,
            for column in columns.iter() {
                if matches!(column.editable, Editable::No) {
                    DisplayCell { key: "{column.id}", column: column.clone(), row: row.clone() }
                } else {
                    EditableCell {
                        key: "{column.id}",
                        column: column.clone(),
                        row: row.clone(),
                        row_index,
                        on_save: on_save.clone(),
                    }
                }
            }
        }
    }
}

#[component]
fn TableToolbar(state: Signal<TableState<Row>>, rows: ReadOnlySignal<Vec<Row>>) -> Element {
    let mut show_columns = use_signal(|| false);
    let snapshot = state.read().clone();
    let grouped = snapshot.group_by().is_some();
    let entries: Vec<(String, String, bool)> = snapshot
        .layout()
        .order()
        .iter()
        .filter_map(|id| {
            snapshot
                .column(id)
                .map(|column| (id.clone(), column.header_text(), snapshot.layout().is_visible(id)))
        })
        .collect();
    let active_filters = snapshot.filters().active_count();

    rsx! {
        div { class: "table-toolbar",
            button {
                class: "toolbar-button",
                onclick: move |_| show_columns.set(!show_columns()),
                "Columns"
            }
            if active_filters > 0 {
                button {
                    class: "toolbar-button",
                    onclick: move |_| {
                        let mut state = state;
                        state.with_mut(|s| s.clear_filters());
                    },
                    "Clear filters ({active_filters})"
                }
            }
            if grouped {
                button {
                    class: "toolbar-button",
                    onclick: move |_| {
                        let mut state = state;
                        let rows = rows.read();
                        state.with_mut(|s| s.expand_all(&rows));
                    },
                    "Expand all"
                }
                button {
                    class: "toolbar-button",
                    onclick: move |_| {
                        let mut state = state;
                        let rows = rows.read();
                        state.with_mut(|s| s.collapse_all(&rows));
                    },
                    "Collapse all"
                }
            }
            if show_columns() {
                div { class: "column-menu",
                    for (id, title, visible) in entries {
                        label { key: "{id}", class: "column-menu-item",
                            input {
                                r#type: "checkbox",
                                checked: visible,
                                onchange: {
                                    let id = id.clone();
                                    move |_| {
                                        let mut state = state;
                                        state.with_mut(|s| s.toggle_column_visibility(&id));
                                    }
                                }
                            }
                            "{title}"
                        }
                    }
                    button {
                        class: "toolbar-button",
                        onclick: move |_| {
                            let mut state = state;
                            state.with_mut(|s| s.reset_column_order());
                        },
                        "Reset columns"
                    }
                }
            }
        }
    }
}
