use dioxus::prelude::*;

use crate::state::column::ColumnDef;
use crate::state::data_model::Row;
use crate::state::filter::{FilterType, FilterValue};
use crate::state::sort::SortDirection;
use crate::state::table_state::TableState;
use crate::ui::cell::cell_style;

#[component]
pub fn HeaderCell(
    state: Signal<TableState<Row>>,
    column: ColumnDef<Row>,
    dragging: Signal<Option<String>>,
) -> Element {
    let direction = state.read().sort().direction_for(&column.id);
    let filter_active = state.read().filters().is_active(&column.id);
    let label = column.header_text();
    let column_id = column.id.clone();

    let mut class = String::from("header-cell");
    if column.sortable {
        class.push_str(" sortable");
    }
    match direction {
        SortDirection::Asc => class.push_str(" sorted-asc"),
        SortDirection::Desc => class.push_str(" sorted-desc"),
        SortDirection::None => {}
    }
    if filter_active {
        class.push_str(" filtered");
    }
    if dragging.read().as_deref() == Some(column_id.as_str()) {
        class.push_str(" dragging");
    }

    rsx! {
        th {
            class: "{class}",
            style: cell_style(&column),
            id: format!("col-{}", sanitize_id(&column_id)),
            draggable: "true",
            ondragstart: {
                let column_id = column_id.clone();
                move |_| {
                    let mut dragging = dragging;
                    dragging.set(Some(column_id.clone()));
                }
            },
            ondragover: move |evt| evt.prevent_default(),
            ondrop: {
                let column_id = column_id.clone();
                move |evt| {
                    evt.prevent_default();
                    let mut dragging = dragging;
                    let active = dragging.write().take();
                    if let Some(active) = active {
                        let mut state = state;
                        state.with_mut(|s| s.move_column(&active, &column_id));
                    }
                }
            },
            ondragend: move |_| {
                let mut dragging = dragging;
                dragging.set(None);
            },
            div { class: "header-label",
                if column.sortable {
                    button {
                        class: "sort-button",
                        onclick: {
                            let column_id = column_id.clone();
                            move |_| {
                                let mut state = state;
                                state.with_mut(|s| s.on_sort(&column_id));
                            }
                        },
                        "{label}"
                        span { class: "sort-indicator", "{sort_indicator(direction)}" }
                    }
                } else {
                    span { "{label}" }
                }
            }
            if let Some(filter_type) = column.filter {
                FilterControl {
                    state,
                    column_id: column_id.clone(),
                    filter_type,
                    options: column.filter_options.clone(),
                }
            }
        }
    }
}

#[component]
fn FilterControl(
    state: Signal<TableState<Row>>,
    column_id: String,
    filter_type: FilterType,
    options: Vec<String>,
) -> Element {
    let current = state.read().filters().get(&column_id).cloned();
    let set_filter = {
        let column_id = column_id.clone();
        move |value: FilterValue| {
            let mut state = state;
            state.with_mut(|s| s.on_filter(&column_id, value));
        }
    };
    let clear = {
        let column_id = column_id.clone();
        move |_: MouseEvent| {
            let mut state = state;
            state.with_mut(|s| s.on_clear_filter(&column_id));
        }
    };

    let control = match filter_type {
        FilterType::Text => {
            let text = match &current {
                Some(FilterValue::Text(text)) => text.clone(),
                _ => String::new(),
            };
            rsx! {
                input {
                    class: "filter-input",
                    r#type: "text",
                    placeholder: "Filter...",
                    value: "{text}",
                    oninput: move |evt| set_filter(FilterValue::Text(evt.value())),
                }
            }
        }
        FilterType::Select => {
            let selected = match &current {
                Some(FilterValue::Select(value)) => value.clone(),
                _ => String::new(),
            };
            rsx! {
                select {
                    class: "filter-select",
                    value: "{selected}",
                    onchange: move |evt| set_filter(FilterValue::Select(evt.value())),
                    option { value: "", "All" }
                    for opt in options.iter() {
                        option { value: "{opt}", selected: *opt == selected, "{opt}" }
                    }
                }
            }
        }
        FilterType::MultiSelect => {
            let selected = match &current {
                Some(FilterValue::MultiSelect(values)) => values.clone(),
                _ => Vec::new(),
            };
            rsx! {
                div { class: "filter-multiselect",
                    for opt in options.iter() {
                        label { class: "filter-option",
                            input {
                                r#type: "checkbox",
                                checked: selected.contains(opt),
                                onchange: {
                                    let column_id = column_id.clone();
                                    let opt = opt.clone();
                                    move |_| {
                                        let mut state = state;
                                        state.with_mut(|s| {
                                            s.toggle_filter_option(&column_id, &opt)
                                        });
                                    }
                                }
                            }
                            "{opt}"
                        }
                    }
                }
            }
        }
        FilterType::DateRange => {
            let date = match &current {
                Some(FilterValue::Date(date)) => date.clone(),
                _ => String::new(),
            };
            rsx! {
                input {
                    class: "filter-input",
                    r#type: "date",
                    value: "{date}",
                    oninput: move |evt| set_filter(FilterValue::Date(evt.value())),
                }
            }
        }
        FilterType::NumberRange => {
            let (min, max) = match &current {
                Some(FilterValue::NumberRange { min, max }) => (*min, *max),
                _ => (None, None),
            };
            let min_text = min.map(|v| v.to_string()).unwrap_or_default();
            let max_text = max.map(|v| v.to_string()).unwrap_or_default();
            let set_min = set_filter.clone();
            rsx! {
                div { class: "filter-range",
                    input {
                        class: "filter-input filter-min",
                        r#type: "number",
                        placeholder: "Min",
                        value: "{min_text}",
                        oninput: move |evt| {
                            let min = parse_bound(&evt.value());
                            set_min(FilterValue::NumberRange { min, max })
                        },
                    }
                    input {
                        class: "filter-input filter-max",
                        r#type: "number",
                        placeholder: "Max",
                        value: "{max_text}",
                        oninput: move |evt| {
                            let max = parse_bound(&evt.value());
                            set_filter(FilterValue::NumberRange { min, max })
                        },
                    }
                }
            }
        }
    };

    rsx! {
        div { class: "filter-control",
            {control}
            if current.is_some() {
                button { class: "filter-clear", title: "Clear filter", onclick: clear, "×" }
            }
        }
    }
}

fn parse_bound(text: &str) -> Option<f64> {
    text.trim().parse().ok()
}

fn sort_indicator(direction: SortDirection) -> &'static str {
    match direction {
        SortDirection::Asc => "▲",
        SortDirection::Desc => "▼",
        SortDirection::None => "",
    }
}

pub(crate) fn sanitize_id(value: &str) -> String {
    value
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() { ch } else { '_' })
        .collect()
}
