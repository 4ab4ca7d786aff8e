use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use dioxus::core::spawn_forever;
use dioxus::prelude::{Key, *};
use serde_json::Value;

use crate::state::column::ColumnDef;
use crate::state::data_model::{self, Row};
use crate::state::edit::{self, CellEditor, Confirm, Draft, EditorKind, SaveError};

/// An edit leaving the table.
#[derive(Clone, Debug, PartialEq)]
pub struct CellSave {
    pub row_index: usize,
    pub column_id: String,
    pub value: Value,
}

type SaveFuture = Pin<Box<dyn Future<Output = Result<(), SaveError>>>>;

/// Caller-supplied async mutation for inline edits.
#[derive(Clone)]
pub struct SaveHandler(Rc<dyn Fn(CellSave) -> SaveFuture>);

impl SaveHandler {
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(CellSave) -> Fut + 'static,
        Fut: Future<Output = Result<(), SaveError>> + 'static,
    {
        Self(Rc::new(move |save| Box::pin(f(save))))
    }

    pub fn call(&self, save: CellSave) -> SaveFuture {
        (self.0)(save)
    }
}

impl PartialEq for SaveHandler {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

#[component]
pub fn DisplayCell(column: ColumnDef<Row>, row: Row) -> Element {
    let text = column.display(&row);
    rsx! {
        td {
            class: cell_class(&column, "cell"),
            style: cell_style(&column),
            title: "{text}",
            "{text}"
        }
    }
}

#[component]
pub fn EditableCell(
    column: ColumnDef<Row>,
    row: Row,
    row_index: usize,
    on_save: Option<SaveHandler>,
) -> Element {
    let editor = use_signal({
        let kind = column.editor.clone();
        move || CellEditor::new(kind)
    });
    let value = column.value(&row);

    if !column.is_editable(&row) {
        return rsx! { DisplayCell { column, row } };
    }

    let column_id = column.id.clone();
    let save = move |value: Value| {
        let mut editor = editor;
        let Some(handler) = on_save.clone() else {
            editor.with_mut(|e| e.finish_save(Ok(())));
            return;
        };
        let save = CellSave {
            row_index,
            column_id: column_id.clone(),
            value,
        };
        // Outlives the cell so an unmounted row still completes its save.
        spawn_forever(async move {
            let result = handler.call(save).await;
            if let Ok(mut editor) = editor.try_write() {
                editor.finish_save(result);
            }
        });
    };

    if let EditorKind::Checkbox = column.editor {
        let checked = value.as_ref().and_then(Value::as_bool).unwrap_or(false);
        let saving = editor.read().is_saving();
        let error = editor.read().error().map(str::to_string);
        return rsx! {
            td { class: cell_class(&column, "cell cell-checkbox"), style: cell_style(&column),
                input {
                    r#type: "checkbox",
                    checked,
                    disabled: saving,
                    onchange: move |_| {
                        let mut editor = editor;
                        let confirm = editor.with_mut(|e| e.toggle_checkbox(checked));
                        if let Confirm::Save(value) = confirm {
                            save(value);
                        }
                    }
                }
                if let Some(error) = error {
                    div { class: "cell-error", "{error}" }
                }
            }
        };
    }

    let confirm = move |confirm: Confirm| {
        if let Confirm::Save(value) = confirm {
            save(value);
        }
    };

    let begin = {
        let value = value.clone();
        move || {
            let mut editor = editor;
            editor.with_mut(|e| e.begin(value.clone()));
        }
    };

    let editing = editor.read().is_editing();
    if !editing {
        let text = column.display(&row);
        return rsx! {
            td {
                class: cell_class(&column, "cell cell-editable"),
                style: cell_style(&column),
                tabindex: 0,
                onclick: {
                    let begin = begin.clone();
                    move |_| begin()
                },
                onkeydown: move |evt| {
                    let key = evt.key();
                    if key == Key::Enter || key == Key::Character(" ".to_string()) {
                        evt.prevent_default();
                        begin();
                    }
                },
                if let EditorKind::MultiSelect { options, max_display } = &column.editor {
                    ChipList {
                        values: multi_values(value.as_ref()),
                        options: options.clone(),
                        max_display: *max_display,
                    }
                } else {
                    "{text}"
                }
            }
        };
    }

    let snapshot = editor.read().clone();
    let saving = snapshot.is_saving();
    let error = snapshot.error().map(str::to_string);
    let draft = snapshot.draft().cloned();

    rsx! {
        td { class: cell_class(&column, "cell editing-cell"), style: cell_style(&column),
            {editor_input(&column.editor, draft, saving, editor, confirm)}
            if let Some(error) = error {
                div { class: "cell-error", "{error}" }
            }
        }
    }
}

/// Renders the input matching the column's editor kind.
fn editor_input(
    kind: &EditorKind,
    draft: Option<Draft>,
    saving: bool,
    mut editor: Signal<CellEditor>,
    confirm: impl Fn(Confirm) + Clone + 'static,
) -> Element {
    let on_key = {
        let confirm = confirm.clone();
        move |evt: KeyboardEvent| match evt.key() {
            Key::Enter => {
                let result = editor.with_mut(|e| e.confirm());
                confirm(result);
            }
            Key::Escape => {
                editor.with_mut(|e| e.cancel());
            }
            _ => {}
        }
    };
    let on_blur = {
        let confirm = confirm.clone();
        move |_: FocusEvent| {
            let result = editor.with_mut(|e| e.blur());
            confirm(result);
        }
    };

    match (kind, draft) {
        (EditorKind::Text, Some(Draft::Text(text))) => rsx! {
            input {
                class: "cell-input",
                r#type: "text",
                value: "{text}",
                autofocus: true,
                disabled: saving,
                oninput: move |evt| editor.with_mut(|e| e.set_draft(Draft::Text(evt.value()))),
                onkeydown: on_key,
                onblur: on_blur,
            }
        },
        (EditorKind::Number, Some(Draft::Text(text))) => rsx! {
            input {
                class: "cell-input",
                r#type: "number",
                value: "{text}",
                autofocus: true,
                disabled: saving,
                oninput: move |evt| editor.with_mut(|e| e.set_draft(Draft::Text(evt.value()))),
                onkeydown: on_key,
                onblur: on_blur,
            }
        },
        (EditorKind::Date, Some(Draft::Text(text))) => rsx! {
            input {
                class: "cell-input",
                r#type: "date",
                value: "{text}",
                autofocus: true,
                disabled: saving,
                oninput: move |evt| editor.with_mut(|e| e.set_draft(Draft::Text(evt.value()))),
                onkeydown: on_key,
                onblur: on_blur,
            }
        },
        (EditorKind::Select { options, clearable }, Some(Draft::Choice(choice))) => {
            let selected = choice.unwrap_or_default();
            rsx! {
                select {
                    class: "cell-select",
                    value: "{selected}",
                    autofocus: true,
                    disabled: saving,
                    onchange: move |evt| {
                        let value = evt.value();
                        let choice = if value.is_empty() { None } else { Some(value) };
                        let result = editor.with_mut(|e| {
                            e.set_draft(Draft::Choice(choice));
                            e.confirm()
                        });
                        confirm(result);
                    },
                    onkeydown: on_key,
                    onblur: on_blur,
                    if *clearable || selected.is_empty() {
                        option { value: "", "-" }
                    }
                    for opt in options.iter() {
                        option {
                            value: "{opt.value}",
                            selected: opt.value == selected,
                            "{opt.label}"
                        }
                    }
                }
            }
        }
        (EditorKind::MultiSelect { options, max_display }, Some(Draft::Choices(choices))) => {
            let (shown, hidden) = edit::chip_overflow(&choices, *max_display);
            let shown = shown.to_vec();
            rsx! {
                div {
                    class: "cell-multiselect",
                    tabindex: 0,
                    onkeydown: on_key,
                    onfocusout: on_blur,
                    div { class: "chips",
                        for value in shown {
                            span { key: "{value}", class: "chip",
                                "{edit::option_label(options, &value)}"
                                button {
                                    class: "chip-remove",
                                    disabled: saving,
                                    onclick: {
                                        let value = value.clone();
                                        move |evt: MouseEvent| {
                                            evt.stop_propagation();
                                            editor.with_mut(|e| e.remove_choice(&value));
                                        }
                                    },
                                    "×"
                                }
                            }
                        }
                        if hidden > 0 {
                            span { class: "chip chip-more", "+{hidden} more" }
                        }
                    }
                    for opt in options.iter() {
                        label { class: "multiselect-option",
                            input {
                                r#type: "checkbox",
                                checked: choices.contains(&opt.value),
                                disabled: saving,
                                onchange: {
                                    let value = opt.value.clone();
                                    move |_| editor.with_mut(|e| e.toggle_choice(&value))
                                }
                            }
                            "{opt.label}"
                        }
                    }
                    button {
                        class: "multiselect-done",
                        disabled: saving,
                        onclick: move |_| {
                            let result = editor.with_mut(|e| e.confirm());
                            confirm(result);
                        },
                        "Done"
                    }
                }
            }
        }
        _ => rsx! {},
    }
}

#[component]
pub fn ChipList(
    values: Vec<String>,
    options: Vec<edit::SelectOption>,
    max_display: usize,
) -> Element {
    let (shown, hidden) = edit::chip_overflow(&values, max_display);
    if shown.is_empty() {
        return rsx! { span { class: "cell-empty", "{data_model::EMPTY_CELL}" } };
    }
    rsx! {
        span { class: "chips",
            for value in shown.iter() {
                span { class: "chip", "{edit::option_label(&options, value)}" }
            }
            if hidden > 0 {
                span { class: "chip chip-more", "+{hidden} more" }
            }
        }
    }
}

fn multi_values(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().map(data_model::display_value).collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(value) => vec![data_model::display_value(value)],
    }
}

pub(crate) fn cell_class<T>(column: &ColumnDef<T>, base: &str) -> String {
    match column.class_name.as_deref() {
        Some(extra) => format!("{base} {extra}"),
        None => base.to_string(),
    }
}

pub(crate) fn cell_style<T>(column: &ColumnDef<T>) -> String {
    let mut style = format!("text-align: {};", column.align.css());
    if let Some(width) = column.width {
        style.push_str(&format!(" width: {width}px;"));
    }
    style
}
