//! Inline cell editing.
//!
//! Every editable cell runs the same two-state machine (display, editing).
//! What differs per column is the [`EditorKind`]: how a value becomes a
//! draft, and how a draft is validated back into a value.

use std::collections::BTreeSet;
use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::state::data_model;
use crate::state::filter;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }

    /// Options whose label is their value.
    pub fn plain<I, S>(values: I) -> Vec<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        values
            .into_iter()
            .map(|value| {
                let value = value.into();
                Self::new(value.clone(), value)
            })
            .collect()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum EditorKind {
    #[default]
    Text,
    Number,
    Select {
        options: Vec<SelectOption>,
        #[serde(default)]
        clearable: bool,
    },
    MultiSelect {
        options: Vec<SelectOption>,
        #[serde(default = "default_max_display")]
        max_display: usize,
    },
    Date,
    Checkbox,
}

fn default_max_display() -> usize {
    3
}

/// Work-in-progress input held by an open editor.
#[derive(Clone, Debug, PartialEq)]
pub enum Draft {
    Text(String),
    Choice(Option<String>),
    Choices(Vec<String>),
    Flag(bool),
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum EditError {
    #[error("\"{0}\" is not a number")]
    InvalidNumber(String),
    #[error("\"{0}\" is not a date (expected YYYY-MM-DD)")]
    InvalidDate(String),
    #[error("\"{0}\" is not one of the available options")]
    UnknownOption(String),
    #[error("a value is required")]
    Required,
    #[error("draft does not fit this editor")]
    DraftMismatch,
}

/// Failure reported by the caller's save callback.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct SaveError {
    pub message: String,
}

impl SaveError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl EditorKind {
    pub fn select<I, S>(values: I, clearable: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Select {
            options: SelectOption::plain(values),
            clearable,
        }
    }

    pub fn multi_select<I, S>(values: I, max_display: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::MultiSelect {
            options: SelectOption::plain(values),
            max_display,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Select { .. } => "select",
            Self::MultiSelect { .. } => "multi-select",
            Self::Date => "date",
            Self::Checkbox => "checkbox",
        }
    }

    pub fn options(&self) -> &[SelectOption] {
        match self {
            Self::Select { options, .. } | Self::MultiSelect { options, .. } => options,
            _ => &[],
        }
    }

    /// Checkboxes have nothing to confirm; a toggle is the commit.
    pub fn commits_immediately(&self) -> bool {
        matches!(self, Self::Checkbox)
    }

    /// Pre-fills an editor from the cell's current value.
    pub fn draft_from(&self, value: Option<&Value>) -> Draft {
        let value = value.filter(|value| !value.is_null());
        match self {
            Self::Text | Self::Number => {
                Draft::Text(value.map(data_model::display_value).unwrap_or_default())
            }
            Self::Date => Draft::Text(
                value
                    .and_then(Value::as_str)
                    .and_then(filter::parse_date)
                    .map(|date| date.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
            ),
            Self::Select { .. } => Draft::Choice(value.map(data_model::display_value)),
            Self::MultiSelect { .. } => Draft::Choices(match value {
                Some(Value::Array(items)) => items.iter().map(data_model::display_value).collect(),
                Some(value) => vec![data_model::display_value(value)],
                None => Vec::new(),
            }),
            Self::Checkbox => Draft::Flag(value.and_then(Value::as_bool).unwrap_or(false)),
        }
    }

    /// Validates a draft into the value handed to the save callback.
    pub fn parse(&self, draft: &Draft) -> Result<Value, EditError> {
        match (self, draft) {
            (Self::Text, Draft::Text(text)) => Ok(Value::String(text.clone())),
            (Self::Number, Draft::Text(text)) => parse_number(text),
            (Self::Date, Draft::Text(text)) => {
                let text = text.trim();
                if text.is_empty() {
                    return Ok(Value::Null);
                }
                filter::parse_date(text)
                    .map(|date| Value::String(date.format("%Y-%m-%d").to_string()))
                    .ok_or_else(|| EditError::InvalidDate(text.to_string()))
            }
            (Self::Select { options, clearable }, Draft::Choice(choice)) => match choice {
                Some(choice) if options.iter().any(|opt| &opt.value == choice) => {
                    Ok(Value::String(choice.clone()))
                }
                Some(choice) => Err(EditError::UnknownOption(choice.clone())),
                None if *clearable => Ok(Value::Null),
                None => Err(EditError::Required),
            },
            (Self::MultiSelect { options, .. }, Draft::Choices(choices)) => {
                if let Some(unknown) = choices
                    .iter()
                    .find(|choice| !options.iter().any(|opt| &opt.value == *choice))
                {
                    return Err(EditError::UnknownOption(unknown.clone()));
                }
                Ok(Value::Array(
                    choices.iter().cloned().map(Value::String).collect(),
                ))
            }
            (Self::Checkbox, Draft::Flag(flag)) => Ok(Value::Bool(*flag)),
            _ => Err(EditError::DraftMismatch),
        }
    }

    /// Whether `next` differs from `original` as far as this editor cares.
    ///
    /// `original` is first normalized through this editor, so a number
    /// under a text editor or a timestamp under a date editor counts as
    /// unchanged when the draft still reads the same.
    pub fn is_changed(&self, original: Option<&Value>, next: &Value) -> bool {
        if let Ok(baseline) = self.parse(&self.draft_from(original)) {
            if !self.differs(&baseline, next) {
                return false;
            }
        }
        self.differs(original.unwrap_or(&Value::Null), next)
    }

    fn differs(&self, original: &Value, next: &Value) -> bool {
        match (self, original, next) {
            (Self::Number, Value::Number(a), Value::Number(b)) => a.as_f64() != b.as_f64(),
            (Self::MultiSelect { .. }, Value::Array(a), Value::Array(b)) => {
                let a: BTreeSet<String> = a.iter().map(data_model::display_value).collect();
                let b: BTreeSet<String> = b.iter().map(data_model::display_value).collect();
                a != b
            }
            (Self::MultiSelect { .. }, Value::Null, Value::Array(b)) => !b.is_empty(),
            (Self::Text, Value::Null, Value::String(b)) => !b.is_empty(),
            _ => original != next,
        }
    }
}

fn parse_number(text: &str) -> Result<Value, EditError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Value::Null);
    }
    if let Ok(int) = text.parse::<i64>() {
        return Ok(Value::Number(int.into()));
    }
    text.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| EditError::InvalidNumber(text.to_string()))
}

#[derive(Clone, Debug, PartialEq)]
pub struct EditSession {
    pub original: Option<Value>,
    pub draft: Draft,
    pub saving: bool,
    pub error: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum CellMode {
    #[default]
    Display,
    Editing(EditSession),
}

/// Outcome of confirming an editor.
#[derive(Clone, Debug, PartialEq)]
pub enum Confirm {
    /// Nothing changed; the editor closed without saving.
    Unchanged,
    /// The caller must save this value and report back through
    /// [`CellEditor::finish_save`].
    Save(Value),
    /// The draft did not validate; the editor stays open.
    Invalid(EditError),
    /// A save is already in flight.
    Busy,
    NotEditing,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CellEditor {
    editor: EditorKind,
    mode: CellMode,
}

impl CellEditor {
    pub fn new(editor: EditorKind) -> Self {
        Self {
            editor,
            mode: CellMode::Display,
        }
    }

    pub fn editor(&self) -> &EditorKind {
        &self.editor
    }

    pub fn mode(&self) -> &CellMode {
        &self.mode
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.mode, CellMode::Editing(_))
    }

    pub fn is_saving(&self) -> bool {
        matches!(&self.mode, CellMode::Editing(session) if session.saving)
    }

    pub fn draft(&self) -> Option<&Draft> {
        match &self.mode {
            CellMode::Editing(session) => Some(&session.draft),
            CellMode::Display => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.mode {
            CellMode::Editing(session) => session.error.as_deref(),
            CellMode::Display => None,
        }
    }

    /// Opens the editor pre-filled with `original`. No-op when already
    /// editing.
    pub fn begin(&mut self, original: Option<Value>) -> bool {
        if self.is_editing() {
            return false;
        }
        let draft = self.editor.draft_from(original.as_ref());
        self.mode = CellMode::Editing(EditSession {
            original,
            draft,
            saving: false,
            error: None,
        });
        true
    }

    /// Replaces the draft. Ignored while saving.
    pub fn set_draft(&mut self, draft: Draft) {
        if let CellMode::Editing(session) = &mut self.mode {
            if !session.saving {
                session.draft = draft;
                session.error = None;
            }
        }
    }

    /// Adds or removes one value from a multi-select draft.
    pub fn toggle_choice(&mut self, value: &str) {
        if let Some(Draft::Choices(choices)) = self.draft() {
            let mut next = choices.clone();
            toggle_chip(&mut next, value);
            self.set_draft(Draft::Choices(next));
        }
    }

    /// Drops one chip from a multi-select draft.
    pub fn remove_choice(&mut self, value: &str) {
        if let Some(Draft::Choices(choices)) = self.draft() {
            let mut next = choices.clone();
            remove_chip(&mut next, value);
            self.set_draft(Draft::Choices(next));
        }
    }

    pub fn confirm(&mut self) -> Confirm {
        let CellMode::Editing(session) = &mut self.mode else {
            return Confirm::NotEditing;
        };
        if session.saving {
            return Confirm::Busy;
        }

        let value = match self.editor.parse(&session.draft) {
            Ok(value) => value,
            Err(err) => {
                session.error = Some(err.to_string());
                return Confirm::Invalid(err);
            }
        };

        if !self.editor.is_changed(session.original.as_ref(), &value) {
            self.mode = CellMode::Display;
            return Confirm::Unchanged;
        }

        session.saving = true;
        session.error = None;
        Confirm::Save(value)
    }

    /// Settles an in-flight save. Success closes the editor; failure keeps
    /// it open with the error and the draft intact.
    pub fn finish_save(&mut self, result: Result<(), SaveError>) {
        let CellMode::Editing(session) = &mut self.mode else {
            return;
        };
        match result {
            Ok(()) => self.mode = CellMode::Display,
            Err(err) => {
                log::error!("cell save failed: {err}");
                session.saving = false;
                session.error = Some(err.to_string());
            }
        }
    }

    /// Discards the draft. Refused while a save is in flight.
    pub fn cancel(&mut self) -> bool {
        if self.is_saving() || !self.is_editing() {
            return false;
        }
        self.mode = CellMode::Display;
        true
    }

    /// Focus left the editor: an untouched editor closes, a changed one
    /// confirms.
    pub fn blur(&mut self) -> Confirm {
        let CellMode::Editing(session) = &self.mode else {
            return Confirm::NotEditing;
        };
        if session.saving {
            return Confirm::Busy;
        }
        let untouched = self.editor.draft_from(session.original.as_ref()) == session.draft;
        if untouched {
            self.mode = CellMode::Display;
            return Confirm::Unchanged;
        }
        self.confirm()
    }

    /// Checkbox commit: flips `current` and asks the caller to save it
    /// straight away.
    pub fn toggle_checkbox(&mut self, current: bool) -> Confirm {
        if self.is_saving() {
            return Confirm::Busy;
        }
        let next = !current;
        self.mode = CellMode::Editing(EditSession {
            original: Some(Value::Bool(current)),
            draft: Draft::Flag(next),
            saving: true,
            error: None,
        });
        Confirm::Save(Value::Bool(next))
    }

    /// Confirms and, when there is something to save, awaits `save` and
    /// settles the editor with its result.
    pub async fn commit_with<F, Fut>(&mut self, save: F) -> Confirm
    where
        F: FnOnce(Value) -> Fut,
        Fut: Future<Output = Result<(), SaveError>>,
    {
        let confirm = self.confirm();
        if let Confirm::Save(value) = &confirm {
            let result = save(value.clone()).await;
            self.finish_save(result);
        }
        confirm
    }
}

pub fn toggle_chip(selected: &mut Vec<String>, value: &str) {
    if let Some(pos) = selected.iter().position(|chip| chip == value) {
        selected.remove(pos);
    } else {
        selected.push(value.to_string());
    }
}

pub fn remove_chip(selected: &mut Vec<String>, value: &str) {
    selected.retain(|chip| chip != value);
}

/// Chips to show and how many are folded into "+N more".
pub fn chip_overflow(selected: &[String], max_display: usize) -> (&[String], usize) {
    let shown = selected.len().min(max_display);
    (&selected[..shown], selected.len() - shown)
}

/// Label for a value, falling back to the value itself.
pub fn option_label<'a>(options: &'a [SelectOption], value: &'a str) -> &'a str {
    options
        .iter()
        .find(|opt| opt.value == value)
        .map(|opt| opt.label.as_str())
        .unwrap_or(value)
}
