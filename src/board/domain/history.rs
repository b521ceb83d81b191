//! Append-only audit trail of task status changes and field edits.
//!
//! Entries are persisted as a JSON array. Status changes carry
//! `{status, timestamp, previous_status}`; field edits carry
//! `{timestamp, change_type, old_value, new_value}`. A `null`
//! `previous_status` marks task creation.

use super::TaskStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Task field whose edits are audited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EditedField {
    /// Task title.
    #[serde(rename = "title_edit")]
    Title,
    /// Task description.
    #[serde(rename = "description_edit")]
    Description,
    /// Task due date.
    #[serde(rename = "due_date_edit")]
    DueDate,
}

impl EditedField {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title_edit",
            Self::Description => "description_edit",
            Self::DueDate => "due_date_edit",
        }
    }
}

/// Record of one status mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    /// Status after the change.
    pub status: TaskStatus,
    /// When the change happened.
    pub timestamp: DateTime<Utc>,
    /// Status before the change; `None` for task creation.
    pub previous_status: Option<TaskStatus>,
}

/// Record of one edited field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldEdit {
    /// When the edit happened.
    pub timestamp: DateTime<Utc>,
    /// Which field changed.
    pub change_type: EditedField,
    /// Value before the edit.
    pub old_value: Option<String>,
    /// Value after the edit.
    pub new_value: Option<String>,
}

/// One history entry.
///
/// Field edits are tried first when deserializing because only they carry a
/// `change_type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HistoryEntry {
    /// A title, description or due date edit.
    FieldEdit(FieldEdit),
    /// A status transition or the creation marker.
    StatusChange(StatusChange),
}

impl HistoryEntry {
    /// Returns when the entry was recorded.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::FieldEdit(edit) => edit.timestamp,
            Self::StatusChange(change) => change.timestamp,
        }
    }

    /// Returns whether this entry marks task creation.
    #[must_use]
    pub const fn is_creation(&self) -> bool {
        matches!(
            self,
            Self::StatusChange(StatusChange {
                previous_status: None,
                ..
            })
        )
    }

    /// Short description shown in the history timeline.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::StatusChange(StatusChange {
                previous_status: None,
                ..
            }) => "Task created".to_owned(),
            Self::StatusChange(StatusChange {
                status,
                previous_status: Some(previous),
                ..
            }) => format!("{} → {}", previous.label(), status.label()),
            Self::FieldEdit(edit) => match edit.change_type {
                EditedField::Title => "Title updated".to_owned(),
                EditedField::Description => "Description updated".to_owned(),
                EditedField::DueDate => "Due date updated".to_owned(),
            },
        }
    }
}

/// Ordered, append-only sequence of history entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusHistory(Vec<HistoryEntry>);

impl StatusHistory {
    /// Creates a history holding only the creation marker.
    #[must_use]
    pub fn created(status: TaskStatus, at: DateTime<Utc>) -> Self {
        Self::default().with_status_change(status, None, at)
    }

    /// Returns the history with a status change appended.
    ///
    /// `previous` is `None` only for the creation marker.
    #[must_use]
    pub fn with_status_change(
        mut self,
        status: TaskStatus,
        previous: Option<TaskStatus>,
        at: DateTime<Utc>,
    ) -> Self {
        self.0.push(HistoryEntry::StatusChange(StatusChange {
            status,
            timestamp: at,
            previous_status: previous,
        }));
        self
    }

    /// Returns the history with a field edit appended.
    #[must_use]
    pub fn with_field_edit(
        mut self,
        field: EditedField,
        old_value: Option<String>,
        new_value: Option<String>,
        at: DateTime<Utc>,
    ) -> Self {
        self.0.push(HistoryEntry::FieldEdit(FieldEdit {
            timestamp: at,
            change_type: field,
            old_value,
            new_value,
        }));
        self
    }

    /// Returns the entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.0
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether no entry has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the most recent entry.
    #[must_use]
    pub fn last(&self) -> Option<&HistoryEntry> {
        self.0.last()
    }

    /// Iterates over the entries in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, HistoryEntry> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a StatusHistory {
    type Item = &'a HistoryEntry;
    type IntoIter = std::slice::Iter<'a, HistoryEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
