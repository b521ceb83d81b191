//! Board ("Kai") and category aggregates.

use super::{BoardDomainError, BoardId, CategoryId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Trims `value` and rejects it when nothing is left.
fn validated_name(value: impl Into<String>) -> Result<String, BoardDomainError> {
    let raw = value.into();
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(BoardDomainError::EmptyName);
    }
    Ok(trimmed.to_owned())
}

/// Top-level container of categories and tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    id: BoardId,
    name: String,
    description: String,
    created_at: DateTime<Utc>,
}

impl Board {
    /// Creates a board.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::EmptyName`] when the name is blank.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<Self, BoardDomainError> {
        Ok(Self {
            id: BoardId::new(),
            name: validated_name(name)?,
            description: description.into().trim().to_owned(),
            created_at: clock.utc(),
        })
    }

    /// Returns the board identifier.
    #[must_use]
    pub const fn id(&self) -> BoardId {
        self.id
    }

    /// Returns the board name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the board description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Applies a rename and/or description change.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::EmptyName`] when the new name is blank.
    pub fn apply(&mut self, changes: BoardChanges) -> Result<(), BoardDomainError> {
        let name = changes.name.map(validated_name).transpose()?;
        if let Some(new_name) = name {
            self.name = new_name;
        }
        if let Some(description) = changes.description {
            self.description = description.trim().to_owned();
        }
        Ok(())
    }
}

/// Partial update of a board.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardChanges {
    /// New name, if renaming.
    pub name: Option<String>,
    /// New description, if changing it.
    pub description: Option<String>,
}

impl BoardChanges {
    /// Sets the new name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the new description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Board with denormalized child counts, as shown in the board list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSummary {
    /// The board itself.
    pub board: Board,
    /// Number of categories on the board.
    pub category_count: usize,
    /// Number of tasks and notes on the board.
    pub task_count: usize,
}

impl BoardSummary {
    /// Wraps a freshly created board with zero counts.
    #[must_use]
    pub const fn empty(board: Board) -> Self {
        Self {
            board,
            category_count: 0,
            task_count: 0,
        }
    }
}

/// Column grouping tasks within a board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    id: CategoryId,
    board_id: BoardId,
    name: String,
    position: u32,
}

impl Category {
    /// Creates a category at `position` on `board_id`.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::EmptyName`] when the name is blank.
    pub fn new(
        board_id: BoardId,
        name: impl Into<String>,
        position: u32,
    ) -> Result<Self, BoardDomainError> {
        Ok(Self {
            id: CategoryId::new(),
            board_id,
            name: validated_name(name)?,
            position,
        })
    }

    /// Returns the category identifier.
    #[must_use]
    pub const fn id(&self) -> CategoryId {
        self.id
    }

    /// Returns the owning board.
    #[must_use]
    pub const fn board_id(&self) -> BoardId {
        self.board_id
    }

    /// Returns the category name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the ordinal position on the board.
    #[must_use]
    pub const fn position(&self) -> u32 {
        self.position
    }

    /// Renames the category.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::EmptyName`] when the name is blank.
    pub fn rename(&mut self, name: impl Into<String>) -> Result<(), BoardDomainError> {
        self.name = validated_name(name)?;
        Ok(())
    }
}
