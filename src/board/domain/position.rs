//! Sparse floating-point ordering of tasks within a lane.
//!
//! A lane is the set of tasks sharing a category and a status, sorted by
//! ascending position. Moving a task to either end places it one gap beyond
//! the current extreme; moving it between two tasks takes the midpoint of its
//! new neighbours. Once neighbours get closer than the minimum gap the lane is
//! renumbered from scratch.

use super::TaskId;

/// Spacing rules for sparse positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionSpacing {
    gap: f64,
    min_gap: f64,
}

impl PositionSpacing {
    /// Gap of 1000 with a one-millionth renumbering threshold.
    pub const DEFAULT: Self = Self {
        gap: 1000.0,
        min_gap: 1e-6,
    };

    /// Creates spacing rules.
    ///
    /// Both values are expected to be positive and finite; configuration
    /// loading enforces this.
    #[must_use]
    pub const fn new(gap: f64, min_gap: f64) -> Self {
        Self { gap, min_gap }
    }

    /// Returns the end-of-lane gap.
    #[must_use]
    pub const fn gap(self) -> f64 {
        self.gap
    }

    /// Returns the renumbering threshold.
    #[must_use]
    pub const fn min_gap(self) -> f64 {
        self.min_gap
    }
}

impl Default for PositionSpacing {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A task's place in a lane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaneSlot {
    /// Task occupying the slot.
    pub task_id: TaskId,
    /// Sort key of the task.
    pub position: f64,
}

/// Position writes needed to complete a move.
#[derive(Debug, Clone, PartialEq)]
pub enum ReorderPlan {
    /// Only the moved task changes position.
    Move {
        /// Task being moved.
        task_id: TaskId,
        /// Its new position.
        position: f64,
    },
    /// The whole lane is renumbered, listed in final order.
    Renumber(Vec<LaneSlot>),
}

/// Plans moving `moved` onto the slot currently held by `target`.
///
/// `lane` must be sorted by ascending position. Returns `None` when either
/// task is missing from the lane or both are the same task.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "positions are floating-point ranks by construction"
)]
pub fn plan_reorder(
    lane: &[LaneSlot],
    moved: TaskId,
    target: TaskId,
    spacing: PositionSpacing,
) -> Option<ReorderPlan> {
    if moved == target {
        return None;
    }
    let old_index = lane.iter().position(|slot| slot.task_id == moved)?;
    let new_index = lane.iter().position(|slot| slot.task_id == target)?;
    let last_index = lane.len().checked_sub(1)?;

    if new_index == 0 {
        let top = lane.first()?.position;
        return Some(ReorderPlan::Move {
            task_id: moved,
            position: top - spacing.gap,
        });
    }
    if new_index == last_index {
        let bottom = lane.last()?.position;
        return Some(ReorderPlan::Move {
            task_id: moved,
            position: bottom + spacing.gap,
        });
    }

    let mut reordered = lane.to_vec();
    let slot = reordered.remove(old_index);
    reordered.insert(new_index, slot);

    let previous = reordered.get(new_index - 1)?.position;
    let next = reordered.get(new_index + 1)?.position;
    let midpoint = (previous + next) / 2.0;

    if midpoint - previous < spacing.min_gap || next - midpoint < spacing.min_gap {
        return Some(ReorderPlan::Renumber(renumbered(reordered, spacing)));
    }
    Some(ReorderPlan::Move {
        task_id: moved,
        position: midpoint,
    })
}

/// Reassigns evenly spaced positions, starting one gap above zero.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "positions are floating-point ranks by construction"
)]
pub fn renumbered(slots: Vec<LaneSlot>, spacing: PositionSpacing) -> Vec<LaneSlot> {
    let mut position = 0.0;
    slots
        .into_iter()
        .map(|slot| {
            position += spacing.gap;
            LaneSlot { position, ..slot }
        })
        .collect()
}
