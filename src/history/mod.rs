//! Undo/redo command log.
//!
//! Every layout mutation goes through [`History::execute`] as a [`Command`].
//! Consecutive edits of the same target inside the coalesce window merge into
//! a single undo step, so dragging a device across the rack undoes in one go.

mod commands;

pub use commands::{Command, CommandAction, CommandKind};

use chrono::TimeDelta;
use std::collections::VecDeque;
use tracing::debug;

use crate::config::EditorConfig;
use crate::constants::{DEFAULT_COALESCE_WINDOW_MS, DEFAULT_HISTORY_LIMIT};
use crate::models::Layout;

/// A recorded command and whether it changed the layout when last applied.
#[derive(Debug, Clone)]
struct Entry {
    command: Command,
    applied: bool,
}

/// Undo and redo stacks over a layout.
#[derive(Debug, Clone)]
pub struct History {
    undo_stack: VecDeque<Entry>,
    redo_stack: Vec<Entry>,
    limit: usize,
    coalesce_window: TimeDelta,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT, DEFAULT_COALESCE_WINDOW_MS)
    }
}

impl History {
    /// Creates an empty history keeping at most `limit` undo steps.
    #[must_use]
    pub fn new(limit: usize, coalesce_window_ms: u64) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            limit: limit.max(1),
            coalesce_window: TimeDelta::milliseconds(
                i64::try_from(coalesce_window_ms).unwrap_or(i64::MAX),
            ),
        }
    }

    /// Creates an empty history from editor settings.
    #[must_use]
    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new(config.history_limit, config.coalesce_window_ms)
    }

    /// Applies `command`, records it and clears the redo stack.
    ///
    /// A command whose target does not exist is still recorded as an undo
    /// step; it changes nothing, returns false, and its undo is a no-op.
    /// Such a command is never coalesced.
    ///
    /// # Examples
    ///
    /// ```
    /// use rackplan::history::{Command, History};
    /// use rackplan::models::{Layout, Rack};
    ///
    /// let mut layout = Layout::new("Lab", Rack::new("Main", 42).unwrap());
    /// let mut history = History::default();
    ///
    /// let rename = Command::rename_layout(&layout, "Garage");
    /// assert!(history.execute(&mut layout, rename));
    /// assert_eq!(layout.name, "Garage");
    ///
    /// history.undo(&mut layout);
    /// assert_eq!(layout.name, "Lab");
    /// ```
    pub fn execute(&mut self, layout: &mut Layout, command: Command) -> bool {
        let applied = command.execute(layout);
        self.redo_stack.clear();

        if !applied {
            debug!("'{}' found no target", command.description);
        } else if let Some(top) = self.undo_stack.back_mut().filter(|e| e.applied) {
            let elapsed = command.timestamp.signed_duration_since(top.command.timestamp);
            if elapsed >= TimeDelta::zero()
                && elapsed <= self.coalesce_window
                && top.command.coalesce(&command)
            {
                debug!("Coalesced '{}'", command.description);
                return true;
            }
        }

        debug!("Executed '{}'", command.description);
        self.undo_stack.push_back(Entry { command, applied });
        while self.undo_stack.len() > self.limit {
            self.undo_stack.pop_front();
        }
        applied
    }

    /// Reverts the most recent command. No-op when there is nothing to undo.
    pub fn undo(&mut self, layout: &mut Layout) -> bool {
        let Some(entry) = self.undo_stack.pop_back() else {
            return false;
        };
        if entry.applied && !entry.command.undo(layout) {
            debug!("Undo of '{}' found no target", entry.command.description);
        }
        self.redo_stack.push(entry);
        true
    }

    /// Re-applies the most recently undone command. No-op when there is nothing to redo.
    pub fn redo(&mut self, layout: &mut Layout) -> bool {
        let Some(mut entry) = self.redo_stack.pop() else {
            return false;
        };
        entry.applied = entry.command.execute(layout);
        if !entry.applied {
            debug!("Redo of '{}' found no target", entry.command.description);
        }
        self.undo_stack.push_back(entry);
        true
    }

    /// Returns true if there is a command to undo.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Returns true if there is a command to redo.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Description of the command [`History::undo`] would revert.
    #[must_use]
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack
            .back()
            .map(|e| e.command.description.as_str())
    }

    /// Description of the command [`History::redo`] would re-apply.
    #[must_use]
    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack
            .last()
            .map(|e| e.command.description.as_str())
    }

    /// Number of recorded undo steps.
    #[must_use]
    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    /// Drops both stacks.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
