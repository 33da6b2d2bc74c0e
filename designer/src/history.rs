//! Bounded linear undo/redo history.
//!
//! Commands are kept in execution order with a cursor pointing at the last
//! applied one (`None` when everything has been undone). Executing a new
//! command discards anything after the cursor. When the history grows past
//! its capacity the oldest command is dropped.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use tracing::debug;

use crate::command::Command;
use crate::consts::DEFAULT_HISTORY_CAPACITY;
use crate::doc::Scene;

#[derive(Debug)]
pub struct History {
    commands: Vec<Box<dyn Command>>,
    /// Index of the most recently applied command.
    cursor: Option<usize>,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl History {
    /// An empty history keeping at most `capacity` commands (minimum 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self { commands: Vec::new(), cursor: None, capacity: capacity.max(1) }
    }

    /// Run `command` against `scene` and record it.
    pub fn execute(&mut self, mut command: Box<dyn Command>, scene: &mut Scene) {
        command.execute(scene);
        debug!(label = command.label(), "command executed");

        self.commands.truncate(self.redo_start());
        self.commands.push(command);

        if self.commands.len() > self.capacity {
            self.commands.remove(0);
            debug!(capacity = self.capacity, "history full, oldest command evicted");
        }
        self.cursor = self.commands.len().checked_sub(1);
    }

    /// Undo the command at the cursor. Returns `false` if there is none.
    pub fn undo(&mut self, scene: &mut Scene) -> bool {
        let Some(index) = self.cursor else {
            return false;
        };
        let Some(command) = self.commands.get_mut(index) else {
            return false;
        };
        command.undo(scene);
        debug!(label = command.label(), "command undone");
        self.cursor = index.checked_sub(1);
        true
    }

    /// Redo the command after the cursor. Returns `false` if there is none.
    pub fn redo(&mut self, scene: &mut Scene) -> bool {
        let index = self.redo_start();
        let Some(command) = self.commands.get_mut(index) else {
            return false;
        };
        command.redo(scene);
        debug!(label = command.label(), "command redone");
        self.cursor = Some(index);
        true
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.cursor.is_some()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.redo_start() < self.commands.len()
    }

    /// Drop every recorded command.
    pub fn clear(&mut self) {
        self.commands.clear();
        self.cursor = None;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Position of the most recently applied command.
    #[must_use]
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Label of the command [`History::undo`] would revert.
    #[must_use]
    pub fn undo_label(&self) -> Option<&'static str> {
        self.cursor.and_then(|i| self.commands.get(i)).map(|c| c.label())
    }

    /// Label of the command [`History::redo`] would re-apply.
    #[must_use]
    pub fn redo_label(&self) -> Option<&'static str> {
        self.commands.get(self.redo_start()).map(|c| c.label())
    }

    fn redo_start(&self) -> usize {
        self.cursor.map_or(0, |i| i + 1)
    }
}
