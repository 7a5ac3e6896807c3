//! Linear undo/redo log of markings.
//!
//! Entry 0 holds the initial marking and no transition; entry `i > 0` holds the marking
//! produced by firing `entries[i].transition` from entry `i - 1`. The cursor selects the
//! present entry. Recording after an undo first drops everything past the cursor.
use crate::net::{Marking, TransitionId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub marking: Marking,
    pub transition: Option<TransitionId>,
}

#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<HistoryEntry>,
    cursor: usize,
    limit: Option<usize>,
}

impl History {
    /// Unbounded history starting at `initial`.
    pub fn new(initial: Marking) -> Self {
        Self::with_limit(initial, None)
    }

    /// History that keeps at most `limit` entries (at least one is always kept).
    ///
    /// When a record exceeds the limit the oldest entries are dropped and the oldest
    /// survivor becomes the new starting point, losing its transition.
    pub fn with_limit(initial: Marking, limit: Option<usize>) -> Self {
        let mut history = Self {
            entries: Vec::new(),
            cursor: 0,
            limit: limit.map(|l| l.max(1)),
        };
        history.init(initial);
        history
    }

    /// Clears the log down to a single entry holding `marking`.
    pub fn init(&mut self, marking: Marking) {
        self.entries.clear();
        self.entries.push(HistoryEntry {
            marking,
            transition: None,
        });
        self.cursor = 0;
    }

    /// Appends the result of firing `transition`, discarding any redo tail.
    pub fn record_fire(&mut self, marking: Marking, transition: TransitionId) {
        let discarded = self.entries.len() - (self.cursor + 1);
        if discarded > 0 {
            log::debug!("discarding {discarded} redo entries");
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push(HistoryEntry {
            marking,
            transition: Some(transition),
        });
        self.cursor = self.entries.len() - 1;
        self.enforce_limit();
    }

    fn enforce_limit(&mut self) {
        let Some(limit) = self.limit else {
            return;
        };
        if self.entries.len() <= limit {
            return;
        }
        let excess = self.entries.len() - limit;
        log::warn!("history limit {limit} reached, evicting {excess} oldest entries");
        self.entries.drain(..excess);
        self.entries[0].transition = None;
        self.cursor -= excess;
    }

    pub fn current(&self) -> &Marking {
        &self.entries[self.cursor].marking
    }

    pub fn current_entry(&self) -> &HistoryEntry {
        &self.entries[self.cursor]
    }

    /// Transitions that lead from entry 0 to the present, in firing order.
    pub fn sequence(&self) -> Vec<TransitionId> {
        self.entries[1..=self.cursor]
            .iter()
            .filter_map(|entry| entry.transition)
            .collect()
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Steps back one entry. Returns false, doing nothing, at the start.
    pub fn undo(&mut self) -> bool {
        if !self.can_undo() {
            return false;
        }
        self.cursor -= 1;
        true
    }

    /// Steps forward one entry. Returns false, doing nothing, at the end.
    pub fn redo(&mut self) -> bool {
        if !self.can_redo() {
            return false;
        }
        self.cursor += 1;
        true
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }
}
