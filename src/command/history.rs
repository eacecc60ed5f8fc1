use crate::document::Document;

/// Linear undo/redo history of document snapshots.
///
/// `entries` always holds at least one snapshot and `cursor` always points
/// at one of them. Pushing while the cursor is behind the last entry drops
/// everything after the cursor first, so there is never more than one
/// forward path.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<Document>,
    cursor: usize,
    /// Oldest entries are dropped once this many are held
    max_entries: Option<usize>,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    /// History holding only the empty document
    pub fn new() -> Self {
        Self::starting_at(Document::new())
    }

    /// History whose only entry is `initial`
    pub fn starting_at(initial: Document) -> Self {
        Self {
            entries: vec![initial],
            cursor: 0,
            max_entries: None,
        }
    }

    /// Bound the number of held snapshots; `None` keeps every entry.
    ///
    /// A bound of zero is treated as one, the current snapshot must stay.
    pub fn with_limit(mut self, max_entries: Option<usize>) -> Self {
        self.max_entries = max_entries.map(|max| max.max(1));
        self.enforce_limit();
        self
    }

    /// The snapshot at the cursor
    pub fn current(&self) -> &Document {
        &self.entries[self.cursor]
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Never true: the history always holds the current snapshot
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Document] {
        &self.entries
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Append `snapshot` after the cursor and make it current
    pub fn push(&mut self, snapshot: Document) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(snapshot);
        self.cursor = self.entries.len() - 1;
        self.enforce_limit();
        log::debug!(
            "History push: {} entries, cursor at {}",
            self.entries.len(),
            self.cursor
        );
    }

    /// Step back one snapshot. Returns `None` when already at the first entry.
    pub fn undo(&mut self) -> Option<&Document> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        log::debug!("History undo: cursor at {}", self.cursor);
        Some(self.current())
    }

    /// Step forward one snapshot. Returns `None` when already at the last entry.
    pub fn redo(&mut self) -> Option<&Document> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        log::debug!("History redo: cursor at {}", self.cursor);
        Some(self.current())
    }

    /// Overwrite the snapshot at the cursor without adding an entry.
    ///
    /// Used for changes that are not undoable on their own, like selection.
    pub fn replace_current(&mut self, snapshot: Document) {
        self.entries[self.cursor] = snapshot;
    }

    fn enforce_limit(&mut self) {
        let Some(max) = self.max_entries else {
            return;
        };
        if self.entries.len() > max {
            let excess = self.entries.len() - max;
            self.entries.drain(..excess);
            self.cursor = self.cursor.saturating_sub(excess);
        }
    }
}
