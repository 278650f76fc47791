//! Ordered, deduplicated in-memory store of assistant records.

use std::collections::HashMap;

use tracing::debug;

use crate::model::Assistant;

/// Tracks the last-seen id for incremental list loads.
///
/// Advances only on a successful page fetch and never rewinds mid-session;
/// `reset` starts pagination over for an initial fetch.
#[derive(Debug, Clone, Default)]
pub struct PaginationCursor {
    last_id: Option<String>,
}

impl PaginationCursor {
    /// The id to pass as `after` on the next list call, if any.
    pub fn last_id(&self) -> Option<&str> {
        self.last_id.as_deref()
    }

    /// Advance to the last id of a successfully appended page.
    pub fn advance(&mut self, id: &str) {
        self.last_id = Some(id.to_string());
    }

    /// Restart pagination from the beginning.
    pub fn reset(&mut self) {
        self.last_id = None;
    }
}

/// Ordered, deduplicated cache of assistants in server pagination order.
///
/// Re-fetching a page never reorders previously cached entries: a known id
/// is updated in place, a new id is appended in response order.
#[derive(Debug, Default)]
pub struct AssistantCache {
    entries: Vec<Assistant>,
    index: HashMap<String, usize>,
    cursor: PaginationCursor,
    has_more: bool,
}

impl AssistantCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a fetched page into the cache and advance the cursor to the
    /// page's last id.
    pub fn append_page(&mut self, items: Vec<Assistant>, has_more: bool) {
        let last_id = items.last().map(|a| a.id.clone());
        let mut appended = 0usize;
        let mut updated = 0usize;
        for item in items {
            if self.upsert(item) {
                appended += 1;
            } else {
                updated += 1;
            }
        }
        if let Some(id) = last_id {
            self.cursor.advance(&id);
        }
        self.has_more = has_more;
        debug!(appended, updated, total = self.entries.len(), "Merged assistant page");
    }

    /// Insert or update a single record. A known id keeps its position; a
    /// new id lands at the end. Returns true if the record was appended.
    pub fn upsert(&mut self, assistant: Assistant) -> bool {
        match self.index.get(&assistant.id) {
            Some(&pos) => {
                self.entries[pos] = assistant;
                false
            }
            None => {
                self.index.insert(assistant.id.clone(), self.entries.len());
                self.entries.push(assistant);
                true
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&Assistant> {
        self.index.get(id).map(|&pos| &self.entries[pos])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Ordered snapshot of all cached assistants.
    pub fn snapshot(&self) -> Vec<Assistant> {
        self.entries.clone()
    }

    pub fn cursor(&self) -> &PaginationCursor {
        &self.cursor
    }

    /// Restart pagination (the cached entries are kept; refetched pages
    /// merge in place).
    pub fn reset_cursor(&mut self) {
        self.cursor.reset();
    }

    /// Whether the server reported more pages after the last fetch.
    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
