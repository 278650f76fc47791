//! Upload coordination — generation-tokened pending uploads.

use std::path::PathBuf;

use tracing::debug;

/// An in-flight or completed file upload tied to a draft generation.
///
/// The result is only applied to the draft that was active when the upload
/// started; a selection change in between means the result is discarded.
#[derive(Debug, Clone)]
pub struct PendingUpload {
    pub file_url: PathBuf,
    pub file_id: Option<String>,
    pub generation: u64,
    attempt: u64,
}

/// Tracks at most one pending upload per draft generation.
///
/// A second upload started before the first resolves replaces it as the
/// authoritative pending file (last-write-wins); the replaced attempt's late
/// result is dropped.
#[derive(Debug, Default)]
pub struct UploadCoordinator {
    pending: Option<PendingUpload>,
    attempts: u64,
}

impl UploadCoordinator {
    /// Register a new upload as the authoritative pending file for this
    /// generation. Returns the attempt id to pass back on completion.
    pub fn begin(&mut self, generation: u64, file_url: PathBuf) -> u64 {
        self.attempts += 1;
        if let Some(prev) = &self.pending {
            debug!(
                replaced = %prev.file_url.display(),
                generation,
                "Pending upload replaced"
            );
        }
        self.pending = Some(PendingUpload {
            file_url,
            file_id: None,
            generation,
            attempt: self.attempts,
        });
        self.attempts
    }

    /// Record a finished upload. Returns false if the result is stale —
    /// the generation moved on or a later upload replaced this attempt.
    pub fn complete(&mut self, generation: u64, attempt: u64, file_id: String) -> bool {
        match self.pending.as_mut() {
            Some(pending) if pending.generation == generation && pending.attempt == attempt => {
                pending.file_id = Some(file_id);
                true
            }
            _ => {
                debug!(generation, attempt, "Stale upload result dropped");
                false
            }
        }
    }

    /// Drop any pending upload from a generation before `current`.
    pub fn invalidate_stale(&mut self, current: u64) {
        if self
            .pending
            .as_ref()
            .is_some_and(|p| p.generation < current)
        {
            self.pending = None;
        }
    }

    /// File ids to attach to a modify call for this generation, if an
    /// upload completed under it.
    pub fn file_ids(&self, generation: u64) -> Option<Vec<String>> {
        self.pending
            .as_ref()
            .filter(|p| p.generation == generation)
            .and_then(|p| p.file_id.clone())
            .map(|id| vec![id])
    }

    pub fn pending(&self) -> Option<&PendingUpload> {
        self.pending.as_ref()
    }

    /// Drop all upload state (selection cleared or committed).
    pub fn reset(&mut self) {
        self.pending = None;
    }
}
