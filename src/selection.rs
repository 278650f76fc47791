//! Selection state — the active assistant, its draft, and the edit phase
//! state machine.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SessionError;
use crate::model::{Assistant, AssistantFields, DraftField};

/// Phases of an edit session.
///
/// Progresses Idle → Selected → Editing → Committing, returning to Idle on a
/// successful commit or to Editing on a failed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditPhase {
    Idle,
    Selected,
    Editing,
    Committing,
}

impl EditPhase {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: EditPhase) -> bool {
        use EditPhase::*;
        match target {
            // A new selection or a clear is legal at any point; a reselect
            // during a commit is the generation race the session tolerates.
            Selected | Idle => true,
            Editing => matches!(self, Selected | Editing | Committing),
            Committing => matches!(self, Selected | Editing),
        }
    }
}

impl Default for EditPhase {
    fn default() -> Self {
        Self::Idle
    }
}

impl std::fmt::Display for EditPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Selected => "selected",
            Self::Editing => "editing",
            Self::Committing => "committing",
        };
        write!(f, "{s}")
    }
}

/// Snapshot of the active selection handed to observers.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionSnapshot {
    pub assistant_id: String,
    pub draft: AssistantFields,
    pub phase: EditPhase,
    pub generation: u64,
}

#[derive(Debug)]
struct ActiveSelection {
    assistant_id: String,
    draft: AssistantFields,
    phase: EditPhase,
    generation: u64,
}

/// Manages the single active selection and its draft edit state.
///
/// The draft is decoupled from the cache: edits never touch the cached
/// record until a modify succeeds. Each selection gets a fresh generation
/// token (monotonic counter) so stale async results can be detected.
#[derive(Debug, Default)]
pub struct SelectionController {
    active: Option<ActiveSelection>,
    generation: u64,
}

impl SelectionController {
    /// Select an assistant: snapshot its fields into a fresh draft under a
    /// new generation token. Returns the token.
    pub fn select(&mut self, assistant: &Assistant) -> u64 {
        self.generation += 1;
        debug!(id = %assistant.id, generation = self.generation, "Selection snapshot taken");
        self.active = Some(ActiveSelection {
            assistant_id: assistant.id.clone(),
            draft: assistant.fields(),
            phase: EditPhase::Selected,
            generation: self.generation,
        });
        self.generation
    }

    /// Apply a local draft edit. Returns false (no-op) with nothing selected.
    pub fn update_field(&mut self, field: DraftField) -> bool {
        let Some(active) = self.active.as_mut() else {
            return false;
        };
        active.draft.apply(field);
        if active.phase.can_transition_to(EditPhase::Editing) {
            active.phase = EditPhase::Editing;
        }
        true
    }

    /// Enter the Committing phase, yielding what the modify call needs.
    pub fn begin_commit(&mut self) -> Result<(String, AssistantFields, u64), SessionError> {
        let Some(active) = self.active.as_mut() else {
            return Err(SessionError::NoSelection);
        };
        if active.phase == EditPhase::Committing {
            return Err(SessionError::CommitInFlight);
        }
        active.phase = EditPhase::Committing;
        Ok((
            active.assistant_id.clone(),
            active.draft.clone(),
            active.generation,
        ))
    }

    /// A commit failed: drop back to Editing with the draft intact. Applies
    /// only if the selection that started the commit is still active.
    pub fn fail_commit(&mut self, generation: u64) {
        if let Some(active) = self.active.as_mut() {
            if active.generation == generation {
                active.phase = EditPhase::Editing;
            }
        }
    }

    /// Drop the selection and its draft.
    pub fn clear(&mut self) {
        self.active = None;
    }

    /// The most recently issued generation token.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether `generation` is the token of the current selection.
    pub fn is_current(&self, generation: u64) -> bool {
        self.active
            .as_ref()
            .is_some_and(|a| a.generation == generation)
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.assistant_id.as_str())
    }

    pub fn phase(&self) -> EditPhase {
        self.active
            .as_ref()
            .map(|a| a.phase)
            .unwrap_or(EditPhase::Idle)
    }

    pub fn snapshot(&self) -> Option<SelectionSnapshot> {
        self.active.as_ref().map(|a| SelectionSnapshot {
            assistant_id: a.assistant_id.clone(),
            draft: a.draft.clone(),
            phase: a.phase,
            generation: a.generation,
        })
    }
}
