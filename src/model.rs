//! Assistant data model.

use serde::{Deserialize, Serialize};

/// A remote assistant configuration resource.
///
/// The `id` is server-assigned and immutable; every other field changes only
/// via a successful modify response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Assistant {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub code_interpreter: bool,
    #[serde(default)]
    pub retrieval: bool,
    /// Attached file ids, in server order.
    #[serde(default)]
    pub file_ids: Vec<String>,
    /// Unix seconds, assigned by the server at creation.
    #[serde(default)]
    pub created_at: i64,
}

impl Assistant {
    /// Snapshot the editable subset of this assistant's fields.
    pub fn fields(&self) -> AssistantFields {
        AssistantFields {
            name: self.name.clone(),
            description: self.description.clone(),
            instructions: self.instructions.clone(),
            code_interpreter: self.code_interpreter,
            retrieval: self.retrieval,
            file_ids: self.file_ids.clone(),
        }
    }
}

/// The editable subset of an assistant's fields — the payload for create and
/// modify requests, and the shape of a selection draft.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssistantFields {
    pub name: String,
    pub description: String,
    pub instructions: String,
    pub code_interpreter: bool,
    pub retrieval: bool,
    pub file_ids: Vec<String>,
}

impl AssistantFields {
    /// Apply a single draft edit in place.
    pub fn apply(&mut self, field: DraftField) {
        match field {
            DraftField::Name(v) => self.name = v,
            DraftField::Description(v) => self.description = v,
            DraftField::Instructions(v) => self.instructions = v,
            DraftField::CodeInterpreter(v) => self.code_interpreter = v,
            DraftField::Retrieval(v) => self.retrieval = v,
        }
    }
}

/// A single edit to a selection draft.
#[derive(Debug, Clone, PartialEq)]
pub enum DraftField {
    Name(String),
    Description(String),
    Instructions(String),
    CodeInterpreter(bool),
    Retrieval(bool),
}
