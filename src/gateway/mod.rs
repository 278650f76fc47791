//! Remote assistant gateway — the seam between the session core and the
//! hosted assistant service.

mod http;

pub use http::HttpAssistantGateway;

use async_trait::async_trait;

use crate::error::GatewayError;
use crate::model::{Assistant, AssistantFields};

/// One page of assistants from the remote list endpoint.
#[derive(Debug, Clone, Default)]
pub struct AssistantPage {
    /// Records in server pagination order.
    pub items: Vec<Assistant>,
    /// Whether the server reports further pages after this one.
    pub has_more: bool,
}

/// Interface to the remote assistant service.
///
/// Every operation is asynchronous and fallible. The gateway carries no
/// implicit retry; retry and timeout policy belong to the session manager.
#[async_trait]
pub trait AssistantGateway: Send + Sync {
    /// Fetch one page of assistants, starting after `after` when given.
    async fn list_assistants(
        &self,
        after: Option<&str>,
        limit: Option<u32>,
    ) -> Result<AssistantPage, GatewayError>;

    /// Create a new assistant from the given fields.
    async fn create_assistant(&self, fields: &AssistantFields)
        -> Result<Assistant, GatewayError>;

    /// Modify an existing assistant. `file_ids`, when present, replaces the
    /// assistant's attached files.
    async fn modify_assistant(
        &self,
        id: &str,
        fields: &AssistantFields,
        file_ids: Option<&[String]>,
    ) -> Result<Assistant, GatewayError>;

    /// Upload a file for attachment to assistants. Returns the file id.
    async fn upload_file(&self, filename: &str, bytes: Vec<u8>)
        -> Result<String, GatewayError>;
}
