//! HTTP gateway — talks to the hosted Assistants API over reqwest.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;

use crate::error::GatewayError;
use crate::model::{Assistant, AssistantFields};

use super::{AssistantGateway, AssistantPage};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o";
const BETA_HEADER: &str = "assistants=v2";

/// Gateway implementation against the hosted Assistants API.
pub struct HttpAssistantGateway {
    client: reqwest::Client,
    base_url: String,
    api_key: SecretString,
    model: String,
}

impl HttpAssistantGateway {
    pub fn new(api_key: SecretString) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Override the API base URL (proxies, compatible servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Model name sent on create and modify requests.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(self.api_key.expose_secret())
            .header("OpenAI-Beta", BETA_HEADER)
    }
}

#[async_trait]
impl AssistantGateway for HttpAssistantGateway {
    async fn list_assistants(
        &self,
        after: Option<&str>,
        limit: Option<u32>,
    ) -> Result<AssistantPage, GatewayError> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(after) = after {
            query.push(("after", after.to_string()));
        }
        if let Some(limit) = limit {
            query.push(("limit", limit.to_string()));
        }

        let resp = self
            .request(Method::GET, "/assistants")
            .query(&query)
            .send()
            .await
            .map_err(transport)?;
        if !resp.status().is_success() {
            let status = resp.status();
            return Err(map_status(status, read_error(resp).await, None));
        }

        let parsed: ListResponse = resp.json().await.map_err(transport)?;
        debug!(count = parsed.data.len(), has_more = parsed.has_more, "Listed assistants");
        Ok(AssistantPage {
            items: parsed.data.into_iter().map(Into::into).collect(),
            has_more: parsed.has_more,
        })
    }

    async fn create_assistant(
        &self,
        fields: &AssistantFields,
    ) -> Result<Assistant, GatewayError> {
        let body = assistant_body(&self.model, fields, None);
        let resp = self
            .request(Method::POST, "/assistants")
            .json(&body)
            .send()
            .await
            .map_err(transport)?;
        if !resp.status().is_success() {
            let status = resp.status();
            return Err(map_status(status, read_error(resp).await, None));
        }

        let parsed: AssistantObject = resp.json().await.map_err(transport)?;
        Ok(parsed.into())
    }

    async fn modify_assistant(
        &self,
        id: &str,
        fields: &AssistantFields,
        file_ids: Option<&[String]>,
    ) -> Result<Assistant, GatewayError> {
        let body = assistant_body(&self.model, fields, file_ids);
        let resp = self
            .request(Method::POST, &format!("/assistants/{id}"))
            .json(&body)
            .send()
            .await
            .map_err(transport)?;
        if !resp.status().is_success() {
            let status = resp.status();
            return Err(map_status(status, read_error(resp).await, Some(id)));
        }

        let parsed: AssistantObject = resp.json().await.map_err(transport)?;
        Ok(parsed.into())
    }

    async fn upload_file(
        &self,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<String, GatewayError> {
        let form = Form::new()
            .text("purpose", "assistants")
            .part("file", Part::bytes(bytes).file_name(filename.to_string()));

        let resp = self
            .request(Method::POST, "/files")
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;
        if !resp.status().is_success() {
            let status = resp.status();
            let message = read_error(resp).await;
            return Err(if status.is_client_error() {
                GatewayError::Payload(message)
            } else {
                GatewayError::Network(format!("{status}: {message}"))
            });
        }

        let parsed: FileObject = resp.json().await.map_err(transport)?;
        Ok(parsed.id)
    }
}

/// Build the JSON body shared by create and modify. `file_ids`, when given,
/// overrides the ids carried in `fields`.
fn assistant_body(
    model: &str,
    fields: &AssistantFields,
    file_ids: Option<&[String]>,
) -> serde_json::Value {
    let mut tools = Vec::new();
    if fields.code_interpreter {
        tools.push(serde_json::json!({ "type": "code_interpreter" }));
    }
    if fields.retrieval {
        tools.push(serde_json::json!({ "type": "retrieval" }));
    }

    let mut body = serde_json::json!({
        "model": model,
        "name": fields.name,
        "description": fields.description,
        "instructions": fields.instructions,
        "tools": tools,
    });
    let ids = match file_ids {
        Some(ids) => Some(ids.to_vec()),
        None if !fields.file_ids.is_empty() => Some(fields.file_ids.clone()),
        None => None,
    };
    if let Some(ids) = ids {
        body["file_ids"] = serde_json::json!(ids);
    }
    body
}

fn transport(err: reqwest::Error) -> GatewayError {
    GatewayError::Network(err.to_string())
}

fn map_status(status: StatusCode, message: String, id: Option<&str>) -> GatewayError {
    match status {
        StatusCode::NOT_FOUND => GatewayError::NotFound {
            id: id.unwrap_or("unknown").to_string(),
        },
        s if s.is_client_error() => GatewayError::Validation(message),
        s => GatewayError::Network(format!("{s}: {message}")),
    }
}

/// Pull the server's error message out of the response body, falling back
/// to the raw body or status line.
async fn read_error(resp: reqwest::Response) -> String {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    match serde_json::from_str::<serde_json::Value>(&body) {
        Ok(value) => value["error"]["message"]
            .as_str()
            .map(str::to_owned)
            .unwrap_or(body),
        Err(_) if body.is_empty() => status.to_string(),
        Err(_) => body,
    }
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    data: Vec<AssistantObject>,
    #[serde(default)]
    has_more: bool,
}

#[derive(Debug, Deserialize)]
struct AssistantObject {
    id: String,
    #[serde(default)]
    created_at: i64,
    name: Option<String>,
    description: Option<String>,
    instructions: Option<String>,
    #[serde(default)]
    tools: Vec<ToolEntry>,
    #[serde(default)]
    file_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ToolEntry {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct FileObject {
    id: String,
}

impl From<AssistantObject> for Assistant {
    fn from(obj: AssistantObject) -> Self {
        let code_interpreter = obj.tools.iter().any(|t| t.kind == "code_interpreter");
        // v2 renamed the retrieval tool to file_search; accept both.
        let retrieval = obj
            .tools
            .iter()
            .any(|t| t.kind == "retrieval" || t.kind == "file_search");
        Assistant {
            id: obj.id,
            name: obj.name.unwrap_or_default(),
            description: obj.description.unwrap_or_default(),
            instructions: obj.instructions.unwrap_or_default(),
            code_interpreter,
            retrieval,
            file_ids: obj.file_ids,
            created_at: obj.created_at,
        }
    }
}
