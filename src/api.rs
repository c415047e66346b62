use std::fs;

use reqwest::blocking::{Client, RequestBuilder, multipart};
use serde::Deserialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::ConsoleConfig;
use crate::models::{
    Condition, ConditionPayload, ConditionQuery, Page, ParsedCondition, ScreeningResult, Talent,
    TalentFilters,
};
use crate::upload::SelectedFile;

// --- Client trait ---

/// Everything the console asks of the screening service. Persistence, NLP
/// parsing and resume qualification all happen on the other side.
pub trait ScreeningApi {
    fn list_conditions(&self, query: &ConditionQuery) -> Result<Page<Condition>, ApiError>;
    fn create_condition(&self, payload: &ConditionPayload) -> Result<(), ApiError>;
    fn update_condition(&self, id: i64, payload: &ConditionPayload) -> Result<(), ApiError>;
    fn delete_condition(&self, id: i64) -> Result<(), ApiError>;
    fn parse_natural_language(&self, text: &str) -> Result<ParsedCondition, ApiError>;
    fn list_talents(&self, filters: &TalentFilters) -> Result<Page<Talent>, ApiError>;
    fn talent_detail(&self, id: i64) -> Result<Talent, ApiError>;
    fn upload_and_screen(
        &self,
        file: &SelectedFile,
        condition_id: Option<i64>,
    ) -> Result<ScreeningResult, ApiError>;
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {}", .message.as_deref().unwrap_or("no details"))]
    Status { status: u16, message: Option<String> },

    #[error("{}", .message.as_deref().unwrap_or("Request was rejected by the server"))]
    Rejected { message: Option<String> },

    #[error("Response did not contain any data")]
    MissingData,

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ApiError {
    /// The message the server gave, if any, for showing to the user verbatim.
    pub fn user_message(&self) -> Option<&str> {
        match self {
            ApiError::Status { message, .. } | ApiError::Rejected { message } => message.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    data: Option<T>,
    message: Option<String>,
}

impl<T> Envelope<T> {
    fn check(self) -> Result<Option<T>, ApiError> {
        if self.success {
            Ok(self.data)
        } else {
            Err(ApiError::Rejected {
                message: self.message,
            })
        }
    }
}

/// Pull a human-readable message out of an error body, if it has one.
fn server_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "detail", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
        .map(str::to_string)
}

// --- HTTP implementation ---

pub struct HttpApi {
    base_url: String,
    client: Client,
}

impl HttpApi {
    pub fn new(config: &ConsoleConfig) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            base_url: config.api_url.clone(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn send(&self, route: &str, request: RequestBuilder) -> Result<reqwest::blocking::Response, ApiError> {
        debug!(route, "calling screening API");
        let response = request.send().inspect_err(|e| warn!(route, error = %e, "request failed"))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            let message = server_message(&body);
            warn!(route, status = status.as_u16(), ?message, "API returned an error status");
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }

    fn fetch<T: DeserializeOwned>(&self, route: &str, request: RequestBuilder) -> Result<T, ApiError> {
        let envelope: Envelope<T> = self.send(route, request)?.json()?;
        envelope.check()?.ok_or(ApiError::MissingData)
    }

    fn acknowledge(&self, route: &str, request: RequestBuilder) -> Result<(), ApiError> {
        let envelope: Envelope<IgnoredAny> = self.send(route, request)?.json()?;
        envelope.check().map(|_| ())
    }
}

impl ScreeningApi for HttpApi {
    fn list_conditions(&self, query: &ConditionQuery) -> Result<Page<Condition>, ApiError> {
        let request = self.client.get(self.url("/conditions")).query(query);
        self.fetch("GET /conditions", request)
    }

    fn create_condition(&self, payload: &ConditionPayload) -> Result<(), ApiError> {
        let request = self.client.post(self.url("/conditions")).json(payload);
        self.acknowledge("POST /conditions", request)
    }

    fn update_condition(&self, id: i64, payload: &ConditionPayload) -> Result<(), ApiError> {
        let request = self
            .client
            .put(self.url(&format!("/conditions/{}", id)))
            .json(payload);
        self.acknowledge("PUT /conditions/{id}", request)
    }

    fn delete_condition(&self, id: i64) -> Result<(), ApiError> {
        let request = self.client.delete(self.url(&format!("/conditions/{}", id)));
        self.acknowledge("DELETE /conditions/{id}", request)
    }

    fn parse_natural_language(&self, text: &str) -> Result<ParsedCondition, ApiError> {
        let request = self
            .client
            .post(self.url("/conditions/parse"))
            .json(&json!({ "text": text }));
        self.fetch("POST /conditions/parse", request)
    }

    fn list_talents(&self, filters: &TalentFilters) -> Result<Page<Talent>, ApiError> {
        let request = self.client.get(self.url("/talents")).query(filters);
        self.fetch("GET /talents", request)
    }

    fn talent_detail(&self, id: i64) -> Result<Talent, ApiError> {
        let request = self.client.get(self.url(&format!("/talents/{}", id)));
        self.fetch("GET /talents/{id}", request)
    }

    fn upload_and_screen(
        &self,
        file: &SelectedFile,
        condition_id: Option<i64>,
    ) -> Result<ScreeningResult, ApiError> {
        let bytes = fs::read(&file.path).map_err(|source| ApiError::Io {
            path: file.path.display().to_string(),
            source,
        })?;
        let part = multipart::Part::bytes(bytes)
            .file_name(file.name.clone())
            .mime_str(&file.mime_type())?;
        let mut form = multipart::Form::new().part("file", part);
        if let Some(id) = condition_id {
            form = form.text("condition_id", id.to_string());
        }
        let request = self
            .client
            .post(self.url("/talents/upload-screen"))
            .multipart(form);
        self.fetch("POST /talents/upload-screen", request)
    }
}
