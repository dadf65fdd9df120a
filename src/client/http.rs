//! reqwest implementation of the timetable service client

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

use super::{ClientError, ServiceReply, TimetableService};
use crate::config::ServiceConfig;
use crate::models::{TimetableRequest, TimetableResponse};

/// HTTP client for `POST {base_url}{endpoint_path}`
pub struct HttpTimetableClient {
    url: String,
    http: Client,
}

impl HttpTimetableClient {
    /// Build a client from configuration.
    ///
    /// No timeout is applied unless `timeout_secs` is set.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, ClientError> {
        debug!(?config, "from_config: called");
        let url = config.endpoint_url();
        reqwest::Url::parse(&url).map_err(|e| ClientError::InvalidUrl(format!("{}: {}", url, e)))?;

        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build().map_err(ClientError::Network)?;

        Ok(Self { url, http })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl TimetableService for HttpTimetableClient {
    async fn generate(&self, request: &TimetableRequest) -> Result<ServiceReply, ClientError> {
        info!(url = %self.url, subjects = request.subjects.len(), "generate: sending request");

        let response = self
            .http
            .post(&self.url)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status().as_u16();
        debug!(status, "generate: response received");
        let body = response.text().await?;

        interpret_response(status, &body)
    }
}

/// Map an HTTP status and body to a reply.
///
/// A truthy `error` field wins regardless of status, matching the browser
/// client which never looked at the status code. Everything else that is not
/// a 2xx with a `timetable` list is a [`ClientError`].
pub fn interpret_response(status: u16, body: &str) -> Result<ServiceReply, ClientError> {
    let success = (200..300).contains(&status);

    let parsed: TimetableResponse = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(e) if success => return Err(ClientError::Decode(e)),
        Err(_) => {
            return Err(ClientError::Status {
                status,
                message: body.trim().to_string(),
            });
        }
    };

    if let Some(message) = parsed.error_message() {
        debug!(%message, "interpret_response: service rejected request");
        return Ok(ServiceReply::Rejected(message));
    }

    if !success {
        let message = match parsed.detail {
            Some(serde_json::Value::String(s)) => s,
            Some(other) => other.to_string(),
            None => body.trim().to_string(),
        };
        return Err(ClientError::Status { status, message });
    }

    parsed
        .timetable
        .map(ServiceReply::Timetable)
        .ok_or(ClientError::MissingTimetable)
}
