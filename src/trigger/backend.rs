//! HTTP client for the analysis backend.

use crate::models::{AnalysisResult, AnalysisStatus, Zone};
use crate::trigger::TriggerError;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

/// Something that can run an analysis for a zone.
pub trait AnalysisBackend: Send + Sync {
    /// Start a run and wait for its document.
    fn run_analysis(&self, zone: Zone) -> BoxFuture<'_, Result<AnalysisResult, TriggerError>>;
}

/// Request body for `POST /api/run-analysis`.
#[derive(Debug, Serialize)]
struct RunAnalysisRequest {
    zone: Zone,
}

/// Response from `GET /api/health`.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// The analysis backend reached over HTTP.
pub struct HttpBackend {
    base_url: String,
    timeout_seconds: Option<u64>,
    http_client: reqwest::Client,
}

impl HttpBackend {
    /// Create a client for the backend at `base_url`.
    ///
    /// Without a timeout, requests wait as long as the transport allows.
    pub fn new(base_url: &str, timeout_seconds: Option<u64>) -> Result<Self, TriggerError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http_client = builder
            .build()
            .map_err(|e| TriggerError::Transport(format!("failed to create HTTP client: {}", e)))?;

        let base_url = base_url.trim_end_matches('/').to_string();
        info!("Analysis backend: {}", base_url);

        Ok(Self {
            base_url,
            timeout_seconds,
            http_client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Probe the backend's health endpoint.
    pub async fn health(&self) -> Result<HealthStatus, TriggerError> {
        let url = format!("{}/api/health", self.base_url);
        debug!("GET {}", url);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        if !status.is_success() {
            return Err(TriggerError::Status {
                code: status.as_u16(),
                message: body,
            });
        }

        serde_json::from_str(&body).map_err(|e| TriggerError::Decode(e.to_string()))
    }

    fn transport_error(&self, e: reqwest::Error) -> TriggerError {
        if e.is_timeout() {
            TriggerError::Timeout(self.timeout_seconds)
        } else if e.is_connect() {
            TriggerError::Connect(self.base_url.clone())
        } else {
            TriggerError::Transport(e.to_string())
        }
    }
}

impl AnalysisBackend for HttpBackend {
    fn run_analysis(&self, zone: Zone) -> BoxFuture<'_, Result<AnalysisResult, TriggerError>> {
        Box::pin(async move {
            let url = format!("{}/api/run-analysis", self.base_url);
            debug!("POST {} (zone: {})", url, zone);

            let response = self
                .http_client
                .post(&url)
                .json(&RunAnalysisRequest { zone })
                .send()
                .await
                .map_err(|e| self.transport_error(e))?;

            let status = response.status();
            let body = response.text().await.map_err(|e| self.transport_error(e))?;
            debug!("Backend answered {} ({} bytes)", status, body.len());

            classify_response(status.as_u16(), &body)
        })
    }
}

/// Turn an HTTP status and body into a result or an error.
///
/// A non-2xx status, a body that is not a JSON object, and a body with
/// `status: "error"` are all failures.
pub fn classify_response(status: u16, body: &str) -> Result<AnalysisResult, TriggerError> {
    let parsed = serde_json::from_str::<Value>(body);

    if !(200..300).contains(&status) {
        let message = parsed
            .ok()
            .and_then(|v| v.get("error").and_then(Value::as_str).map(String::from))
            .unwrap_or_else(|| body.trim().to_string());
        return Err(TriggerError::Status {
            code: status,
            message,
        });
    }

    let document = parsed.map_err(|e| TriggerError::Decode(e.to_string()))?;
    if !document.is_object() {
        return Err(TriggerError::Decode(
            "expected a JSON object at the top level".to_string(),
        ));
    }

    let result = AnalysisResult::new(document);
    if result.status() == Some(AnalysisStatus::Error) {
        let message = result
            .error_message()
            .filter(|m| !m.is_empty())
            .unwrap_or("Unknown error occurred");
        return Err(TriggerError::Application(message.to_string()));
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_success_body_is_passed_through() {
        let result = assert_ok!(classify_response(
            200,
            r#"{"status":"success","zone":"Tifra","images":{},"custom":{"x":1}}"#
        ));
        assert_eq!(result.zone(), Some("Tifra"));
        assert_eq!(serde_json::to_value(&result).unwrap()["custom"]["x"], 1);
    }

    #[test]
    fn test_missing_status_is_not_an_error() {
        let result = assert_ok!(classify_response(200, r#"{"zone":"Urla"}"#));
        assert_eq!(result.status(), None);
    }

    #[test]
    fn test_application_error_uses_message() {
        let err = assert_err!(classify_response(200, r#"{"status":"error","error":"timeout"}"#));
        assert!(matches!(err, TriggerError::Application(ref m) if m == "timeout"));
        assert_eq!(err.to_string(), "timeout");
    }

    #[test]
    fn test_application_error_without_message() {
        let err = assert_err!(classify_response(200, r#"{"status":"error"}"#));
        assert_eq!(err.to_string(), "Unknown error occurred");
    }

    #[test]
    fn test_non_success_status() {
        let err = assert_err!(classify_response(
            400,
            r#"{"status":"error","error":"Zone parameter is required"}"#
        ));
        match err {
            TriggerError::Status { code, message } => {
                assert_eq!(code, 400);
                assert_eq!(message, "Zone parameter is required");
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let err = assert_err!(classify_response(502, "Bad Gateway\n"));
        assert!(err.to_string().contains("Bad Gateway"));
    }

    #[test]
    fn test_undecodable_bodies() {
        assert!(matches!(
            classify_response(200, "<html>oops</html>"),
            Err(TriggerError::Decode(_))
        ));
        assert!(matches!(
            classify_response(200, "[1, 2, 3]"),
            Err(TriggerError::Decode(_))
        ));
    }

    #[test]
    fn test_base_url_is_normalized() {
        let backend = HttpBackend::new("http://localhost:5000/", Some(5)).unwrap();
        assert_eq!(backend.base_url(), "http://localhost:5000");
    }

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(RunAnalysisRequest {
            zone: Zone::SiltaraPhase1,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "zone": "Siltara Phase 1" }));
    }

    #[test]
    fn test_health_status() {
        let health: HealthStatus =
            serde_json::from_str(r#"{"status":"healthy","timestamp":"2026-10-19T12:00:00"}"#).unwrap();
        assert!(health.is_healthy());
        assert_eq!(health.timestamp.as_deref(), Some("2026-10-19T12:00:00"));
    }
}
