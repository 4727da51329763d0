//! Submission gateway: the "POST bytes, get a status" boundary behind which
//! every outbound HTTP hop sits.

use crate::message::ExchangeMessage;
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Submission path of the connector API accepting a request document.
pub const SUBMIT_REQUEST_PATH: &str = "/api/user/submit/request";
/// Submission path of the connector API accepting a response document.
pub const SUBMIT_RESPONSE_PATH: &str = "/api/user/submit/response";
/// Submission path of the connector API accepting an error document.
pub const SUBMIT_ERROR_PATH: &str = "/api/user/submit/error";

const DEFAULT_SUBMIT_TIMEOUT: Duration = Duration::from_secs(10);

/// Failures delivering a submission to a peer endpoint. Never retried; fatal
/// only to the message being handled.
#[derive(Debug)]
pub enum DeliveryError {
    /// The endpoint answered with a non-success status.
    Rejected { target: String, status: u16 },
    /// The request never completed: connect failure, timeout, or transport error.
    Transport { target: String, detail: String },
}

impl Display for DeliveryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryError::Rejected { target, status } => {
                write!(f, "submission to {target} rejected with status {status}")
            }
            DeliveryError::Transport { target, detail } => {
                write!(f, "submission to {target} failed: {detail}")
            }
        }
    }
}

impl Error for DeliveryError {}

/// Outbound submission boundary consumed by the router: wrap a message, POST
/// it to a target endpoint, report success or a delivery failure.
#[async_trait]
pub trait SubmissionGateway: Send + Sync {
    async fn submit(&self, target: &str, message: &ExchangeMessage) -> Result<(), DeliveryError>;
}

/// HTTP gateway. POSTs the JSON submission envelope with a bounded per-request
/// timeout; an unresponsive peer becomes a delivery failure, never a hang.
pub struct HttpSubmissionGateway {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpSubmissionGateway {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_SUBMIT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
        }
    }
}

impl Default for HttpSubmissionGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SubmissionGateway for HttpSubmissionGateway {
    async fn submit(&self, target: &str, message: &ExchangeMessage) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(target)
            .timeout(self.timeout)
            .json(message)
            .send()
            .await
            .map_err(|err| DeliveryError::Transport {
                target: target.to_string(),
                detail: err.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::Rejected {
                target: target.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}
