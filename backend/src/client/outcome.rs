//! Interpretation of `POST /api/v1/users` responses.

use serde::{Deserialize, Serialize};

use crate::domain::registration::FieldErrors;

const CREATED: u16 = 201;
const UNPROCESSABLE: u16 = 422;
const DEFAULT_SUCCESS: &str = "Registration successful";
const DEFAULT_FAILURE: &str = "Registration failed, please try again later";

/// Result of a submission as the form sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SubmitOutcome {
    Created { message: String },
    Rejected { errors: FieldErrors },
    Failed { message: String },
}

#[derive(Deserialize)]
struct MessageBody {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
struct RejectionBody {
    #[serde(default)]
    errors: Option<FieldErrors>,
}

impl SubmitOutcome {
    /// Map an HTTP status and JSON body to an outcome.
    ///
    /// A 422 without a readable field error map is treated as a failure so
    /// the form never clears fields on a response it cannot attribute.
    ///
    /// # Examples
    /// ```
    /// use signup::client::SubmitOutcome;
    ///
    /// let outcome = SubmitOutcome::from_response(503, b"{}");
    /// assert!(matches!(outcome, SubmitOutcome::Failed { .. }));
    /// ```
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        match status {
            CREATED => Self::Created {
                message: message_of(body).unwrap_or_else(|| DEFAULT_SUCCESS.to_owned()),
            },
            UNPROCESSABLE => match serde_json::from_slice::<RejectionBody>(body) {
                Ok(RejectionBody {
                    errors: Some(errors),
                }) if !errors.is_empty() => Self::Rejected { errors },
                _ => Self::failed(body),
            },
            _ => Self::failed(body),
        }
    }

    fn failed(body: &[u8]) -> Self {
        Self::Failed {
            message: message_of(body).unwrap_or_else(|| DEFAULT_FAILURE.to_owned()),
        }
    }
}

fn message_of(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<MessageBody>(body)
        .ok()
        .and_then(|parsed| parsed.message)
        .filter(|message| !message.trim().is_empty())
}
