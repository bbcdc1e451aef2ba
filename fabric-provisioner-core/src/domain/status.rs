// fabric-provisioner-core/src/domain/status.rs

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    /// Kept for wire compatibility with asynchronous callers. Never produced.
    Running,
    Completed,
    Failed,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Running => f.write_str("RUNNING"),
            Status::Completed => f.write_str("COMPLETED"),
            Status::Failed => f.write_str("FAILED"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvisioningStatus {
    pub status: Status,
    pub result: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<serde_json::Value>,
}

impl ProvisioningStatus {
    pub fn completed(result: impl Into<String>) -> Self {
        Self {
            status: Status::Completed,
            result: result.into(),
            info: None,
        }
    }

    pub fn failed(result: impl Into<String>) -> Self {
        Self {
            status: Status::Failed,
            result: result.into(),
            info: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemErr {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_error_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub more_info: Option<serde_json::Value>,
}

impl SystemErr {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            user_message: None,
            input: None,
            input_error_field: None,
            more_info: None,
        }
    }
}

/// Terminal outcome of one provisioning operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProvisioningResponse {
    Status(ProvisioningStatus),
    SystemError(SystemErr),
}

impl ProvisioningResponse {
    pub fn is_completed(&self) -> bool {
        matches!(
            self,
            ProvisioningResponse::Status(ProvisioningStatus {
                status: Status::Completed,
                ..
            })
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ValidationErrors>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationErrors {
    pub errors: Vec<String>,
}

/// Outcome of a validation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValidationResponse {
    Result(ValidationResult),
    SystemError(SystemErr),
}
