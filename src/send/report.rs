//! Caller-facing results of the send pipeline

use serde::Serialize;

use crate::error::AppError;

use super::{DispatchError, DispatchReceipt, ValidationError};

pub const TEMPLATE_NOT_FOUND_MESSAGE: &str = "Email template does not exist";
pub const MESSAGE_REJECTED_MESSAGE: &str =
    "Email was rejected. Please check your SES sending limits and email addresses.";
pub const SEND_FAILED_MESSAGE: &str = "Failed to send email";

/// Successful send payload
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailResponse {
    pub message_id: String,
    pub success: bool,
}

impl From<DispatchReceipt> for SendEmailResponse {
    fn from(receipt: DispatchReceipt) -> Self {
        Self {
            message_id: receipt.message_id,
            success: true,
        }
    }
}

/// Terminal states of a send request that reached the handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Succeeded,
    Failed,
    ValidationRejected,
}

impl SendOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            SendOutcome::Succeeded => "succeeded",
            SendOutcome::Failed => "failed",
            SendOutcome::ValidationRejected => "validation_rejected",
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

/// Provider detail stays in the server log; callers get a fixed summary.
impl From<DispatchError> for AppError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::TemplateNotFound { .. } => {
                AppError::NotFound(TEMPLATE_NOT_FOUND_MESSAGE.to_string())
            }
            DispatchError::MessageRejected { .. } => {
                AppError::Rejected(MESSAGE_REJECTED_MESSAGE.to_string())
            }
            DispatchError::Unknown { .. } => AppError::Internal(SEND_FAILED_MESSAGE.to_string()),
        }
    }
}
