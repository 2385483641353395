//! Template-send request pipeline.
//!
//! A request moves through `authenticated → validated → dispatched` and ends
//! in one of `succeeded`, `failed` or `validation-rejected`. Authentication
//! happens earlier, in the access gate middleware; this module picks up from
//! an admitted request:
//! - `request`: parse and validate the body in one step
//! - `dispatcher`: one provider call, failures mapped to `DispatchError`
//! - `report`: caller-facing payloads and statuses

mod dispatcher;
mod report;
mod request;

pub use dispatcher::{DispatchError, DispatchReceipt, TemplateSendDispatcher};
pub use report::{
    SendEmailResponse, SendOutcome, MESSAGE_REJECTED_MESSAGE, SEND_FAILED_MESSAGE,
    TEMPLATE_NOT_FOUND_MESSAGE,
};
pub use request::{is_valid_email, FieldIssue, SendEmailBody, SendRequest, ValidationError};

use crate::auth::AuthContext;
use crate::error::AppError;
use crate::metrics::SendMetrics;

/// Validate and dispatch one admitted send request.
pub async fn process_send(
    context: &AuthContext,
    body: SendEmailBody,
    dispatcher: &TemplateSendDispatcher,
) -> Result<SendEmailResponse, AppError> {
    let request = match SendRequest::parse(body) {
        Ok(request) => request,
        Err(err) => {
            SendMetrics::record_outcome(SendOutcome::ValidationRejected.as_str());
            tracing::warn!(
                request_id = %context.request_id,
                client_ip = %context.client_ip,
                timestamp = %context.timestamp.to_rfc3339(),
                issues = err.issues().len(),
                "Send request failed validation"
            );
            return Err(err.into());
        }
    };

    match dispatcher.dispatch(&request).await {
        Ok(receipt) => {
            SendMetrics::record_outcome(SendOutcome::Succeeded.as_str());
            tracing::info!(
                request_id = %context.request_id,
                template_name = %request.template_name(),
                message_id = %receipt.message_id,
                recipient_count = request.recipients().len(),
                "Templated email sent"
            );
            Ok(receipt.into())
        }
        Err(err) => {
            SendMetrics::record_outcome(SendOutcome::Failed.as_str());
            tracing::warn!(
                request_id = %context.request_id,
                template_name = %request.template_name(),
                client_ip = %context.client_ip,
                timestamp = %context.timestamp.to_rfc3339(),
                kind = err.kind(),
                "Templated email not sent"
            );
            Err(err.into())
        }
    }
}
