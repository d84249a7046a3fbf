use crate::error::{respond, ApiError};
use crate::routes::body_text;
use crate::services::{EmailBody, OutgoingEmail};
use crate::{json_response, AppState};
use aws_lambda_events::apigw::{ApiGatewayV2httpRequest, ApiGatewayV2httpResponse};
use serde::{Deserialize, Serialize};
use shared::StorageError;
use tracing::info;

pub const MISSING_DATA: &str = "No se proporcionaron datos para el envío de correo";
pub const MISSING_FIELDS: &str = "Faltan campos requeridos: to, subject, body";
pub const REJECTED: &str = "El email fue rechazado";
pub const SENT: &str = "Email enviado correctamente";

/// One address or several.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Recipients {
    One(String),
    Many(Vec<String>),
}

impl Recipients {
    fn into_vec(self) -> Vec<String> {
        let addresses = match self {
            Recipients::One(address) => vec![address],
            Recipients::Many(addresses) => addresses,
        };
        addresses.into_iter().filter(|a| !a.is_empty()).collect()
    }
}

fn addresses(recipients: Option<Recipients>) -> Vec<String> {
    recipients.map(Recipients::into_vec).unwrap_or_default()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailRequest {
    pub to: Option<Recipients>,
    pub subject: Option<String>,
    pub body: Option<String>,
    #[serde(default)]
    pub is_html: bool,
    pub reply_to: Option<Recipients>,
    pub cc: Option<Recipients>,
    pub bcc: Option<Recipients>,
}

impl EmailRequest {
    /// Builds the outgoing message; reply-to falls back to the sender.
    pub fn into_email(self, from: &str) -> Result<OutgoingEmail, ApiError> {
        let to = addresses(self.to);
        let subject = self.subject.filter(|s| !s.is_empty());
        let body = self.body.filter(|b| !b.is_empty());

        let (Some(subject), Some(body)) = (subject, body) else {
            return Err(ApiError::Validation(MISSING_FIELDS));
        };
        if to.is_empty() {
            return Err(ApiError::Validation(MISSING_FIELDS));
        }

        let mut reply_to = addresses(self.reply_to);
        if reply_to.is_empty() {
            reply_to.push(from.to_string());
        }

        Ok(OutgoingEmail {
            from: from.to_string(),
            to,
            cc: addresses(self.cc),
            bcc: addresses(self.bcc),
            reply_to,
            subject,
            body: if self.is_html {
                EmailBody::Html(body)
            } else {
                EmailBody::Text(body)
            },
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailResponse {
    pub message: &'static str,
    pub message_id: String,
}

pub async fn send(state: &AppState, request: &ApiGatewayV2httpRequest) -> ApiGatewayV2httpResponse {
    respond("send email", send_email(state, request).await)
}

async fn send_email(
    state: &AppState,
    request: &ApiGatewayV2httpRequest,
) -> Result<ApiGatewayV2httpResponse, ApiError> {
    let body = body_text(request)?.ok_or(ApiError::Validation(MISSING_DATA))?;
    let email_request: EmailRequest = serde_json::from_str(&body)?;
    let email = email_request.into_email(&state.config.source_email)?;

    let message_id = state.mailer.send(&email).await.map_err(|e| match e {
        StorageError::Rejected { message, .. } => ApiError::Rejected {
            error: REJECTED,
            details: message,
        },
        other => ApiError::Storage(other),
    })?;

    info!(message_id = %message_id, recipients = email.to.len(), "Sent email");
    Ok(json_response(
        200,
        &SendEmailResponse {
            message: SENT,
            message_id,
        },
    ))
}
