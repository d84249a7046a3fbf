use std::fmt::Debug;

use async_trait::async_trait;
use aws_sdk_sesv2::error::{BuildError, DisplayErrorContext, SdkError};
use aws_sdk_sesv2::operation::send_email::SendEmailError;
use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message};
use aws_sdk_sesv2::Client;
use shared::StorageError;

const CHARSET: &str = "UTF-8";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailBody {
    Text(String),
    Html(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
    pub reply_to: Vec<String>,
    pub subject: String,
    pub body: EmailBody,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Sends the message and returns the provider's message id.
    ///
    /// A message the provider refuses to send is [`StorageError::Rejected`].
    async fn send(&self, email: &OutgoingEmail) -> Result<String, StorageError>;
}

pub struct SesMailer {
    client: Client,
}

impl SesMailer {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

fn content(data: &str) -> Result<Content, StorageError> {
    Content::builder()
        .data(data)
        .charset(CHARSET)
        .build()
        .map_err(build_error)
}

fn build_error(err: BuildError) -> StorageError {
    StorageError::Backend {
        operation: "SendEmail",
        message: err.to_string(),
    }
}

fn message(email: &OutgoingEmail) -> Result<Message, StorageError> {
    let body = match &email.body {
        EmailBody::Text(text) => Body::builder().text(content(text)?).build(),
        EmailBody::Html(html) => Body::builder().html(content(html)?).build(),
    };
    Ok(Message::builder()
        .subject(content(&email.subject)?)
        .body(body)
        .build())
}

/// Messages SES refuses to send surface as [`StorageError::Rejected`].
fn map_send_error<R>(err: SdkError<SendEmailError, R>) -> StorageError
where
    R: Debug + Send + Sync + 'static,
{
    match err.as_service_error() {
        Some(SendEmailError::MessageRejected(rejected)) => StorageError::Rejected {
            operation: "SendEmail",
            message: rejected.message().unwrap_or("Message rejected").to_string(),
        },
        _ => StorageError::Backend {
            operation: "SendEmail",
            message: DisplayErrorContext(&err).to_string(),
        },
    }
}

#[async_trait]
impl Mailer for SesMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<String, StorageError> {
        let destination = Destination::builder()
            .set_to_addresses(Some(email.to.clone()))
            .set_cc_addresses(Some(email.cc.clone()))
            .set_bcc_addresses(Some(email.bcc.clone()))
            .build();

        let output = self
            .client
            .send_email()
            .from_email_address(&email.from)
            .destination(destination)
            .set_reply_to_addresses(Some(email.reply_to.clone()))
            .content(EmailContent::builder().simple(message(email)?).build())
            .send()
            .await
            .map_err(map_send_error)?;

        Ok(output.message_id().unwrap_or_default().to_string())
    }
}
