//! Object storage and email collaborators, each behind a trait with one AWS adapter.

mod files;
mod mail;

pub use files::{FileStore, S3FileStore};
pub use mail::{EmailBody, Mailer, OutgoingEmail, SesMailer};
