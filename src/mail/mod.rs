//! Reviewer notification: compose the submission email and deliver it.
//!
//! Shares nothing with the form pipeline except the screenshot path.

pub mod sender;
pub mod templates;

use async_trait::async_trait;

use crate::error::Result;

pub use sender::SmtpConfig;
pub use templates::{DeliveryMetadata, EmailTemplate};

pub const DELIVERED_MESSAGE: &str = "Email sent successfully!";

#[async_trait]
pub trait Notifier: Send + Sync {
    /// One delivery attempt. `Ok` carries a message for the caller.
    async fn deliver(&self, meta: &DeliveryMetadata) -> Result<String>;
}

/// Reads SMTP settings from the environment on every delivery.
#[derive(Debug, Default, Clone, Copy)]
pub struct SmtpNotifier;

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn deliver(&self, meta: &DeliveryMetadata) -> Result<String> {
        let config = SmtpConfig::from_env()?;
        let message = sender::compose(meta, &config).await?;
        sender::send_smtp(message, &config).await?;
        tracing::info!(to = %config.to, "submission email sent");
        Ok(DELIVERED_MESSAGE.to_string())
    }
}
