use std::path::Path;

use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::error::{Error, Result};
use crate::mail::templates::{render, DeliveryMetadata};

pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;

pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub to: String,
    pub cc: Option<String>,
}

impl SmtpConfig {
    /// `SENDER_EMAIL` and `SENDER_PASSWORD` are required; `RECIPIENT_EMAIL`,
    /// `CC_EMAIL`, `SMTP_HOST` and `SMTP_PORT` are optional.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let present = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let (Some(username), Some(password)) = (present("SENDER_EMAIL"), present("SENDER_PASSWORD"))
        else {
            return Err(Error::MissingCredentials);
        };

        let port = match present("SMTP_PORT") {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "SMTP_PORT is not a port number, using default");
                DEFAULT_SMTP_PORT
            }),
            None => DEFAULT_SMTP_PORT,
        };

        Ok(Self {
            host: present("SMTP_HOST").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
            port,
            to: present("RECIPIENT_EMAIL").unwrap_or_else(|| username.clone()),
            cc: present("CC_EMAIL"),
            username,
            password,
        })
    }
}

fn mailbox(address: &str) -> Result<Mailbox> {
    address
        .parse()
        .map_err(|e| Error::Delivery(format!("bad address {address}: {e}")))
}

fn content_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

async fn attachment(kind: &'static str, path: &Path) -> Result<SinglePart> {
    if !path.is_file() {
        return Err(Error::AttachmentNotFound {
            kind,
            path: path.to_path_buf(),
        });
    }
    let bytes = tokio::fs::read(path).await?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| kind.to_lowercase());
    let content_type = ContentType::parse(content_type_for(path))
        .map_err(|e| Error::Delivery(e.to_string()))?;
    Ok(Attachment::new(filename).body(bytes, content_type))
}

/// Build the reviewer email with the screenshot and resume attached.
pub async fn compose(meta: &DeliveryMetadata, config: &SmtpConfig) -> Result<Message> {
    let email = render(meta);
    let screenshot = attachment("Screenshot", &meta.screenshot_path).await?;
    let resume = attachment("Resume", &meta.resume_path).await?;

    let mut builder = Message::builder()
        .from(mailbox(&config.username)?)
        .to(mailbox(&config.to)?)
        .subject(email.subject);
    if let Some(ref cc) = config.cc {
        builder = builder.cc(mailbox(cc)?);
    }

    builder
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(email.body))
                .singlepart(screenshot)
                .singlepart(resume),
        )
        .map_err(|e| Error::Delivery(format!("failed to build message: {e}")))
}

/// Send over SMTP with STARTTLS using lettre.
pub async fn send_smtp(message: Message, config: &SmtpConfig) -> Result<()> {
    let creds = Credentials::new(config.username.clone(), config.password.clone());
    let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
        .map_err(|e| Error::Delivery(format!("SMTP relay error: {e}")))?
        .port(config.port)
        .credentials(creds)
        .build();

    transport.send(message).await.map_err(classify)?;
    Ok(())
}

/// 534/535 are the servers' "credentials rejected" replies.
fn classify(err: lettre::transport::smtp::Error) -> Error {
    let code = err.status().map(|code| code.to_string());
    match code.as_deref() {
        Some("534") | Some("535") => Error::SmtpAuth,
        _ => Error::Delivery(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    fn config() -> SmtpConfig {
        SmtpConfig::from_lookup(lookup(&[
            ("SENDER_EMAIL", "sender@example.com"),
            ("SENDER_PASSWORD", "app-password"),
        ]))
        .unwrap()
    }

    #[test]
    fn missing_password_is_missing_credentials() {
        let result = SmtpConfig::from_lookup(lookup(&[("SENDER_EMAIL", "sender@example.com")]));
        assert!(matches!(result, Err(Error::MissingCredentials)));
    }

    #[test]
    fn blank_credentials_count_as_missing() {
        let result = SmtpConfig::from_lookup(lookup(&[
            ("SENDER_EMAIL", " "),
            ("SENDER_PASSWORD", "secret"),
        ]));
        assert!(matches!(result, Err(Error::MissingCredentials)));
    }

    #[test]
    fn recipient_defaults_to_sender() {
        let config = config();
        assert_eq!(config.to, "sender@example.com");
        assert_eq!(config.host, DEFAULT_SMTP_HOST);
        assert_eq!(config.port, DEFAULT_SMTP_PORT);
        assert!(config.cc.is_none());
    }

    #[test]
    fn content_types_follow_extension() {
        assert_eq!(content_type_for(Path::new("a/confirmation.PNG")), "image/png");
        assert_eq!(content_type_for(Path::new("resume.pdf")), "application/pdf");
        assert_eq!(content_type_for(Path::new("notes")), "application/octet-stream");
    }

    #[tokio::test]
    async fn missing_screenshot_is_reported_first() {
        let dir = tempfile::tempdir().unwrap();
        let meta = DeliveryMetadata {
            screenshot_path: dir.path().join("confirmation.png"),
            resume_path: dir.path().join("resume.pdf"),
            ..DeliveryMetadata::default()
        };
        let err = compose(&meta, &config()).await.unwrap_err();
        assert!(err.to_string().starts_with("Screenshot not found at"));
    }

    #[tokio::test]
    async fn missing_resume_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let screenshot = dir.path().join("confirmation.png");
        std::fs::write(&screenshot, b"\x89PNG").unwrap();
        let meta = DeliveryMetadata {
            screenshot_path: screenshot,
            resume_path: dir.path().join("resume.pdf"),
            ..DeliveryMetadata::default()
        };
        let err = compose(&meta, &config()).await.unwrap_err();
        assert!(err.to_string().starts_with("Resume not found at"));
    }

    #[tokio::test]
    async fn compose_attaches_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let screenshot = dir.path().join("confirmation.png");
        let resume = dir.path().join("resume.pdf");
        std::fs::write(&screenshot, b"\x89PNG").unwrap();
        std::fs::write(&resume, b"%PDF-1.4").unwrap();
        let meta = DeliveryMetadata {
            sender_name: "Ada".to_string(),
            screenshot_path: screenshot,
            resume_path: resume,
            ..DeliveryMetadata::default()
        };

        let message = compose(&meta, &config()).await.unwrap();
        let raw = String::from_utf8_lossy(&message.formatted()).into_owned();
        assert!(raw.contains("Subject: Form Automation Submission - Ada"));
        assert!(raw.contains("filename=\"confirmation.png\""));
        assert!(raw.contains("filename=\"resume.pdf\""));
    }
}
