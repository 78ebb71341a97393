use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_ARTIFACT_PATH;

pub const DEFAULT_RESUME_PATH: &str = "attachments/resume.pdf";

/// Everything the reviewer email is built from. Fixed for one delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryMetadata {
    pub sender_name: String,
    pub repository_url: String,
    pub approach_summary: String,
    pub past_projects: Vec<String>,
    /// Section 6 of the body; omitted when unset.
    pub availability: Option<String>,
    pub screenshot_path: PathBuf,
    pub resume_path: PathBuf,
}

impl Default for DeliveryMetadata {
    fn default() -> Self {
        Self {
            sender_name: "autoform".to_string(),
            repository_url: "https://github.com/yourusername/autoform".to_string(),
            approach_summary: "Drove headless Chromium over CDP to fill the form. Each field \
                waits for a clickable state before input, the date question is set directly \
                with synthetic input/change events, and a screenshot of the confirmation page \
                is captured after a settle delay. The email is sent over SMTP with STARTTLS."
                .to_string(),
            past_projects: Vec::new(),
            availability: None,
            screenshot_path: PathBuf::from(DEFAULT_ARTIFACT_PATH),
            resume_path: PathBuf::from(DEFAULT_RESUME_PATH),
        }
    }
}

impl DeliveryMetadata {
    /// Read metadata from a JSON file; missing keys keep their defaults.
    pub fn load(path: impl AsRef<std::path::Path>) -> crate::error::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

pub struct EmailTemplate {
    pub subject: String,
    pub body: String,
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Subject and plain-text body for the reviewer email.
pub fn render(meta: &DeliveryMetadata) -> EmailTemplate {
    let subject = format!("Form Automation Submission - {}", meta.sender_name);

    let projects = if meta.past_projects.is_empty() {
        "   - none".to_string()
    } else {
        meta.past_projects
            .iter()
            .map(|link| format!("   - {link}"))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let availability = meta
        .availability
        .as_deref()
        .map(|text| format!("6. Availability Confirmation:\n   {text}\n\n"))
        .unwrap_or_default();

    let body = format!(
        "Dear Hiring Team,\n\
         Please find my form automation submission below:\n\
         \n\
         1. Screenshot of the submitted form: Attached ({screenshot})\n\
         \n\
         2. Source Code (GitHub Repository):\n   {repo}\n\
         \n\
         3. Brief Documentation of Approach:\n   {summary}\n\
         \n\
         4. Resume: Attached ({resume})\n\
         \n\
         5. Links to Past Projects/Work Samples:\n{projects}\n\
         \n\
         {availability}\
         Best regards,\n\
         {name}\n",
        screenshot = file_name(&meta.screenshot_path),
        repo = meta.repository_url,
        summary = meta.approach_summary,
        resume = file_name(&meta.resume_path),
        name = meta.sender_name,
    );

    EmailTemplate { subject, body }
}
