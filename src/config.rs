use std::path::PathBuf;
use std::time::Duration;

use crate::browser::ChromeLauncher;
use crate::strategy::InputStrategy;

/// The form this crate was built to submit.
pub const DEFAULT_FORM_URL: &str = "https://forms.gle/WT68aV5UnPajeoSc8";

/// Where the confirmation screenshot lands and where the notifier looks for it.
pub const DEFAULT_ARTIFACT_PATH: &str = "screenshots/confirmation.png";

pub struct BrowserConfig {
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub chrome_path: Option<String>,
    /// Timeout for CDP requests issued while launching and navigating (default: 30s).
    pub default_timeout: Duration,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1280,
            viewport_height: 1024,
            chrome_path: None,
            default_timeout: Duration::from_secs(30),
        }
    }
}

pub struct BrowserBuilder {
    config: BrowserConfig,
}

impl BrowserBuilder {
    pub fn new() -> Self {
        Self {
            config: BrowserConfig::default(),
        }
    }

    pub fn headless(mut self, headless: bool) -> Self {
        self.config.headless = headless;
        self
    }

    pub fn viewport(mut self, width: u32, height: u32) -> Self {
        self.config.viewport_width = width;
        self.config.viewport_height = height;
        self
    }

    pub fn chrome_path(mut self, path: impl Into<String>) -> Self {
        self.config.chrome_path = Some(path.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.default_timeout = timeout;
        self
    }

    pub fn build_config(self) -> BrowserConfig {
        self.config
    }

    /// Produce a launcher; the browser itself starts when a session is acquired.
    pub fn build(self) -> ChromeLauncher {
        ChromeLauncher::new(self.build_config())
    }
}

impl Default for BrowserBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// What to do when the input record and the discovered fields differ in length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MismatchPolicy {
    /// Fill `min(values, fields)` and report the rest as skipped.
    #[default]
    Truncate,
    /// Refuse to fill anything.
    Strict,
}

/// Selectors, timings and role hints for the target form.
#[derive(Debug, Clone)]
pub struct FormConfig {
    pub form_url: String,
    /// Wrapper around each question's interactive element.
    pub container_selector: String,
    /// Searched for inside each container; the first match is the field.
    pub input_selector: String,
    pub address_selector: String,
    /// Visible text of the submit control.
    pub submit_label: String,
    /// Ordinal treated as the date question when a field exposes no label.
    pub date_ordinal: Option<usize>,
    /// Case-insensitive whole words that mark a date question's label.
    pub date_keywords: Vec<String>,
    pub date_strategy: InputStrategy,
    pub mismatch: MismatchPolicy,
    pub wait_timeout: Duration,
    pub poll_interval: Duration,
    /// Delay between the submit click and the screenshot.
    pub settle_interval: Duration,
    pub artifact_path: PathBuf,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            form_url: DEFAULT_FORM_URL.to_string(),
            container_selector: ".Xb9hP".to_string(),
            input_selector: "input".to_string(),
            address_selector: "textarea.KHxj8b.tL9Q4c".to_string(),
            submit_label: "Submit".to_string(),
            date_ordinal: Some(4),
            date_keywords: ["date", "birth", "birthday", "birthdate", "dob"]
                .into_iter()
                .map(String::from)
                .collect(),
            date_strategy: InputStrategy::DirectAssignWithNotify,
            mismatch: MismatchPolicy::Truncate,
            wait_timeout: Duration::from_secs(10),
            poll_interval: Duration::from_millis(100),
            settle_interval: Duration::from_secs(5),
            artifact_path: PathBuf::from(DEFAULT_ARTIFACT_PATH),
        }
    }
}

impl FormConfig {
    /// Defaults with `FORM_ARTIFACT_PATH` applied when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(path) = std::env::var("FORM_ARTIFACT_PATH") {
            if !path.trim().is_empty() {
                config.artifact_path = PathBuf::from(path);
            }
        }
        config
    }

    pub fn artifact_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.artifact_path = path.into();
        self
    }

    pub fn mismatch(mut self, policy: MismatchPolicy) -> Self {
        self.mismatch = policy;
        self
    }

    pub fn date_strategy(mut self, strategy: InputStrategy) -> Self {
        self.date_strategy = strategy;
        self
    }

    pub fn timings(mut self, wait_timeout: Duration, settle_interval: Duration) -> Self {
        self.wait_timeout = wait_timeout;
        self.settle_interval = settle_interval;
        self
    }
}
