use async_trait::async_trait;
use chromiumoxide::browser::{Browser as CrBrowser, BrowserConfig as CrBrowserConfig};
use chromiumoxide::handler::viewport::Viewport;
use futures::StreamExt;

use crate::config::{BrowserBuilder, BrowserConfig};
use crate::error::{Error, Result};
use crate::page::ChromeSurface;
use crate::surface::SessionLauncher;

/// Chrome flags that improve performance without affecting functionality.
const PERF_ARGS: &[&str] = &[
    "disable-gpu",
    "disable-extensions",
    "metrics-recording-only",
    "mute-audio",
    "no-default-browser-check",
    "no-first-run",
    "disable-popup-blocking",
    "disable-prompt-on-repost",
];

/// Launches one Chromium instance per acquired session.
pub struct ChromeLauncher {
    config: BrowserConfig,
}

impl ChromeLauncher {
    pub fn builder() -> BrowserBuilder {
        BrowserBuilder::new()
    }

    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }

    fn chromium_config(&self) -> Result<CrBrowserConfig> {
        let config = &self.config;
        let mut builder = CrBrowserConfig::builder();

        if config.headless {
            builder = builder.new_headless_mode().no_sandbox();
        } else {
            builder = builder.with_head().no_sandbox();
        }

        // chromiumoxide adds the `--` prefix itself
        for arg in PERF_ARGS {
            builder = builder.arg(*arg);
        }

        if let Some(ref path) = config.chrome_path {
            builder = builder.chrome_executable(path);
        }

        builder = builder
            .request_timeout(config.default_timeout)
            .viewport(Viewport {
                width: config.viewport_width,
                height: config.viewport_height,
                device_scale_factor: None,
                emulating_mobile: false,
                is_landscape: false,
                has_touch: false,
            });

        builder.build().map_err(Error::LaunchError)
    }
}

#[async_trait]
impl SessionLauncher for ChromeLauncher {
    type Surface = ChromeSurface;

    async fn acquire(&self) -> Result<ChromeSurface> {
        let cr_config = self.chromium_config()?;

        let (mut browser, mut handler) = CrBrowser::launch(cr_config)
            .await
            .map_err(|e| Error::LaunchError(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(_event) = handler.next().await {}
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                // Nothing owns the browser yet, so shut it down here.
                let _ = browser.close().await;
                let _ = browser.wait().await;
                handler_task.abort();
                return Err(Error::LaunchError(format!("could not open a tab: {e}")));
            }
        };

        tracing::debug!(headless = self.config.headless, "browser session acquired");
        Ok(ChromeSurface::new(browser, page, handler_task))
    }
}
