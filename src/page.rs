use async_trait::async_trait;
use chromiumoxide::browser::Browser as CrBrowser;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::Page as CrPage;
use chromiumoxide::page::ScreenshotParams;
use tokio::task::JoinHandle;

use crate::element::Element;
use crate::error::{Error, Result};
use crate::surface::{FieldProbe, FormSurface};

/// A live Chromium tab plus the browser that owns it.
pub struct ChromeSurface {
    browser: CrBrowser,
    inner: CrPage,
    handler_task: JoinHandle<()>,
}

impl ChromeSurface {
    pub(crate) fn new(browser: CrBrowser, inner: CrPage, handler_task: JoinHandle<()>) -> Self {
        Self {
            browser,
            inner,
            handler_task,
        }
    }

    /// Navigate to the given URL and wait for the page to load.
    pub async fn goto(&self, url: &str) -> Result<()> {
        self.inner
            .goto(url)
            .await
            .map_err(|e| Error::NavigationError(e.to_string()))?;
        Ok(())
    }

    /// Find an element matching the given CSS selector.
    pub async fn find_element(&self, selector: &str) -> Result<Element> {
        let el = self
            .inner
            .find_element(selector)
            .await
            .map_err(|e| Error::ElementNotFound(format!("{selector}: {e}")))?;
        Ok(Element::new(el))
    }

    /// Find all elements matching the given CSS selector.
    pub async fn find_elements(&self, selector: &str) -> Result<Vec<Element>> {
        let els = self
            .inner
            .find_elements(selector)
            .await
            .map_err(|e| Error::ElementNotFound(format!("{selector}: {e}")))?;
        Ok(els.into_iter().map(Element::new).collect())
    }

    /// Find an element by XPath expression.
    pub async fn find_xpath(&self, xpath: &str) -> Result<Element> {
        let el = self
            .inner
            .find_xpath(xpath)
            .await
            .map_err(|e| Error::ElementNotFound(format!("{xpath}: {e}")))?;
        Ok(Element::new(el))
    }
}

#[async_trait]
impl FormSurface for ChromeSurface {
    type Field = Element;

    async fn navigate(&self, url: &str) -> Result<()> {
        self.goto(url).await
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<Element>> {
        self.find_elements(selector).await
    }

    async fn find_within(&self, container: &Element, selector: &str) -> Result<Option<Element>> {
        container.find_first(selector).await
    }

    async fn find_by_text(&self, text: &str) -> Result<Element> {
        let xpath = format!("//*[normalize-space(text())={}]", xpath_literal(text));
        self.find_xpath(&xpath).await
    }

    async fn probe(&self, field: &Element) -> Result<FieldProbe> {
        field.probe().await
    }

    async fn is_clickable(&self, field: &Element) -> Result<bool> {
        field.is_clickable().await
    }

    async fn click(&self, field: &Element) -> Result<()> {
        field.click().await
    }

    async fn type_text(&self, field: &Element, text: &str) -> Result<()> {
        field.type_text(text).await
    }

    async fn assign_with_notify(&self, field: &Element, value: &str) -> Result<()> {
        field.assign_with_notify(value).await
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();
        self.inner
            .screenshot(params)
            .await
            .map_err(|e| Error::ScreenshotError(e.to_string()))
    }

    async fn release(self) -> Result<()> {
        let Self {
            mut browser,
            inner,
            handler_task,
        } = self;
        if let Err(e) = inner.close().await {
            tracing::debug!(error = %e, "tab already gone");
        }
        let closed = browser.close().await;
        let _ = browser.wait().await;
        handler_task.abort();
        closed.map_err(Error::CdpError)?;
        Ok(())
    }
}

/// Quote `text` as an XPath 1.0 string literal.
fn xpath_literal(text: &str) -> String {
    if !text.contains('\'') {
        format!("'{text}'")
    } else if !text.contains('"') {
        format!("\"{text}\"")
    } else {
        let parts: Vec<String> = text.split('\'').map(|part| format!("'{part}'")).collect();
        format!("concat({})", parts.join(", \"'\", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_label_uses_single_quotes() {
        assert_eq!(xpath_literal("Submit"), "'Submit'");
    }

    #[test]
    fn apostrophe_switches_to_double_quotes() {
        assert_eq!(xpath_literal("Don't stop"), "\"Don't stop\"");
    }

    #[test]
    fn both_quote_kinds_use_concat() {
        assert_eq!(
            xpath_literal(r#"it's "fine""#),
            r#"concat('it', "'", 's "fine"')"#
        );
    }
}
