use chromiumoxide::element::Element as CrElement;

use crate::error::{Error, Result};
use crate::surface::FieldProbe;

/// Clickable means attached, rendered, enabled and the topmost thing at its
/// centre. A hit on a sibling inside the same wrapper still counts: form
/// widgets often float their placeholder over the input.
const CLICKABLE_JS: &str = r#"
    function() {
        if (!this.isConnected) return false;
        const style = window.getComputedStyle(this);
        if (style.display === 'none' || style.visibility === 'hidden') return false;
        if (this.disabled || this.getAttribute('aria-disabled') === 'true') return false;
        this.scrollIntoView({ block: 'center', inline: 'center' });
        const rect = this.getBoundingClientRect();
        if (rect.width === 0 || rect.height === 0) return false;
        const hit = document.elementFromPoint(rect.left + rect.width / 2, rect.top + rect.height / 2);
        if (!hit) return false;
        const scope = this.parentElement || this;
        return hit === this || this.contains(hit) || scope.contains(hit);
    }
"#;

const PROBE_JS: &str = r#"
    function() {
        const text = (el) => el ? (el.innerText || el.textContent || '').trim() : '';
        let label = (this.getAttribute('aria-label') || '').trim();
        const labelledBy = this.getAttribute('aria-labelledby');
        if (!label && labelledBy) {
            label = labelledBy.split(/\s+/)
                .map(id => text(document.getElementById(id)))
                .filter(Boolean)
                .join(' ');
        }
        if (!label && this.id) {
            label = text(document.querySelector('label[for="' + CSS.escape(this.id) + '"]'));
        }
        if (!label) {
            const item = this.closest('[role="listitem"]');
            if (item) label = text(item.querySelector('[role="heading"]'));
        }
        const type = (this.getAttribute('type') || '').toLowerCase();
        return JSON.stringify({ label: label || null, input_type: type || null });
    }
"#;

/// Wrapper around a chromiumoxide Element, providing the calls the form pipeline needs.
pub struct Element {
    inner: CrElement,
}

impl Element {
    pub(crate) fn new(inner: CrElement) -> Self {
        Self { inner }
    }

    /// Click this element (scrolls into view first).
    pub async fn click(&self) -> Result<()> {
        self.inner.click().await.map_err(Error::CdpError)?;
        Ok(())
    }

    /// Type text into this element (wraps type_str).
    pub async fn type_text(&self, text: &str) -> Result<()> {
        self.inner.type_str(text).await.map_err(Error::CdpError)?;
        Ok(())
    }

    /// Get the inner text of this element.
    pub async fn inner_text(&self) -> Result<String> {
        self.inner
            .inner_text()
            .await
            .map_err(Error::CdpError)?
            .ok_or_else(|| Error::ElementNotFound("inner text is empty".into()))
    }

    /// First descendant matching `selector`, or `None` when nothing matches.
    pub async fn find_first(&self, selector: &str) -> Result<Option<Element>> {
        let els = self
            .inner
            .find_elements(selector)
            .await
            .map_err(Error::CdpError)?;
        Ok(els.into_iter().next().map(Element::new))
    }

    pub async fn is_clickable(&self) -> Result<bool> {
        let value = self.call(CLICKABLE_JS).await?;
        Ok(value.and_then(|v| v.as_bool()).unwrap_or(false))
    }

    /// Assign `value` to the element's `value` property and fire `input` + `change`.
    pub async fn assign_with_notify(&self, value: &str) -> Result<()> {
        let value_js = serde_json::to_string(value).map_err(|e| Error::JsError(e.to_string()))?;
        let js = format!(
            r#"
            function() {{
                this.value = {value_js};
                this.dispatchEvent(new Event('input', {{ bubbles: true }}));
                this.dispatchEvent(new Event('change', {{ bubbles: true }}));
            }}
            "#,
        );
        self.call(js).await?;
        Ok(())
    }

    /// Read the label and input type the page exposes for this field.
    pub async fn probe(&self) -> Result<FieldProbe> {
        #[derive(serde::Deserialize)]
        struct Probe {
            label: Option<String>,
            input_type: Option<String>,
        }

        let json_str = self
            .call(PROBE_JS)
            .await?
            .and_then(|v| v.as_str().map(str::to_string))
            .ok_or_else(|| Error::JsError("field probe returned nothing".into()))?;
        let probe: Probe =
            serde_json::from_str(&json_str).map_err(|e| Error::JsError(e.to_string()))?;
        Ok(FieldProbe {
            label: probe.label,
            input_type: probe.input_type,
        })
    }

    async fn call(&self, function: impl Into<String>) -> Result<Option<serde_json::Value>> {
        let returns = self
            .inner
            .call_js_fn(function, false)
            .await
            .map_err(|e| Error::JsError(e.to_string()))?;
        if let Some(details) = returns.exception_details {
            return Err(Error::JsError(details.text));
        }
        Ok(returns.result.value)
    }
}
