//! The seam between the form pipeline and whatever renders the page.
//!
//! [`crate::page::ChromeSurface`] drives a real Chromium tab; tests supply a
//! scripted page. Everything in `locator`, `wait`, `strategy`, `capture` and
//! `session` is written against these traits only.

use async_trait::async_trait;

use crate::error::Result;

/// Identifying hints read from a live field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldProbe {
    /// Question heading, `aria-label` or associated `<label>` text.
    pub label: Option<String>,
    /// The `type` attribute of the input, lower-cased.
    pub input_type: Option<String>,
}

#[async_trait]
pub trait FormSurface: Send + Sync + Sized {
    /// Handle to an element on the page.
    type Field: Send + Sync;

    async fn navigate(&self, url: &str) -> Result<()>;

    /// All elements matching `selector`, in document order.
    async fn find_all(&self, selector: &str) -> Result<Vec<Self::Field>>;

    /// First element matching `selector` below `container`, if any.
    async fn find_within(&self, container: &Self::Field, selector: &str)
        -> Result<Option<Self::Field>>;

    /// Element whose own visible text equals `text`.
    async fn find_by_text(&self, text: &str) -> Result<Self::Field>;

    async fn probe(&self, field: &Self::Field) -> Result<FieldProbe>;

    /// Present, visible, enabled and not covered by another element.
    async fn is_clickable(&self, field: &Self::Field) -> Result<bool>;

    async fn click(&self, field: &Self::Field) -> Result<()>;

    /// Append `text` as simulated keystrokes to the focused field.
    async fn type_text(&self, field: &Self::Field, text: &str) -> Result<()>;

    /// Set `value` directly and dispatch bubbling `input` and `change` events.
    async fn assign_with_notify(&self, field: &Self::Field, value: &str) -> Result<()>;

    /// PNG of the current viewport.
    async fn screenshot(&self) -> Result<Vec<u8>>;

    /// Tear down the browser session. Consumes the surface, so it runs once.
    async fn release(self) -> Result<()>;
}

/// Acquires a fresh [`FormSurface`] for one run.
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    type Surface: FormSurface;

    async fn acquire(&self) -> Result<Self::Surface>;
}
