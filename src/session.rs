//! One form submission, start to finish.
//!
//! The run walks `Start → PageLoaded → FieldsDiscovered → FieldFilled* →
//! AddressFilled → Submitted → Confirmed → Done` without back-edges. Field and
//! address failures are recorded and skipped over; discovery, submission and
//! capture failures end the run early. The browser is released on every path.

use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt;
use tokio::time::Instant;

use crate::capture::{self, ConfirmationArtifact};
use crate::config::{FormConfig, MismatchPolicy};
use crate::error::{Error, Result};
use crate::locator;
use crate::record::InputRecord;
use crate::strategy::{self, FieldRole, InputStrategy};
use crate::surface::{FormSurface, SessionLauncher};
use crate::wait::{self, Readiness};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Start,
    PageLoaded,
    FieldsDiscovered,
    FieldFilled(usize),
    AddressFilled,
    Submitted,
    Confirmed,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldOutcome {
    /// `value` is what the field holds now, e.g. the canonical date.
    Filled { value: String },
    TimedOut,
    Failed(String),
    /// No literal was paired with this field; it was not touched.
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldReport {
    pub ordinal: usize,
    pub role: FieldRole,
    pub strategy: InputStrategy,
    pub outcome: FieldOutcome,
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub trace: Vec<SessionState>,
    pub fields: Vec<FieldReport>,
    pub address: Option<FieldOutcome>,
    pub artifact: Option<ConfirmationArtifact>,
    /// Literals left over because the form had fewer fields.
    pub unused_values: usize,
    pub failure: Option<Error>,
}

impl RunReport {
    fn enter(&mut self, state: SessionState) {
        tracing::debug!(?state, "form session state");
        self.trace.push(state);
    }

    pub fn is_success(&self) -> bool {
        self.failure.is_none() && self.artifact.is_some()
    }

    pub fn filled(&self) -> usize {
        self.fields
            .iter()
            .filter(|f| matches!(f.outcome, FieldOutcome::Filled { .. }))
            .count()
    }

    pub fn field(&self, ordinal: usize) -> Option<&FieldReport> {
        self.fields.iter().find(|f| f.ordinal == ordinal)
    }

    pub fn last_state(&self) -> Option<SessionState> {
        self.trace.last().copied()
    }
}

pub struct FormSession<L> {
    launcher: L,
    config: FormConfig,
}

impl<L: SessionLauncher> FormSession<L> {
    pub fn new(launcher: L, config: FormConfig) -> Self {
        Self { launcher, config }
    }

    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    /// Fill and submit the form once.
    ///
    /// `Err` only when no browser session could be acquired; everything after
    /// that is reported through [`RunReport::failure`]. A panic inside the run
    /// still releases the session before it resumes unwinding.
    pub async fn run(&self, record: &InputRecord) -> Result<RunReport> {
        let mut report = RunReport::default();
        report.enter(SessionState::Start);

        let surface = self.launcher.acquire().await?;

        let outcome = AssertUnwindSafe(drive(&surface, &self.config, record, &mut report))
            .catch_unwind()
            .await;

        if let Err(e) = surface.release().await {
            tracing::warn!(error = %e, "browser session did not shut down cleanly");
        }
        report.enter(SessionState::Done);

        match outcome {
            Ok(Ok(())) => {
                tracing::info!(
                    filled = report.filled(),
                    fields = report.fields.len(),
                    "form submitted"
                );
            }
            Ok(Err(e)) => {
                tracing::error!(error = %e, "form session failed");
                report.failure = Some(e);
            }
            Err(panic) => std::panic::resume_unwind(panic),
        }
        Ok(report)
    }
}

async fn drive<S: FormSurface>(
    surface: &S,
    config: &FormConfig,
    record: &InputRecord,
    report: &mut RunReport,
) -> Result<()> {
    surface.navigate(&config.form_url).await?;
    report.enter(SessionState::PageLoaded);

    let located = discover(surface, config).await?;
    let roles = strategy::resolve_roles(located.iter().map(|f| &f.probe), config)?;

    if record.len() != located.len() {
        if config.mismatch == MismatchPolicy::Strict {
            return Err(Error::InputMismatch {
                values: record.len(),
                fields: located.len(),
            });
        }
        tracing::warn!(
            values = record.len(),
            fields = located.len(),
            "input record and form disagree in length, filling the overlap"
        );
    }
    report.unused_values = record.len().saturating_sub(located.len());
    report.enter(SessionState::FieldsDiscovered);

    for (field, role) in located.iter().zip(roles) {
        let strategy = strategy::strategy_for(role, config);
        let outcome = match record.values.get(field.ordinal) {
            Some(literal) => {
                let outcome = fill(surface, &field.handle, strategy, literal, config).await;
                report.enter(SessionState::FieldFilled(field.ordinal));
                outcome
            }
            None => FieldOutcome::Skipped,
        };
        if let FieldOutcome::Failed(ref reason) = outcome {
            tracing::warn!(ordinal = field.ordinal, reason = %reason, "field fill failed");
        }
        report.fields.push(FieldReport {
            ordinal: field.ordinal,
            role,
            strategy,
            outcome,
        });
    }

    let address = fill_address(surface, config, &record.address).await;
    if !matches!(address, FieldOutcome::Filled { .. }) {
        tracing::warn!(outcome = ?address, "address area not filled");
    }
    report.address = Some(address);
    report.enter(SessionState::AddressFilled);

    submit(surface, config).await?;
    let submitted_at = Instant::now();
    report.enter(SessionState::Submitted);

    let artifact = capture::capture(
        surface,
        &config.artifact_path,
        submitted_at,
        config.settle_interval,
    )
    .await?;
    report.artifact = Some(artifact);
    report.enter(SessionState::Confirmed);
    Ok(())
}

/// Gate on the first container, then locate. Presence and readiness share one deadline.
async fn discover<S: FormSurface>(
    surface: &S,
    config: &FormConfig,
) -> Result<Vec<locator::LocatedField<S::Field>>> {
    let started = Instant::now();
    let not_found = || Error::FieldsNotFound(config.container_selector.clone());

    let first = wait::await_present(
        surface,
        &config.container_selector,
        config.wait_timeout,
        config.poll_interval,
    )
    .await
    .ok_or_else(not_found)?;

    let remaining = remaining_or_zero(config.wait_timeout, started);
    if wait::await_ready(surface, &first, remaining, config.poll_interval).await
        == Readiness::TimedOut
    {
        return Err(not_found());
    }

    locator::locate_fields(surface, &config.container_selector, &config.input_selector).await
}

async fn fill<S: FormSurface>(
    surface: &S,
    field: &S::Field,
    strategy: InputStrategy,
    literal: &str,
    config: &FormConfig,
) -> FieldOutcome {
    if wait::await_ready(surface, field, config.wait_timeout, config.poll_interval).await
        == Readiness::TimedOut
    {
        return FieldOutcome::TimedOut;
    }
    match strategy::apply(surface, field, strategy, literal).await {
        Ok(value) => FieldOutcome::Filled { value },
        Err(e) => FieldOutcome::Failed(e.to_string()),
    }
}

async fn fill_address<S: FormSurface>(
    surface: &S,
    config: &FormConfig,
    address: &str,
) -> FieldOutcome {
    if address.is_empty() {
        return FieldOutcome::Skipped;
    }
    let started = Instant::now();
    let Some(area) = wait::await_present(
        surface,
        &config.address_selector,
        config.wait_timeout,
        config.poll_interval,
    )
    .await
    else {
        return FieldOutcome::TimedOut;
    };
    let remaining = remaining_or_zero(config.wait_timeout, started);
    if wait::await_ready(surface, &area, remaining, config.poll_interval).await
        == Readiness::TimedOut
    {
        return FieldOutcome::TimedOut;
    }
    let strategy = strategy::strategy_for(FieldRole::Address, config);
    match strategy::apply(surface, &area, strategy, address).await {
        Ok(value) => FieldOutcome::Filled { value },
        Err(e) => FieldOutcome::Failed(e.to_string()),
    }
}

async fn submit<S: FormSurface>(surface: &S, config: &FormConfig) -> Result<()> {
    let label = &config.submit_label;
    let button = surface
        .find_by_text(label)
        .await
        .map_err(|e| Error::Submission(format!("no `{label}` control: {e}")))?;
    wait::await_ready(surface, &button, config.wait_timeout, config.poll_interval)
        .await
        .into_result(label)
        .map_err(|e| Error::Submission(e.to_string()))?;
    surface
        .click(&button)
        .await
        .map_err(|e| Error::Submission(e.to_string()))?;
    tracing::info!(label = %label, "submit clicked");
    Ok(())
}

fn remaining_or_zero(timeout: Duration, started: Instant) -> Duration {
    timeout.saturating_sub(started.elapsed())
}
