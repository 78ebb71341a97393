#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use autoform::{Error, FieldProbe, FormConfig, FormSurface, Result, SessionLauncher};
use tokio::time::Instant;

pub const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handle {
    Container(usize),
    /// The input inside container `n`.
    Input(usize),
    Address,
    Submit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Navigate(String),
    /// One readiness check, whatever its answer.
    Ready(Handle),
    Click(Handle),
    Type(Handle, String),
    Assign(Handle, String),
    Screenshot,
}

/// Shape and failure modes of the fake page.
#[derive(Debug, Clone)]
pub struct FormScript {
    pub containers: usize,
    pub empty_containers: Vec<usize>,
    /// Containers whose input lookup errors.
    pub failing_lookups: Vec<usize>,
    /// Container lookups that come back empty before the form renders.
    pub render_after: usize,
    pub probes: HashMap<usize, FieldProbe>,
    pub never_ready: Vec<usize>,
    /// Input `n` reports not-ready for its first `k` checks.
    pub ready_after: HashMap<usize, usize>,
    /// Inputs whose readiness check hangs far past any wait timeout.
    pub hanging_ready: Vec<usize>,
    pub failing_type: Vec<usize>,
    pub has_address: bool,
    pub has_submit: bool,
    pub screenshot_fails: bool,
    pub panic_on_submit: bool,
}

impl FormScript {
    pub fn with_fields(containers: usize) -> Self {
        Self {
            containers,
            empty_containers: Vec::new(),
            failing_lookups: Vec::new(),
            render_after: 0,
            probes: HashMap::new(),
            never_ready: Vec::new(),
            ready_after: HashMap::new(),
            hanging_ready: Vec::new(),
            failing_type: Vec::new(),
            has_address: true,
            has_submit: true,
            screenshot_fails: false,
            panic_on_submit: false,
        }
    }

    pub fn label(mut self, container: usize, label: &str) -> Self {
        self.probes.insert(
            container,
            FieldProbe {
                label: Some(label.to_string()),
                input_type: Some("text".to_string()),
            },
        );
        self
    }
}

#[derive(Default)]
pub struct Recorder {
    pub actions: Mutex<Vec<Action>>,
    pub releases: AtomicUsize,
    pub container_lookups: AtomicUsize,
    pub submitted_at: Mutex<Option<Instant>>,
    pub screenshot_at: Mutex<Option<Instant>>,
}

impl Recorder {
    pub fn actions(&self) -> Vec<Action> {
        self.actions.lock().unwrap().clone()
    }

    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }

    pub fn readiness_checks(&self, handle: &Handle) -> usize {
        self.actions()
            .iter()
            .filter(|action| **action == Action::Ready(handle.clone()))
            .count()
    }

    /// Every click lands right after a readiness check on the same element.
    pub fn every_click_follows_a_readiness_check(&self) -> bool {
        self.actions().windows(2).all(|pair| match &pair[1] {
            Action::Click(h) => pair[0] == Action::Ready(h.clone()),
            _ => true,
        }) && !matches!(self.actions().first(), Some(Action::Click(_)))
    }

    pub fn touched(&self, handle: &Handle) -> bool {
        self.actions().iter().any(|action| match action {
            Action::Click(h) | Action::Type(h, _) | Action::Assign(h, _) => h == handle,
            _ => false,
        })
    }

    fn push(&self, action: Action) {
        self.actions.lock().unwrap().push(action);
    }
}

pub struct ScriptedLauncher {
    pub script: FormScript,
    pub recorder: Arc<Recorder>,
}

impl ScriptedLauncher {
    pub fn new(script: FormScript) -> (Self, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let launcher = Self {
            script,
            recorder: Arc::clone(&recorder),
        };
        (launcher, recorder)
    }
}

#[async_trait]
impl SessionLauncher for ScriptedLauncher {
    type Surface = ScriptedSurface;

    async fn acquire(&self) -> Result<ScriptedSurface> {
        Ok(ScriptedSurface {
            script: self.script.clone(),
            recorder: Arc::clone(&self.recorder),
        })
    }
}

pub struct ScriptedSurface {
    script: FormScript,
    recorder: Arc<Recorder>,
}

#[async_trait]
impl FormSurface for ScriptedSurface {
    type Field = Handle;

    async fn navigate(&self, url: &str) -> Result<()> {
        self.recorder.push(Action::Navigate(url.to_string()));
        Ok(())
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<Handle>> {
        let defaults = FormConfig::default();
        if selector == defaults.container_selector {
            let lookup = self.recorder.container_lookups.fetch_add(1, Ordering::SeqCst);
            if lookup < self.script.render_after {
                return Ok(Vec::new());
            }
            Ok((0..self.script.containers).map(Handle::Container).collect())
        } else if selector == defaults.address_selector && self.script.has_address {
            Ok(vec![Handle::Address])
        } else {
            Ok(Vec::new())
        }
    }

    async fn find_within(&self, container: &Handle, _selector: &str) -> Result<Option<Handle>> {
        match container {
            Handle::Container(n) if self.script.failing_lookups.contains(n) => {
                Err(Error::ElementNotFound("stale node".into()))
            }
            Handle::Container(n) if self.script.empty_containers.contains(n) => Ok(None),
            Handle::Container(n) => Ok(Some(Handle::Input(*n))),
            other => Err(Error::ElementNotFound(format!("{other:?} is not a container"))),
        }
    }

    async fn find_by_text(&self, text: &str) -> Result<Handle> {
        if self.script.has_submit && text == "Submit" {
            Ok(Handle::Submit)
        } else {
            Err(Error::ElementNotFound(format!("text {text:?}")))
        }
    }

    async fn probe(&self, field: &Handle) -> Result<FieldProbe> {
        match field {
            Handle::Input(n) => Ok(self.script.probes.get(n).cloned().unwrap_or_default()),
            _ => Ok(FieldProbe::default()),
        }
    }

    async fn is_clickable(&self, field: &Handle) -> Result<bool> {
        let checks = self.recorder.readiness_checks(field);
        self.recorder.push(Action::Ready(field.clone()));
        let Handle::Input(n) = field else {
            return Ok(true);
        };
        if self.script.hanging_ready.contains(n) {
            tokio::time::sleep(Duration::from_secs(30)).await;
        }
        if self.script.never_ready.contains(n) {
            return Ok(false);
        }
        Ok(checks >= self.script.ready_after.get(n).copied().unwrap_or(0))
    }

    async fn click(&self, field: &Handle) -> Result<()> {
        if *field == Handle::Submit {
            if self.script.panic_on_submit {
                panic!("page crashed on submit");
            }
            *self.recorder.submitted_at.lock().unwrap() = Some(Instant::now());
        }
        self.recorder.push(Action::Click(field.clone()));
        Ok(())
    }

    async fn type_text(&self, field: &Handle, text: &str) -> Result<()> {
        if let Handle::Input(n) = field {
            if self.script.failing_type.contains(n) {
                return Err(Error::JsError(format!("input {n} detached")));
            }
        }
        self.recorder.push(Action::Type(field.clone(), text.to_string()));
        Ok(())
    }

    async fn assign_with_notify(&self, field: &Handle, value: &str) -> Result<()> {
        self.recorder
            .push(Action::Assign(field.clone(), value.to_string()));
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        *self.recorder.screenshot_at.lock().unwrap() = Some(Instant::now());
        self.recorder.push(Action::Screenshot);
        if self.script.screenshot_fails {
            return Err(Error::ScreenshotError("renderer gone".into()));
        }
        let mut png = PNG_MAGIC.to_vec();
        png.extend_from_slice(b"scripted");
        Ok(png)
    }

    async fn release(self) -> Result<()> {
        self.recorder.releases.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Default selectors with timings short enough for tests.
pub fn fast_config(artifact: &Path) -> FormConfig {
    let mut config = FormConfig::default()
        .artifact_path(artifact)
        .timings(Duration::from_millis(60), Duration::from_millis(20));
    config.poll_interval = Duration::from_millis(5);
    config
}
