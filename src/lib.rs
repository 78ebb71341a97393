pub mod browser;
pub mod capture;
pub mod config;
pub mod element;
pub mod error;
pub mod locator;
pub mod mail;
pub mod page;
pub mod record;
pub mod server;
pub mod session;
pub mod strategy;
pub mod surface;
pub mod wait;

pub use browser::ChromeLauncher;
pub use config::{BrowserConfig, FormConfig, MismatchPolicy};
pub use error::{Error, Result};
pub use record::InputRecord;
pub use session::{FieldOutcome, FieldReport, FormSession, RunReport, SessionState};
pub use strategy::{FieldRole, InputStrategy};
pub use surface::{FieldProbe, FormSurface, SessionLauncher};
