use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const DEFAULT_ADDRESS: &str = "123 Main St, City";

fn default_address() -> String {
    DEFAULT_ADDRESS.to_string()
}

/// Literal answers for one submission, in the form's question order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRecord {
    pub values: Vec<String>,
    /// Goes into the free-text address area, which sits outside the indexed fields.
    #[serde(default = "default_address")]
    pub address: String,
}

impl InputRecord {
    pub fn new<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Self {
            values: values.into_iter().map(Into::into).collect(),
            address: default_address(),
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    /// Read a record from a JSON file: `{"values": [...], "address": "..."}`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
