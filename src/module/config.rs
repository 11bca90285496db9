//! JSON module configuration

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::protocol::Result;

/// Per-module configuration handed over by the host at init
///
/// Unknown keys are kept in [`extra`](Self::extra) and written back by
/// [`to_json`](Self::to_json), so a module can carry its own settings next to
/// the ones this crate understands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleConfig {
    /// Whether the module starts enabled
    pub enabled: bool,
    /// Poll ratio: the module is polled once every `poll_ratio` host cycles
    pub poll_ratio: u32,
    /// Module-specific keys
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for ModuleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_ratio: 1,
            extra: Map::new(),
        }
    }
}

impl ModuleConfig {
    /// Parse a configuration document.
    ///
    /// An empty or whitespace-only string yields the defaults. A poll ratio
    /// of 0 is raised to 1.
    pub fn from_json(json: &str) -> Result<Self> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        let mut config: Self = serde_json::from_str(json)?;
        config.poll_ratio = config.poll_ratio.max(1);
        Ok(config)
    }

    /// Serialize the configuration
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Module-specific setting by key
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}
