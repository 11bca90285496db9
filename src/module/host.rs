//! Host-side services a module calls into

use std::fmt;
use std::sync::Arc;

use tracing::{error, info, warn};

use super::ABI_VERSION;

/// Severity of a module log message, as understood by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum LogLevel {
    /// Informational message
    #[default]
    Info = 0,
    /// Something unexpected that the module recovered from
    Warning = 1,
    /// A failure the host should surface
    Error = 2,
}

impl LogLevel {
    /// Convert from the host's numeric level
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Info),
            1 => Some(Self::Warning),
            2 => Some(Self::Error),
            _ => None,
        }
    }

    /// Convert to the host's numeric level
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        };
        write!(f, "{name}")
    }
}

/// Identity of a module as seen by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleContext {
    name: String,
    description: String,
}

impl ModuleContext {
    /// Create a context
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    /// Module name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Module description
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Functions the host provides to a module
pub trait Host: Send + Sync {
    /// ABI version the host speaks
    fn abi_version(&self, context: &ModuleContext) -> u32;

    /// Display a log message on behalf of the module
    fn log(&self, context: &ModuleContext, level: LogLevel, message: &str);
}

impl<H: Host + ?Sized> Host for Arc<H> {
    fn abi_version(&self, context: &ModuleContext) -> u32 {
        (**self).abi_version(context)
    }

    fn log(&self, context: &ModuleContext, level: LogLevel, message: &str) {
        (**self).log(context, level, message);
    }
}

/// Host that reports [`ABI_VERSION`] and forwards logs to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingHost;

impl Host for TracingHost {
    fn abi_version(&self, _context: &ModuleContext) -> u32 {
        ABI_VERSION
    }

    fn log(&self, context: &ModuleContext, level: LogLevel, message: &str) {
        let module = context.name();
        match level {
            LogLevel::Info => info!(module, "{message}"),
            LogLevel::Warning => warn!(module, "{message}"),
            LogLevel::Error => error!(module, "{message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_roundtrip() {
        for level in [LogLevel::Info, LogLevel::Warning, LogLevel::Error] {
            assert_eq!(LogLevel::from_u8(level.as_u8()), Some(level));
        }
        assert_eq!(LogLevel::from_u8(3), None);
        assert_eq!(LogLevel::Warning.to_string(), "warning");
    }

    #[test]
    fn test_tracing_host_reports_abi_version() {
        let context = ModuleContext::new("ram", "RAM usage");
        assert_eq!(TracingHost.abi_version(&context), ABI_VERSION);
        TracingHost.log(&context, LogLevel::Error, "no subscriber installed");
    }

    #[test]
    fn test_arc_host_delegates() {
        let host: Arc<dyn Host> = Arc::new(TracingHost);
        let context = ModuleContext::new("ram", "RAM usage");
        assert_eq!(host.abi_version(&context), ABI_VERSION);
    }
}
