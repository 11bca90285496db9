//! Module framework
//!
//! A [`Module`] is one reporting unit: its identity, its lifecycle state, the
//! host it talks to and the [`FrameSlot`] holding its most recent MDTP frame.
//! [`ReportingModule`] pairs a module with a [`Collector`] and exposes the
//! callback table a host dispatches through ([`ModuleApi`]).

mod api;
mod config;
mod host;

pub use api::{Collector, ModuleApi, ReportingModule};
pub use config::ModuleConfig;
pub use host::{Host, LogLevel, ModuleContext, TracingHost};

use tracing::debug;

use crate::protocol::{Error, Frame, FrameSlot, Node, Result};

/// Version of the host/module ABI this crate implements
pub const ABI_VERSION: u32 = 1;

/// State of one reporting module
pub struct Module {
    context: ModuleContext,
    host: Box<dyn Host>,
    config: ModuleConfig,
    slot: FrameSlot,
}

impl Module {
    /// Initialize a module.
    ///
    /// Fails with [`Error::NullArgument`] if `name` or `description` is empty,
    /// [`Error::AbiMismatch`] if the host speaks another ABI version and
    /// [`Error::InvalidConfig`] if `json_configuration` cannot be parsed.
    pub fn init<H>(name: &str, description: &str, host: H, json_configuration: &str) -> Result<Self>
    where
        H: Host + 'static,
    {
        if name.is_empty() {
            return Err(Error::NullArgument { argument: "name" });
        }
        if description.is_empty() {
            return Err(Error::NullArgument {
                argument: "description",
            });
        }

        let context = ModuleContext::new(name, description);
        let found = host.abi_version(&context);
        if found != ABI_VERSION {
            return Err(Error::AbiMismatch {
                expected: ABI_VERSION,
                found,
            });
        }

        let config = ModuleConfig::from_json(json_configuration)?;
        debug!(
            module = name,
            enabled = config.enabled,
            poll_ratio = config.poll_ratio,
            "module initialized"
        );

        Ok(Self {
            context,
            host: Box::new(host),
            config,
            slot: FrameSlot::new(),
        })
    }

    /// Module identity
    #[must_use]
    pub const fn context(&self) -> &ModuleContext {
        &self.context
    }

    /// Module name
    #[must_use]
    pub fn name(&self) -> &str {
        self.context.name()
    }

    /// Module description
    #[must_use]
    pub fn description(&self) -> &str {
        self.context.description()
    }

    /// Current configuration, including lifecycle changes made since init
    #[must_use]
    pub const fn config(&self) -> &ModuleConfig {
        &self.config
    }

    /// Current configuration serialized as JSON
    pub fn configuration(&self) -> Result<String> {
        self.config.to_json()
    }

    /// Enable the module
    pub fn enable(&mut self) {
        self.config.enabled = true;
    }

    /// Disable the module
    pub fn disable(&mut self) {
        self.config.enabled = false;
    }

    /// Check whether the module is enabled
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Poll ratio of the module
    #[must_use]
    pub const fn poll_ratio(&self) -> u32 {
        self.config.poll_ratio
    }

    /// Set the poll ratio; 0 is raised to 1
    pub fn set_poll_ratio(&mut self, poll_ratio: u32) {
        self.config.poll_ratio = poll_ratio.max(1);
    }

    /// ABI version the host currently reports for this module
    #[must_use]
    pub fn server_abi_version(&self) -> u32 {
        self.host.abi_version(&self.context)
    }

    /// Send a log message to the host
    pub fn log(&self, level: LogLevel, message: &str) {
        self.host.log(&self.context, level, message);
    }

    /// Frame `nodes` into this module's slot, replacing the previous frame
    pub fn make_root<I>(&mut self, nodes: I) -> Result<Frame<'_>>
    where
        I: IntoIterator<Item = Node>,
    {
        self.slot.make_root(nodes)
    }

    /// Most recent frame, if one was built
    #[must_use]
    pub fn data(&self) -> Option<Frame<'_>> {
        self.slot.frame()
    }
}

impl std::fmt::Debug for Module {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Module")
            .field("context", &self.context)
            .field("config", &self.config)
            .field("slot", &self.slot)
            .finish_non_exhaustive()
    }
}

impl Drop for Module {
    fn drop(&mut self) {
        debug!(module = self.context.name(), "module destroyed");
    }
}
