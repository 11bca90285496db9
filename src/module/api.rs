//! Callback table exposed to the host

use tracing::{debug, warn};

use super::{LogLevel, Module, ModuleContext};
use crate::protocol::{Error, Frame, Node, Result};

/// Produces the top-level nodes of one report
pub trait Collector {
    /// Gather the current measurements
    fn collect(&mut self, context: &ModuleContext) -> Result<Vec<Node>>;
}

impl<F> Collector for F
where
    F: FnMut(&ModuleContext) -> Result<Vec<Node>>,
{
    fn collect(&mut self, context: &ModuleContext) -> Result<Vec<Node>> {
        self(context)
    }
}

/// Functions the host may invoke on a loaded module
///
/// `Box<dyn ModuleApi>` is the dispatch table: the host keeps one per module
/// and never needs to know the concrete collector behind it.
pub trait ModuleApi {
    /// Identity the module presents to the host
    fn context(&self) -> &ModuleContext;

    /// Module name
    fn name(&self) -> &str;

    /// Module description
    fn description(&self) -> &str;

    /// Current configuration as JSON
    fn configuration(&self) -> Result<String>;

    /// Enable the module
    fn enable(&mut self);

    /// Disable the module
    fn disable(&mut self);

    /// Check whether the module is enabled
    fn is_enabled(&self) -> bool;

    /// Poll ratio of the module
    fn poll_ratio(&self) -> u32;

    /// Set the poll ratio
    fn set_poll_ratio(&mut self, poll_ratio: u32);

    /// Collect and frame a fresh report.
    ///
    /// The frame is valid until the next call on the same module.
    fn get_data(&mut self) -> Result<Frame<'_>>;
}

/// A [`Module`] driven by a [`Collector`]
#[derive(Debug)]
pub struct ReportingModule<C> {
    module: Module,
    collector: C,
}

impl<C: Collector> ReportingModule<C> {
    /// Pair an initialized module with its collector
    pub fn new(module: Module, collector: C) -> Self {
        Self { module, collector }
    }

    /// Underlying module
    #[must_use]
    pub const fn module(&self) -> &Module {
        &self.module
    }

    /// Underlying module, mutably
    pub fn module_mut(&mut self) -> &mut Module {
        &mut self.module
    }
}

impl<C: Collector> ModuleApi for ReportingModule<C> {
    fn context(&self) -> &ModuleContext {
        self.module.context()
    }

    fn name(&self) -> &str {
        self.module.name()
    }

    fn description(&self) -> &str {
        self.module.description()
    }

    fn configuration(&self) -> Result<String> {
        self.module.configuration()
    }

    fn enable(&mut self) {
        self.module.enable();
    }

    fn disable(&mut self) {
        self.module.disable();
    }

    fn is_enabled(&self) -> bool {
        self.module.is_enabled()
    }

    fn poll_ratio(&self) -> u32 {
        self.module.poll_ratio()
    }

    fn set_poll_ratio(&mut self, poll_ratio: u32) {
        self.module.set_poll_ratio(poll_ratio);
    }

    fn get_data(&mut self) -> Result<Frame<'_>> {
        if !self.module.is_enabled() {
            return Err(Error::ModuleDisabled {
                name: self.module.name().to_owned(),
            });
        }

        let nodes = match self.collector.collect(self.module.context()) {
            Ok(nodes) => nodes,
            Err(err) => {
                warn!(module = self.module.name(), %err, "collection failed");
                self.module
                    .log(LogLevel::Error, &format!("collection failed: {err}"));
                return Err(err);
            }
        };

        debug!(
            module = self.module.name(),
            nodes = nodes.len(),
            "collected report"
        );
        self.module.make_root(nodes)
    }
}
