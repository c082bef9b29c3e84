//! Plugin construction and the host handle.

use std::sync::Arc;

use gangmem_core::{NodeSnapshot, ScoreMode, UnitLister};
use tracing::info;

use crate::args::PluginArgs;
use crate::error::PluginResult;

/// Name the plugin is registered under in a scheduler profile.
pub const NAME: &str = "GangMemory";

/// Read-only access to the host's unit listing and node snapshot.
#[derive(Clone)]
pub struct Handle {
    units: Arc<dyn UnitLister>,
    nodes: Arc<dyn NodeSnapshot>,
}

impl Handle {
    pub fn new(units: Arc<dyn UnitLister>, nodes: Arc<dyn NodeSnapshot>) -> Self {
        Self { units, nodes }
    }

    pub fn units(&self) -> &dyn UnitLister {
        self.units.as_ref()
    }

    pub fn nodes(&self) -> &dyn NodeSnapshot {
        self.nodes.as_ref()
    }
}

/// Gang admission plus memory-headroom scoring.
///
/// Holds no mutable state: the mode is fixed at construction and every
/// check only reads through the [`Handle`], so one instance can serve
/// concurrent scoring calls.
#[derive(Clone)]
pub struct GangMemPlugin {
    mode: ScoreMode,
    handle: Handle,
}

impl GangMemPlugin {
    /// Build the plugin from optional host-supplied args.
    ///
    /// Without args the plugin defaults to [`ScoreMode::Least`]. With args,
    /// an invalid or missing mode refuses construction.
    pub fn new(args: Option<&PluginArgs>, handle: Handle) -> PluginResult<Self> {
        let mode = match args {
            Some(args) => args.score_mode()?,
            None => ScoreMode::default(),
        };
        info!(plugin = NAME, %mode, "scheduler plugin initialized");
        Ok(Self::with_mode(mode, handle))
    }

    pub fn with_mode(mode: ScoreMode, handle: Handle) -> Self {
        Self { mode, handle }
    }

    pub fn name(&self) -> &'static str {
        NAME
    }

    pub fn mode(&self) -> ScoreMode {
        self.mode
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gangmem_state::StateStore;

    use crate::error::PluginError;

    fn handle() -> Handle {
        let store = StateStore::open_in_memory().unwrap();
        Handle::new(Arc::new(store.clone()), Arc::new(store))
    }

    #[test]
    fn defaults_to_least_without_args() {
        let plugin = GangMemPlugin::new(None, handle()).unwrap();
        assert_eq!(plugin.mode(), ScoreMode::Least);
        assert_eq!(plugin.name(), "GangMemory");
    }

    #[test]
    fn honors_mode_arg() {
        let args = PluginArgs::new("Most");
        let plugin = GangMemPlugin::new(Some(&args), handle()).unwrap();
        assert_eq!(plugin.mode(), ScoreMode::Most);
    }

    #[test]
    fn refuses_invalid_mode() {
        let args = PluginArgs::new("Random");
        let err = GangMemPlugin::new(Some(&args), handle()).err().unwrap();
        assert!(matches!(err, PluginError::Config(_)));
    }

    #[test]
    fn plugin_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GangMemPlugin>();
    }
}
