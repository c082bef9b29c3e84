//! Plugin error types.

use thiserror::Error;

use crate::gate::LabelError;

/// Failures that stop a check from running, as opposed to a negative
/// admission decision.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PluginError {
    /// Bad mode string, bad plugin args, or bad gang labels on a unit.
    #[error("configuration error: {0}")]
    Config(String),

    /// The host's unit listing or node snapshot could not be read.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The node is unknown to the current snapshot.
    #[error("node lookup failed: {0}")]
    NodeLookup(String),
}

impl From<LabelError> for PluginError {
    fn from(err: LabelError) -> Self {
        PluginError::Config(err.to_string())
    }
}

pub type PluginResult<T> = Result<T, PluginError>;
