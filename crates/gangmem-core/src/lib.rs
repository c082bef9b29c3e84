pub mod config;
pub mod host;
pub mod types;

pub use config::{ConfigError, GangmemConfig, ScoreBounds, parse_memory_quantity};
pub use host::{HostError, NodeSnapshot, UnitLister};
pub use types::*;
