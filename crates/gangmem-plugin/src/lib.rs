//! gangmem scheduler plugin — gang admission and memory-headroom scoring.
//!
//! Plugs into two extension points of a host scheduler. It never binds or
//! preempts; it only answers the host's questions.
//!
//! # Components
//!
//! - **`gate`** — Admission gate: a unit waits until its group has `minAvailable` members
//! - **`scorer`** — Raw per-node score from memory headroom (`Least` / `Most`)
//! - **`normalize`** — Rescale raw scores into the host's `[MinOut, MaxOut]`
//! - **`status`** — Host-facing `Success` / `Unschedulable` / `Error` codes
//!
//! # Pipeline
//!
//! ```text
//! admit(unit) ──admitted──▶ score(unit, node) × N ──barrier──▶ normalize(unit, scores)
//!      │                        (parallel)
//!      └─ Unschedulable / Error
//! ```

pub mod args;
pub mod error;
pub mod gate;
pub mod normalize;
pub mod plugin;
pub mod scorer;
pub mod status;

pub use args::PluginArgs;
pub use error::{PluginError, PluginResult};
pub use gate::{Admission, GangRequest, LabelError};
pub use normalize::normalize_scores;
pub use plugin::{GangMemPlugin, Handle, NAME};
pub use scorer::{LEAST_MODE_NUMERATOR, memory_score};
pub use status::{Code, Status};
