//! gangmem-state — embedded store standing in for the host's caches.
//!
//! Backed by [redb](https://docs.rs/redb), it holds the workload units the
//! admission gate counts and the node resource snapshots the scorer reads.
//! `StateStore` implements the `UnitLister` and `NodeSnapshot` host traits
//! from `gangmem-core`, so the plugin can run outside a real scheduler.
//!
//! The `StateStore` is `Clone` + `Send` + `Sync` (backed by `Arc<Database>`)
//! and can be shared across scoring tasks.

pub mod error;
pub mod store;
pub mod tables;

pub use error::{StateError, StateResult};
pub use store::StateStore;
