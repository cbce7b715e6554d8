//! Sentinel node: runs the governance engine against a live chain node.
//!
//! The node owns everything around the engine:
//! - Configuration (TOML with defaults for every field)
//! - Logging (human or JSON)
//! - The cooperative scheduler and its task cadences
//! - Graceful shutdown on SIGINT/SIGTERM
//! - Wiring of the LMDB store and the JSON-RPC chain client

pub mod config;
pub mod error;
pub mod logging;
pub mod node;
pub mod scheduler;
pub mod shutdown;
pub mod tracing_spans;

pub use config::{ChainConfig, NetworkChoice, SchedulerConfig, SentinelConfig, StoreConfig};
pub use error::NodeError;
pub use logging::{init_logging, LogFormat};
pub use node::{report_errored_events, resolve_network, SentinelNode};
pub use scheduler::{Job, ScheduledTask, Scheduler, Step, TickReport};
pub use shutdown::ShutdownController;
