//! Span constructors shared by the scheduler and the node wiring.
//!
//! Consistent span names keep task output greppable in both log formats.

use tracing::{debug_span, info_span, Span};

/// One scheduler tick.
pub fn tick_span(tick: u64, now: u64) -> Span {
    debug_span!("tick", tick, now)
}

/// One run of a scheduled task.
pub fn task_span(task: &str) -> Span {
    info_span!("task", name = %task)
}

/// Startup of the daemon against a chain node.
pub fn startup_span(rpc_url: &str) -> Span {
    info_span!("startup", rpc_url = %rpc_url)
}
