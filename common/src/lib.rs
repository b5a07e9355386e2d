//! Shared types for the `resultsnap` workspace.
//!
//! * [`record`]: the typed result records written to the staging log.
//! * [`range`]: inclusive hall-ticket ranges and their textual form.
//! * [`config`]: the immutable run configuration handed to every component.

pub mod config;
pub mod range;
pub mod record;

/// Logs an operator-facing success line.
///
/// Routed through `tracing` under a dedicated target so the console formatter
/// can give it its own marker.
#[macro_export]
macro_rules! success {
    ($($arg:tt)*) => {
        $crate::__tracing::info!(target: $crate::SUCCESS_TARGET, $($arg)*)
    };
}

pub const SUCCESS_TARGET: &str = "resultsnap::success";

#[doc(hidden)]
pub use tracing as __tracing;
