//! Core timeline engine - year domain, filters, controller, animation
//!
//! These modules form the timeline engine, independent of any UI or
//! renderer. Output goes through the sink traits only.

pub mod animation;
pub mod controller;
pub mod error;
pub mod filter;
pub mod sinks;
pub mod state;
pub mod timeline_events;
pub mod year;

// Re-exports for convenience
pub use animation::Animation;
pub use controller::{TimelineController, TimelineSettings};
pub use error::TimelineError;
pub use filter::{FilterExpr, YearField};
pub use sinks::{FilterSink, JsonLinesSink, LayerRole, LogSink, SceneUpdate, YearSink};
pub use state::{PlayState, TimelineState};
pub use timeline_events::TimelineEvent;
pub use year::YearRange;
