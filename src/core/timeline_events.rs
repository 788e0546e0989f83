//! Timeline events.
//!
//! Everything that can change the timeline arrives as one of these on a
//! single channel: slider updates, console and REST commands, shutdown.
//! Animation ticks are not events; the runner owns the tick source.

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TimelineEvent {
    /// Range widget moved (drag or programmatic set, not distinguished)
    YearChanged(i32),
    /// Raw year text from the widget, console or REST API
    YearEntered(String),
    /// Play control pressed
    PlayRequested,
    /// Stop control pressed
    StopRequested,
    /// Play when idle, stop when playing
    ToggleRequested,
    /// End the event loop
    Shutdown,
}
