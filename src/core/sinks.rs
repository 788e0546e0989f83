//! Output side of the timeline controller.
//!
//! The controller never touches the renderer or the page directly. It is
//! handed two sinks at construction:
//!
//! - [`FilterSink`] receives the definition expression for each building
//!   layer (the Scene Rendering Service).
//! - [`YearSink`] receives the year label, the slider position and the
//!   visible transport control (the page).
//!
//! Sinks are fire-and-forget: nothing is returned and a sink that cannot
//! deliver logs and carries on. Tuples fan out to both members, so the CLI
//! can log, stream JSON and feed the REST snapshot at the same time.

use std::io::Write;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::filter::FilterExpr;
use super::state::PlayState;

/// Which of the two building layers a filter is meant for
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerRole {
    /// Layer A: buildings that already exist in the selected year
    Built,
    /// Layer B: buildings completed in exactly the selected year
    UnderConstruction,
}

impl LayerRole {
    pub fn as_str(self) -> &'static str {
        match self {
            LayerRole::Built => "built",
            LayerRole::UnderConstruction => "under_construction",
        }
    }
}

pub trait FilterSink {
    /// Replace the definition expression of `layer`
    fn apply_filter(&mut self, layer: LayerRole, filter: &FilterExpr);
}

pub trait YearSink {
    /// Write the year into the label next to the slider
    fn show_year(&mut self, year: i32);
    /// Move the slider handle without user interaction
    fn move_slider(&mut self, year: i32);
    /// Show the control matching `state` and hide the other one
    fn show_transport(&mut self, state: PlayState);
}

/// One sink call, in the form streamed to external renderers
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SceneUpdate {
    LayerFilter { layer: LayerRole, expression: String },
    YearLabel { year: i32 },
    Slider { year: i32 },
    Transport { state: PlayState },
}

impl FilterSink for Vec<SceneUpdate> {
    fn apply_filter(&mut self, layer: LayerRole, filter: &FilterExpr) {
        self.push(SceneUpdate::LayerFilter {
            layer,
            expression: filter.expression(),
        });
    }
}

impl YearSink for Vec<SceneUpdate> {
    fn show_year(&mut self, year: i32) {
        self.push(SceneUpdate::YearLabel { year });
    }

    fn move_slider(&mut self, year: i32) {
        self.push(SceneUpdate::Slider { year });
    }

    fn show_transport(&mut self, state: PlayState) {
        self.push(SceneUpdate::Transport { state });
    }
}

impl<A: FilterSink, B: FilterSink> FilterSink for (A, B) {
    fn apply_filter(&mut self, layer: LayerRole, filter: &FilterExpr) {
        self.0.apply_filter(layer, filter);
        self.1.apply_filter(layer, filter);
    }
}

impl<A: YearSink, B: YearSink> YearSink for (A, B) {
    fn show_year(&mut self, year: i32) {
        self.0.show_year(year);
        self.1.show_year(year);
    }

    fn move_slider(&mut self, year: i32) {
        self.0.move_slider(year);
        self.1.move_slider(year);
    }

    fn show_transport(&mut self, state: PlayState) {
        self.0.show_transport(state);
        self.1.show_transport(state);
    }
}

impl<T: FilterSink> FilterSink for Option<T> {
    fn apply_filter(&mut self, layer: LayerRole, filter: &FilterExpr) {
        if let Some(sink) = self {
            sink.apply_filter(layer, filter);
        }
    }
}

impl<T: YearSink> YearSink for Option<T> {
    fn show_year(&mut self, year: i32) {
        if let Some(sink) = self {
            sink.show_year(year);
        }
    }

    fn move_slider(&mut self, year: i32) {
        if let Some(sink) = self {
            sink.move_slider(year);
        }
    }

    fn show_transport(&mut self, state: PlayState) {
        if let Some(sink) = self {
            sink.show_transport(state);
        }
    }
}

/// Reports every sink call through the `log` facade
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl FilterSink for LogSink {
    fn apply_filter(&mut self, layer: LayerRole, filter: &FilterExpr) {
        debug!("Layer {} filter: {}", layer.as_str(), filter);
    }
}

impl YearSink for LogSink {
    fn show_year(&mut self, year: i32) {
        info!("Year {}", year);
    }

    fn move_slider(&mut self, year: i32) {
        debug!("Slider moved to {}", year);
    }

    fn show_transport(&mut self, state: PlayState) {
        info!("Transport {:?}, showing '{}' control", state, state.visible_control());
    }
}

/// Streams sink calls as JSON lines (one [`SceneUpdate`] per line).
///
/// Stops writing after the first I/O error, e.g. when the reading end of a
/// pipe has gone away.
pub struct JsonLinesSink<W: Write> {
    out: W,
    failed: bool,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self { out, failed: false }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, update: &SceneUpdate) {
        if self.failed {
            return;
        }
        let result = serde_json::to_writer(&mut self.out, update)
            .map_err(std::io::Error::from)
            .and_then(|_| self.out.write_all(b"\n"))
            .and_then(|_| self.out.flush());
        if let Err(e) = result {
            warn!("Update stream closed: {}", e);
            self.failed = true;
        }
    }
}

impl<W: Write> FilterSink for JsonLinesSink<W> {
    fn apply_filter(&mut self, layer: LayerRole, filter: &FilterExpr) {
        self.emit(&SceneUpdate::LayerFilter {
            layer,
            expression: filter.expression(),
        });
    }
}

impl<W: Write> YearSink for JsonLinesSink<W> {
    fn show_year(&mut self, year: i32) {
        self.emit(&SceneUpdate::YearLabel { year });
    }

    fn move_slider(&mut self, year: i32) {
        self.emit(&SceneUpdate::Slider { year });
    }

    fn show_transport(&mut self, state: PlayState) {
        self.emit(&SceneUpdate::Transport { state });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::filter::YearField;

    #[test]
    fn test_json_lines_format() {
        let mut sink = JsonLinesSink::new(Vec::new());
        let filter = FilterExpr::built_in(&YearField::default(), 1901);
        sink.apply_filter(LayerRole::UnderConstruction, &filter);
        sink.show_year(1901);
        sink.show_transport(PlayState::Playing);

        let text = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            r#"{"type":"layer_filter","layer":"under_construction","expression":"bouwjaar IS NOT NULL AND bouwjaar > 0 AND bouwjaar = 1901"}"#
        );
        assert_eq!(lines[1], r#"{"type":"year_label","year":1901}"#);
        assert_eq!(lines[2], r#"{"type":"transport","state":"playing"}"#);
    }

    struct BrokenPipe {
        writes: usize,
    }

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            self.writes += 1;
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_json_lines_stops_after_error() {
        let mut sink = JsonLinesSink::new(BrokenPipe { writes: 0 });
        sink.show_year(1900);
        let after_first = sink.out.writes;
        sink.show_year(1901);
        sink.move_slider(1901);
        assert!(sink.failed);
        assert_eq!(sink.out.writes, after_first);
    }

    #[test]
    fn test_tuple_fans_out() {
        let mut pair: (Vec<SceneUpdate>, Option<Vec<SceneUpdate>>) = (Vec::new(), Some(Vec::new()));
        pair.move_slider(1950);
        assert_eq!(pair.0, vec![SceneUpdate::Slider { year: 1950 }]);
        assert_eq!(pair.1, Some(vec![SceneUpdate::Slider { year: 1950 }]));

        let mut none: Option<Vec<SceneUpdate>> = None;
        none.show_year(1950);
        assert!(none.is_none());
    }
}
