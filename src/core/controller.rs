//! Timeline controller: the year state machine.
//!
//! Owns [`TimelineState`] and keeps the two layer filters, the year label,
//! the slider and the transport controls in line with it.
//!
//! # States
//!
//! ```text
//!            start                      tick (advance, wrap at max)
//!   Idle ───────────▶ Playing ◀───┐
//!     ▲                  │  └─────┘
//!     └──────────────────┘
//!            stop
//! ```
//!
//! Initial state is `Idle`; there is no terminal state.
//!
//! # Policies
//!
//! - `set_year()` rejects years outside the range. Nothing is applied.
//! - `start_animation()` while playing is a no-op, so a second tick source
//!   can never appear. `stop_animation()` while idle is a no-op as well.
//! - Playback shows the last year of the range before wrapping to the
//!   first (2019 -> 2020 -> 1800). With looping disabled it stops at the
//!   last year instead.
//!
//! The controller has no notion of time. Ticks come from the runner, which
//! owns the periodic tick source and keeps it in step with `play_state()`.

use log::{debug, trace};

use super::error::TimelineError;
use super::filter::{FilterExpr, YearField};
use super::sinks::{FilterSink, LayerRole, YearSink};
use super::state::{PlayState, TimelineState};
use super::timeline_events::TimelineEvent;
use super::year::{DEFAULT_START_YEAR, YearRange};

/// Validated controller configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimelineSettings {
    pub field: YearField,
    pub range: YearRange,
    pub start_year: i32,
    pub loop_enabled: bool,
}

impl Default for TimelineSettings {
    fn default() -> Self {
        Self {
            field: YearField::default(),
            range: YearRange::default(),
            start_year: DEFAULT_START_YEAR,
            loop_enabled: true,
        }
    }
}

pub struct TimelineController<F: FilterSink, Y: YearSink> {
    settings: TimelineSettings,
    state: TimelineState,
    filters: F,
    display: Y,
}

impl<F: FilterSink, Y: YearSink> TimelineController<F, Y> {
    /// Create an idle controller. Nothing is pushed to the sinks until
    /// [`activate()`](Self::activate).
    pub fn new(settings: TimelineSettings, filters: F, display: Y) -> Result<Self, TimelineError> {
        let start = settings.range.check(settings.start_year)?;
        Ok(Self {
            state: TimelineState::new(start),
            settings,
            filters,
            display,
        })
    }

    /// Show the start year and the play control.
    pub fn activate(&mut self) {
        debug!(
            "Timeline activated: range {}, field {}, start {}",
            self.settings.range, self.settings.field, self.state.current_year
        );
        self.apply_year(self.state.current_year);
        self.display.show_transport(self.state.play_state);
    }

    pub fn state(&self) -> TimelineState {
        self.state
    }

    pub fn current_year(&self) -> i32 {
        self.state.current_year
    }

    pub fn play_state(&self) -> PlayState {
        self.state.play_state
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing()
    }

    pub fn settings(&self) -> &TimelineSettings {
        &self.settings
    }

    pub fn filters(&self) -> &F {
        &self.filters
    }

    pub fn display(&self) -> &Y {
        &self.display
    }

    /// Filter currently applied to `layer`
    pub fn filter_for(&self, layer: LayerRole) -> FilterExpr {
        let year = self.state.current_year;
        match layer {
            LayerRole::Built => FilterExpr::built_before(&self.settings.field, year),
            LayerRole::UnderConstruction => FilterExpr::built_in(&self.settings.field, year),
        }
    }

    /// Select `year`: updates the label once and each layer filter once.
    pub fn set_year(&mut self, year: i32) -> Result<(), TimelineError> {
        let year = self.settings.range.check(year)?;
        self.apply_year(year);
        Ok(())
    }

    /// Select a year given as text, as delivered by the slider or typed by
    /// a user. Decimal text is truncated ("1950.7" selects 1950).
    pub fn set_year_input(&mut self, input: &str) -> Result<(), TimelineError> {
        let year = parse_year(input)?;
        self.set_year(year)
    }

    pub fn start_animation(&mut self) {
        if self.state.is_playing() {
            trace!("Animation already running");
            return;
        }
        self.state.play_state = PlayState::Playing;
        debug!("Animation started at {}", self.state.current_year);
        self.display.show_transport(PlayState::Playing);
    }

    pub fn stop_animation(&mut self) {
        if !self.state.is_playing() {
            return;
        }
        self.state.play_state = PlayState::Idle;
        debug!("Animation stopped at {}", self.state.current_year);
        self.display.show_transport(PlayState::Idle);
    }

    pub fn toggle_animation(&mut self) {
        if self.state.is_playing() {
            self.stop_animation();
        } else {
            self.start_animation();
        }
    }

    /// Advance one year. Ignored while idle.
    pub fn tick(&mut self) {
        if !self.state.is_playing() {
            return;
        }
        let current = self.state.current_year;
        match self.settings.range.next(current, self.settings.loop_enabled) {
            Some(next) => {
                if next < current {
                    trace!("Year loop: {} -> {}", current, next);
                }
                self.display.move_slider(next);
                self.apply_year(next);
            }
            None => {
                trace!("Reached {}, stopping", current);
                self.stop_animation();
            }
        }
    }

    /// Dispatch one event from the event channel.
    ///
    /// `Shutdown` stops the animation; ending the loop is up to the runner.
    pub fn handle(&mut self, event: TimelineEvent) -> Result<(), TimelineError> {
        match event {
            TimelineEvent::YearChanged(year) => self.set_year(year),
            TimelineEvent::YearEntered(text) => self.set_year_input(&text),
            TimelineEvent::PlayRequested => {
                self.start_animation();
                Ok(())
            }
            TimelineEvent::StopRequested | TimelineEvent::Shutdown => {
                self.stop_animation();
                Ok(())
            }
            TimelineEvent::ToggleRequested => {
                self.toggle_animation();
                Ok(())
            }
        }
    }

    fn apply_year(&mut self, year: i32) {
        self.state.current_year = year;
        self.display.show_year(year);
        let field = &self.settings.field;
        self.filters
            .apply_filter(LayerRole::Built, &FilterExpr::built_before(field, year));
        self.filters
            .apply_filter(LayerRole::UnderConstruction, &FilterExpr::built_in(field, year));
    }
}

/// Read a year from widget or console text.
///
/// The whole trimmed text must be a number. Integers are taken as they are;
/// other numeric forms (`"1950.7"`, `"1.95e3"`) are truncated toward zero.
/// Trailing text such as `"1950px"` is rejected, as are NaN, infinities and
/// values outside `i32`.
pub fn parse_year(input: &str) -> Result<i32, TimelineError> {
    let text = input.trim();
    if let Ok(year) = text.parse::<i32>() {
        return Ok(year);
    }
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() && value.abs() < f64::from(i32::MAX) => Ok(value.trunc() as i32),
        _ => Err(TimelineError::NotANumber(input.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sinks::SceneUpdate;

    type TestController = TimelineController<Vec<SceneUpdate>, Vec<SceneUpdate>>;

    fn controller() -> TestController {
        TimelineController::new(TimelineSettings::default(), Vec::new(), Vec::new()).unwrap()
    }

    fn at_year(year: i32) -> TestController {
        let settings = TimelineSettings {
            start_year: year,
            ..Default::default()
        };
        TimelineController::new(settings, Vec::new(), Vec::new()).unwrap()
    }

    fn filter_updates(c: &TestController) -> Vec<(LayerRole, String)> {
        c.filters()
            .iter()
            .filter_map(|u| match u {
                SceneUpdate::LayerFilter { layer, expression } => Some((*layer, expression.clone())),
                _ => None,
            })
            .collect()
    }

    fn year_labels(c: &TestController) -> Vec<i32> {
        c.display()
            .iter()
            .filter_map(|u| match u {
                SceneUpdate::YearLabel { year } => Some(*year),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_new_is_silent_and_idle() {
        let c = controller();
        assert_eq!(c.current_year(), 1900);
        assert_eq!(c.play_state(), PlayState::Idle);
        assert!(c.filters().is_empty());
        assert!(c.display().is_empty());
    }

    #[test]
    fn test_new_rejects_start_outside_range() {
        let settings = TimelineSettings {
            start_year: 1700,
            ..Default::default()
        };
        assert!(matches!(
            TimelineController::new(settings, Vec::<SceneUpdate>::new(), Vec::<SceneUpdate>::new()),
            Err(TimelineError::YearOutOfRange { year: 1700, .. })
        ));
    }

    #[test]
    fn test_activate_shows_start_year_and_play() {
        let mut c = controller();
        c.activate();
        assert_eq!(year_labels(&c), vec![1900]);
        assert_eq!(filter_updates(&c).len(), 2);
        assert_eq!(
            c.display().last(),
            Some(&SceneUpdate::Transport { state: PlayState::Idle })
        );
    }

    #[test]
    fn test_set_year_updates_each_sink_once() {
        let mut c = controller();
        c.set_year(1900).unwrap();

        assert_eq!(
            filter_updates(&c),
            vec![
                (
                    LayerRole::Built,
                    "bouwjaar IS NOT NULL AND bouwjaar > 0 AND bouwjaar < 1900".to_string()
                ),
                (
                    LayerRole::UnderConstruction,
                    "bouwjaar IS NOT NULL AND bouwjaar > 0 AND bouwjaar = 1900".to_string()
                ),
            ]
        );
        assert_eq!(c.display(), &vec![SceneUpdate::YearLabel { year: 1900 }]);
    }

    #[test]
    fn test_set_year_out_of_range_changes_nothing() {
        let mut c = controller();
        let err = c.set_year(2021).unwrap_err();
        assert!(matches!(err, TimelineError::YearOutOfRange { year: 2021, .. }));
        assert!(c.set_year(1799).is_err());
        assert_eq!(c.current_year(), 1900);
        assert!(c.filters().is_empty());
        assert!(c.display().is_empty());
    }

    #[test]
    fn test_set_year_input() {
        let mut c = controller();
        c.set_year_input(" 1950 ").unwrap();
        assert_eq!(c.current_year(), 1950);
        c.set_year_input("1960.00").unwrap();
        assert_eq!(c.current_year(), 1960);
        c.set_year_input("1970.9").unwrap();
        assert_eq!(c.current_year(), 1970);

        let err = c.set_year_input("nineteen-eighty").unwrap_err();
        assert_eq!(err, TimelineError::NotANumber("nineteen-eighty".to_string()));
        assert!(c.set_year_input("").is_err());
        assert!(c.set_year_input("NaN").is_err());
        assert_eq!(c.current_year(), 1970);
        assert_eq!(year_labels(&c), vec![1950, 1960, 1970]);
    }

    #[test]
    fn test_three_ticks_advance_three_years() {
        let mut c = controller();
        let before = c.current_year();
        c.start_animation();
        c.tick();
        c.tick();
        c.tick();
        assert_eq!(c.current_year(), before + 3);
        assert_eq!(year_labels(&c), vec![1901, 1902, 1903]);
    }

    #[test]
    fn test_tick_moves_slider_before_label() {
        let mut c = controller();
        c.start_animation();
        c.tick();
        assert_eq!(
            c.display(),
            &vec![
                SceneUpdate::Transport { state: PlayState::Playing },
                SceneUpdate::Slider { year: 1901 },
                SceneUpdate::YearLabel { year: 1901 },
            ]
        );
        assert_eq!(filter_updates(&c).len(), 2);
    }

    #[test]
    fn test_tick_shows_2020_then_wraps() {
        let mut c = at_year(2019);
        c.start_animation();
        c.tick();
        assert_eq!(c.current_year(), 2020);
        c.tick();
        assert_eq!(c.current_year(), 1800);
        assert!(c.is_playing());
    }

    #[test]
    fn test_tick_without_loop_stops_at_max() {
        let settings = TimelineSettings {
            start_year: 2019,
            loop_enabled: false,
            ..Default::default()
        };
        let mut c = TimelineController::new(settings, Vec::new(), Vec::new()).unwrap();
        c.start_animation();
        c.tick();
        assert_eq!(c.current_year(), 2020);
        c.tick();
        assert_eq!(c.current_year(), 2020);
        assert_eq!(c.play_state(), PlayState::Idle);
    }

    #[test]
    fn test_tick_while_idle_is_ignored() {
        let mut c = controller();
        c.tick();
        assert_eq!(c.current_year(), 1900);
        assert!(c.display().is_empty());
    }

    #[test]
    fn test_start_twice_is_single_transition() {
        let mut c = controller();
        c.start_animation();
        c.start_animation();
        assert!(c.is_playing());
        assert_eq!(c.display().len(), 1);
        c.tick();
        assert_eq!(c.current_year(), 1901);
    }

    #[test]
    fn test_stop_twice_is_safe() {
        let mut c = controller();
        c.start_animation();
        c.stop_animation();
        c.stop_animation();
        assert_eq!(c.play_state(), PlayState::Idle);
        assert_eq!(
            c.display(),
            &vec![
                SceneUpdate::Transport { state: PlayState::Playing },
                SceneUpdate::Transport { state: PlayState::Idle },
            ]
        );

        let mut idle = controller();
        idle.stop_animation();
        assert_eq!(idle.play_state(), PlayState::Idle);
        assert!(idle.display().is_empty());
    }

    #[test]
    fn test_handle_events() {
        let mut c = controller();
        c.handle(TimelineEvent::YearChanged(1930)).unwrap();
        assert_eq!(c.current_year(), 1930);
        c.handle(TimelineEvent::YearEntered("1940".into())).unwrap();
        assert_eq!(c.current_year(), 1940);
        c.handle(TimelineEvent::ToggleRequested).unwrap();
        assert!(c.is_playing());
        c.handle(TimelineEvent::PlayRequested).unwrap();
        assert!(c.is_playing());
        c.handle(TimelineEvent::StopRequested).unwrap();
        assert!(!c.is_playing());
        c.handle(TimelineEvent::ToggleRequested).unwrap();
        c.handle(TimelineEvent::Shutdown).unwrap();
        assert!(!c.is_playing());
        assert!(c.handle(TimelineEvent::YearChanged(3000)).is_err());
    }

    #[test]
    fn test_widget_echo_reapplies_same_year() {
        let mut c = controller();
        c.start_animation();
        c.tick();
        // A slider that reports programmatic moves triggers the same year again
        c.handle(TimelineEvent::YearChanged(1901)).unwrap();
        assert_eq!(c.current_year(), 1901);
        assert_eq!(year_labels(&c), vec![1901, 1901]);
    }

    #[test]
    fn test_filter_for_matches_applied() {
        let mut c = controller();
        c.set_year(1999).unwrap();
        let applied = filter_updates(&c);
        assert_eq!(applied[0].1, c.filter_for(LayerRole::Built).expression());
        assert_eq!(applied[1].1, c.filter_for(LayerRole::UnderConstruction).expression());
    }

    #[test]
    fn test_parse_year() {
        assert_eq!(parse_year("2000"), Ok(2000));
        assert_eq!(parse_year("-12"), Ok(-12));
        assert_eq!(parse_year("1e3"), Ok(1000));
        assert!(parse_year("1e12").is_err());
        assert!(parse_year("abc").is_err());
    }

    #[test]
    fn test_parse_year_needs_whole_number_text() {
        assert_eq!(parse_year(" 1960 "), Ok(1960));
        assert_eq!(parse_year("1950.7"), Ok(1950));
        assert_eq!(parse_year("1.95e3"), Ok(1950));
        assert!(matches!(parse_year("1950px"), Err(TimelineError::NotANumber(_))));
        assert!(parse_year("inf").is_err());
        assert!(parse_year("").is_err());
    }
}
