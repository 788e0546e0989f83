//! Timeline runner - the single-threaded event loop.
//!
//! ```text
//!  console thread ──┐
//!                   ├── TimelineEvent ──▶ ┌──────────────────────┐
//!  REST threads   ──┘                     │ TimelineRunner::run  │──▶ sinks
//!                                         │  select { events,    │
//!  Animation (tick receiver) ───────────▶ │           ticks }    │
//!                                         └──────────────────────┘
//! ```
//!
//! Producers only send messages. The controller is mutated on the runner
//! thread alone, one event or tick at a time. After every step the ticker
//! is reconciled with the controller's play state, so exactly one tick
//! source exists while playing and none while idle. The ticker is cancelled
//! when the loop ends.

use std::time::Duration;

use crossbeam_channel::{Receiver, select};
use log::{debug, info, warn};

use crate::core::animation::Animation;
use crate::core::controller::TimelineController;
use crate::core::sinks::{FilterSink, YearSink};
use crate::core::timeline_events::TimelineEvent;

/// Why the loop ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunExit {
    Shutdown,
    ChannelClosed,
    TickBudget,
    /// Playback stopped on its own while a tick budget was set
    Finished,
}

enum Step {
    Event(TimelineEvent),
    Tick,
    Closed,
}

pub struct TimelineRunner<F: FilterSink, Y: YearSink> {
    controller: TimelineController<F, Y>,
    animation: Animation,
    events: Receiver<TimelineEvent>,
    max_ticks: Option<u64>,
    ticks: u64,
}

impl<F: FilterSink, Y: YearSink> TimelineRunner<F, Y> {
    pub fn new(controller: TimelineController<F, Y>, interval: Duration, events: Receiver<TimelineEvent>) -> Self {
        Self {
            controller,
            animation: Animation::new(interval),
            events,
            max_ticks: None,
            ticks: 0,
        }
    }

    /// End the loop after `max` animation ticks, or as soon as playback
    /// stops by itself (last year reached without looping).
    pub fn with_max_ticks(mut self, max: Option<u64>) -> Self {
        self.max_ticks = max;
        self
    }

    pub fn controller(&self) -> &TimelineController<F, Y> {
        &self.controller
    }

    pub fn animation(&self) -> &Animation {
        &self.animation
    }

    /// Animation ticks processed so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Process events and ticks until shutdown, channel close or the tick
    /// budget ends the run.
    pub fn run(&mut self) -> RunExit {
        info!(
            "Timeline loop running (tick every {} ms)",
            self.animation.interval().as_millis()
        );

        let exit = loop {
            self.sync_animation();
            if self.max_ticks.is_some_and(|max| self.ticks >= max) {
                break RunExit::TickBudget;
            }

            let ticks = self.animation.receiver();
            let step = select! {
                recv(self.events) -> msg => match msg {
                    Ok(event) => Step::Event(event),
                    Err(_) => Step::Closed,
                },
                recv(ticks) -> _ => Step::Tick,
            };

            match step {
                Step::Event(TimelineEvent::Shutdown) => {
                    let _ = self.controller.handle(TimelineEvent::Shutdown);
                    break RunExit::Shutdown;
                }
                Step::Event(event) => {
                    debug!("Event: {:?}", event);
                    if let Err(e) = self.controller.handle(event) {
                        warn!("Ignored: {}", e);
                    }
                }
                Step::Tick => {
                    self.controller.tick();
                    self.ticks += 1;
                    if self.max_ticks.is_some() && !self.controller.is_playing() {
                        break RunExit::Finished;
                    }
                }
                Step::Closed => break RunExit::ChannelClosed,
            }
        };

        self.controller.stop_animation();
        self.animation.stop();
        info!(
            "Timeline loop finished ({:?}) at year {} after {} ticks",
            exit,
            self.controller.current_year(),
            self.ticks
        );
        exit
    }

    fn sync_animation(&mut self) {
        if self.controller.is_playing() {
            self.animation.start();
        } else {
            self.animation.stop();
        }
    }
}
