//! REST API implementation using rouille.
//!
//! GET endpoints read [`SharedApiState`]; POST endpoints turn into
//! [`TimelineEvent`]s on the runner's channel and return immediately. The
//! runner applies them in order with everything else it receives.
//!
//! CORS headers are added to all responses for browser access.

use std::sync::{Arc, RwLock};
use std::thread;

use anyhow::{Result, anyhow};
use crossbeam_channel::Sender;
use rouille::{Request, Response};
use serde::{Deserialize, Serialize};

use crate::core::controller::parse_year;
use crate::core::filter::FilterExpr;
use crate::core::sinks::{FilterSink, LayerRole, YearSink};
use crate::core::state::PlayState;
use crate::core::timeline_events::TimelineEvent;
use crate::core::year::YearRange;
use crate::scene::SceneDefinition;

/// Timeline state as seen by API clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineSnapshot {
    /// Year shown in the label
    pub year: i32,
    /// Last programmatic slider position
    pub slider: Option<i32>,
    pub state: PlayState,
    /// Control the user can press ("play" or "stop")
    pub control: String,
    pub range_min: i32,
    pub range_max: i32,
    pub built_filter: Option<String>,
    pub under_construction_filter: Option<String>,
}

impl TimelineSnapshot {
    pub fn new(year: i32, range: YearRange) -> Self {
        Self {
            year,
            slider: None,
            state: PlayState::Idle,
            control: PlayState::Idle.visible_control().to_string(),
            range_min: range.min(),
            range_max: range.max(),
            built_filter: None,
            under_construction_filter: None,
        }
    }
}

/// Shared state readable by API handlers (written through [`SnapshotSink`])
pub struct SharedApiState {
    pub timeline: RwLock<TimelineSnapshot>,
    pub scene: RwLock<SceneDefinition>,
}

impl SharedApiState {
    pub fn new(snapshot: TimelineSnapshot, scene: SceneDefinition) -> Self {
        Self {
            timeline: RwLock::new(snapshot),
            scene: RwLock::new(scene),
        }
    }

    pub fn timeline(&self) -> TimelineSnapshot {
        self.timeline.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn scene(&self) -> SceneDefinition {
        self.scene.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn update_timeline(&self, f: impl FnOnce(&mut TimelineSnapshot)) {
        let mut guard = self.timeline.write().unwrap_or_else(|e| e.into_inner());
        f(&mut *guard);
    }
}

/// Sink keeping [`SharedApiState`] in line with the controller
#[derive(Clone)]
pub struct SnapshotSink {
    state: Arc<SharedApiState>,
}

impl SnapshotSink {
    pub fn new(state: Arc<SharedApiState>) -> Self {
        Self { state }
    }
}

impl FilterSink for SnapshotSink {
    fn apply_filter(&mut self, layer: LayerRole, filter: &FilterExpr) {
        let expression = filter.expression();
        self.state.update_timeline(|t| match layer {
            LayerRole::Built => t.built_filter = Some(expression),
            LayerRole::UnderConstruction => t.under_construction_filter = Some(expression),
        });
        self.state
            .scene
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .apply_filter(layer, filter);
    }
}

impl YearSink for SnapshotSink {
    fn show_year(&mut self, year: i32) {
        self.state.update_timeline(|t| t.year = year);
    }

    fn move_slider(&mut self, year: i32) {
        self.state.update_timeline(|t| t.slider = Some(year));
    }

    fn show_transport(&mut self, state: PlayState) {
        self.state.update_timeline(|t| {
            t.state = state;
            t.control = state.visible_control().to_string();
        });
    }
}

/// Generic API response
#[derive(Serialize)]
struct ApiResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ApiResponse {
    fn ok() -> Self {
        Self { success: true, message: None, error: None }
    }

    fn ok_msg(msg: &str) -> Self {
        Self { success: true, message: Some(msg.to_string()), error: None }
    }

    fn err(msg: &str) -> Self {
        Self { success: false, message: None, error: Some(msg.to_string()) }
    }
}

/// REST API server
pub struct ApiServer;

impl ApiServer {
    /// Bind `port` and serve requests on a background thread.
    ///
    /// Returns once the socket is bound, so a taken port is reported here.
    pub fn start(port: u16, state: Arc<SharedApiState>, tx: Sender<TimelineEvent>) -> Result<()> {
        let addr = format!("0.0.0.0:{}", port);
        let (ready_tx, ready_rx) = crossbeam_channel::bounded(1);

        thread::Builder::new()
            .name("timetravel-api".to_string())
            .spawn(move || {
                let handler = move |request: &Request| Self::handle_request(request, &state, &tx);
                match rouille::Server::new(&addr, handler) {
                    Ok(server) => {
                        let _ = ready_tx.send(Ok(server.server_addr()));
                        server.run();
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(format!("{}: {}", addr, e)));
                    }
                }
            })?;

        match ready_rx.recv() {
            Ok(Ok(bound)) => {
                log::info!("API server listening on http://{}", bound);
                Ok(())
            }
            Ok(Err(msg)) => Err(anyhow!("Failed to start API server on {}", msg)),
            Err(_) => Err(anyhow!("API server thread exited during startup")),
        }
    }

    pub fn handle_request(request: &Request, state: &SharedApiState, tx: &Sender<TimelineEvent>) -> Response {
        // Handle preflight
        if request.method() == "OPTIONS" {
            return Response::empty_204()
                .with_additional_header("Access-Control-Allow-Origin", "*")
                .with_additional_header("Access-Control-Allow-Methods", "GET, POST, OPTIONS")
                .with_additional_header("Access-Control-Allow-Headers", "Content-Type");
        }

        // Path parameters are matched by hand
        let path = request.url();
        if request.method() == "POST"
            && let Some(year_str) = path.strip_prefix("/api/timeline/year/")
        {
            return Self::handle_year(year_str, state, tx)
                .with_additional_header("Access-Control-Allow-Origin", "*");
        }

        let response = rouille::router!(request,
            (GET) ["/api/health"] => {
                Response::json(&ApiResponse::ok_msg("timetravel API server"))
            },
            (GET) ["/api/status"] => {
                Response::json(&state.timeline())
            },
            (GET) ["/api/scene"] => {
                Response::json(&state.scene())
            },

            (POST) ["/api/timeline/play"] => {
                Self::send_event(tx, TimelineEvent::PlayRequested)
            },
            (POST) ["/api/timeline/stop"] => {
                Self::send_event(tx, TimelineEvent::StopRequested)
            },
            (POST) ["/api/timeline/toggle"] => {
                Self::send_event(tx, TimelineEvent::ToggleRequested)
            },
            (POST) ["/api/timeline/year"] => {
                Response::json(&ApiResponse::err("Missing year")).with_status_code(400)
            },

            _ => {
                Response::json(&ApiResponse::err("Not found")).with_status_code(404)
            }
        );

        response.with_additional_header("Access-Control-Allow-Origin", "*")
    }

    fn handle_year(year_str: &str, state: &SharedApiState, tx: &Sender<TimelineEvent>) -> Response {
        let year = match parse_year(year_str) {
            Ok(year) => year,
            Err(e) => return Response::json(&ApiResponse::err(&e.to_string())).with_status_code(400),
        };
        let snapshot = state.timeline();
        if year < snapshot.range_min || year > snapshot.range_max {
            let msg = format!(
                "Year {} is outside {}..={}",
                year, snapshot.range_min, snapshot.range_max
            );
            return Response::json(&ApiResponse::err(&msg)).with_status_code(400);
        }
        Self::send_event(tx, TimelineEvent::YearChanged(year))
    }

    fn send_event(tx: &Sender<TimelineEvent>, event: TimelineEvent) -> Response {
        match tx.send(event) {
            Ok(_) => Response::json(&ApiResponse::ok()),
            Err(e) => Response::json(&ApiResponse::err(&format!("Timeline is not running: {}", e)))
                .with_status_code(503),
        }
    }
}
