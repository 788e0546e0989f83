//! REST API server for remote control of the timeline.
//!
//! # Purpose
//!
//! Lets scripts, web pages or the rendering service itself drive the
//! timeline and read the filters that are currently in effect.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────┐    crossbeam channel     ┌──────────────────────┐
//! │   API Server Thread     │  ── TimelineEvent ────▶  │   Runner Thread      │
//! │   (rouille HTTP)        │                          │   (timeline loop)    │
//! │                         │                          │                      │
//! │  POST /api/timeline/play│  ──▶ PlayRequested ──▶   │  controller.handle() │
//! │  POST .../year/1950     │  ──▶ YearChanged(1950)   │                      │
//! └─────────────────────────┘                          └──────────────────────┘
//!          │                                                      │
//!          │  Arc<SharedApiState>                                 │
//!          │◀──────────── read snapshots ───────── SnapshotSink ──│
//! ```
//!
//! - **rouille** - sync HTTP server
//! - **crossbeam channel** - the runner's event channel, shared with the console
//! - **SharedApiState** - snapshots written by [`SnapshotSink`] on every update
//!
//! # Endpoints
//!
//! | Method | Path                        | Description                      |
//! |--------|-----------------------------|----------------------------------|
//! | GET    | `/api/health`               | Health check                     |
//! | GET    | `/api/status`               | Year, transport, filters, range  |
//! | GET    | `/api/scene`                | Scene definition with filters    |
//! | POST   | `/api/timeline/play`        | Start animation                  |
//! | POST   | `/api/timeline/stop`        | Stop animation                   |
//! | POST   | `/api/timeline/toggle`      | Toggle animation                 |
//! | POST   | `/api/timeline/year/{n}`    | Select year n                    |

mod api;

pub use api::{ApiServer, SharedApiState, SnapshotSink, TimelineSnapshot};
