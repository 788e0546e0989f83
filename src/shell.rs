//! Console control: line commands on stdin.
//!
//! ```text
//! play | p          start the animation
//! stop | s          stop the animation
//! toggle | t        play/stop
//! year N | y N | N  select year N
//! status            print the current year and transport
//! help | ?          list commands
//! quit | q | exit   end the program
//! ```
//!
//! The reader runs on its own thread and only sends [`TimelineEvent`]s;
//! state for `status` comes from the shared API snapshot.

use std::io::BufRead;
use std::sync::Arc;
use std::thread;

use crossbeam_channel::Sender;
use log::{debug, warn};

use crate::core::timeline_events::TimelineEvent;
use crate::server::SharedApiState;

pub const HELP: &str = "commands: play, stop, toggle, year N, status, help, quit";

/// Parsed console line
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Event(TimelineEvent),
    Status,
    Help,
    Empty,
}

/// Parse one console line. Unknown commands are returned as `Err` with a
/// message for the user.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(Command::Empty);
    };
    let arg = words.next();
    if words.next().is_some() {
        return Err(format!("too many arguments: {}", line.trim()));
    }

    let event = match (head.to_ascii_lowercase().as_str(), arg) {
        ("play" | "p", None) => TimelineEvent::PlayRequested,
        ("stop" | "s", None) => TimelineEvent::StopRequested,
        ("toggle" | "t", None) => TimelineEvent::ToggleRequested,
        ("quit" | "q" | "exit", None) => TimelineEvent::Shutdown,
        ("year" | "y", Some(value)) => TimelineEvent::YearEntered(value.to_string()),
        ("year" | "y", None) => return Err("usage: year N".to_string()),
        ("status", None) => return Ok(Command::Status),
        ("help" | "?", None) => return Ok(Command::Help),
        (_, None) if head.starts_with(|c: char| c.is_ascii_digit()) => TimelineEvent::YearEntered(head.to_string()),
        _ => return Err(format!("unknown command: {} ({})", line.trim(), HELP)),
    };
    Ok(Command::Event(event))
}

/// Whether end of console input should end the program.
///
/// Only an interactive session without other control (REST API) or a tick
/// budget is ended by EOF. Redirected or closed stdin (`< /dev/null`, cron,
/// a pipe) leaves the timeline running.
pub fn quit_on_eof(stdin_is_terminal: bool, api_enabled: bool, tick_budget: bool) -> bool {
    stdin_is_terminal && !api_enabled && !tick_budget
}

/// Read commands from stdin on a background thread.
///
/// With `shutdown_on_eof`, end of input ends the program as `quit` would.
pub fn spawn_console(
    tx: Sender<TimelineEvent>,
    state: Arc<SharedApiState>,
    shutdown_on_eof: bool,
) -> std::io::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("timetravel-console".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        warn!("Console read failed: {}", e);
                        break;
                    }
                };
                match parse_command(&line) {
                    Ok(Command::Event(event)) => {
                        let quit = event == TimelineEvent::Shutdown;
                        if tx.send(event).is_err() || quit {
                            return;
                        }
                    }
                    Ok(Command::Status) => {
                        let t = state.timeline();
                        eprintln!("year {} [{:?}] range {}..={}", t.year, t.state, t.range_min, t.range_max);
                    }
                    Ok(Command::Help) => eprintln!("{}", HELP),
                    Ok(Command::Empty) => {}
                    Err(msg) => eprintln!("{}", msg),
                }
            }
            debug!("Console input closed");
            if shutdown_on_eof {
                let _ = tx.send(TimelineEvent::Shutdown);
            }
        })
}
