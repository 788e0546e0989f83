use timetravel::cli::Args;
use timetravel::config::{AppSettings, SETTINGS_FILE};
use timetravel::core::{JsonLinesSink, LogSink, TimelineController};
use timetravel::paths::{self, PathConfig};
use timetravel::runner::TimelineRunner;
use timetravel::scene::SceneDefinition;
use timetravel::server::{ApiServer, SharedApiState, SnapshotSink, TimelineSnapshot};
use timetravel::shell;

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};
use std::io::IsTerminal;
use std::sync::Arc;

fn init_logger(args: &Args, path_config: &PathConfig) -> Result<()> {
    // 0 (default) = warn, 1 (-v) = info, 2 (-vv) = debug, 3+ (-vvv) = trace
    let log_level = match args.verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    if let Some(log_path_opt) = &args.log_file {
        // File logging with specified verbosity level
        let log_path = log_path_opt
            .as_ref()
            .cloned()
            .unwrap_or_else(|| paths::data_file("timetravel.log", path_config));

        let file = std::fs::File::create(&log_path)
            .with_context(|| format!("Failed to create log file: {}", log_path.display()))?;

        env_logger::Builder::new()
            .filter_level(log_level)
            .format_timestamp_millis()
            .target(env_logger::Target::Pipe(Box::new(file)))
            .init();

        info!("Logging to file: {} (level: {:?})", log_path.display(), log_level);
    } else {
        // Console logging on stderr (respects RUST_LOG if set); stdout carries the update stream
        let default_level = match args.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };

        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
            .format_timestamp_millis()
            .init();
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let path_config = PathConfig::from_env_and_cli(args.config_dir.clone());
    if let Err(e) = paths::ensure_dirs(&path_config) {
        eprintln!("Warning: Failed to create application directories: {}", e);
    }

    init_logger(&args, &path_config)?;
    info!("timetravel {} starting...", env!("CARGO_PKG_VERSION"));
    debug!("Command-line args: {:?}", args);

    let settings_path = paths::config_file(SETTINGS_FILE, &path_config);
    info!("Config path: {}", settings_path.display());
    let mut settings = AppSettings::load(&settings_path)?;
    settings.apply_args(&args);
    if args.save_settings {
        settings.save(&settings_path)?;
    }

    let timeline = settings
        .timeline_settings()
        .context("Invalid timeline settings, timeline not started")?;
    let scene = SceneDefinition::from_settings(&settings);

    if args.dump_scene {
        println!("{}", scene.to_json_pretty()?);
        return Ok(());
    }

    let state = Arc::new(SharedApiState::new(
        TimelineSnapshot::new(timeline.start_year, timeline.range),
        scene,
    ));
    let (tx, rx) = crossbeam_channel::unbounded();

    if settings.api_server_enabled {
        ApiServer::start(settings.api_server_port, Arc::clone(&state), tx.clone())?;
    }
    if !args.no_console {
        let quit_on_eof = shell::quit_on_eof(
            std::io::stdin().is_terminal(),
            settings.api_server_enabled,
            args.ticks.is_some(),
        );
        let _console = shell::spawn_console(tx.clone(), Arc::clone(&state), quit_on_eof)?;
    }

    let stream = || (!args.quiet).then(|| JsonLinesSink::new(std::io::stdout()));
    let filters = (LogSink, (SnapshotSink::new(Arc::clone(&state)), stream()));
    let display = (LogSink, (SnapshotSink::new(Arc::clone(&state)), stream()));

    let mut controller = TimelineController::new(timeline, filters, display)?;
    controller.activate();
    if args.autoplay || args.ticks.is_some() {
        controller.start_animation();
    }

    let mut runner = TimelineRunner::new(controller, settings.tick_interval(), rx).with_max_ticks(args.ticks);
    let exit = runner.run();
    drop(tx);

    info!("Exit: {:?} at year {}", exit, runner.controller().current_year());
    Ok(())
}
