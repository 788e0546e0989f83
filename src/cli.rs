use clap::Parser;
use std::path::PathBuf;

// Build version with target info
const VERSION_INFO: &str = const_format::concatcp!(
    env!("CARGO_PKG_VERSION"), "\n",
    "Target: ", std::env::consts::ARCH, "-", std::env::consts::OS
);

/// Building construction timeline controller for 3D scene renderers
#[derive(Parser, Debug)]
#[command(author, version = VERSION_INFO, about, long_about = None)]
pub struct Args {
    /// Year shown on startup
    #[arg(short = 'y', long = "year", value_name = "YEAR")]
    pub year: Option<i32>,

    /// Timeline range (first and last year)
    #[arg(long = "range", value_names = ["MIN", "MAX"], num_args = 2)]
    pub range: Option<Vec<i32>>,

    /// Attribute holding the construction year
    #[arg(long = "field", value_name = "NAME")]
    pub field: Option<String>,

    /// Building scene service URL
    #[arg(long = "service", value_name = "URL")]
    pub service_url: Option<String>,

    /// Auto-play on startup
    #[arg(short = 'a', long = "autoplay")]
    pub autoplay: bool,

    /// Wrap to the first year after the last one (default: 1)
    #[arg(short = 'o', long = "loop", value_name = "0|1")]
    pub loop_playback: Option<u8>,

    /// Milliseconds between animation steps (default: 1000)
    #[arg(short = 'i', long = "interval", value_name = "MS")]
    pub interval_ms: Option<u64>,

    /// Exit after N animation steps (implies --autoplay)
    #[arg(short = 'n', long = "ticks", value_name = "N")]
    pub ticks: Option<u64>,

    /// Enable the REST API server
    #[arg(long = "api")]
    pub api: bool,

    /// REST API port (implies --api)
    #[arg(short = 'p', long = "port", value_name = "PORT")]
    pub port: Option<u16>,

    /// Print the scene definition as JSON and exit
    #[arg(long = "dump-scene")]
    pub dump_scene: bool,

    /// Do not stream scene updates to stdout
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,

    /// Do not read commands from stdin
    #[arg(long = "no-console")]
    pub no_console: bool,

    /// Write current settings to the config directory
    #[arg(long = "save-settings")]
    pub save_settings: bool,

    /// Enable debug logging to file (default: timetravel.log)
    #[arg(short = 'l', long = "log", value_name = "LOG_FILE")]
    pub log_file: Option<Option<PathBuf>>,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,

    /// Custom configuration directory (overrides default platform paths)
    #[arg(short = 'c', long = "config-dir", value_name = "DIR")]
    pub config_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["timetravel"]);
        assert!(args.year.is_none());
        assert!(!args.autoplay);
        assert!(args.log_file.is_none());
        assert_eq!(args.verbosity, 0);
    }

    #[test]
    fn test_flags() {
        let args = Args::parse_from(["timetravel", "-a", "-vv", "-n", "12", "--log", "-q"]);
        assert!(args.autoplay);
        assert_eq!(args.verbosity, 2);
        assert_eq!(args.ticks, Some(12));
        assert_eq!(args.log_file, Some(None));
        assert!(args.quiet);
    }

    #[test]
    fn test_range_needs_two_values() {
        assert!(Args::try_parse_from(["timetravel", "--range", "1900"]).is_err());
        let args = Args::parse_from(["timetravel", "--range", "1900", "1950"]);
        assert_eq!(args.range, Some(vec![1900, 1950]));
    }
}
