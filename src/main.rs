use chrono::Duration;
use clap::Parser;
use ip_tracker::config::Settings;
use ip_tracker::location::{LocationError, LocationRecord, OptionalFields};
use ip_tracker::{logging, server};
use log::LevelFilter;
use std::io::{Read, Write};
use std::path::PathBuf;

/// iptrack: validate IP geolocation payloads for map renderers.
///
/// Reads a geolocation provider's JSON response, checks it against the
/// location record contract, prints a summary to stderr and the normalized
/// record to stdout.
///
/// Examples:
///   iptrack lookup.json
///   curl -s "$PROVIDER_URL" | iptrack
///   iptrack --strict lookup.json
///   iptrack --cached 8.8.8.8
///   iptrack --latest
///   iptrack --serve --port 3030
#[derive(Parser)]
#[command(name = "iptrack", version, about, long_about = None)]
struct Cli {
    /// Payload file. Reads stdin when absent or "-".
    #[arg(index = 1)]
    input: Option<PathBuf>,

    /// Treat a missing postalCode or region as malformed.
    #[arg(long)]
    strict: bool,

    /// Don't store the validated record in the cache.
    #[arg(long)]
    no_cache: bool,

    /// Print the cached record for this IP instead of reading a payload.
    #[arg(long, value_name = "IP")]
    cached: Option<String>,

    /// Print the most recently cached record.
    #[arg(long, conflicts_with = "cached")]
    latest: bool,

    /// Cache file location. Defaults to ~/.iptrack/cache.json.
    #[arg(long, value_name = "PATH")]
    cache_file: Option<PathBuf>,

    /// How long cached records stay valid.
    #[arg(long, value_name = "N")]
    cache_ttl_hours: Option<u32>,

    /// Run the HTTP API instead of validating a single payload.
    #[arg(long)]
    serve: bool,

    /// Server bind host.
    #[arg(long, default_value = ip_tracker::config::DEFAULT_HOST)]
    host: String,

    /// Server port.
    #[arg(long, default_value_t = ip_tracker::config::DEFAULT_PORT)]
    port: u16,

    /// Log level: off, error, warn, info, debug, trace.
    #[arg(long, default_value_t = ip_tracker::config::DEFAULT_LOG_LEVEL, value_parser = logging::parse_level)]
    log_level: LevelFilter,
}

impl Cli {
    fn settings(&self) -> Settings {
        let defaults = Settings::default();
        Settings {
            cache_path: self.cache_file.clone().unwrap_or(defaults.cache_path),
            cache_ttl: self
                .cache_ttl_hours
                .map(|h| Duration::hours(i64::from(h)))
                .unwrap_or(defaults.cache_ttl),
            optional_fields: if self.strict {
                OptionalFields::Required
            } else {
                OptionalFields::EmptyWhenAbsent
            },
            host: self.host.clone(),
            port: self.port,
            log_level: self.log_level,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let settings = cli.settings();

    if let Err(e) = logging::init_logger(settings.log_level) {
        eprintln!("Warning: logger not initialized: {}", e);
    }

    if let Err(e) = run(&cli, &settings) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli, settings: &Settings) -> Result<(), LocationError> {
    if cli.serve {
        let runtime = tokio::runtime::Runtime::new()?;
        return runtime.block_on(server::start(settings));
    }

    let record = if let Some(ref ip) = cli.cached {
        settings
            .open_cache()
            .get(ip)
            .ok_or_else(|| LocationError::NotFound(ip.clone()))?
    } else if cli.latest {
        settings
            .open_cache()
            .most_recent()
            .ok_or_else(|| LocationError::NotFound("latest".into()))?
    } else {
        let payload = read_input(cli.input.as_ref())?;
        let record = LocationRecord::from_json_with(&payload, &settings.parse_options())?;
        if !cli.no_cache {
            settings.open_cache().put(&record);
        }
        record
    };

    // ── Summary to stderr, record to stdout ─────────────────────

    eprintln!("  {}", record.display_line());

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, &record).map_err(std::io::Error::from)?;
    writeln!(out)?;
    Ok(())
}

fn read_input(path: Option<&PathBuf>) -> Result<String, LocationError> {
    match path {
        Some(p) if p.as_os_str() != "-" => Ok(std::fs::read_to_string(p)?),
        _ => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}
