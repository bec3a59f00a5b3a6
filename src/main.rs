use chrono_tz::Tz;
use clap::Parser;
use iss_flyover::config::{Config, ConfigError};
use iss_flyover::flyover::{Coordinates, FetchError, FlyoverReport, FlyoverResolver};
use iss_flyover::{logging, report, server};
use log::LevelFilter;
use std::path::PathBuf;

/// ISS Flyover — when will the space station pass over you next?
///
/// Looks up your public IP, geolocates it, and asks open-notify for the
/// upcoming overhead passes.
///
/// Examples:
///   iss-flyover
///   iss-flyover --tz Europe/Stockholm
///   iss-flyover --ip 8.8.8.8 --passes 3
///   iss-flyover --lat 59.33 --lon 18.07 --json
///   iss-flyover --serve --port 8080
#[derive(Parser)]
#[command(name = "iss-flyover", version, about, long_about = None)]
struct Cli {
    /// Skip the IP lookup and geolocate this address instead.
    #[arg(long)]
    ip: Option<String>,

    /// Latitude (-90 to 90). Skips the IP and geo lookups; requires --lon.
    #[arg(long, allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Longitude (-180 to 180). Requires --lat.
    #[arg(long, allow_hyphen_values = true)]
    lon: Option<f64>,

    /// Number of passes to request (1-100).
    #[arg(long, short = 'n')]
    passes: Option<u32>,

    /// Per-request timeout in seconds.
    #[arg(long)]
    timeout: Option<u64>,

    /// Config file. Defaults to ~/.iss-flyover/config.json.
    #[arg(long)]
    config: Option<PathBuf>,

    /// IANA timezone for printed times (e.g. Europe/Oslo). Defaults to UTC.
    #[arg(long)]
    tz: Option<String>,

    /// Print the full report as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Log level (error, warn, info, debug, trace). Overrides RUST_LOG.
    #[arg(long)]
    log_level: Option<LevelFilter>,

    /// Run the HTTP API instead of printing passes.
    #[arg(long)]
    serve: bool,

    /// Address to bind in --serve mode.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to bind in --serve mode.
    #[arg(long, default_value_t = 3000)]
    port: u16,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.log_level) {
        eprintln!("Warning: logger already initialized: {}", e);
    }

    let config = load_config(&cli).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    let resolver = FlyoverResolver::new(&config);

    if cli.serve {
        if let Err(e) = server::start(&cli.host, cli.port, resolver).await {
            eprintln!("Error: Cannot serve on {}:{}: {}", cli.host, cli.port, e);
            std::process::exit(1);
        }
        return;
    }

    let tz: Option<Tz> = cli.tz.as_deref().map(|s| {
        s.parse().unwrap_or_else(|_| {
            eprintln!("Error: Unknown timezone '{}'. Use IANA format (e.g. Europe/Oslo).", s);
            std::process::exit(1);
        })
    });

    let start = match starting_point(&cli) {
        Ok(start) => start,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            std::process::exit(1);
        }
    };

    let flyovers = run_chain(&resolver, start).await.unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    if cli.json {
        match serde_json::to_string_pretty(&flyovers) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    eprintln!("  {}", report::location_line(&flyovers));
    if flyovers.passes.is_empty() {
        println!("No upcoming passes.");
    } else {
        println!("{}", report::render_passes(&flyovers.passes, tz));
    }
}

/// File settings first, then CLI overrides, then validation.
fn load_config(cli: &Cli) -> Result<Config, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(timeout) = cli.timeout {
        config.timeout_secs = timeout;
    }
    if let Some(passes) = cli.passes {
        config.passes = Some(passes);
    }
    config.validate()?;
    Ok(config)
}

enum Start {
    MyLocation,
    Ip(String),
    Coords(Coordinates),
}

fn starting_point(cli: &Cli) -> Result<Start, String> {
    // Priority: --lat/--lon > --ip > own IP
    match (cli.lat, cli.lon) {
        (Some(lat), Some(lon)) => {
            let coords = Coordinates::new(lat, lon);
            if !coords.is_valid() {
                return Err("Invalid coordinates. Lat: -90..90, Lon: -180..180".into());
            }
            Ok(Start::Coords(coords))
        }
        (None, None) => match &cli.ip {
            Some(ip) => Ok(Start::Ip(ip.clone())),
            None => Ok(Start::MyLocation),
        },
        _ => Err("--lat and --lon must be given together".into()),
    }
}

async fn run_chain(resolver: &FlyoverResolver, start: Start) -> Result<FlyoverReport, FetchError> {
    match start {
        Start::MyLocation => resolver.report_for_my_location().await,
        Start::Ip(ip) => resolver.report_for_ip(&ip).await,
        Start::Coords(coords) => resolver.report_for_coords(coords).await,
    }
}
