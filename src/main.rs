use anyhow::{Context, Result};
use clap::{ArgGroup, Args, Parser, Subcommand};
use mux_pricing::config::Config;
use mux_pricing::convert::to_minutes;
use mux_pricing::display::DisplayManager;
use mux_pricing::logging::init_logging;
use mux_pricing::models::{BandwidthInputs, InputParameters, Sku, Tier, Volumes};
use mux_pricing::{PricingSession, RateTable};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, error};

#[derive(Parser)]
#[command(name = "mux-pricing")]
#[command(about = "Estimate monthly video encoding, storage and streaming spend")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate monthly spend for a usage scenario
    Estimate(EstimateArgs),
    /// Convert bandwidth and library sizes into minutes
    Convert {
        /// Monthly delivery bandwidth in GB
        #[arg(long, default_value_t = 0.0)]
        bandwidth_gb: f64,
        /// Average bitrate in Mbps
        #[arg(long)]
        bitrate: f64,
        /// Stored library size in GB
        #[arg(long, default_value_t = 0.0)]
        library_gb: f64,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Show the rate table
    Tiers {
        /// Only show tiers for this SKU
        #[arg(long)]
        sku: Option<Sku>,
        /// Rate table file (TOML or JSON)
        #[arg(long)]
        rates: Option<PathBuf>,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
#[command(group = ArgGroup::new("bandwidth_input").args(["bandwidth_gb", "library_gb"]).multiple(true))]
struct EstimateArgs {
    /// Scenario file with input parameters (TOML)
    #[arg(long)]
    scenario: Option<PathBuf>,
    /// Rate table file (TOML or JSON)
    #[arg(long)]
    rates: Option<PathBuf>,

    /// Monthly VOD encoding minutes
    #[arg(long)]
    encoding: Option<f64>,
    /// Monthly live encoding minutes
    #[arg(long)]
    live_encoding: Option<f64>,
    /// Monthly storage minutes
    #[arg(long)]
    storage: Option<f64>,
    /// Monthly delivery minutes
    #[arg(long)]
    streaming: Option<f64>,

    /// Delivery bandwidth in GB (replaces minute volumes, no encoding)
    #[arg(long, requires = "bitrate", conflicts_with_all = ["encoding", "live_encoding", "storage", "streaming"])]
    bandwidth_gb: Option<f64>,
    /// Stored library size in GB (replaces minute volumes, no encoding)
    #[arg(long, requires = "bitrate", conflicts_with_all = ["encoding", "live_encoding", "storage", "streaming"])]
    library_gb: Option<f64>,
    /// Average bitrate in Mbps for bandwidth inputs
    #[arg(long, requires = "bandwidth_input")]
    bitrate: Option<f64>,

    /// Percent of content at 720p
    #[arg(long)]
    res_720p: Option<f64>,
    /// Percent of content at 1080p
    #[arg(long)]
    res_1080p: Option<f64>,
    /// Percent of content at 1440p
    #[arg(long)]
    res_1440p: Option<f64>,
    /// Percent of content at 2160p
    #[arg(long)]
    res_2160p: Option<f64>,

    /// Percent of storage that is hot
    #[arg(long)]
    hot: Option<f64>,
    /// Percent of storage that is cold
    #[arg(long)]
    cold: Option<f64>,
    /// Percent of storage that is infrequently accessed
    #[arg(long)]
    infrequent: Option<f64>,

    /// Bill encoding and storage at the baseline tier
    #[arg(long, conflicts_with = "smart")]
    baseline: bool,
    /// Bill encoding and storage at the smart tier
    #[arg(long)]
    smart: bool,

    /// Include SKUs with zero usage
    #[arg(long)]
    all: bool,
    /// Output in JSON format
    #[arg(long)]
    json: bool,
}

impl EstimateArgs {
    fn input_parameters(&self) -> Result<InputParameters> {
        let mut params = match &self.scenario {
            Some(path) => load_scenario(path)?,
            None => InputParameters::default(),
        };

        if self.bandwidth_gb.is_some() || self.library_gb.is_some() {
            let inputs = BandwidthInputs {
                bandwidth_gb: self.bandwidth_gb.unwrap_or(0.0),
                bitrate_mbps: self.bitrate.unwrap_or(0.0),
                library_gb: self.library_gb.unwrap_or(0.0),
            };
            params.volumes = Volumes::from_bandwidth(&inputs)?;
        }

        let volumes = &mut params.volumes;
        override_with(&mut volumes.encoding, self.encoding);
        override_with(&mut volumes.live_encoding, self.live_encoding);
        override_with(&mut volumes.storage, self.storage);
        override_with(&mut volumes.streaming, self.streaming);

        let mix = &mut params.resolution_mix;
        override_with(&mut mix.r720p, self.res_720p);
        override_with(&mut mix.r1080p, self.res_1080p);
        override_with(&mut mix.r1440p, self.res_1440p);
        override_with(&mut mix.r2160p, self.res_2160p);

        let storage = &mut params.storage_mix;
        override_with(&mut storage.hot, self.hot);
        override_with(&mut storage.cold, self.cold);
        override_with(&mut storage.infrequent, self.infrequent);

        if self.baseline {
            params.baseline_encoding = true;
        } else if self.smart {
            params.baseline_encoding = false;
        }

        Ok(params)
    }
}

fn override_with(field: &mut f64, value: Option<f64>) {
    if let Some(value) = value {
        *field = value;
    }
}

fn load_scenario(path: &Path) -> Result<InputParameters> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read scenario file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse scenario file: {}", path.display()))
}

fn load_rates(flag: Option<&Path>, config: &Config) -> Result<Arc<RateTable>> {
    match flag.or(config.rates.path.as_deref()) {
        Some(path) => Ok(Arc::new(RateTable::from_path(path)?)),
        None => Ok(RateTable::bundled()?),
    }
}

fn run(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Estimate(args) => {
            let display = DisplayManager::new(
                config.output.json_pretty,
                args.all || config.output.show_zero_usage,
            );
            let rates = load_rates(args.rates.as_deref(), config)?;
            let params = args.input_parameters()?;
            debug!(?params, "Resolved input parameters");

            let mut session =
                PricingSession::with_plan(rates, Box::new(config.billing_plan()));
            session.set_params(params);
            display.display_estimate(&session.estimate(), args.json)
        }
        Commands::Convert {
            bandwidth_gb,
            bitrate,
            library_gb,
            json,
        } => {
            let display = DisplayManager::new(config.output.json_pretty, false);
            let (storage, streaming) = to_minutes(bandwidth_gb, bitrate, library_gb)?;
            display.display_conversion(storage, streaming, json)
        }
        Commands::Tiers { sku, rates, json } => {
            let display = DisplayManager::new(config.output.json_pretty, false);
            let table = load_rates(rates.as_deref(), config)?;
            match sku {
                Some(sku) => {
                    let tiers: Vec<&Tier> = table.tiers(sku).iter().collect();
                    display.print_tiers(&tiers, json)
                }
                None => display.display_tiers(&table, json),
            }
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let json = match &cli.command {
        Commands::Estimate(args) => args.json,
        Commands::Convert { json, .. } | Commands::Tiers { json, .. } => *json,
    };

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => return handle_error(&e, json),
    };
    // Returning from main drops the guard, which flushes file logs on every exit path.
    let _log_guard = init_logging(&config.logging, &config.paths.log_directory);

    match run(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Command failed: {:#}", e);
            handle_error(&e, json)
        }
    }
}

fn handle_error(e: &anyhow::Error, json: bool) -> ExitCode {
    if json {
        println!("{}", serde_json::json!({ "error": format!("{:#}", e) }));
    } else {
        eprintln!("Error: {:#}", e);
    }
    ExitCode::FAILURE
}
