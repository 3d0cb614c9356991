use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use solalendar_core::{
    logging, AnalysisContext, BirthRecord, CivilDateTime, EngineConfig, FateEngine, Location,
};

/// Decode a six-layer fate profile for a birth date, time and place.
#[derive(Parser, Debug)]
#[command(name = "solalendar", version)]
struct Cli {
    name: String,
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,

    /// Birth latitude in degrees; defaults to the configured location.
    #[arg(long, allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Birth longitude in degrees; defaults to the configured location.
    #[arg(long, allow_hyphen_values = true)]
    lng: Option<f64>,

    /// IANA timezone of the civil time, e.g. Asia/Tokyo.
    #[arg(long)]
    tz: Option<String>,

    /// Year the age is evaluated in; defaults to the current year.
    #[arg(long)]
    current_year: Option<i32>,

    /// Engine config (TOML). Falls back to $SOLALENDAR_CONFIG.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print single-line JSON.
    #[arg(long)]
    compact: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_tracing().context("initialising logging")?;

    let config = EngineConfig::load(cli.config.as_deref()).context("loading engine config")?;
    let birth = birth_record(&cli, &config)?;

    let context = cli
        .current_year
        .map(AnalysisContext::for_year)
        .unwrap_or_else(AnalysisContext::now);

    let engine = FateEngine::analytic(config);
    let profile = engine.analyze(&birth, &context).context("analysis failed")?;

    let json = if cli.compact {
        serde_json::to_string(&profile)?
    } else {
        serde_json::to_string_pretty(&profile)?
    };
    println!("{json}");
    Ok(())
}

/// Coordinates and zone not given on the command line come from `config`.
fn birth_record(cli: &Cli, config: &EngineConfig) -> anyhow::Result<BirthRecord> {
    let defaults = config.location.location();
    let location = Location::new(
        cli.lat.unwrap_or(defaults.latitude),
        cli.lng.unwrap_or(defaults.longitude),
    );
    let timezone = cli.tz.as_deref().unwrap_or(&config.location.timezone);

    let civil = CivilDateTime::new(cli.year, cli.month, cli.day, cli.hour, cli.minute);
    BirthRecord::new(cli.name.as_str(), civil, location, timezone)
        .with_context(|| format!("invalid birth record for {}", cli.name))
}
