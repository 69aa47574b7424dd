use anyhow::{bail, Context, Result};
use clap::Parser;
use jet_lag_locator::{Analyzer, AnalyzerConfig, MatchKind, Status};
use std::path::{Path, PathBuf};

mod network;
mod report;
mod track;

use network::read_network;
use report::{ReplaySummary, ReportLine, ReportWriter};
use track::read_track;

#[derive(Parser, Debug)]
#[command(
    name = "track-replay",
    author,
    version,
    about = "Replay a recorded track against a transit network",
    long_about = "Feeds every fix of a recorded GeoJSON track into the locator and logs \
                  the resulting status.\n\n\
                  The network is a GeoJSON FeatureCollection where Point features are \
                  stops and LineString/MultiLineString features are routes, one chain \
                  per line string, ordered in travel direction."
)]
struct Args {
    /// Network GeoJSON file (stops and routes)
    #[arg(short, long)]
    network: PathBuf,

    /// Track GeoJSON file (Point features in recording order)
    #[arg(short, long)]
    track: PathBuf,

    /// Analyzer configuration as JSON
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write one JSON object per fix to this file
    #[arg(short, long)]
    report: Option<PathBuf>,

    /// Override the speed (m/s) below which route guesses need a tight fix
    #[arg(long)]
    speed_cutoff: Option<f64>,

    /// Override the candidate search radius in meters
    #[arg(long)]
    search_radius: Option<f64>,

    /// Verbose output (show debug messages)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if args.verbose { "debug" } else { "info" }),
    )
    .format_timestamp(None)
    .init();

    log::info!("=== Track Replay ===");
    log::info!("Network: {}", args.network.display());
    log::info!("Track: {}", args.track.display());

    let config = load_config(&args)?;
    let pois = read_network(&args.network)?;
    let fixes = read_track(&args.track)?;

    if fixes.is_empty() {
        bail!("Track contains no fixes: {}", args.track.display());
    }

    let stops = pois.iter().filter(|poi| poi.is_stop()).count();
    log::info!("Loaded {} stops, {} routes", stops, pois.len() - stops);
    log::info!("Loaded {} fixes", fixes.len());

    let mut analyzer = Analyzer::with_pois(config, pois).context("Invalid analyzer configuration")?;
    let mut writer = args.report.as_deref().map(ReportWriter::create).transpose()?;
    let mut summary = ReplaySummary::default();

    log::info!("");
    for (index, position) in fixes.into_iter().enumerate() {
        let previous = analyzer.status().kind();
        let skipped = !position.is_valid();
        let status = analyzer.update_position(position);

        summary.record(previous, status, skipped);
        if skipped {
            continue;
        }
        log_status(index, status);

        if let (Some(writer), Some(result)) = (writer.as_mut(), status.result()) {
            writer.write(&ReportLine::new(index, result))?;
        }
    }

    if let Some(writer) = writer {
        writer.finish()?;
    }

    log::info!("");
    summary.log_summary();
    if let Some(report) = &args.report {
        log::info!("");
        log::info!("Report written to: {}", report.display());
    }
    log::info!("Done!");

    Ok(())
}

/// Defaults, then the config file, then command-line overrides
fn load_config(args: &Args) -> Result<AnalyzerConfig> {
    let mut config = match &args.config {
        Some(path) => read_config(path)?,
        None => AnalyzerConfig::default(),
    };

    if let Some(cutoff) = args.speed_cutoff {
        config = config.with_on_route_speed_cutoff(cutoff);
    }
    if let Some(radius) = args.search_radius {
        config = config.with_search_radius(radius);
    }
    Ok(config)
}

fn read_config(path: &Path) -> Result<AnalyzerConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid config in: {}", path.display()))
}

fn log_status(index: usize, status: &Status) {
    let Some(result) = status.result() else {
        return;
    };

    let names: Vec<_> = result
        .guesses
        .iter()
        .map(|guess| format!("{} ({:.0} m)", guess.poi.name(), guess.distance))
        .collect();

    match result.kind {
        MatchKind::Unknown => log::info!(
            "#{index}: {} ({} platforms nearby)",
            result.kind.as_str(),
            result.nearby_platforms.len()
        ),
        _ => log::info!("#{index}: {} -> {}", result.kind.as_str(), names.join(", ")),
    }

    for platform in &result.nearby_platforms {
        log::debug!("  platform {} at {:.1} m", platform.poi.name(), platform.distance);
    }
}
