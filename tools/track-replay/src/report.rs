use anyhow::{Context, Result};
use jet_lag_locator::{ClassificationResult, MatchKind, NearestRecord, Status};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// One line of the JSONL report
#[derive(Debug, Serialize)]
pub struct ReportLine {
    pub index: usize,
    pub kind: MatchKind,
    pub latitude: f64,
    pub longitude: f64,
    pub guesses: Vec<ReportEntry>,
    pub nearby_platforms: Vec<ReportEntry>,
}

#[derive(Debug, Serialize)]
pub struct ReportEntry {
    pub id: String,
    pub name: String,
    pub distance_m: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<usize>,
}

impl From<&NearestRecord> for ReportEntry {
    fn from(record: &NearestRecord) -> Self {
        Self {
            id: record.id().to_string(),
            name: record.poi.name().to_string(),
            distance_m: record.distance,
            chain: record.route_section.map(|s| s.chain),
            section: record.route_section.map(|s| s.section),
        }
    }
}

impl ReportLine {
    pub fn new(index: usize, result: &ClassificationResult) -> Self {
        Self {
            index,
            kind: result.kind,
            latitude: result.position.latitude,
            longitude: result.position.longitude,
            guesses: result.guesses.iter().map(ReportEntry::from).collect(),
            nearby_platforms: result.nearby_platforms.iter().map(ReportEntry::from).collect(),
        }
    }
}

/// Writes one JSON object per line
pub struct ReportWriter {
    out: BufWriter<File>,
}

impl ReportWriter {
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create report file: {}", path.display()))?;
        Ok(Self {
            out: BufWriter::new(file),
        })
    }

    pub fn write(&mut self, line: &ReportLine) -> Result<()> {
        serde_json::to_writer(&mut self.out, line).context("Failed to serialize report line")?;
        self.out.write_all(b"\n")?;
        Ok(())
    }

    pub fn finish(mut self) -> Result<()> {
        self.out.flush().context("Failed to flush report file")
    }
}

/// Counts of how each replayed fix was classified
#[derive(Debug, Default)]
pub struct ReplaySummary {
    pub fixes: usize,
    pub skipped: usize,
    pub unknown: usize,
    pub stop_matches: usize,
    pub route_matches: usize,
    pub kind_changes: usize,
}

impl ReplaySummary {
    /// Record the status produced by one fix. `previous` is the kind before it.
    pub fn record(&mut self, previous: MatchKind, status: &Status, skipped: bool) {
        self.fixes += 1;
        if skipped {
            self.skipped += 1;
            return;
        }

        match status.kind() {
            MatchKind::Unknown => self.unknown += 1,
            MatchKind::StopMatch => self.stop_matches += 1,
            MatchKind::RouteMatch => self.route_matches += 1,
        }
        if status.kind() != previous {
            self.kind_changes += 1;
        }
    }

    pub fn log_summary(&self) {
        log::info!("=== Replay Statistics ===");
        log::info!("Fixes: {}", self.fixes);
        log::info!("Unknown: {}", self.unknown);
        log::info!("Stop matches: {}", self.stop_matches);
        log::info!("Route matches: {}", self.route_matches);
        log::info!("Kind changes: {}", self.kind_changes);
        if self.skipped > 0 {
            log::warn!("Invalid fixes skipped: {}", self.skipped);
        }
    }
}
