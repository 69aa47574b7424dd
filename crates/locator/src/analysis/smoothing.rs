//! Trailing averages of per-POI distances across recent snapshots.

use std::sync::Arc;

use crate::analysis::history::BoundedHistory;
use crate::spatial::NearestRecord;

/// Raw nearest-POI records observed at one position
pub type Snapshot = Arc<[NearestRecord]>;

/// Averaged distances closer than this are treated as equal
pub const TIE_TOLERANCE_M: f64 = 1e-9;

#[derive(Clone, Debug, PartialEq)]
pub struct AveragedRecord {
    pub record: NearestRecord,
    pub averaged_distance: f64,
}

/// Mean of the current distance and the distances of the same POI in the
/// `window - 1` most recent snapshots. A snapshot that did not see the POI
/// contributes the current distance instead.
pub fn averaged_distance(
    record: &NearestRecord,
    snapshots: &BoundedHistory<Snapshot>,
    window: usize,
) -> f64 {
    let samples = window.max(1);
    let current = record.distance;

    let preceding: f64 = (0..samples - 1)
        .map(|n| {
            snapshots
                .recent(n)
                .and_then(|snapshot| snapshot.iter().find(|seen| seen.id() == record.id()))
                .map_or(current, |seen| seen.distance)
        })
        .sum();

    (current + preceding) / samples as f64
}

/// The records sharing the minimal averaged distance, in input order
pub fn closest_by_average<I>(
    records: I,
    snapshots: &BoundedHistory<Snapshot>,
    window: usize,
) -> Vec<AveragedRecord>
where
    I: IntoIterator<Item = NearestRecord>,
{
    let averaged: Vec<AveragedRecord> = records
        .into_iter()
        .map(|record| AveragedRecord {
            averaged_distance: averaged_distance(&record, snapshots, window),
            record,
        })
        .collect();

    let Some(min) = averaged
        .iter()
        .map(|candidate| candidate.averaged_distance)
        .min_by(f64::total_cmp)
    else {
        return Vec::new();
    };

    averaged
        .into_iter()
        .filter(|candidate| candidate.averaged_distance - min <= TIE_TOLERANCE_M)
        .collect()
}
