//! One-step memory layered on top of the state machine.
//!
//! When a POI guessed in the previous result is still a candidate and lies
//! within the fix's accuracy of the best fresh guess, it keeps the guess even
//! if a fresh classification would pick a slightly closer neighbour. This
//! suppresses flicker between near-equidistant POIs.

use std::collections::HashSet;

use crate::spatial::{by_proximity, NearestRecord};

/// Guesses to publish given the previous result's guesses, the current
/// eligible candidates and the freshly proposed guesses.
///
/// A re-seen candidate is kept only when its distance is at most `accuracy`
/// beyond the closest proposed guess, or at most `accuracy` when nothing was
/// proposed.
pub fn stabilize(
    previous_guesses: &[NearestRecord],
    candidates: &[NearestRecord],
    proposed: Vec<NearestRecord>,
    accuracy: f64,
) -> Vec<NearestRecord> {
    let previous: HashSet<_> = previous_guesses.iter().map(NearestRecord::id).collect();
    let reach = proposed
        .iter()
        .map(|guess| guess.distance)
        .min_by(f64::total_cmp)
        .unwrap_or(0.0)
        + accuracy;

    let mut reseen: Vec<NearestRecord> = candidates
        .iter()
        .filter(|candidate| previous.contains(candidate.id()))
        .filter(|candidate| candidate.distance <= reach)
        .cloned()
        .collect();

    if reseen.is_empty() {
        return proposed;
    }

    reseen.sort_by(by_proximity);
    reseen
}
