use crate::shared_data::{DensityScore, LaneId, SignalState};
use std::cmp::Ordering;

/// Lanes ordered by score, highest first.
///
/// `scores` must be in canonical lane order. The sort is stable, so lanes with
/// equal scores keep that order and the earlier lane ranks higher.
pub fn ranking(scores: &[(LaneId, DensityScore)]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| compare_desc(scores[a].1, scores[b].1));
    order
}

fn compare_desc(a: DensityScore, b: DensityScore) -> Ordering {
    b.value().total_cmp(&a.value())
}

/// Signal state for the lane at `rank` (0 = busiest).
pub fn signal_for_rank(rank: usize) -> SignalState {
    match rank {
        0 => SignalState::Green,
        1 => SignalState::Orange,
        _ => SignalState::Red,
    }
}

/// Assigns GREEN to the busiest lane, ORANGE to the runner-up and RED to the rest.
///
/// The output keeps the input (canonical) order. An empty input gives an
/// empty output.
pub fn allocate(scores: &[(LaneId, DensityScore)]) -> Vec<(LaneId, SignalState)> {
    let mut signals = vec![SignalState::Red; scores.len()];
    for (rank, index) in ranking(scores).into_iter().enumerate() {
        signals[index] = signal_for_rank(rank);
    }
    scores
        .iter()
        .zip(signals)
        .map(|((lane, _), signal)| (lane.clone(), signal))
        .collect()
}
