use crate::core::Position;
use crate::tracker::TourState;

/// A ranker enumerates the legal continuations from a cell, in the order they
/// should be pushed onto the search stack. Since the stack is LIFO, the LAST
/// move returned is the first one tried. The ordering only affects how fast a
/// tour is found, never whether one is found, so a ranker must return every
/// legal continuation exactly once.
pub trait Ranker {
    fn rank(&self, state: &TourState, from: Position) -> Vec<Position>;
}

/// Number of legal moves available from p (not counting p itself, which has
/// not been placed yet).
pub fn onward_degree(state: &TourState, p: Position) -> usize {
    state.neighbors(p).count()
}

/// Warnsdorff's rule: prefer the cell with the fewest onward moves. The
/// candidates are sorted by descending degree (stable, so ties keep offset
/// order), which puts the most constrained cell on top of the stack.
pub fn ranked_moves(state: &TourState, from: Position) -> Vec<Position> {
    let mut candidates: Vec<(usize, Position)> = state
        .neighbors(from)
        .map(|c| (onward_degree(state, c), c))
        .collect();
    candidates.sort_by(|a, b| b.0.cmp(&a.0));
    candidates.into_iter().map(|(_, c)| c).collect()
}

pub struct WarnsdorffRanker;

impl Ranker for WarnsdorffRanker {
    fn rank(&self, state: &TourState, from: Position) -> Vec<Position> {
        ranked_moves(state, from)
    }
}

/// No heuristic at all; the last offset is tried first. Useful as a baseline
/// to see how much Warnsdorff's rule actually buys.
pub struct OffsetOrderRanker;

impl Ranker for OffsetOrderRanker {
    fn rank(&self, state: &TourState, from: Position) -> Vec<Position> {
        state.neighbors(from).collect()
    }
}
