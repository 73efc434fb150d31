use crate::core::{Board, Leaper, Position};
use crate::tracker::TourState;

/// The first thing wrong with a candidate tour. Indices are into the moves
/// slice that was checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathViolation {
    WrongLength { expected: usize, actual: usize },
    OutOfBounds(usize),
    Repeated(usize),
    IllegalJump(usize),
}

/// Checks that moves visits every cell of the board exactly once, with each
/// move after the first being a legal jump of the leaper from the one before.
pub fn check_path(board: &Board, leaper: &Leaper, moves: &[Position]) -> Result<(), PathViolation> {
    if moves.len() != board.size() {
        return Err(PathViolation::WrongLength { expected: board.size(), actual: moves.len() });
    }
    let mut state = TourState::new(*board, leaper.clone());
    for (i, m) in moves.iter().enumerate() {
        if !state.inside(*m) {
            return Err(PathViolation::OutOfBounds(i));
        }
        if i > 0 && !leaper.connects(moves[i - 1], *m) {
            return Err(PathViolation::IllegalJump(i));
        }
        if !state.apply(*m) {
            return Err(PathViolation::Repeated(i));
        }
    }
    Ok(())
}

pub fn validate(board: &Board, leaper: &Leaper, moves: &[Position]) -> bool {
    check_path(board, leaper, moves).is_ok()
}
