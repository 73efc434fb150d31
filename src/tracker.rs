use std::fmt::Debug;
use bit_set::BitSet;
use crate::core::{Board, Leaper, Position};

/// The state of a (partial) tour: which cells have been visited and in what
/// order. The visited set and the path are always mutated together, so a cell
/// is visited iff it is somewhere in the path.
#[derive(Clone)]
pub struct TourState {
    board: Board,
    leaper: Leaper,
    visited: BitSet,
    path: Vec<Position>,
}

impl TourState {
    pub fn new(board: Board, leaper: Leaper) -> Self {
        Self {
            board,
            leaper,
            visited: BitSet::with_capacity(board.size()),
            path: Vec::with_capacity(board.size()),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn leaper(&self) -> &Leaper {
        &self.leaper
    }

    pub fn board_size(&self) -> usize {
        self.board.size()
    }

    pub fn inside(&self, p: Position) -> bool {
        self.board.inside(p)
    }

    pub fn cell_index(&self, p: Position) -> usize {
        self.board.cell_index(p)
    }

    pub fn is_visited(&self, p: Position) -> bool {
        self.inside(p) && self.visited.contains(self.cell_index(p))
    }

    /// The only legality check for putting the piece on a cell.
    pub fn can_jump(&self, p: Position) -> bool {
        self.inside(p) && !self.visited.contains(self.cell_index(p))
    }

    /// Extends the path with p. Returns false (and changes nothing) if p is
    /// off the board or already visited.
    pub fn apply(&mut self, p: Position) -> bool {
        if !self.can_jump(p) {
            return false;
        }
        self.visited.insert(self.board.cell_index(p));
        self.path.push(p);
        true
    }

    /// Truncates the path to length k, unvisiting everything that was cut.
    pub fn undo_to(&mut self, k: usize) {
        assert!(k <= self.path.len(), "Can't undo to length {} of a path of length {}", k, self.path.len());
        for p in self.path.drain(k..) {
            self.visited.remove(self.board.cell_index(p));
        }
    }

    pub fn reset(&mut self) {
        self.visited.clear();
        self.path.clear();
    }

    pub fn path(&self) -> &[Position] {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    pub fn last(&self) -> Option<Position> {
        self.path.last().copied()
    }

    pub fn is_complete(&self) -> bool {
        self.path.len() == self.board.size()
    }

    /// Cells reachable from p in one jump that are still legal, in offset
    /// order.
    pub fn neighbors(&self, p: Position) -> impl Iterator<Item = Position> + '_ {
        self.leaper.offsets()
            .iter()
            .filter_map(move |d| p.move_by(*d))
            .filter(|n| self.can_jump(*n))
    }

    /// Move number (0-based) of the piece's visit to each cell, if visited.
    pub fn move_numbers(&self) -> Vec<Option<usize>> {
        let mut numbers = vec![None; self.board.size()];
        for (i, p) in self.path.iter().enumerate() {
            numbers[self.board.cell_index(*p)] = Some(i);
        }
        numbers
    }
}

impl Debug for TourState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let numbers = self.move_numbers();
        let digits = self.board.size().to_string().len();
        for y in 0..self.board.height() {
            for x in 0..self.board.width() {
                if x > 0 {
                    write!(f, " ")?;
                }
                match numbers[self.board.cell_index(Position::new(x, y))] {
                    Some(n) => write!(f, "{:>width$}", n + 1, width = digits)?,
                    None => write!(f, "{:>width$}", ".", width = digits)?,
                }
            }
            write!(f, "\n")?;
        }
        Ok(())
    }
}
