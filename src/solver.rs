use std::fmt::Debug;
use crate::core::{Board, Error, Leaper, Position};
use crate::ranker::{Ranker, WarnsdorffRanker};
use crate::tracker::TourState;

/// A move waiting on the search stack. The depth is the length the path must
/// have (after undoing anything past it) for this move to extend it.
#[derive(Debug, PartialEq, Clone, Copy, Eq)]
pub struct PendingMove {
    pub depth: usize,
    pub pos: Position,
}

#[derive(Debug, PartialEq, Clone, Copy, Eq)]
pub struct AdvancingState {
    // Number of uninterrupted advancing steps.
    pub streak: usize,
    // The number of candidate moves pushed after this advance.
    pub possibilities: usize,
    // The step at which this advance was taken.
    pub step: usize,
}

#[derive(Debug, PartialEq, Clone, Copy, Eq)]
pub struct BacktrackingState {
    // Number of uninterrupted backtracking steps.
    pub streak: usize,
}

/// The state of the DFS solver. Before the first step it is initializing;
/// after that it is either advancing (the last popped move extended the
/// path), backtracking (the last popped move was rejected), solved (the path
/// covers the board), or exhausted (the stack ran dry).
#[derive(Debug, PartialEq, Clone, Copy, Eq)]
pub enum DfsSolverState {
    Initializing,
    Advancing(AdvancingState),
    Backtracking(BacktrackingState),
    Solved,
    Exhausted,
}

// A view on the state and associated data for the solver.
pub trait DfsSolverView {
    fn step_count(&self) -> usize;
    fn solver_state(&self) -> DfsSolverState;
    fn is_done(&self) -> bool;
    fn is_solved(&self) -> bool;
    fn most_recent_move(&self) -> Option<PendingMove>;
    // How many moves had to be undone before the most recent move was tried.
    fn undone_moves(&self) -> Option<usize>;
    fn pending(&self) -> &[PendingMove];
    fn get_state(&self) -> &TourState;
}

// Mostly for debugging purposes, a StepObserver allows the caller of the
// solver to dump or otherwise inspect the state of the search after each
// step without having to drive DfsSolver by hand.
pub trait StepObserver {
    fn after_step(&mut self, solver: &dyn DfsSolverView);
}

/// DFS solver. Most users should prefer find_path, FindFirstPath or
/// FindAllPaths, but stepping this directly is useful for debugging or
/// driving a UI.
pub struct DfsSolver<'a, R: Ranker> {
    step: usize,
    tour: &'a mut TourState,
    ranker: &'a R,
    start: Position,
    stack: Vec<PendingMove>,
    last_move: Option<PendingMove>,
    undone: Option<usize>,
    state: DfsSolverState,
}

impl <'a, R: Ranker> Debug for DfsSolver<'a, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "State: {:?}\n{:?}Pending: {}\n", self.state, self.tour, self.stack.len())
    }
}

impl <'a, R: Ranker> DfsSolverView for DfsSolver<'a, R> {
    fn step_count(&self) -> usize {
        self.step
    }

    fn solver_state(&self) -> DfsSolverState {
        self.state
    }

    fn is_done(&self) -> bool {
        self.state == DfsSolverState::Solved || self.state == DfsSolverState::Exhausted
    }

    fn is_solved(&self) -> bool {
        self.state == DfsSolverState::Solved
    }

    fn most_recent_move(&self) -> Option<PendingMove> {
        self.last_move
    }

    fn undone_moves(&self) -> Option<usize> { self.undone }

    fn pending(&self) -> &[PendingMove] {
        &self.stack
    }

    fn get_state(&self) -> &TourState {
        self.tour
    }
}

pub const SEARCH_ALREADY_DONE: Error = Error::new_const("Search already done");

impl <'a, R: Ranker> DfsSolver<'a, R> {
    pub fn new(tour: &'a mut TourState, ranker: &'a R, start: Position) -> Self {
        tour.reset();
        DfsSolver {
            step: 0,
            tour,
            ranker,
            start,
            stack: vec![PendingMove { depth: 0, pos: start }],
            last_move: None,
            undone: None,
            state: DfsSolverState::Initializing,
        }
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn step(&mut self) -> Result<(), Error> {
        if self.is_done() {
            return Err(SEARCH_ALREADY_DONE);
        }
        self.step += 1;
        let next = match self.stack.pop() {
            Some(m) => m,
            None => {
                self.state = DfsSolverState::Exhausted;
                self.last_move = None;
                self.undone = None;
                return Ok(());
            }
        };
        self.last_move = Some(next);
        // Everything pushed after this move has already been popped, so the
        // path is at least as long as it was when this move was pushed.
        let prior = self.tour.len();
        debug_assert!(next.depth <= prior);
        if next.depth < prior {
            self.tour.undo_to(next.depth);
            self.undone = Some(prior - next.depth);
        } else {
            self.undone = None;
        }
        if !self.tour.apply(next.pos) {
            self.state = DfsSolverState::Backtracking(BacktrackingState {
                streak: match self.state {
                    DfsSolverState::Backtracking(bt) => bt.streak + 1,
                    _ => 1,
                },
            });
            return Ok(());
        }
        if self.tour.is_complete() {
            self.state = DfsSolverState::Solved;
            return Ok(());
        }
        let candidates = self.ranker.rank(self.tour, next.pos);
        let possibilities = candidates.len();
        self.stack.extend(candidates.into_iter().map(|pos| PendingMove { depth: next.depth + 1, pos }));
        self.state = DfsSolverState::Advancing(AdvancingState {
            possibilities,
            step: self.step,
            streak: match (self.state, self.undone) {
                (DfsSolverState::Advancing(adv), None) => adv.streak + 1,
                _ => 1,
            },
        });
        Ok(())
    }

    /// Treat a solved tour as a dead end so that the search carries on to the
    /// next one.
    pub fn force_backtrack(&mut self) -> bool {
        if self.state != DfsSolverState::Solved {
            return false;
        }
        self.state = DfsSolverState::Backtracking(BacktrackingState { streak: 1 });
        true
    }

    pub fn reset(&mut self) {
        self.tour.reset();
        self.stack.clear();
        self.stack.push(PendingMove { depth: 0, pos: self.start });
        self.last_move = None;
        self.undone = None;
        self.state = DfsSolverState::Initializing;
        self.step = 0;
    }
}

/// Find the first tour using the given ranker.
pub struct FindFirstPath<'a, R: Ranker> {
    solver: DfsSolver<'a, R>,
    observer: Option<&'a mut dyn StepObserver>,
}

impl <'a, R: Ranker> DfsSolverView for FindFirstPath<'a, R> {
    fn step_count(&self) -> usize { self.solver.step_count() }
    fn solver_state(&self) -> DfsSolverState { self.solver.solver_state() }
    fn is_done(&self) -> bool { self.solver.is_done() }
    fn is_solved(&self) -> bool { self.solver.is_solved() }
    fn most_recent_move(&self) -> Option<PendingMove> { self.solver.most_recent_move() }
    fn undone_moves(&self) -> Option<usize> { self.solver.undone_moves() }
    fn pending(&self) -> &[PendingMove] { self.solver.pending() }
    fn get_state(&self) -> &TourState { self.solver.get_state() }
}

impl <'a, R: Ranker> FindFirstPath<'a, R> {
    pub fn new(
        tour: &'a mut TourState,
        ranker: &'a R,
        start: Position,
        observer: Option<&'a mut dyn StepObserver>,
    ) -> Self {
        FindFirstPath {
            solver: DfsSolver::new(tour, ranker, start),
            observer,
        }
    }

    pub fn step(&mut self) -> Result<&dyn DfsSolverView, Error> {
        self.solver.step()?;
        Ok(&self.solver)
    }

    /// Runs to completion. Ok(None) means there is no tour from the start
    /// cell, which is an answer rather than an error.
    pub fn solve(&mut self) -> Result<Option<&dyn DfsSolverView>, Error> {
        while !self.solver.is_done() {
            self.solver.step()?;
            if let Some(observer) = &mut self.observer {
                observer.after_step(&self.solver);
            }
        }
        if self.solver.is_solved() {
            Ok(Some(&self.solver))
        } else {
            Ok(None)
        }
    }
}

/// Find every tour from the start cell. Nothing is collected here; use a
/// StepObserver to look at each tour as it's found.
pub struct FindAllPaths<'a, R: Ranker> {
    solver: DfsSolver<'a, R>,
    observer: Option<&'a mut dyn StepObserver>,
}

impl <'a, R: Ranker> DfsSolverView for FindAllPaths<'a, R> {
    fn step_count(&self) -> usize { self.solver.step_count() }
    fn solver_state(&self) -> DfsSolverState { self.solver.solver_state() }
    fn is_done(&self) -> bool { self.solver.solver_state() == DfsSolverState::Exhausted }
    fn is_solved(&self) -> bool { self.solver.is_solved() }
    fn most_recent_move(&self) -> Option<PendingMove> { self.solver.most_recent_move() }
    fn undone_moves(&self) -> Option<usize> { self.solver.undone_moves() }
    fn pending(&self) -> &[PendingMove] { self.solver.pending() }
    fn get_state(&self) -> &TourState { self.solver.get_state() }
}

impl <'a, R: Ranker> FindAllPaths<'a, R> {
    pub fn new(
        tour: &'a mut TourState,
        ranker: &'a R,
        start: Position,
        observer: Option<&'a mut dyn StepObserver>,
    ) -> Self {
        FindAllPaths {
            solver: DfsSolver::new(tour, ranker, start),
            observer,
        }
    }

    pub fn step(&mut self) -> Result<&dyn DfsSolverView, Error> {
        self.solver.force_backtrack();
        self.solver.step()?;
        Ok(&self.solver)
    }

    // Returns the number of steps taken and the number of tours found.
    pub fn solve_all(&mut self) -> Result<(usize, usize), Error> {
        let mut steps = 0;
        let mut tour_count = 0;
        while !self.is_done() {
            self.step()?;
            steps += 1;
            tour_count += if self.solver.is_solved() { 1 } else { 0 };
            if let Some(observer) = &mut self.observer {
                observer.after_step(&self.solver);
            }
        }
        Ok((steps, tour_count))
    }
}

/// Warnsdorff-ordered search for a tour from start. Ok(None) if there isn't
/// one (including when start is off the board).
pub fn find_path(board: Board, leaper: Leaper, start: Position) -> Result<Option<Vec<Position>>, Error> {
    find_path_with(board, leaper, start, &WarnsdorffRanker)
}

pub fn find_path_with<R: Ranker>(board: Board, leaper: Leaper, start: Position, ranker: &R) -> Result<Option<Vec<Position>>, Error> {
    let mut tour = TourState::new(board, leaper);
    let mut finder = FindFirstPath::new(&mut tour, ranker, start, None);
    Ok(finder.solve()?.map(|solved| solved.get_state().path().to_vec()))
}

#[cfg(any(test, feature = "test-util"))]
pub mod test_util {
    use super::*;
    use crate::validator::check_path;

    /// Collects every tour the solver lands on.
    pub struct PathCollector(pub Vec<Vec<Position>>);

    impl StepObserver for PathCollector {
        fn after_step(&mut self, solver: &dyn DfsSolverView) {
            if solver.is_solved() {
                self.0.push(solver.get_state().path().to_vec());
            }
        }
    }

    pub fn assert_valid_tour(board: &Board, leaper: &Leaper, start: Position, path: &[Position]) {
        assert_eq!(path.first(), Some(&start), "Tour doesn't begin at the start cell");
        assert_eq!(check_path(board, leaper, path), Ok(()), "Invalid tour: {:?}", path);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use super::test_util::*;
    use crate::config::TourConfig;
    use crate::core::LeaperPreset;
    use crate::ranker::OffsetOrderRanker;
    use crate::validator::validate;

    #[test]
    fn test_single_cell_board() -> Result<(), Error> {
        let board = Board::new(1, 1)?;
        let leaper = LeaperPreset::Knight.leaper();
        let path = find_path(board, leaper.clone(), Position::new(0, 0))?;
        assert_eq!(path, Some(vec![Position::new(0, 0)]));
        assert!(validate(&board, &leaper, &path.unwrap()));
        Ok(())
    }

    #[test]
    fn test_knight_5x5() -> Result<(), Error> {
        let board = Board::new(5, 5)?;
        let leaper = LeaperPreset::Knight.leaper();
        let start = Position::new(0, 0);
        let path = find_path(board, leaper.clone(), start)?.expect("5x5 has a tour from the corner");
        assert_eq!(path.len(), 25);
        assert_valid_tour(&board, &leaper, start, &path);
        Ok(())
    }

    #[test]
    fn test_knight_8x8_without_backtracking() -> Result<(), Error> {
        let board = Board::new(8, 8)?;
        let leaper = LeaperPreset::Knight.leaper();
        let start = Position::new(0, 0);
        let mut tour = TourState::new(board, leaper.clone());
        let ranker = WarnsdorffRanker;
        let mut finder = FindFirstPath::new(&mut tour, &ranker, start, None);
        let solved = finder.solve()?.expect("Warnsdorff finds an 8x8 tour");
        // One step per cell: the heuristic never hits a dead end here.
        assert_eq!(solved.step_count(), 64);
        assert_valid_tour(&board, &leaper, start, solved.get_state().path());
        Ok(())
    }

    #[test]
    fn test_knight_5x5_unranked() -> Result<(), Error> {
        let board = Board::new(5, 5)?;
        let leaper = LeaperPreset::Knight.leaper();
        let start = Position::new(2, 2);
        let path = find_path_with(board, leaper.clone(), start, &OffsetOrderRanker)?
            .expect("5x5 has a tour from the center");
        assert_valid_tour(&board, &leaper, start, &path);
        Ok(())
    }

    #[test]
    fn test_deterministic() -> Result<(), Error> {
        let board = Board::new(6, 5)?;
        let leaper = LeaperPreset::Knight.leaper();
        let start = Position::new(0, 0);
        let first = find_path(board, leaper.clone(), start)?;
        let second = find_path(board, leaper.clone(), start)?;
        assert!(first.is_some());
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn test_no_knight_tour_3x3_or_4x4() -> Result<(), Error> {
        let leaper = LeaperPreset::Knight.leaper();
        // The middle of a 3x3 board is unreachable.
        assert_eq!(find_path(Board::new(3, 3)?, leaper.clone(), Position::new(0, 0))?, None);
        for start in Board::new(4, 4)?.positions() {
            assert_eq!(find_path(Board::new(4, 4)?, leaper.clone(), start)?, None);
        }
        Ok(())
    }

    #[test]
    fn test_skewed_5x5() -> Result<(), Error> {
        let board = Board::new(5, 5)?;
        let leaper = Leaper::new(vec![
            Position::new(2, 0),
            Position::new(-2, 0),
            Position::new(0, 2),
            Position::new(0, -2),
            Position::new(1, 1),
            Position::new(-1, -1),
        ])?;
        let start = Position::new(0, 0);
        let path = find_path(board, leaper.clone(), start)?;
        // Every jump preserves (x + y) % 2 being even or odd, so half of the
        // board can never be reached.
        assert_eq!(path, None);
        // The validator agrees: every cell reachable from the start has even
        // parity, so no jump sequence can cover the 25 cells, and a
        // full-board ordering is rejected.
        let mut reachable = vec![start];
        let mut i = 0;
        while i < reachable.len() {
            let from = reachable[i];
            for d in leaper.offsets() {
                if let Some(p) = from.move_by(*d) {
                    if board.inside(p) && !reachable.contains(&p) {
                        reachable.push(p);
                    }
                }
            }
            i += 1;
        }
        assert!(reachable.iter().all(|p| (p.x + p.y) % 2 == 0));
        assert_eq!(reachable.len(), 13);
        assert!(!reachable.contains(&Position::new(1, 0)));
        let row_major: Vec<_> = board.positions().collect();
        assert!(!validate(&board, &leaper, &row_major));
        Ok(())
    }

    #[test]
    fn test_huge_offset_from_config() -> Result<(), Error> {
        let config = TourConfig::from_json(
            r#"{"width": 3, "height": 1, "offsets": [[1, 0], [2147483647, 0]]}"#,
        )?;
        let (board, leaper, start) = config.build()?;
        let path = find_path(board, leaper.clone(), start)?.expect("The (1, 0) jumps walk the row");
        assert_eq!(path, vec![Position::new(0, 0), Position::new(1, 0), Position::new(2, 0)]);
        assert!(validate(&board, &leaper, &path));
        let none = find_path(board, leaper.clone(), Position::new(1, 0))?;
        assert_eq!(none, None);
        Ok(())
    }

    #[test]
    fn test_start_outside_board() -> Result<(), Error> {
        let board = Board::new(4, 4)?;
        let mut tour = TourState::new(board, LeaperPreset::Knight.leaper());
        let ranker = WarnsdorffRanker;
        let mut finder = FindFirstPath::new(&mut tour, &ranker, Position::new(4, 4), None);
        assert!(finder.solve()?.is_none());
        // One step to reject the start, one to find the stack empty.
        assert_eq!(finder.step_count(), 2);
        assert_eq!(finder.solver_state(), DfsSolverState::Exhausted);
        assert!(finder.get_state().is_empty());
        Ok(())
    }

    #[test]
    fn test_step_after_done() -> Result<(), Error> {
        let board = Board::new(1, 1)?;
        let mut tour = TourState::new(board, LeaperPreset::Knight.leaper());
        let ranker = WarnsdorffRanker;
        let mut finder = FindFirstPath::new(&mut tour, &ranker, Position::new(0, 0), None);
        assert!(finder.solve()?.is_some());
        assert_eq!(finder.step().err(), Some(SEARCH_ALREADY_DONE));
        Ok(())
    }

    #[test]
    fn test_solver_states() -> Result<(), Error> {
        let board = Board::new(3, 1)?;
        let mut tour = TourState::new(board, LeaperPreset::Wazir.leaper());
        let ranker = WarnsdorffRanker;
        let mut solver = DfsSolver::new(&mut tour, &ranker, Position::new(1, 0));
        assert_eq!(solver.solver_state(), DfsSolverState::Initializing);
        solver.step()?;
        assert_eq!(solver.solver_state(), DfsSolverState::Advancing(AdvancingState {
            streak: 1, possibilities: 2, step: 1,
        }));
        assert_eq!(solver.pending().len(), 2);
        // Both ends are dead ends once taken.
        solver.step()?;
        assert_eq!(solver.solver_state(), DfsSolverState::Advancing(AdvancingState {
            streak: 2, possibilities: 0, step: 2,
        }));
        solver.step()?;
        assert_eq!(solver.undone_moves(), Some(1));
        assert_eq!(solver.get_state().len(), 2);
        solver.step()?;
        assert_eq!(solver.solver_state(), DfsSolverState::Exhausted);
        assert!(solver.step().is_err());
        solver.reset();
        assert_eq!(solver.solver_state(), DfsSolverState::Initializing);
        assert_eq!(solver.pending(), &[PendingMove { depth: 0, pos: Position::new(1, 0) }]);
        Ok(())
    }

    #[test]
    fn test_all_wazir_2x2() -> Result<(), Error> {
        let board = Board::new(2, 2)?;
        let leaper = LeaperPreset::Wazir.leaper();
        let mut tour = TourState::new(board, leaper.clone());
        let ranker = WarnsdorffRanker;
        let mut collector = PathCollector(vec![]);
        let mut finder = FindAllPaths::new(&mut tour, &ranker, Position::new(0, 0), Some(&mut collector));
        let (_, count) = finder.solve_all()?;
        assert_eq!(count, 2);
        assert_eq!(collector.0.len(), 2);
        assert_ne!(collector.0[0], collector.0[1]);
        for path in &collector.0 {
            assert_valid_tour(&board, &leaper, Position::new(0, 0), path);
        }
        Ok(())
    }

    #[test]
    fn test_all_knight_3x4() -> Result<(), Error> {
        let board = Board::new(4, 3)?;
        let leaper = LeaperPreset::Knight.leaper();
        let ranker = WarnsdorffRanker;
        let mut total = 0;
        for start in board.positions() {
            let mut tour = TourState::new(board, leaper.clone());
            let mut collector = PathCollector(vec![]);
            let mut finder = FindAllPaths::new(&mut tour, &ranker, start, Some(&mut collector));
            let (_, count) = finder.solve_all()?;
            assert_eq!(count, collector.0.len());
            for (i, path) in collector.0.iter().enumerate() {
                assert_valid_tour(&board, &leaper, start, path);
                assert!(!collector.0[..i].contains(path));
            }
            total += count;
        }
        // Each of the 8 undirected tours is found once from each of its ends.
        assert_eq!(total, 16);
        Ok(())
    }

    struct StepCounter(pub usize, pub usize);
    impl StepObserver for StepCounter {
        fn after_step(&mut self, solver: &dyn DfsSolverView) {
            self.0 += 1;
            if let DfsSolverState::Backtracking(_) = solver.solver_state() {
                self.1 += 1;
            }
            // The visited set and the path move together.
            let state = solver.get_state();
            let visited = state.board().positions().filter(|p| state.is_visited(*p)).count();
            assert_eq!(visited, state.len());
        }
    }

    #[test]
    fn test_observer() -> Result<(), Error> {
        let board = Board::new(5, 5)?;
        let mut tour = TourState::new(board, LeaperPreset::Knight.leaper());
        let ranker = OffsetOrderRanker;
        let mut counter = StepCounter(0, 0);
        let mut finder = FindFirstPath::new(&mut tour, &ranker, Position::new(0, 0), Some(&mut counter));
        let steps = {
            let solved = finder.solve()?;
            assert!(solved.is_some());
            solved.unwrap().step_count()
        };
        assert_eq!(counter.0, steps);
        Ok(())
    }
}
