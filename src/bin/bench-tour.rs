use rand_chacha::ChaCha20Rng;
use leaper_tour_dfs::bench::{random_start, Bench};
use leaper_tour_dfs::core::{Board, Error, LeaperPreset, Position};
use leaper_tour_dfs::ranker::{OffsetOrderRanker, Ranker, WarnsdorffRanker};
use leaper_tour_dfs::solver::find_path_with;
use leaper_tour_dfs::validator::validate;

// Check the result just so nothing gets optimized away.
fn touch_path(board: Board, preset: LeaperPreset, path: Result<Option<Vec<Position>>, Error>) {
    match path {
        Ok(Some(p)) => assert!(validate(&board, &preset.leaper(), &p)),
        Ok(None) => {},
        Err(e) => panic!("Search failed: {}", e),
    }
}

struct Tour<R: Ranker> {
    board: Board,
    preset: LeaperPreset,
    ranker: R,
}

trait TourBench {
    fn run_random_start(&self, rng: &mut ChaCha20Rng);
    fn run_corner_start(&self, rng: &mut ChaCha20Rng);
}

impl <R: Ranker> TourBench for Tour<R> {
    fn run_random_start(&self, rng: &mut ChaCha20Rng) {
        let start = random_start(&self.board, rng);
        touch_path(self.board, self.preset, find_path_with(self.board, self.preset.leaper(), start, &self.ranker));
    }

    fn run_corner_start(&self, _: &mut ChaCha20Rng) {
        let start = Position::new(0, 0);
        touch_path(self.board, self.preset, find_path_with(self.board, self.preset.leaper(), start, &self.ranker));
    }
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let mut bench = Bench::new();
    let knight = LeaperPreset::Knight;
    let warnsdorff: Vec<Box<dyn TourBench>> = vec_box::vec_box![
        Tour { board: Board::new(8, 8)?, preset: knight, ranker: WarnsdorffRanker },
        Tour { board: Board::new(12, 12)?, preset: knight, ranker: WarnsdorffRanker },
        Tour { board: Board::new(16, 16)?, preset: knight, ranker: WarnsdorffRanker },
    ];
    bench.benchmark_cases(100, &warnsdorff, "warnsdorff_random_start", |tour, rng| {
        tour.run_random_start(rng);
    });
    bench.benchmark_cases(100, &warnsdorff, "warnsdorff_corner_start", |tour, rng| {
        tour.run_corner_start(rng);
    });
    let unranked: Vec<Box<dyn TourBench>> = vec_box::vec_box![
        Tour { board: Board::new(5, 5)?, preset: knight, ranker: OffsetOrderRanker },
    ];
    bench.benchmark_cases(10, &unranked, "offset_order_corner_start", |tour, rng| {
        tour.run_corner_start(rng);
    });
    bench.save_json("stats/bench-tour.json")
        .map_err(|e| Error::new(format!("Couldn't save results: {}", e)))?;
    Ok(())
}
