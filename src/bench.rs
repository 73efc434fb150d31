use std::{collections::BTreeMap, fs::File, io::Write, time::Instant};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use crate::core::{Board, Position};

/// Timing harness. Runs are seeded, so the same benchmark always sees the
/// same sequence of random inputs.
pub struct Bench {
    results: BTreeMap<String, f64>,
    rng: ChaCha20Rng,
}

const SEED: u64 = 0x5eed1ea9e7700b17;

impl Bench {
    pub fn new() -> Self {
        Self {
            results: BTreeMap::new(),
            rng: ChaCha20Rng::seed_from_u64(SEED),
        }
    }

    pub fn benchmark<F: FnMut(&mut ChaCha20Rng) -> ()>(&mut self, n: usize, name: &str, mut f: F) {
        let start = Instant::now();
        for _ in 0..n {
            f(&mut self.rng);
        }
        let duration = start.elapsed();
        println!("{}: {:?}", name, duration);
        self.results.insert(name.into(), duration.as_secs_f64());
    }

    pub fn benchmark_cases<T, F: FnMut(&T, &mut ChaCha20Rng) -> ()>(&mut self, n: usize, cases: &[T], name: &str, mut f: F) {
        let start = Instant::now();
        for _ in 0..n {
            for case in cases {
                f(case, &mut self.rng);
            }
        }
        let duration = start.elapsed();
        println!("{}: {:?}", name, duration);
        self.results.insert(name.into(), duration.as_secs_f64());
    }

    pub fn results(&self) -> &BTreeMap<String, f64> {
        &self.results
    }

    pub fn save_json(&self, filename: &str) -> Result<(), std::io::Error> {
        let mut f = File::create(filename)?;
        let json_data = serde_json::to_string_pretty(&self.results)?;
        f.write_all(json_data.as_bytes())?;
        Ok(())
    }
}

/// A uniformly random cell of the board.
pub fn random_start(board: &Board, rng: &mut ChaCha20Rng) -> Position {
    Position::new(rng.random_range(0..board.width()), rng.random_range(0..board.height()))
}
