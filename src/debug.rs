use std::{collections::BTreeMap, time::{Duration, Instant}};

use rand::{distr::{Bernoulli, Distribution}, rng, rngs::ThreadRng};
use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{EnumCount as EnumCountMacro, EnumIter};
use crate::solver::{DfsSolverState, DfsSolverView, StepObserver};
use plotters::{chart::ChartBuilder, prelude::{BitMapBackend, IntoDrawingArea, IntoSegmentedCoord, MultiLineText, Rectangle, SegmentValue}, style::{Color, IntoFont, GREEN, WHITE}};

/// Counts of how often each value was seen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Histogram(BTreeMap<usize, usize>);

impl Histogram {
    pub fn record(&mut self, v: usize) {
        *self.0.entry(v).or_default() += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Value at sorted position i (0-based) among all recorded values.
    fn nth(&self, i: usize) -> Option<usize> {
        let mut seen = 0;
        for (v, c) in &self.0 {
            seen += c;
            if i < seen {
                return Some(*v);
            }
        }
        None
    }

    pub fn summary(&self) -> DistStat {
        let count: usize = self.0.values().sum();
        let total: usize = self.0.iter().map(|(v, c)| v * c).sum();
        let max = self.0.keys().next_back().copied().unwrap_or(0);
        let max_count = self.0.values().max().copied().unwrap_or(0);
        let (mean, median) = if count == 0 {
            (0.0, 0.0)
        } else {
            let lo = self.nth((count - 1) / 2).unwrap_or(0);
            let hi = self.nth(count / 2).unwrap_or(0);
            (total as f64 / count as f64, (lo + hi) as f64 / 2.0)
        };
        DistStat { total, count, max, max_count, mean, median }
    }
}

#[derive(PartialEq, Clone, Debug)]
pub struct DistStat {
    pub total: usize,
    pub count: usize,
    pub max: usize,
    pub max_count: usize,
    pub mean: f64,
    pub median: f64,
}

/// Decides, step by step, whether something (printing, dumping stats) should
/// happen. Everything but Never also fires once the search is done.
pub enum Sample {
    Never,
    AtEnd,
    EveryN { n: usize, seen: usize },
    Probability(Bernoulli, ThreadRng),
    Every { period: Duration, last: Instant },
}

impl Sample {
    pub fn never() -> Self {
        Sample::Never
    }

    pub fn at_end() -> Self {
        Sample::AtEnd
    }

    pub fn every_n(n: usize) -> Self {
        Sample::EveryN { n, seen: 0 }
    }

    /// Panics unless 0 <= p <= 1.
    pub fn probability(p: f64) -> Self {
        let d = Bernoulli::new(p).unwrap_or_else(|e| panic!("Bad sampling probability {}: {}", p, e));
        Sample::Probability(d, rng())
    }

    pub fn time(period: Duration) -> Self {
        Sample::Every { period, last: Instant::now() }
    }

    pub fn fires(&mut self, done: bool) -> bool {
        match self {
            Sample::Never => false,
            Sample::AtEnd => done,
            Sample::EveryN { n, seen } => {
                *seen += 1;
                let fire = *seen >= *n || done;
                if fire {
                    *seen = 0;
                }
                fire
            },
            Sample::Probability(d, rng) => d.sample(rng) || done,
            Sample::Every { period, last } => {
                let fire = last.elapsed() >= *period || done;
                if fire {
                    *last = Instant::now();
                }
                fire
            },
        }
    }
}

/// What DbgObserver keeps a histogram of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, EnumCountMacro)]
pub enum Metric {
    // Moves pushed by each advance.
    Branching,
    // Path length after each step.
    Depth,
    // Consecutive advances without undoing anything.
    AdvanceStreak,
    // Consecutive rejected moves.
    RejectStreak,
    // Moves undone before trying a move that didn't directly extend the path.
    Undo,
}

impl Metric {
    pub fn caption(self) -> &'static str {
        match self {
            Metric::Branching => "Moves pushed per advance",
            Metric::Depth => "Path length at each step",
            Metric::AdvanceStreak => "Uninterrupted advances",
            Metric::RejectStreak => "Rejected-move streaks",
            Metric::Undo => "Moves undone per retreat",
        }
    }
}

/// Observer that prints the search as it goes and keeps histograms of how it
/// behaved, which can be rendered to an image with dump_stats.
pub struct DbgObserver {
    print_sample: Sample,
    stat: Option<(String, Sample)>,
    hists: [Histogram; Metric::COUNT],
    // Longest path seen so far.
    best: usize,
    steps: usize,
}

impl DbgObserver {
    pub fn new() -> Self {
        DbgObserver {
            print_sample: Sample::every_n(1),
            stat: None,
            hists: Default::default(),
            best: 0,
            steps: 0,
        }
    }

    pub fn sample_print(&mut self, sample: Sample) -> &mut Self {
        self.print_sample = sample;
        self
    }

    pub fn sample_stats<S: Into<String>>(&mut self, filename: S, sample: Sample) -> &mut Self {
        self.stat = Some((filename.into(), sample));
        self
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn best(&self) -> usize {
        self.best
    }

    pub fn histogram(&self, metric: Metric) -> &Histogram {
        &self.hists[metric as usize]
    }

    fn record(&mut self, metric: Metric, v: usize) {
        self.hists[metric as usize].record(v);
    }

    fn update_stats(&mut self, solver: &dyn DfsSolverView) {
        match solver.solver_state() {
            DfsSolverState::Advancing(adv) => {
                self.record(Metric::AdvanceStreak, adv.streak);
                self.record(Metric::Branching, adv.possibilities);
            },
            DfsSolverState::Backtracking(bt) => self.record(Metric::RejectStreak, bt.streak),
            _ => {},
        }
        if let Some(n) = solver.undone_moves() {
            self.record(Metric::Undo, n);
        }
        let depth = solver.get_state().len();
        self.record(Metric::Depth, depth);
        self.best = self.best.max(depth);
        self.steps += 1;
    }

    pub fn dump_stats(&self, hist_filename: &str) -> Result<(), Box<dyn std::error::Error>> {
        let branching = self.histogram(Metric::Branching).summary();
        println!("Steps: {} (longest path {}, mean branching {:.3})", self.steps, self.best, branching.mean);
        let root = BitMapBackend::new(hist_filename, (600, 700)).into_drawing_area();
        root.fill(&WHITE)?;
        let (header, body) = root.split_vertically(50);
        let mut title = MultiLineText::<_, String>::new((15, 15), ("sans-serif", 22).into_font());
        title.push_line(format!("Steps: {}  Longest path: {}", self.steps, self.best));
        header.draw(&title)?;
        let panels = body.split_evenly((3, 2));
        for (metric, panel) in Metric::iter().zip(panels.iter()) {
            let hist = self.histogram(metric);
            let stats = hist.summary();
            let (label_area, chart_area) = panel.split_vertically(panel.relative_to_height(0.18));
            let mut label = MultiLineText::<_, String>::new((5, 5), ("sans-serif", 14).into_font());
            label.push_line(metric.caption());
            label.push_line(format!("mean {:.2}, median {:.1}, max {}", stats.mean, stats.median, stats.max));
            label_area.draw(&label)?;
            let mut chart = ChartBuilder::on(&chart_area)
                .margin(5)
                .set_left_and_bottom_label_area_size(20)
                .build_cartesian_2d(
                    (0..stats.max as i32 + 1).into_segmented(),
                    0..stats.max_count as i32 + 1,
                )?;
            chart.configure_mesh().draw()?;
            chart.draw_series(hist.0.iter().map(|(v, c)| {
                let mut bar = Rectangle::new(
                    [(SegmentValue::Exact(*v as i32), 0), (SegmentValue::Exact(*v as i32 + 1), *c as i32)],
                    GREEN.filled(),
                );
                bar.set_margin(0, 0, 3, 3);
                bar
            }))?;
        }
        root.present()?;
        Ok(())
    }

    pub fn print(&self, solver: &dyn DfsSolverView) {
        let state = solver.get_state();
        match solver.solver_state() {
            DfsSolverState::Solved => println!("TOUR after {} steps:\n{:?}", solver.step_count(), state),
            DfsSolverState::Exhausted => println!(
                "EXHAUSTED after {} steps (longest path {})", solver.step_count(), self.best,
            ),
            _ => {
                let tried = solver.most_recent_move()
                    .map(|m| format!("{} at depth {}", m.pos, m.depth))
                    .unwrap_or_else(|| "nothing".into());
                println!(
                    "STEP {}: tried {} (undid {}, {} pending)\n{:?}",
                    solver.step_count(),
                    tried,
                    solver.undone_moves().unwrap_or(0),
                    solver.pending().len(),
                    state,
                );
            },
        }
    }
}

impl StepObserver for DbgObserver {
    fn after_step(&mut self, solver: &dyn DfsSolverView) {
        self.update_stats(solver);
        let done = solver.is_done();
        if self.print_sample.fires(done) {
            self.print(solver);
        }
        let dump_to = match &mut self.stat {
            Some((f, s)) => if s.fires(done) { Some(f.clone()) } else { None },
            None => None,
        };
        if let Some(f) = dump_to {
            if let Err(e) = self.dump_stats(&f) {
                eprintln!("Failed to dump stats to {}: {}", f, e);
            }
        }
    }
}
