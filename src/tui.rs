use std::{env, io, time::Duration};
use num_enum::{IntoPrimitive, TryFromPrimitive};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Direction, Layout, Rect},
    style::{Style, Stylize},
    symbols::border,
    text::{Line, Span, Text},
    widgets::{Block, Paragraph},
    DefaultTerminal,
    Frame,
};
use strum::EnumCount;
use crate::{
    config::TourConfig,
    core::{Board, Error, Leaper, Position},
    debug::{DbgObserver, Sample},
    ranker::{onward_degree, Ranker, WarnsdorffRanker},
    solver::{DfsSolver, DfsSolverState, DfsSolverView, FindAllPaths, FindFirstPath, StepObserver},
    tracker::TourState,
    validator::validate,
};

/// Searches in command-line mode. No interactivity, but a StepObserver can be
/// passed in to periodically print out or save debug information. The tour
/// (or the lack of one) is printed at the end.
pub fn solve_cli<D: StepObserver>(board: Board, leaper: Leaper, start: Position, mut observer: D) -> Result<(), Error> {
    let mut tour = TourState::new(board, leaper.clone());
    let ranker = WarnsdorffRanker;
    let mut finder = FindFirstPath::new(&mut tour, &ranker, start, Some(&mut observer));
    let found = finder.solve()?.is_some();
    if found {
        let state = finder.get_state();
        println!("Path found after {} steps:\n{:?}", finder.step_count(), state);
        for p in state.path() {
            println!("{}", p);
        }
        println!("validate: {}", validate(&board, &leaper, state.path()));
    } else {
        println!("No path found from {} after {} steps", start, finder.step_count());
    }
    Ok(())
}

/// Counts every tour from the start cell.
pub fn count_cli<D: StepObserver>(board: Board, leaper: Leaper, start: Position, mut observer: D) -> Result<(), Error> {
    let mut tour = TourState::new(board, leaper);
    let ranker = WarnsdorffRanker;
    let mut finder = FindAllPaths::new(&mut tour, &ranker, start, Some(&mut observer));
    let (steps, count) = finder.solve_all()?;
    println!("{} paths from {} ({} steps)", count, start, steps);
    Ok(())
}

/// Steps through the search in the interactive debugger.
pub fn solve_interactive(board: Board, leaper: Leaper, start: Position) -> io::Result<()> {
    let mut terminal = ratatui::init();
    let mut tour = TourState::new(board, leaper);
    let ranker = WarnsdorffRanker;
    let mut ts = TuiState::new(&mut tour, &ranker, start);
    let app_result = tui_run(&mut ts, &mut terminal);
    ratatui::restore();
    app_result
}

/// Reads the config and flags from the command line and does the appropriate
/// thing:
///  - By default runs silently (dumping stats to stats_file every 30s) and
///    prints the tour at the end
///  - Can be configured to print progress:
///    --sample_secs=10 <-- Sample::time(Duration::from_secs(10))
///    --sample_every=10000 <-- Sample::every_n(10000)
///  - Can count all tours instead of stopping at the first:
///    --all
///  - Can run in interactive mode instead:
///    --interactive
/// Anything else (--config, --width, --preset, ...) goes to TourConfig.
pub fn solve_main(stats_file: &str) -> Result<(), Error> {
    let mut config = TourConfig::default();
    let flags = parse_main_args(env::args().skip(1), &mut config)?;
    let (board, leaper, start) = config.build()?;
    if let PrintMode::Interactive = &flags.mode {
        return solve_interactive(board, leaper, start)
            .map_err(|e| Error::new(format!("Interactive debugger failed: {}", e)));
    }
    let mut dbg = DbgObserver::new();
    dbg.sample_stats(stats_file, Sample::time(Duration::from_secs(30)));
    match flags.mode {
        PrintMode::Default => {
            dbg.sample_print(Sample::never());
        },
        PrintMode::SampleEvery(n) => {
            dbg.sample_print(Sample::every_n(n));
        },
        PrintMode::SampleSecs(s) => {
            dbg.sample_print(Sample::time(Duration::from_secs(s)));
        },
        _ => {},
    };
    if flags.all {
        count_cli(board, leaper, start, dbg)
    } else {
        solve_cli(board, leaper, start, dbg)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PrintMode {
    Default,
    SampleSecs(u64),
    SampleEvery(usize),
    Interactive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct MainFlags {
    mode: PrintMode,
    all: bool,
}

fn parse_main_args<I: Iterator<Item = String>>(raw_args: I, config: &mut TourConfig) -> Result<MainFlags, Error> {
    let mut args = vec![];
    for arg in raw_args {
        if let Some((x, y)) = arg.split_once("=") {
            args.push((x.to_string(), Some(y.to_string())));
        } else {
            args.push((arg, None));
        }
    }
    let mut mode: Option<PrintMode> = None;
    let mut all = false;
    let only_one = "You may only specify one of --sample_secs, --sample_every, and --interactive";
    for (arg, value) in args {
        let mut set_mode = |m: PrintMode| {
            if mode.is_some() {
                return Err(Error::new_const(only_one));
            }
            mode = Some(m);
            Ok(())
        };
        match (arg.as_str(), value) {
            ("--sample_secs", Some(v)) => set_mode(PrintMode::SampleSecs(v.parse::<u64>().map_err(|_| {
                Error::new_const("Invalid value for --sample_secs. Must be an unsigned integer.")
            })?))?,
            ("--sample_every", Some(v)) => set_mode(PrintMode::SampleEvery(v.parse::<usize>().map_err(|_| {
                Error::new_const("Invalid value for --sample_every. Must be an unsigned integer.")
            })?))?,
            ("--interactive", None) => set_mode(PrintMode::Interactive)?,
            ("--all", None) => all = true,
            (name, Some(v)) => {
                if !config.apply_flag(name, &v)? {
                    return Err(Error::new(format!("Unknown flag: {}", name)));
                }
            },
            (name, None) => return Err(Error::new(format!("Unknown flag or missing value: {}", name))),
        }
    }
    Ok(MainFlags { mode: mode.unwrap_or(PrintMode::Default), all })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Ok,
    Err(String),
}

#[derive(Debug, Clone, PartialEq, Eq, IntoPrimitive, TryFromPrimitive, strum_macros::EnumCount)]
#[repr(u8)]
pub enum Mode {
    Readme = 1,
    Stack,
    Candidates,
}

impl Mode {
    // Wraps around at both ends.
    fn cycle(&self, forward: bool) -> Mode {
        let n = Mode::COUNT as u8;
        let m: u8 = self.clone().into();
        let next = if forward { m % n + 1 } else { (m + n - 2) % n + 1 };
        Mode::try_from(next).unwrap_or(Mode::Readme)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TuiStateEvent {
    Ignore,
    ModeUpdate,
    Step,
    Reset,
    Scroll,
    Exit,
}

pub struct TuiState<'a, R: Ranker> {
    pub solver: DfsSolver<'a, R>,
    pub scroll_pos: usize,
    pub mode: Mode,
    pub exit: Option<Status>,
}

// Steps taken per press of 'f'.
const FAST_FORWARD: usize = 1000;

impl <'a, R: Ranker> TuiState<'a, R> {
    pub fn new(tour: &'a mut TourState, ranker: &'a R, start: Position) -> Self {
        Self {
            solver: DfsSolver::new(tour, ranker, start),
            scroll_pos: 0,
            mode: Mode::Readme,
            exit: None,
        }
    }

    pub fn step(&mut self, n: usize) {
        for _ in 0..n {
            if self.solver.is_done() {
                break;
            }
            if let Err(e) = self.solver.step() {
                self.exit(Status::Err(format!("{:?}", e)));
                break;
            }
        }
    }

    pub fn reset(&mut self) {
        self.solver.reset();
        self.scroll_pos = 0;
    }

    pub fn exit(&mut self, status: Status) {
        self.exit = Some(status);
    }

    fn text_lines(&self) -> Vec<Line<'static>> {
        match self.mode {
            Mode::Readme => vec![
                Line::from("Leaper tour debugger"),
                Line::from(""),
                Line::from(vec!["n".blue().bold(), " take one search step".into()]),
                Line::from(vec!["f".blue().bold(), format!(" take {} steps", FAST_FORWARD).into()]),
                Line::from(vec!["Ctrl+R".blue().bold(), " restart the search".into()]),
                Line::from(vec!["Tab".blue().bold(), " cycle through the panes".into()]),
                Line::from(vec!["Up/Down".blue().bold(), " scroll this pane".into()]),
                Line::from(""),
                Line::from("Cells show the move number of each visited cell;"),
                Line::from("the most recent move is highlighted."),
            ],
            Mode::Stack => {
                // Top of the stack first, since that's what gets popped next.
                self.solver.pending().iter().rev().map(|m| {
                    Line::from(format!("depth {:>4}  {}", m.depth, m.pos))
                }).collect()
            },
            Mode::Candidates => {
                let state = self.solver.get_state();
                match state.last() {
                    None => vec![Line::from("Nothing placed yet")],
                    Some(last) => {
                        let mut lines = vec![Line::from(format!("Onward moves from {}:", last))];
                        for c in state.neighbors(last) {
                            lines.push(Line::from(format!("{}  degree {}", c, onward_degree(state, c))));
                        }
                        lines
                    },
                }
            },
        }
    }
}

fn tui_run<'a, R: Ranker>(state: &mut TuiState<'a, R>, terminal: &mut DefaultTerminal) -> io::Result<()> {
    while state.exit.is_none() {
        terminal.draw(|frame| {
            let (g, ta) = tui_draw(state, frame);
            draw_grid(state, frame, g);
            draw_text_area(state, frame, ta);
        })?;
        if let TuiStateEvent::ModeUpdate = tui_handle_events(state)? {
            state.scroll_pos = 0;
        }
    }
    match state.exit.clone() {
        Some(Status::Err(e)) => Err(io::Error::new(io::ErrorKind::Other, e)),
        _ => Ok(()),
    }
}

fn tui_draw<'a, R: Ranker>(state: &TuiState<'a, R>, frame: &mut Frame) -> (Rect, Rect) {
    let size = frame.area();
    let vertical_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            ratatui::layout::Constraint::Length(4),  // Header
            ratatui::layout::Constraint::Min(0),     // Body (fills remaining space)
            ratatui::layout::Constraint::Length(1),  // Footer
        ])
        .split(size);
    let header_area = vertical_chunks[0];
    let body_area = vertical_chunks[1];
    let footer_area = vertical_chunks[2];
    let horizontal_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            ratatui::layout::Constraint::Min(25),  // Grid on left
            ratatui::layout::Constraint::Min(25),  // Text area on right
        ])
        .split(body_area);
    let title = Line::from(" Leaper Tour Debugger ".bold());
    let block = Block::bordered()
        .title(title.centered())
        .border_set(border::PLAIN);
    let solver_state: Span<'_> = match state.solver.solver_state() {
        DfsSolverState::Initializing => "Initializing".yellow(),
        DfsSolverState::Advancing(_) => "Advancing".green(),
        DfsSolverState::Backtracking(_) => "Backtracking".red(),
        DfsSolverState::Exhausted => "Exhausted".magenta(),
        DfsSolverState::Solved => "Solved".blue(),
    };
    let tour = state.solver.get_state();
    let header_lines = vec![
        Line::from(vec![
            "State: ".into(), solver_state,
            " Steps: ".into(), state.solver.step_count().to_string().yellow(),
            " Mode: ".into(), format!("{:?}", state.mode).yellow(),
        ]),
        Line::from(vec![
            "Path: ".into(), format!("{}/{}", tour.len(), tour.board_size()).cyan(),
            " Pending: ".into(), state.solver.pending().len().to_string().cyan(),
            match state.solver.undone_moves() {
                Some(n) => format!(" Undid {}", n).red(),
                None => "".into(),
            },
        ]),
    ];
    frame.render_widget(
        Paragraph::new(Text::from(header_lines))
            .centered()
            .block(block),
        header_area,
    );
    let instructions = Line::from(vec![
        " Step ".into(),
        "N".blue().bold(),
        " Skip ".into(),
        "F".blue().bold(),
        " Modes ".into(),
        "Tab/Shift+Tab".blue().bold(),
        " Restart ".into(),
        "Ctrl+R".blue().bold(),
        " Quit ".into(),
        "Ctrl+C ".blue().bold(),
    ]);
    frame.render_widget(
        Paragraph::new(instructions).centered(),
        footer_area,
    );
    (horizontal_chunks[0], horizontal_chunks[1])
}

fn draw_grid<'a, R: Ranker>(state: &TuiState<'a, R>, frame: &mut Frame, area: Rect) {
    let tour = state.solver.get_state();
    let board = tour.board();
    let numbers = tour.move_numbers();
    let digits = board.size().to_string().len();
    let last = tour.last();
    let lines: Vec<Line> = (0..board.height()).map(|y| {
        Line::from((0..board.width()).flat_map(|x| {
            let p = Position::new(x, y);
            let cell = match numbers[board.cell_index(p)] {
                Some(n) => format!("{:>width$}", n + 1, width = digits),
                None => format!("{:>width$}", ".", width = digits),
            };
            let span = if Some(p) == last {
                Span::styled(cell, Style::new().black().on_green())
            } else if numbers[board.cell_index(p)].is_some() {
                Span::raw(cell)
            } else {
                Span::raw(cell).dark_gray()
            };
            [span, Span::raw(" ")]
        }).collect::<Vec<_>>())
    }).collect();
    frame.render_widget(
        Paragraph::new(Text::from(lines))
            .block(Block::bordered().title(" Board ").border_set(border::PLAIN)),
        area,
    );
}

fn draw_text_area<'a, R: Ranker>(state: &TuiState<'a, R>, frame: &mut Frame, area: Rect) {
    let lines = state.text_lines();
    let scroll = state.scroll_pos.min(lines.len().saturating_sub(1));
    frame.render_widget(
        Paragraph::new(Text::from(lines))
            .scroll((scroll as u16, 0))
            .block(Block::bordered().title(format!(" {:?} ", state.mode)).border_set(border::PLAIN)),
        area,
    );
}

fn tui_handle_events<'a, R: Ranker>(state: &mut TuiState<'a, R>) -> io::Result<TuiStateEvent> {
    Ok(match event::read()? {
        Event::Key(key_event) if key_event.kind == KeyEventKind::Press => match key_event.code {
            KeyCode::Char('c') if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
                state.exit(Status::Ok);
                TuiStateEvent::Exit
            },
            KeyCode::BackTab => {
                state.mode = state.mode.cycle(false);
                TuiStateEvent::ModeUpdate
            },
            KeyCode::Tab => {
                state.mode = state.mode.cycle(true);
                TuiStateEvent::ModeUpdate
            },
            KeyCode::Char('n') => {
                state.step(1);
                TuiStateEvent::Step
            },
            KeyCode::Char('f') => {
                state.step(FAST_FORWARD);
                TuiStateEvent::Step
            },
            KeyCode::Char('r') if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
                state.reset();
                TuiStateEvent::Reset
            },
            KeyCode::Up => {
                state.scroll_pos = state.scroll_pos.saturating_sub(1);
                TuiStateEvent::Scroll
            },
            KeyCode::Down => {
                state.scroll_pos += 1;
                TuiStateEvent::Scroll
            },
            _ => TuiStateEvent::Ignore,
        },
        _ => TuiStateEvent::Ignore,
    })
}
