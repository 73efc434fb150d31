pub mod core;
pub mod tracker;
pub mod ranker;
pub mod solver;
pub mod validator;
pub mod config;
pub mod debug;
pub mod bench;
pub mod tui;
