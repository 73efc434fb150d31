use leaper_tour_dfs::tui::solve_main;

// E.g., cargo run --bin leaper-tour -- --width=6 --height=5 --preset=knight --start=2,2
fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    solve_main("stats/leaper-tour.png")?;
    Ok(())
}
