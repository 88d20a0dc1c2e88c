//! seed-runner: headless demo-data seeder and dashboard printer.
//!
//! Usage:
//!   seed-runner --db attendance.db --dry
//!   seed-runner --db attendance.db --reset --make-users --summary
//!   seed-runner --db attendance.db --game homecoming-2025 --detail homecoming-2025

use anyhow::Result;
use checkin_core::{
    aggregate::{counts_by_grade, cumulative, summarize_games, time_series},
    config::AppConfig,
    grade::Grade,
    seed::{SeedOptions, Seeder},
    store::{AttendanceStore, GameFilter, SqliteStore},
};
use std::env;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let db = flag_value(&args, "--db").unwrap_or(":memory:");
    let data_dir = flag_value(&args, "--data-dir").unwrap_or("./data");
    let detail = flag_value(&args, "--detail");
    let games: Vec<String> = args
        .windows(2)
        .filter(|w| w[0] == "--game")
        .map(|w| w[1].clone())
        .collect();

    log::info!("seed-runner: db={db} data_dir={data_dir}");
    let config = AppConfig::load(data_dir)?;
    let store = SqliteStore::open(db)?;
    store.migrate()?;

    let opts = SeedOptions {
        dry_run: has_flag(&args, "--dry"),
        reset: has_flag(&args, "--reset"),
        games,
        include_future: has_flag(&args, "--include-future"),
        attach_students: has_flag(&args, "--make-users"),
        now: chrono::Utc::now(),
    };

    let report = Seeder::new(&config.catalog, &config.cohort).run(&store, &opts)?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    if has_flag(&args, "--summary") {
        print_summary(&config, &store)?;
    }
    if let Some(game_id) = detail {
        print_game_detail(&config, &store, game_id)?;
    }
    Ok(())
}

fn print_summary(config: &AppConfig, store: &SqliteStore) -> Result<()> {
    let rows = store.rows(&GameFilter::All)?;
    let summaries = summarize_games(&config.catalog, &rows);

    println!();
    println!("=== OVERVIEW ===");
    println!("  total check-ins: {} across {} games", rows.len(), summaries.len());
    for s in &summaries {
        println!(
            "  {} | {:<36} | {:>4} students",
            s.check_in_start.format("%b %d"),
            s.name,
            s.total
        );
    }
    Ok(())
}

fn print_game_detail(config: &AppConfig, store: &SqliteStore, game_id: &str) -> Result<()> {
    let game = config.catalog.find(game_id)?;
    let rows = store.rows(&GameFilter::Game(game.id.clone()))?;
    let counts = counts_by_grade(&rows);

    println!();
    println!("=== {} ===", game.name);
    println!(
        "  total check-ins: {} ({:.1}% of {} students)",
        rows.len(),
        counts.overall_turnout_percent(config.cohort.total_students()),
        config.cohort.total_students()
    );
    for (grade, count) in counts.ranked() {
        let cohort = config.cohort.grade_sizes.get(&grade).copied().unwrap_or(0);
        println!(
            "  {:<10} {:>4} of {:>4} ({:.1}%)",
            grade,
            count,
            cohort,
            counts.turnout_percent(grade, &config.cohort.grade_sizes)
        );
    }

    let bins = cumulative(&time_series(&rows, config.cohort.bin_minutes)?);
    if bins.is_empty() {
        println!("  (no check-ins yet)");
        return Ok(());
    }
    println!();
    print!("  {:<6}", "time");
    for grade in Grade::CANONICAL {
        print!(" {:>9}", grade.as_str());
    }
    println!();
    for bin in &bins {
        print!("  {:<6}", bin.label);
        for grade in Grade::CANONICAL {
            print!(" {:>9}", bin.counts.get(grade));
        }
        println!();
    }
    Ok(())
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}
