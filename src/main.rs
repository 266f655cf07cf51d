// Ranks a Steam library (plus hand-listed extras) by IGDB rating × vote
// count and attaches a HowLongToBeat completionist estimate to each title.
//
// Misses never stop a run: a title that can't be matched, rated or timed
// keeps -1 / "not found" in the report. Only bad credentials or a failed
// bulk query end it early.

use std::fs::File;
use std::process;
use std::time::Instant;

use log::{error, info};
use simplelog::{
    ColorChoice, CombinedLogger, Config as LogConfig, LevelFilter, SharedLogger, TermLogger,
    TerminalMode, WriteLogger,
};

use catalog::hltb::HowLongToBeat;
use catalog::igdb::Igdb;
use catalog::steam::Steam;
use catalog::steamspy::SteamSpy;
use catalog::{PrimaryCatalog, ReviewAggregator};
use config::Config;
use error::Result;
use lists::{load_supplemental, Overrides};
use pipeline::Sources;

mod catalog;
mod cli;
mod completion;
mod config;
mod error;
mod game;
mod lists;
mod pipeline;
mod rating;
mod report;
mod resolve;
mod user;

fn main() {
    let started = Instant::now();
    let matches = cli::build_command().get_matches();

    let config = match Config::load(&matches) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("ERROR: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = init_logger(&config) {
        eprintln!("WARNING: logging disabled: {e}");
    }
    info!("Started at {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));

    if let Err(e) = run(&config) {
        error!("{e}");
        eprintln!("ERROR: {e}");
        process::exit(1);
    }

    let elapsed = started.elapsed().as_secs_f64();
    info!(
        "Finished at {} ({elapsed:.2} seconds)",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    println!("\nExecution time: {elapsed:.2} seconds");
}

fn init_logger(config: &Config) -> Result<()> {
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        config.log_level,
        LogConfig::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];
    match File::create(&config.files.log) {
        Ok(file) => loggers.push(WriteLogger::new(
            LevelFilter::Info.max(config.log_level),
            LogConfig::default(),
            file,
        )),
        Err(e) => eprintln!(
            "WARNING: cannot open log file {}: {e}",
            config.files.log.display()
        ),
    }

    CombinedLogger::init(loggers)
        .map_err(|e| error::Error::Config(format!("logger already set: {e}")))
}

fn run(config: &Config) -> Result<()> {
    // Everything that can fail on credentials happens before any game is touched.
    let creds = config.credentials()?;
    let steam = Steam::new(&creds.steam_api_key, config.retry.clone())?;
    info!("Steam API connection initialized.");
    let igdb = Igdb::connect(
        &creds.igdb_client_id,
        &creds.igdb_client_secret,
        config.igdb_batch_size,
    )?;
    let hltb = HowLongToBeat::new(config.hltb_case_insensitive)?;
    let steamspy = if config.with_reviews {
        Some(SteamSpy::new()?)
    } else {
        None
    };

    let user = steam.resolve_user(&creds.steam_user)?;
    info!("User initialized: {user}");

    let overrides = Overrides::load(&config.files.overrides)?;
    info!("Loaded {} title override(s)", overrides.len());
    let supplemental = load_supplemental(&config.files.supplemental)?;

    let sources = Sources {
        primary: &steam,
        metadata: &igdb,
        completion: &hltb,
        reviews: steamspy.as_ref().map(|s| s as &dyn ReviewAggregator),
    };
    let outcome = pipeline::run(&user, &sources, &overrides, &supplemental)?;

    report::write_report_file(&config.files.output, &outcome.games, config.with_reviews)?;
    info!(
        "Wrote {} games to {}",
        outcome.games.len(),
        config.files.output.display()
    );

    if !config.quiet {
        for game in &outcome.games {
            println!("{game}");
        }
    }
    if !outcome.warnings.is_empty() {
        info!("{} warning(s) during this run", outcome.warnings.len());
    }

    Ok(())
}
