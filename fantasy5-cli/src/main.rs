mod display;
mod import;

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};

use fantasy5_db::db::{count_draws, db_path, fetch_history, fetch_last_draws, insert_draw, migrate, open_db};
use fantasy5_db::models::StoredDraw;
use fantasy5_db::rusqlite::Connection;
use fantasy5_engine::frequency::{analyze, count_numbers, rank_by_frequency};
use fantasy5_engine::models::DEFAULT_MAX_NUMBER;
use fantasy5_engine::{run_strategy_with_progress, StrategyConfig};
use crate::display::{
    display_draws, display_import_summary, display_ranking, display_run_header, display_stats,
    write_ranking_csv, write_ranking_json,
};
use crate::import::parse_date;

#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq)]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
    Json,
}

#[derive(Parser)]
#[command(name = "fantasy5", about = "Fantasy 5 hot-pair ranking by historical resampling")]
struct Cli {
    /// SQLite database (default: ./data/fantasy5.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Highest number of the draw universe
    #[arg(long, global = true)]
    max_number: Option<u8>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import draws from a CSV file (columns: date, NO.1 .. NO.5)
    Import {
        /// Path to the CSV file
        #[arg(short, long, default_value = "Fan_number.csv")]
        file: PathBuf,
    },

    /// Print the database path
    DbPath,

    /// List the most recent draws
    List {
        /// Number of draws to show
        #[arg(short, long, default_value = "20")]
        last: u32,
    },

    /// Number frequencies with hot / over-hot tags
    Stats {
        /// Analysis window (number of draws)
        #[arg(short, long, default_value = "63")]
        window: usize,

        /// Over-heat window (number of draws)
        #[arg(short, long, default_value = "3")]
        exclude_recent: usize,

        /// Hot set size
        #[arg(short, long, default_value = "13")]
        top_n: usize,
    },

    /// Add one draw
    Add {
        /// Draw date (YYYY/M/D or YYYY-MM-DD)
        #[arg(short, long)]
        date: String,

        /// The five numbers drawn
        #[arg(num_args = 5, required = true)]
        numbers: Vec<u8>,
    },

    /// Rank hot pairs for the next draw
    Run {
        /// JSON strategy configuration; flags below override its values
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[arg(long)]
        recent_n: Option<usize>,

        #[arg(long)]
        top_n: Option<usize>,

        #[arg(long)]
        exclude_recent: Option<usize>,

        #[arg(long)]
        simulations: Option<usize>,

        #[arg(long)]
        sample_size: Option<usize>,

        #[arg(long)]
        seed: Option<u64>,

        /// Ceiling on --simulations
        #[arg(long)]
        max_simulations: Option<usize>,

        /// Estimate pairs on all cores (per-pair derived seeds)
        #[arg(long)]
        parallel: bool,

        /// Pairs highlighted before the full ranking
        #[arg(long, default_value = "3")]
        top: usize,

        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },
}

struct RunOverrides {
    recent_n: Option<usize>,
    top_n: Option<usize>,
    exclude_recent: Option<usize>,
    simulations: Option<usize>,
    sample_size: Option<usize>,
    seed: Option<u64>,
    max_simulations: Option<usize>,
    max_number: Option<u8>,
    parallel: bool,
}

impl RunOverrides {
    fn apply(self, mut config: StrategyConfig) -> StrategyConfig {
        if let Some(v) = self.recent_n { config.recent_n = v; }
        if let Some(v) = self.top_n { config.top_n = v; }
        if let Some(v) = self.exclude_recent { config.exclude_recent = v; }
        if let Some(v) = self.simulations { config.simulations = v; }
        if let Some(v) = self.sample_size { config.sample_size = v; }
        if let Some(v) = self.seed { config.seed = v; }
        if let Some(v) = self.max_simulations { config.max_simulations = v; }
        if let Some(v) = self.max_number { config.max_number = v; }
        config.parallel |= self.parallel;
        config
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let path = cli.db.clone().unwrap_or_else(db_path);
    let conn = open_db(&path)?;
    migrate(&conn)?;
    let max_number = cli.max_number.unwrap_or(DEFAULT_MAX_NUMBER);

    match cli.command {
        Command::Import { file } => cmd_import(&conn, &file, max_number),
        Command::DbPath => {
            println!("{}", path.display());
            Ok(())
        }
        Command::List { last } => cmd_list(&conn, last, max_number),
        Command::Stats { window, exclude_recent, top_n } => {
            cmd_stats(&conn, window, exclude_recent, top_n, max_number)
        }
        Command::Add { date, numbers } => cmd_add(&conn, &date, &numbers, max_number),
        Command::Run {
            config,
            recent_n,
            top_n,
            exclude_recent,
            simulations,
            sample_size,
            seed,
            max_simulations,
            parallel,
            top,
            format,
        } => {
            let overrides = RunOverrides {
                recent_n,
                top_n,
                exclude_recent,
                simulations,
                sample_size,
                seed,
                max_simulations,
                max_number: cli.max_number,
                parallel,
            };
            let config = overrides.apply(load_config(config.as_deref())?);
            cmd_run(&conn, &config, top, format)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<StrategyConfig> {
    let Some(path) = path else {
        return Ok(StrategyConfig::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read {:?}", path))?;
    let config: StrategyConfig = serde_json::from_str(&json)
        .with_context(|| format!("Invalid JSON in {:?}", path))?;
    Ok(config)
}

fn empty_db(conn: &Connection) -> Result<bool> {
    if count_draws(conn)? == 0 {
        println!("Empty database. Run first: fantasy5 import");
        return Ok(true);
    }
    Ok(false)
}

fn cmd_import(conn: &Connection, file: &Path, max_number: u8) -> Result<()> {
    let result = import::import_csv(conn, file, max_number)?;
    display_import_summary(&result);
    Ok(())
}

fn cmd_list(conn: &Connection, last: u32, max_number: u8) -> Result<()> {
    if empty_db(conn)? {
        return Ok(());
    }
    let draws = fetch_last_draws(conn, last, max_number)?;
    display_draws(&draws);
    Ok(())
}

/// Same entry checks as `run` for the parameters `stats` shares with it.
fn stats_config(window: usize, exclude_recent: usize, top_n: usize, max_number: u8) -> Result<StrategyConfig> {
    let config = StrategyConfig {
        recent_n: window,
        exclude_recent,
        top_n,
        max_number,
        ..Default::default()
    };
    config.validate().context("Invalid stats parameters")?;
    Ok(config)
}

fn cmd_stats(conn: &Connection, window: usize, exclude_recent: usize, top_n: usize, max_number: u8) -> Result<()> {
    let config = stats_config(window, exclude_recent, top_n, max_number)?;
    if empty_db(conn)? {
        return Ok(());
    }
    let limit = u32::try_from(config.recent_n).unwrap_or(u32::MAX);
    let history = fetch_history(conn, limit, config.max_number)?;
    let stats = rank_by_frequency(&count_numbers(history.draws(), config.max_number));
    let hot = analyze(&history, config.recent_n, config.exclude_recent, config.top_n);
    display_stats(&stats, &hot, history.len());
    Ok(())
}

fn cmd_add(conn: &Connection, raw_date: &str, numbers: &[u8], max_number: u8) -> Result<()> {
    let stored = StoredDraw::new(parse_date(raw_date)?, numbers, max_number)?;
    if insert_draw(conn, &stored)? {
        println!("Draw {} added: {}", stored.date, stored.draw);
    } else {
        println!("A draw dated {} already exists (ignored).", stored.date);
    }
    Ok(())
}

fn cmd_run(conn: &Connection, config: &StrategyConfig, top: usize, format: OutputFormat) -> Result<()> {
    if empty_db(conn)? {
        return Ok(());
    }
    let limit = u32::try_from(config.recent_n).unwrap_or(u32::MAX);
    let history = fetch_history(conn, limit, config.max_number)?;

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} pairs ({eta})",
        )?
        .progress_chars("=> "),
    );

    let analysis = run_strategy_with_progress(&history, config, |done, total| {
        pb.set_length(total as u64);
        pb.set_position(done as u64);
    })
    .context("Strategy run failed")?;
    pb.finish_and_clear();

    match format {
        OutputFormat::Table => {
            display_run_header(config, &analysis);
            display_ranking(&analysis.ranking, top);
        }
        OutputFormat::Csv => write_ranking_csv(&analysis.ranking, io::stdout().lock())?,
        OutputFormat::Json => {
            write_ranking_json(&analysis.ranking, io::stdout().lock())?;
            println!();
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_overrides() -> RunOverrides {
        RunOverrides {
            recent_n: None,
            top_n: None,
            exclude_recent: None,
            simulations: None,
            sample_size: None,
            seed: None,
            max_simulations: None,
            max_number: None,
            parallel: false,
        }
    }

    #[test]
    fn test_overrides_keep_unset_values() {
        let base = StrategyConfig { top_n: 4, seed: 9, ..Default::default() };
        let config = RunOverrides { seed: Some(1), ..no_overrides() }.apply(base);
        assert_eq!(config.top_n, 4);
        assert_eq!(config.seed, 1);
        assert!(!config.parallel);
    }

    #[test]
    fn test_parallel_flag_or_config() {
        let base = StrategyConfig { parallel: true, ..Default::default() };
        assert!(no_overrides().apply(base).parallel);
        let config = RunOverrides { parallel: true, ..no_overrides() }.apply(StrategyConfig::default());
        assert!(config.parallel);
    }

    #[test]
    fn test_cli_parses_run() {
        let cli = Cli::try_parse_from([
            "fantasy5", "run", "--top-n", "4", "--seed", "1", "--format", "json", "--db", "x.db",
        ])
        .unwrap();
        assert_eq!(cli.db, Some(PathBuf::from("x.db")));
        match cli.command {
            Command::Run { top_n, seed, format, .. } => {
                assert_eq!(top_n, Some(4));
                assert_eq!(seed, Some(1));
                assert_eq!(format, OutputFormat::Json);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_cli_add_needs_five_numbers() {
        assert!(Cli::try_parse_from(["fantasy5", "add", "-d", "2026/2/6", "1", "2", "3", "4", "5"]).is_ok());
        assert!(Cli::try_parse_from(["fantasy5", "add", "-d", "2026/2/6", "1", "2", "3"]).is_err());
    }

    #[test]
    fn test_stats_parameters_validated() {
        assert!(stats_config(63, 3, 13, 39).is_ok());
        assert!(stats_config(5, 0, 13, 39).is_err());
        assert!(stats_config(3, 9, 4, 39).is_err());
        assert!(stats_config(5, 2, 0, 39).is_err());
        assert!(stats_config(5, 2, 4, 3).is_err());
    }

    #[test]
    fn test_cmd_stats_rejects_bad_windows() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        let err = cmd_stats(&conn, 5, 0, 13, 39).unwrap_err();
        assert!(format!("{err:#}").contains("exclude_recent must be >= 1"), "{err:#}");
        let err = cmd_stats(&conn, 3, 9, 4, 39).unwrap_err();
        assert!(format!("{err:#}").contains("exclude_recent (9) > recent_n (3)"), "{err:#}");
    }

    #[test]
    fn test_load_default_config() {
        assert_eq!(load_config(None).unwrap(), StrategyConfig::default());
    }
}
