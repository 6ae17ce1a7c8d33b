use std::io::Write;

use anyhow::Result;
use comfy_table::{Table, ContentArrangement, presets::UTF8_FULL, Cell, Color};
use serde::Serialize;

use crate::import::ImportResult;
use fantasy5_db::models::StoredDraw;
use fantasy5_engine::frequency::HotSet;
use fantasy5_engine::models::{NumberStat, ScoredPair};
use fantasy5_engine::{Analysis, StrategyConfig};

pub fn display_draws(draws: &[StoredDraw]) {
    if draws.is_empty() {
        println!("No draws to display.");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Date", "Numbers"]);

    for stored in draws {
        table.add_row(vec![stored.date.clone(), stored.draw.to_string()]);
    }

    println!("{table}");
}

pub fn display_import_summary(result: &ImportResult) {
    println!("Import finished:");
    println!("  Rows read          : {}", result.total_records);
    println!("  Inserted           : {}", result.inserted);
    println!("  Duplicates skipped : {}", result.skipped);
    if result.errors > 0 {
        println!("  Errors             : {}", result.errors);
        for line in rejected_lines(result) {
            println!("    {}", line);
        }
    }
}

fn rejected_lines(result: &ImportResult) -> Vec<String> {
    result
        .rejected
        .iter()
        .map(|(row, cause)| format!("row {}: {}", row, cause))
        .collect()
}

/// Frequency table of a window; hot numbers in green, over-hot ones in red.
pub fn display_stats(stats: &[NumberStat], hot: &HotSet, window: usize) {
    println!("\nFrequencies over the last {} draws\n", window);

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["#", "Number", "Count", "Tag"]);

    for (i, stat) in stats.iter().enumerate() {
        let (tag, color) = if hot.over_hot.contains(&stat.number) {
            ("OVER-HOT", Color::Red)
        } else if hot.numbers.contains(&stat.number) {
            ("HOT", Color::Green)
        } else {
            ("-", Color::White)
        };
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(format!("{:2}", stat.number)),
            Cell::new(stat.count),
            Cell::new(tag).fg(color),
        ]);
    }
    println!("{table}");
}

pub fn display_run_header(config: &StrategyConfig, analysis: &Analysis) {
    println!(
        "\nWindow {} draws | top_n {} | over-heat window {} | {} simulations x {} draws | seed {}",
        analysis.window_len,
        config.top_n,
        config.exclude_recent,
        config.simulations,
        config.sample_size,
        config.seed,
    );
    let hot: Vec<String> = analysis.hot_set.numbers.iter().map(|n| n.to_string()).collect();
    let over: Vec<String> = analysis.hot_set.over_hot.iter().map(|n| n.to_string()).collect();
    println!("Hot numbers      : {}", if hot.is_empty() { "-".to_string() } else { hot.join(", ") });
    println!("Over-hot excluded: {}", if over.is_empty() { "-".to_string() } else { over.join(", ") });
}

fn ranking_table(ranking: &[ScoredPair]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["#", "Pair", "Raw hit rate", "Score", "Reason"]);

    for (i, sp) in ranking.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(sp.pair.to_string()),
            Cell::new(format!("{:.4}", sp.raw_probability)),
            Cell::new(format!("{:.4}", sp.score)),
            Cell::new(sp.reason()),
        ]);
    }
    table
}

pub fn display_ranking(ranking: &[ScoredPair], top: usize) {
    if ranking.is_empty() {
        println!("\nNo pair to rank: the hot set has fewer than two numbers.");
        return;
    }

    println!("\nTop {} pairs\n", top.min(ranking.len()));
    println!("{}", ranking_table(&ranking[..top.min(ranking.len())]));

    println!("\nFull ranking\n");
    println!("{}", ranking_table(ranking));
}

#[derive(Debug, Serialize)]
pub struct RankingRow {
    pub rank: usize,
    pub pair: String,
    pub raw_probability: f64,
    pub score: f64,
    pub reason: String,
}

pub fn ranking_rows(ranking: &[ScoredPair]) -> Vec<RankingRow> {
    ranking
        .iter()
        .enumerate()
        .map(|(i, sp)| RankingRow {
            rank: i + 1,
            pair: sp.pair.to_string(),
            raw_probability: sp.raw_probability,
            score: sp.score,
            reason: sp.reason(),
        })
        .collect()
}

pub fn write_ranking_csv<W: Write>(ranking: &[ScoredPair], out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for row in ranking_rows(ranking) {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_ranking_json<W: Write>(ranking: &[ScoredPair], out: W) -> Result<()> {
    serde_json::to_writer_pretty(out, &ranking_rows(ranking))?;
    Ok(())
}
