use owo_colors::OwoColorize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::scoring::{Criterion, RankedProgram, Rating, Ranking};

const EMPTY_MESSAGE: &str = "No programs to rank.";

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format a score with two decimals.
/// If incomplete is true, appends asterisk to indicate substituted ratings
pub fn format_score(score: f64, incomplete: bool) -> String {
    if incomplete {
        format!("{:.2}*", score)
    } else {
        format!("{:.2}", score)
    }
}

/// Format a weight without trailing zeros for whole numbers ("10", "2.5")
pub fn format_weight(weight: f64) -> String {
    if weight.fract() == 0.0 {
        format!("{:.0}", weight)
    } else {
        format!("{:.2}", weight)
    }
}

/// Horizontal bar of `width` cells filled in proportion to `value / max`
pub fn score_bar(value: f64, max: f64, width: usize) -> String {
    let ratio = if max > 0.0 {
        (value / max).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let filled = (ratio * width as f64).round() as usize;
    let empty = width.saturating_sub(filled);
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a name to fit available width, accounting for Unicode
fn truncate_name(name: &str, max_width: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_width {
        name.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Format the ranking as a table with columns: Index, Score, Bar, Program
/// Index column: 3 chars (fits "99."), right-aligned
/// Score column: 6 chars, right-aligned (fits "45.00*")
pub fn format_ranked_table(ranking: &Ranking, use_colors: bool) -> String {
    if ranking.is_empty() {
        return EMPTY_MESSAGE.to_string();
    }

    let term_width = get_terminal_width();

    let index_width = 3;
    let score_width = 6;
    let bar_width = 10;
    let separator = "  ";
    let fixed_width = index_width + 1 + score_width + separator.len() * 2 + bar_width;

    ranking
        .entries
        .iter()
        .map(|entry| {
            let index_str = format!("{:>2}.", entry.rank);
            let score_str = format_score(entry.result.score, entry.result.incomplete);
            let score_padded = format!("{:>width$}", score_str, width = score_width);
            let bar = score_bar(entry.result.score, ranking.max_score, bar_width);

            let name = match term_width {
                Some(width) if width > fixed_width + 10 => {
                    truncate_name(&entry.name, width - fixed_width)
                }
                Some(_) => truncate_name(&entry.name, 20),
                None => entry.name.clone(),
            };

            if use_colors {
                let ratio = if ranking.max_score > 0.0 {
                    entry.result.score / ranking.max_score
                } else {
                    0.0
                };
                let bar = if ratio >= 0.7 {
                    bar.green().to_string()
                } else if ratio >= 0.4 {
                    bar.yellow().to_string()
                } else {
                    bar.red().to_string()
                };
                format!(
                    "{} {}{}{}{}{}",
                    index_str.dimmed(),
                    score_padded.bold(),
                    separator,
                    bar,
                    separator,
                    name
                )
            } else {
                format!(
                    "{} {}{}{}{}{}",
                    index_str, score_padded, separator, bar, separator, name
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format one program's per-criterion breakdown (for `show` and verbose mode)
///
/// Each line shows rating × weight = contribution and a bar of the rating
/// out of 5. Substituted ratings are marked with `*`.
pub fn format_breakdown(entry: &RankedProgram, use_colors: bool) -> String {
    let breakdown = &entry.result.breakdown;
    let header = format!(
        "#{} {}  score {}",
        entry.rank,
        entry.name,
        format_score(entry.result.score, entry.result.incomplete)
    );

    let mut lines = vec![if use_colors {
        header.bold().to_string()
    } else {
        header
    }];

    for c in &breakdown.contributions {
        let mark = if c.substituted { "*" } else { " " };
        let bar = score_bar(c.rating.as_f64(), Rating::MAX as f64, Rating::MAX as usize);
        let label = format!("{:<26}", c.criterion.label());
        let bar = if use_colors {
            bar.cyan().to_string()
        } else {
            bar
        };
        lines.push(format!(
            "  {}{}{} x {:>5} = {:>7.2}  {}",
            label,
            c.rating.value(),
            mark,
            format_weight(c.weight),
            c.contribution,
            bar
        ));
    }

    lines.push(format!(
        "  {:<26}{:>13}{:>10.2}",
        "Total weight",
        format_weight(breakdown.total_weight),
        breakdown.contributions.iter().map(|c| c.contribution).sum::<f64>()
    ));

    if entry.result.incomplete {
        lines.push(format!(
            "  * rating missing, neutral {} used",
            Rating::NEUTRAL.value()
        ));
    }

    lines.join("\n")
}

/// Format several programs' profiles side by side: one row per criterion,
/// one column per program, each cell the rating and a 5-cell bar.
pub fn format_comparison(entries: &[&RankedProgram], use_colors: bool) -> String {
    if entries.is_empty() {
        return EMPTY_MESSAGE.to_string();
    }

    let label_width = 9;
    let column_width = 14;

    let mut header = format!("{:<label_width$}", "");
    for entry in entries {
        let title = truncate_name(&format!("#{} {}", entry.rank, entry.name), column_width - 2);
        header.push_str(&format!("{:<column_width$}", title));
    }
    let mut lines = vec![if use_colors {
        header.trim_end().bold().to_string()
    } else {
        header.trim_end().to_string()
    }];

    for criterion in Criterion::ALL {
        let mut line = format!("{:<label_width$}", criterion.short_label());
        for entry in entries {
            let Some(c) = entry
                .result
                .breakdown
                .contributions
                .iter()
                .find(|c| c.criterion == criterion)
            else {
                line.push_str(&" ".repeat(column_width));
                continue;
            };
            let mark = if c.substituted { "*" } else { " " };
            let bar = score_bar(c.rating.as_f64(), Rating::MAX as f64, Rating::MAX as usize);
            let bar = if use_colors {
                bar.cyan().to_string()
            } else {
                bar
            };
            // Pad by visible width; the bar may carry color codes
            line.push_str(&format!("{}{} {}{}", c.rating.value(), mark, bar, " ".repeat(column_width - 8)));
        }
        lines.push(line.trim_end().to_string());
    }

    let mut score_line = format!("{:<label_width$}", "Score");
    for entry in entries {
        score_line.push_str(&format!(
            "{:<column_width$}",
            format_score(entry.result.score, entry.result.incomplete)
        ));
    }
    lines.push(score_line.trim_end().to_string());

    if entries.iter().any(|e| e.result.incomplete) {
        lines.push(format!(
            "* rating missing, neutral {} used",
            Rating::NEUTRAL.value()
        ));
    }

    lines.join("\n")
}

/// Format the ranking as tab-separated values for scripting
/// Columns: rank, score, name (no headers, no colors)
pub fn format_tsv(ranking: &Ranking) -> String {
    ranking
        .entries
        .iter()
        .map(|entry| format!("{}\t{:.2}\t{}", entry.rank, entry.result.score, entry.name))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format the full ranking, including breakdowns and warnings, as pretty JSON
pub fn format_json(ranking: &Ranking) -> serde_json::Result<String> {
    serde_json::to_string_pretty(ranking)
}
