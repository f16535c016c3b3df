use anyhow::Result;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::config::{get_config_path, save_config, Config};
use crate::scoring::{
    Criterion, MissingRatingPolicy, ScoreScale, ScoringConfig, Weights, WeightsConfig,
    DEFAULT_WEIGHT, MAX_SLIDER_WEIGHT,
};

/// Prompt user with a message and return their trimmed input.
fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    std::io::stdout().flush()?;
    let mut input = String::new();
    std::io::stdin().lock().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

/// Prompt user with a message and a default value. Returns default if input is empty.
fn prompt_with_default(message: &str, default: &str) -> Result<String> {
    let input = prompt(&format!("{} [{}]: ", message, default))?;
    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input)
    }
}

/// Prompt user with a yes/no question. Returns bool based on input and default.
fn prompt_yes_no(message: &str, default_yes: bool) -> Result<bool> {
    let hint = if default_yes { "Y/n" } else { "y/N" };
    let input = prompt(&format!("{} [{}]: ", message, hint))?;
    let input = input.to_lowercase();
    if input.is_empty() {
        Ok(default_yes)
    } else {
        Ok(input == "y" || input == "yes")
    }
}

/// Print text with a typewriter effect, one character at a time.
fn typewriter(text: &str) {
    use std::thread;
    use std::time::Duration;
    for c in text.chars() {
        print!("{}", c);
        std::io::stdout().flush().ok();
        thread::sleep(Duration::from_millis(18));
    }
    println!();
}

fn parse_weight(input: &str) -> Result<f64, String> {
    let weight: f64 = input
        .parse()
        .map_err(|_| "must be a number".to_string())?;
    if !(0.0..=MAX_SLIDER_WEIGHT).contains(&weight) {
        return Err(format!("must be between 0 and {}", MAX_SLIDER_WEIGHT));
    }
    Ok(weight)
}

fn parse_policy(input: &str) -> Result<MissingRatingPolicy, String> {
    match input.to_lowercase().as_str() {
        "neutral" => Ok(MissingRatingPolicy::Neutral),
        "reject" => Ok(MissingRatingPolicy::Reject),
        _ => Err("expected 'neutral' or 'reject'".to_string()),
    }
}

fn parse_scale(input: &str) -> Result<ScoreScale, String> {
    match input.to_lowercase().as_str() {
        "average" => Ok(ScoreScale::Average),
        "points" => Ok(ScoreScale::Points),
        _ => Err("expected 'average' or 'points'".to_string()),
    }
}

/// Run the interactive init wizard to create a config file.
///
/// If `default_path` is Some, uses that as the suggested config file path.
pub fn run_init_wizard(default_path: Option<PathBuf>) -> Result<()> {
    println!();
    typewriter("Residency Ranker Configuration Wizard");
    println!("=====================================");
    println!();

    // 1. Weights
    typewriter("Each program gets a 1-5 rating on nine criteria. Weights decide how much each criterion counts.");
    typewriter("Only the ratio between weights matters: 10 and 20 means the second counts twice as much.");
    let configure_weights = prompt_yes_no("Set weights now? (n gives every criterion 10)", true)?;

    let weights = if configure_weights {
        let mut weights = Weights::default();
        for criterion in Criterion::ALL {
            let weight = loop {
                let input = prompt_with_default(
                    &format!("  Weight: {} (0-{})", criterion, MAX_SLIDER_WEIGHT),
                    &DEFAULT_WEIGHT.to_string(),
                )?;
                match parse_weight(&input) {
                    Ok(w) => break w,
                    Err(e) => println!("  Invalid: {}. Try again.", e),
                }
            };
            weights.set(criterion, weight);
        }
        if weights.total() <= 0.0 {
            println!("  All weights are zero; using defaults instead.");
            Weights::default()
        } else {
            weights
        }
    } else {
        Weights::default()
    };

    // 2. Missing ratings
    println!();
    typewriter("If a program is missing a rating, it can be filled with a neutral 3 (flagged with *) or rejected.");
    let missing_ratings = loop {
        let input = prompt_with_default("Missing ratings (neutral/reject)", "neutral")?;
        match parse_policy(&input) {
            Ok(p) => break p,
            Err(e) => println!("  Invalid: {}. Try again.", e),
        }
    };

    // 3. Scale
    println!();
    typewriter("Scores can be shown as a 1-5 weighted average, or as points out of the total weight.");
    let scale = loop {
        let input = prompt_with_default("Score scale (average/points)", "average")?;
        match parse_scale(&input) {
            Ok(s) => break s,
            Err(e) => println!("  Invalid: {}. Try again.", e),
        }
    };

    // 4. Sheet
    println!();
    let sheet_default = crate::sheet::get_default_sheet_path();
    let sheet = prompt_with_default(
        "Default ratings sheet (CSV)",
        &sheet_default.display().to_string(),
    )?;

    // 5. Config path
    let default_config_path = default_path.unwrap_or_else(get_config_path);
    println!();
    let path_str = prompt_with_default(
        "Where should the config be saved?",
        &default_config_path.display().to_string(),
    )?;
    let config_path = PathBuf::from(&path_str);

    if config_path.exists() {
        let overwrite = prompt_yes_no(
            &format!(
                "Config already exists at {}. Overwrite?",
                config_path.display()
            ),
            false,
        )?;
        if !overwrite {
            println!("Aborted.");
            return Ok(());
        }
    }

    // 6. Write config
    let config = Config {
        sheet: Some(sheet),
        theme: None,
        scoring: Some(ScoringConfig {
            weights: Some(WeightsConfig::from_weights(&weights)),
            missing_ratings: Some(missing_ratings),
            scale: Some(scale),
        }),
    };
    save_config(&config_path, &config)?;

    println!();
    println!("Config written to {}", config_path.display());
    println!("Run `residency-ranker template` to create a starter sheet, then `residency-ranker tui`.");

    Ok(())
}
