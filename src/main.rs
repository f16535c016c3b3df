use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use residency_ranker::config::{self, Config};
use residency_ranker::scoring::{self, ProgramRatings, Ranking};
use residency_ranker::sheet;
use residency_ranker::stderr_buffer::StderrBufferWriter;

const EXIT_SUCCESS: i32 = 0;
const EXIT_INVALID_INPUT: i32 = 1;
const EXIT_IO: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Tsv,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rank programs by weighted score (default if no subcommand)
    Rank {
        /// Ratings sheet (defaults to the configured sheet)
        sheet: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Show the per-criterion breakdown for a program by its rank
    Show {
        /// Rank of the program (1-based, as shown in rank)
        index: usize,
        sheet: Option<PathBuf>,
    },
    /// Compare programs' per-criterion profiles side by side
    Compare {
        /// Ranks or names of the programs to compare
        #[arg(required = true, num_args = 1..)]
        programs: Vec<String>,

        /// Ratings sheet (defaults to the configured sheet)
        #[arg(short, long)]
        sheet: Option<PathBuf>,
    },
    /// Write the sheet in ranked order with a Final Score column
    Export {
        /// Output CSV path
        out: PathBuf,
        sheet: Option<PathBuf>,
    },
    /// Interactive editor for ratings and weights
    Tui { sheet: Option<PathBuf> },
    /// Write a starter sheet
    Template {
        /// Where to write it (defaults to the configured sheet)
        path: Option<PathBuf>,
    },
    /// Create a config file interactively
    Init,
}

#[derive(Parser, Debug)]
#[command(name = "residency-ranker")]
#[command(about = "Rank residency programs by weighted criteria", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/residency-ranker/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn init_logging(verbose: bool) {
    let log_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(std::io::stderr().is_terminal())
                .with_writer(StderrBufferWriter::default),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let command = cli.command.unwrap_or(Commands::Rank {
        sheet: None,
        format: OutputFormat::Table,
    });
    let start_time = Instant::now();
    let config_path = cli.config.map(PathBuf::from);

    // The wizard writes the config, so it runs before one is loaded
    if let Commands::Init = command {
        if let Err(e) = config::run_init_wizard(config_path) {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
        std::process::exit(EXIT_SUCCESS);
    }

    let config = match config::load_config(config_path.clone()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Validate scoring config at startup
    let effective_scoring = config.effective_scoring();
    if let Err(errors) = scoring::validate_scoring(&effective_scoring) {
        eprintln!("Scoring config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }
    let weights = effective_scoring.weights();
    let options = effective_scoring.options();
    tracing::debug!(?options, total_weight = weights.total(), "scoring configured");

    match command {
        Commands::Rank { sheet, format } => {
            let sheet_path = resolve_sheet(sheet, &config);
            let programs = load_programs(&sheet_path);
            let ranking = rank_or_exit(&programs, &weights, &options);
            let use_colors = residency_ranker::output::should_use_colors();

            match format {
                OutputFormat::Table => {
                    println!(
                        "{}",
                        residency_ranker::output::format_ranked_table(&ranking, use_colors)
                    );
                    if cli.verbose {
                        for entry in &ranking.entries {
                            println!();
                            println!(
                                "{}",
                                residency_ranker::output::format_breakdown(entry, use_colors)
                            );
                        }
                    }
                }
                OutputFormat::Tsv => {
                    print!("{}", residency_ranker::output::format_tsv(&ranking));
                }
                OutputFormat::Json => match residency_ranker::output::format_json(&ranking) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Output error: {}", e);
                        std::process::exit(EXIT_IO);
                    }
                },
            }

            tracing::debug!(
                programs = ranking.len(),
                elapsed = ?start_time.elapsed(),
                "ranking complete"
            );
        }
        Commands::Show { index, sheet } => {
            let sheet_path = resolve_sheet(sheet, &config);
            let programs = load_programs(&sheet_path);
            let ranking = rank_or_exit(&programs, &weights, &options);

            let Some(entry) = ranking.get_rank(index) else {
                if ranking.is_empty() {
                    eprintln!("No programs to rank.");
                } else {
                    eprintln!(
                        "Invalid index {}. Must be between 1 and {}.",
                        index,
                        ranking.len()
                    );
                }
                std::process::exit(EXIT_INVALID_INPUT);
            };

            let use_colors = residency_ranker::output::should_use_colors();
            println!(
                "{}",
                residency_ranker::output::format_breakdown(entry, use_colors)
            );
        }
        Commands::Compare { programs: queries, sheet } => {
            let sheet_path = resolve_sheet(sheet, &config);
            let programs = load_programs(&sheet_path);
            let ranking = rank_or_exit(&programs, &weights, &options);

            let mut entries = Vec::with_capacity(queries.len());
            for query in &queries {
                match ranking.lookup(query) {
                    Some(entry) => entries.push(entry),
                    None => {
                        eprintln!("No program matches '{}' (use a rank or a name).", query);
                        std::process::exit(EXIT_INVALID_INPUT);
                    }
                }
            }

            let use_colors = residency_ranker::output::should_use_colors();
            println!(
                "{}",
                residency_ranker::output::format_comparison(&entries, use_colors)
            );
        }
        Commands::Export { out, sheet } => {
            let sheet_path = resolve_sheet(sheet, &config);
            let programs = load_programs(&sheet_path);
            let ranking = rank_or_exit(&programs, &weights, &options);

            if let Err(e) = sheet::save_ranked_sheet(&out, &ranking, &programs) {
                eprintln!("I/O error: {:#}", e);
                std::process::exit(EXIT_IO);
            }
            println!("Wrote {} ranked programs to {}", ranking.len(), out.display());
        }
        Commands::Tui { sheet } => {
            let sheet_path = resolve_sheet(sheet, &config);
            let programs = load_programs(&sheet_path);
            let target_config = config_path.unwrap_or_else(config::get_config_path);
            let theme = residency_ranker::tui::resolve_theme(config.theme.unwrap_or_default());

            let app = residency_ranker::tui::App::new(
                programs,
                config,
                sheet_path,
                target_config,
                theme,
            );
            if let Err(e) = residency_ranker::tui::run_tui(app) {
                eprintln!("TUI error: {:#}", e);
                std::process::exit(EXIT_IO);
            }
        }
        Commands::Template { path } => {
            let target = resolve_sheet(path, &config);
            if let Err(e) = sheet::write_template(&target) {
                eprintln!("I/O error: {:#}", e);
                std::process::exit(EXIT_IO);
            }
            println!("Wrote template sheet to {}", target.display());
        }
        // Handled before the config is loaded
        Commands::Init => {}
    }

    std::process::exit(EXIT_SUCCESS);
}

/// Command-line path, then the configured sheet, then the default location
fn resolve_sheet(arg: Option<PathBuf>, config: &Config) -> PathBuf {
    arg.or_else(|| config.sheet_path())
        .unwrap_or_else(sheet::get_default_sheet_path)
}

fn load_programs(path: &Path) -> Vec<ProgramRatings> {
    match sheet::load_sheet(path) {
        Ok(parsed) => {
            for column in &parsed.ignored_columns {
                tracing::warn!("ignoring unknown column '{}' in {}", column, path.display());
            }
            parsed.programs
        }
        Err(e) => {
            eprintln!("Sheet error: {:#}", e);
            std::process::exit(EXIT_IO);
        }
    }
}

fn rank_or_exit(
    programs: &[ProgramRatings],
    weights: &scoring::Weights,
    options: &scoring::ScoringOptions,
) -> Ranking {
    match scoring::rank_programs(programs, weights, options) {
        Ok(ranking) => {
            for warning in &ranking.warnings {
                tracing::warn!("{}", warning);
            }
            ranking
        }
        Err(errors) => {
            eprintln!("Input error: {}", errors);
            std::process::exit(EXIT_INVALID_INPUT);
        }
    }
}
