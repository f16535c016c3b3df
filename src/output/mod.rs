pub mod formatter;

pub use formatter::{
    format_breakdown, format_comparison, format_json, format_ranked_table, format_score,
    format_tsv, format_weight, score_bar, should_use_colors,
};
