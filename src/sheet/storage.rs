use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::csv::{parse_sheet, render_ranked_sheet, render_sheet, ParsedSheet};
use crate::scoring::{ProgramRatings, Ranking, CRITERIA_COUNT};

/// Get the default sheet path (~/.config/residency-ranker/my_rankings.csv)
pub fn get_default_sheet_path() -> PathBuf {
    crate::config::get_config_dir().join("my_rankings.csv")
}

/// Load a rating sheet from a CSV file
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid sheet.
pub fn load_sheet(path: &Path) -> Result<ParsedSheet> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read sheet at {}", path.display()))?;

    let sheet = parse_sheet(&content)
        .with_context(|| format!("Failed to parse sheet {}", path.display()))?;

    tracing::debug!(
        programs = sheet.programs.len(),
        path = %path.display(),
        "loaded sheet"
    );

    Ok(sheet)
}

/// Save programs to a CSV file atomically
pub fn save_sheet(path: &Path, programs: &[ProgramRatings]) -> Result<()> {
    write_atomic(path, &render_sheet(programs))
}

/// Save programs in ranked order with a `Final Score` column
pub fn save_ranked_sheet(path: &Path, ranking: &Ranking, programs: &[ProgramRatings]) -> Result<()> {
    write_atomic(path, &render_ranked_sheet(ranking, programs))
}

/// Write a starter sheet with one neutral example program.
///
/// Refuses to overwrite an existing file.
pub fn write_template(path: &Path) -> Result<()> {
    if path.exists() {
        anyhow::bail!("{} already exists; not overwriting", path.display());
    }
    let example = ProgramRatings::with_ratings("Example Hospital", [3; CRITERIA_COUNT]);
    save_sheet(path, &[example])
}

/// Write text to a file so readers never observe a partial write.
/// Creates the parent directory if needed.
pub(crate) fn write_atomic(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))?;

    file.commit()
        .with_context(|| format!("Failed to save {}", path.display()))?;

    Ok(())
}
