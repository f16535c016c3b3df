//! CSV layout for rating sheets.
//!
//! One header row with a `Program` column and one column per criterion,
//! matching what spreadsheet exports of the rankings look like. A trailing
//! `Final Score` column is written on export and ignored on import.

use crate::scoring::{Criterion, ProgramRatings, Ranking};

pub const PROGRAM_COLUMN: &str = "Program";
pub const FINAL_SCORE_COLUMN: &str = "Final Score";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SheetError {
    #[error("missing 'Program' column")]
    MissingProgramColumn,

    #[error("column '{0}' appears more than once")]
    DuplicateColumn(String),

    #[error("line {line}: column '{column}' has non-numeric value '{value}'")]
    InvalidNumber {
        line: usize,
        column: String,
        value: String,
    },

    #[error("line {line}: unterminated quoted field")]
    UnterminatedQuote { line: usize },
}

/// Programs read from a sheet, plus header cells that were not understood.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedSheet {
    pub programs: Vec<ProgramRatings>,
    pub ignored_columns: Vec<String>,
}

enum Column {
    Program,
    Rating(Criterion),
    Ignored,
}

/// Parse sheet text into programs. Empty cells are missing ratings.
pub fn parse_sheet(content: &str) -> Result<ParsedSheet, SheetError> {
    // Spreadsheet "CSV UTF-8" exports start with a byte order mark
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut records = split_records(content)?
        .into_iter()
        .filter(|(_, fields)| fields.iter().any(|f| !f.trim().is_empty()));

    let (_, header) = records.next().ok_or(SheetError::MissingProgramColumn)?;

    let mut columns = Vec::with_capacity(header.len());
    let mut seen = Vec::new();
    let mut ignored_columns = Vec::new();
    let mut has_program = false;

    for cell in &header {
        let name = cell.trim();
        if name.eq_ignore_ascii_case(PROGRAM_COLUMN) && !has_program {
            has_program = true;
            columns.push(Column::Program);
        } else if name.eq_ignore_ascii_case(FINAL_SCORE_COLUMN) {
            columns.push(Column::Ignored);
        } else if let Some(criterion) = Criterion::parse(name) {
            if seen.contains(&criterion) {
                return Err(SheetError::DuplicateColumn(name.to_string()));
            }
            seen.push(criterion);
            columns.push(Column::Rating(criterion));
        } else {
            ignored_columns.push(name.to_string());
            columns.push(Column::Ignored);
        }
    }

    if !has_program {
        return Err(SheetError::MissingProgramColumn);
    }

    let mut programs = Vec::new();
    for (line, fields) in records {
        let mut program = ProgramRatings::new(String::new());
        for (column, cell) in columns.iter().zip(fields.iter()) {
            let value = cell.trim();
            match column {
                Column::Program => program.name = value.to_string(),
                Column::Rating(criterion) if !value.is_empty() => {
                    let rating: f64 = value.parse().map_err(|_| SheetError::InvalidNumber {
                        line,
                        column: criterion.label().to_string(),
                        value: value.to_string(),
                    })?;
                    program.ratings.insert(*criterion, rating);
                }
                _ => {}
            }
        }
        programs.push(program);
    }

    Ok(ParsedSheet {
        programs,
        ignored_columns,
    })
}

/// Split CSV text into records of fields, tagging each with its starting line.
fn split_records(content: &str) -> Result<Vec<(usize, Vec<String>)>, SheetError> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut record_line = 1;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                records.push((record_line, std::mem::take(&mut record)));
                line += 1;
                record_line = line;
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(SheetError::UnterminatedQuote { line: record_line });
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push((record_line, record));
    }

    Ok(records)
}

/// Quote a field when it would otherwise break the row.
pub fn escape_csv(s: &str) -> String {
    let needs_quotes = s.contains([',', '"', '\n', '\r']) || s.trim() != s;
    if needs_quotes {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn header_row(with_score: bool) -> String {
    let mut cells = vec![PROGRAM_COLUMN.to_string()];
    cells.extend(Criterion::ALL.iter().map(|c| escape_csv(c.label())));
    if with_score {
        cells.push(FINAL_SCORE_COLUMN.to_string());
    }
    cells.join(",")
}

fn rating_cells(program: &ProgramRatings) -> impl Iterator<Item = String> + '_ {
    Criterion::ALL.into_iter().map(|c| match program.rating(c) {
        Some(v) if v.fract() == 0.0 => format!("{}", v as i64),
        Some(v) => v.to_string(),
        None => String::new(),
    })
}

/// Render programs in their current order, missing ratings as empty cells.
pub fn render_sheet(programs: &[ProgramRatings]) -> String {
    let mut out = header_row(false);
    out.push('\n');
    for program in programs {
        let mut cells = vec![escape_csv(&program.name)];
        cells.extend(rating_cells(program));
        out.push_str(&cells.join(","));
        out.push('\n');
    }
    out
}

/// Render programs in ranked order with a trailing score column.
pub fn render_ranked_sheet(ranking: &Ranking, programs: &[ProgramRatings]) -> String {
    let mut out = header_row(true);
    out.push('\n');
    for entry in &ranking.entries {
        let Some(program) = programs.iter().find(|p| p.name.trim() == entry.name) else {
            continue;
        };
        let mut cells = vec![escape_csv(&entry.name)];
        cells.extend(rating_cells(program));
        cells.push(format!("{:.2}", entry.result.score));
        out.push_str(&cells.join(","));
        out.push('\n');
    }
    out
}
