pub mod csv;
pub mod storage;

pub use csv::{escape_csv, parse_sheet, render_ranked_sheet, render_sheet, ParsedSheet, SheetError};
pub use storage::{
    get_default_sheet_path, load_sheet, save_ranked_sheet, save_sheet, write_template,
};
