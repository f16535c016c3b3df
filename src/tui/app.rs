use crate::config::Config;
use crate::scoring::{
    rank_programs, Criterion, MissingRatingPolicy, ProgramRatings, RankedProgram, Ranking, Rating,
    ScoringConfig, ScoringOptions, Weights, WeightsConfig, CRITERIA_COUNT, MAX_SLIDER_WEIGHT,
};
use crate::tui::theme::ThemeColors;
use ratatui::widgets::TableState;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::time::Instant;

const MAX_UNDO: usize = 50;

/// Programs that fit side by side in the compare popup
pub const MAX_COMPARE: usize = 6;

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Rankings,
    Weights,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputMode {
    Normal,
    Help,
    Breakdown,
    Compare,
    NameInput,
}

/// What the name prompt will do on Enter
#[derive(Debug, Clone, PartialEq)]
pub enum NameTarget {
    Add,
    Rename(usize),
}

/// Program edits refer to positions in `App::programs`. Undo is strictly
/// last-in first-out, so a position is valid again by the time its entry
/// is popped.
#[derive(Debug, Clone, PartialEq)]
pub enum UndoAction {
    Weight {
        criterion: Criterion,
        previous: f64,
    },
    Rating {
        index: usize,
        criterion: Criterion,
        previous: Option<f64>,
    },
    Add {
        index: usize,
    },
    Delete {
        index: usize,
        program: ProgramRatings,
    },
    Rename {
        index: usize,
        previous: String,
    },
}

/// Session state for the interactive editor.
///
/// Programs, weights and options are the only inputs; the ranking is always
/// recomputed from them after an edit and never modified directly. While the
/// input is invalid the table lists programs in sheet order so they can
/// still be renamed or deleted.
pub struct App {
    pub programs: Vec<ProgramRatings>,
    pub weights: Weights,
    pub options: ScoringOptions,
    pub ranking: Option<Ranking>,
    pub errors: Vec<String>,
    pub table_state: TableState,
    pub weights_state: TableState,
    pub breakdown_cursor: usize,
    pub current_view: View,
    pub input_mode: InputMode,
    pub name_input: String,
    pub name_target: NameTarget,
    /// Programs marked for comparison, by name, in marking order
    pub marked: Vec<String>,
    pub flash_message: Option<(String, Instant)>,
    pub undo_stack: VecDeque<UndoAction>,
    pub sheet_path: PathBuf,
    pub config_path: PathBuf,
    pub config: Config,
    pub theme: ThemeColors,
    pub sheet_dirty: bool,
    pub weights_dirty: bool,
    pub quit_requested: bool,
    pub should_quit: bool,
}

impl App {
    pub fn new(
        programs: Vec<ProgramRatings>,
        config: Config,
        sheet_path: PathBuf,
        config_path: PathBuf,
        theme: ThemeColors,
    ) -> Self {
        let scoring = config.effective_scoring();
        let mut weights_state = TableState::default();
        weights_state.select(Some(0));

        let mut app = Self {
            programs,
            weights: scoring.weights(),
            options: scoring.options(),
            ranking: None,
            errors: Vec::new(),
            table_state: TableState::default(),
            weights_state,
            breakdown_cursor: 0,
            current_view: View::Rankings,
            input_mode: InputMode::Normal,
            name_input: String::new(),
            name_target: NameTarget::Add,
            marked: Vec::new(),
            flash_message: None,
            undo_stack: VecDeque::new(),
            sheet_path,
            config_path,
            config,
            theme,
            sheet_dirty: false,
            weights_dirty: false,
            quit_requested: false,
            should_quit: false,
        };
        app.rescore();
        app
    }

    /// Re-run the scorer and keep the same program selected if it still exists.
    pub fn rescore(&mut self) {
        let selected = self.selected_program_index();
        self.rescore_selecting(selected);
    }

    /// Re-run the scorer and select the program at `program_index` in the new table.
    fn rescore_selecting(&mut self, program_index: Option<usize>) {
        let selected_name = program_index
            .and_then(|i| self.programs.get(i))
            .map(|p| p.name.trim().to_string());

        match rank_programs(&self.programs, &self.weights, &self.options) {
            Ok(ranking) => {
                for warning in &ranking.warnings {
                    tracing::debug!("{}", warning);
                }
                let position = selected_name
                    .and_then(|name| ranking.entries.iter().position(|e| e.name == name));
                let selection = match position {
                    Some(i) => Some(i),
                    None if ranking.is_empty() => None,
                    None => Some(0),
                };
                self.table_state.select(selection);
                self.ranking = Some(ranking);
                self.errors.clear();
            }
            Err(errors) => {
                self.errors = errors.errors().iter().map(|e| e.to_string()).collect();
                self.ranking = None;
                let selection = match program_index {
                    Some(i) if i < self.programs.len() => Some(i),
                    _ if self.programs.is_empty() => None,
                    _ => Some(0),
                };
                self.table_state.select(selection);
                if matches!(self.input_mode, InputMode::Breakdown | InputMode::Compare) {
                    self.input_mode = InputMode::Normal;
                }
            }
        }
    }

    pub fn entries(&self) -> &[RankedProgram] {
        self.ranking
            .as_ref()
            .map(|r| r.entries.as_slice())
            .unwrap_or(&[])
    }

    /// Rows in the program table: ranked entries, or raw programs while invalid
    pub fn row_count(&self) -> usize {
        match self.ranking {
            Some(ref ranking) => ranking.len(),
            None => self.programs.len(),
        }
    }

    pub fn selected_entry(&self) -> Option<&RankedProgram> {
        self.table_state
            .selected()
            .and_then(|i| self.entries().get(i))
    }

    /// Position in `programs` of the selected row
    pub fn selected_program_index(&self) -> Option<usize> {
        let row = self.table_state.selected()?;
        match self.ranking {
            Some(ref ranking) => {
                let name = &ranking.entries.get(row)?.name;
                self.programs.iter().position(|p| p.name.trim() == name)
            }
            None => (row < self.programs.len()).then_some(row),
        }
    }

    pub fn selected_criterion(&self) -> Criterion {
        let i = self.weights_state.selected().unwrap_or(0);
        Criterion::ALL[i.min(CRITERIA_COUNT - 1)]
    }

    pub fn breakdown_criterion(&self) -> Criterion {
        Criterion::ALL[self.breakdown_cursor.min(CRITERIA_COUNT - 1)]
    }

    pub fn is_marked(&self, name: &str) -> bool {
        self.marked.iter().any(|m| m == name)
    }

    /// Ranked entries for the marked programs, in marking order
    pub fn compared_entries(&self) -> Vec<&RankedProgram> {
        let Some(ref ranking) = self.ranking else {
            return Vec::new();
        };
        self.marked
            .iter()
            .filter_map(|name| ranking.find(name))
            .collect()
    }

    fn step(current: Option<usize>, len: usize, forward: bool) -> Option<usize> {
        if len == 0 {
            return None;
        }
        Some(match current {
            Some(i) if forward => {
                if i >= len - 1 {
                    0
                } else {
                    i + 1
                }
            }
            Some(i) => {
                if i == 0 {
                    len - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        })
    }

    pub fn next_row(&mut self) {
        self.move_cursor(true);
    }

    pub fn previous_row(&mut self) {
        self.move_cursor(false);
    }

    fn move_cursor(&mut self, forward: bool) {
        if self.input_mode == InputMode::Breakdown {
            if let Some(i) = Self::step(Some(self.breakdown_cursor), CRITERIA_COUNT, forward) {
                self.breakdown_cursor = i;
            }
            return;
        }
        match self.current_view {
            View::Rankings => {
                let next = Self::step(self.table_state.selected(), self.row_count(), forward);
                self.table_state.select(next);
            }
            View::Weights => {
                let next = Self::step(self.weights_state.selected(), CRITERIA_COUNT, forward);
                self.weights_state.select(next);
            }
        }
    }

    pub fn push_undo(&mut self, action: UndoAction) {
        self.undo_stack.push_front(action);
        if self.undo_stack.len() > MAX_UNDO {
            self.undo_stack.pop_back();
        }
    }

    pub fn update_flash(&mut self) {
        if let Some((_, timestamp)) = self.flash_message {
            if timestamp.elapsed().as_secs() >= 3 {
                self.flash_message = None;
            }
        }
    }

    pub fn show_flash(&mut self, msg: String) {
        self.flash_message = Some((msg, Instant::now()));
    }

    fn mark_edited(&mut self) {
        self.sheet_dirty = true;
        self.quit_requested = false;
    }

    /// Nudge the selected weight, clamped to the slider range
    pub fn adjust_weight(&mut self, delta: f64) {
        let criterion = self.selected_criterion();
        let previous = self.weights.get(criterion);
        let updated = (previous + delta).clamp(0.0, MAX_SLIDER_WEIGHT);
        if updated == previous {
            return;
        }

        self.push_undo(UndoAction::Weight {
            criterion,
            previous,
        });
        self.weights.set(criterion, updated);
        self.weights_dirty = true;
        self.quit_requested = false;
        self.rescore();
    }

    /// Nudge the selected program's rating on the breakdown cursor's criterion.
    /// A missing or invalid rating starts from the neutral value.
    pub fn adjust_rating(&mut self, delta: i8) {
        if self.selected_entry().is_none() {
            return;
        }
        let Some(index) = self.selected_program_index() else {
            return;
        };
        let criterion = self.breakdown_criterion();
        let program = &mut self.programs[index];

        let previous = program.rating(criterion);
        let base = previous
            .and_then(Rating::from_raw)
            .unwrap_or(Rating::NEUTRAL)
            .value() as i8;
        let updated = (base + delta).clamp(Rating::MIN as i8, Rating::MAX as i8) as f64;
        if previous == Some(updated) {
            return;
        }

        program.ratings.insert(criterion, updated);
        self.push_undo(UndoAction::Rating {
            index,
            criterion,
            previous,
        });
        self.mark_edited();
        self.rescore();
    }

    /// Open the name prompt for a new program
    pub fn start_add_program(&mut self) {
        self.name_input.clear();
        self.name_target = NameTarget::Add;
        self.input_mode = InputMode::NameInput;
    }

    /// Open the name prompt prefilled with the selected program's name
    pub fn start_rename_program(&mut self) {
        let Some(index) = self.selected_program_index() else {
            return;
        };
        self.name_input = self.programs[index].name.trim().to_string();
        self.name_target = NameTarget::Rename(index);
        self.input_mode = InputMode::NameInput;
    }

    pub fn cancel_name_input(&mut self) {
        self.name_input.clear();
        self.input_mode = InputMode::Normal;
    }

    /// Apply the name prompt. Empty names and names already in use keep the
    /// prompt open.
    pub fn confirm_name_input(&mut self) {
        let name = self.name_input.trim().to_string();
        if name.is_empty() {
            self.show_flash("Failed: program name cannot be empty".to_string());
            return;
        }
        let skip = match self.name_target {
            NameTarget::Rename(index) => Some(index),
            NameTarget::Add => None,
        };
        let taken = self
            .programs
            .iter()
            .enumerate()
            .any(|(i, p)| Some(i) != skip && p.name.trim().eq_ignore_ascii_case(&name));
        if taken {
            self.show_flash(format!("Failed: '{}' already exists", name));
            return;
        }

        self.input_mode = InputMode::Normal;
        self.name_input.clear();
        match self.name_target {
            NameTarget::Add => self.add_program(name),
            NameTarget::Rename(index) => self.rename_program(index, name),
        }
    }

    /// Append a program with no ratings. Under the reject policy it starts at
    /// neutral everywhere so the ranking stays valid.
    pub fn add_program(&mut self, name: String) {
        let program = match self.options.missing_ratings {
            MissingRatingPolicy::Neutral => ProgramRatings::new(name.clone()),
            MissingRatingPolicy::Reject => {
                ProgramRatings::with_ratings(name.clone(), [Rating::NEUTRAL.value(); CRITERIA_COUNT])
            }
        };
        let index = self.programs.len();
        self.programs.push(program);
        self.push_undo(UndoAction::Add { index });
        self.mark_edited();
        self.current_view = View::Rankings;
        self.rescore_selecting(Some(index));
        self.show_flash(format!("Added: {}", name));
    }

    pub fn rename_program(&mut self, index: usize, name: String) {
        let Some(program) = self.programs.get_mut(index) else {
            return;
        };
        let previous = std::mem::replace(&mut program.name, name.clone());
        self.rename_mark(previous.trim(), &name);
        self.push_undo(UndoAction::Rename { index, previous });
        self.mark_edited();
        self.rescore_selecting(Some(index));
        self.show_flash(format!("Renamed: {}", name));
    }

    /// Remove the selected program
    pub fn delete_selected(&mut self) {
        let Some(index) = self.selected_program_index() else {
            return;
        };
        let program = self.programs.remove(index);
        let name = program.name.trim().to_string();
        self.marked.retain(|m| *m != name);
        self.push_undo(UndoAction::Delete { index, program });
        self.mark_edited();

        let next = if self.programs.is_empty() {
            None
        } else {
            Some(index.min(self.programs.len() - 1))
        };
        self.rescore_selecting(next);
        self.show_flash(format!("Deleted: {} (z to undo)", name));
    }

    fn rename_mark(&mut self, from: &str, to: &str) {
        for mark in self.marked.iter_mut().filter(|m| m.as_str() == from) {
            *mark = to.trim().to_string();
        }
    }

    /// Mark or unmark the selected program for comparison
    pub fn toggle_mark(&mut self) {
        let Some(name) = self.selected_entry().map(|e| e.name.clone()) else {
            return;
        };
        if let Some(pos) = self.marked.iter().position(|m| *m == name) {
            self.marked.remove(pos);
        } else if self.marked.len() >= MAX_COMPARE {
            self.show_flash(format!("Compare holds up to {} programs", MAX_COMPARE));
        } else {
            self.marked.push(name);
        }
    }

    /// Open the side-by-side profile comparison of marked programs
    pub fn show_compare(&mut self) {
        if self.compared_entries().is_empty() {
            self.show_flash("Mark programs with m to compare them".to_string());
        } else {
            self.input_mode = InputMode::Compare;
        }
    }

    pub fn dismiss_compare(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    /// Undo the last edit
    pub fn undo_last(&mut self) {
        let action = match self.undo_stack.pop_front() {
            Some(action) => action,
            None => {
                self.show_flash("Nothing to undo".to_string());
                return;
            }
        };

        let mut select = self.selected_program_index();
        match action {
            UndoAction::Weight {
                criterion,
                previous,
            } => {
                self.weights.set(criterion, previous);
                self.weights_dirty = true;
                self.show_flash(format!(
                    "Undid weight change: {} back to {}",
                    criterion,
                    crate::output::format_weight(previous)
                ));
            }
            UndoAction::Rating {
                index,
                criterion,
                previous,
            } => {
                if let Some(p) = self.programs.get_mut(index) {
                    match previous {
                        Some(value) => {
                            p.ratings.insert(criterion, value);
                        }
                        None => {
                            p.ratings.remove(&criterion);
                        }
                    }
                    let name = p.name.trim().to_string();
                    self.show_flash(format!("Undid rating change: {} / {}", name, criterion));
                }
                self.sheet_dirty = true;
                select = Some(index);
            }
            UndoAction::Add { index } => {
                if index < self.programs.len() {
                    let removed = self.programs.remove(index);
                    let name = removed.name.trim().to_string();
                    self.marked.retain(|m| *m != name);
                    self.show_flash(format!("Undid add: {}", name));
                }
                self.sheet_dirty = true;
                select = None;
            }
            UndoAction::Delete { index, program } => {
                let name = program.name.trim().to_string();
                let index = index.min(self.programs.len());
                self.programs.insert(index, program);
                self.sheet_dirty = true;
                self.show_flash(format!("Undid delete: {}", name));
                select = Some(index);
            }
            UndoAction::Rename { index, previous } => {
                if let Some(p) = self.programs.get_mut(index) {
                    let current = std::mem::replace(&mut p.name, previous.clone());
                    self.rename_mark(current.trim(), &previous);
                    self.show_flash(format!("Undid rename: {} back to {}", current, previous));
                }
                self.sheet_dirty = true;
                select = Some(index);
            }
        }
        self.rescore_selecting(select);
    }

    /// Write programs back to the sheet file
    pub fn save_sheet(&mut self) {
        match crate::sheet::save_sheet(&self.sheet_path, &self.programs) {
            Ok(()) => {
                self.sheet_dirty = false;
                self.show_flash(format!("Saved sheet to {}", self.sheet_path.display()));
            }
            Err(e) => self.show_flash(format!("Failed to save sheet: {:#}", e)),
        }
    }

    /// Write the current weights into the config file, keeping other settings
    pub fn save_weights(&mut self) {
        let scoring = self.config.scoring.take().unwrap_or_default();
        self.config.scoring = Some(ScoringConfig {
            weights: Some(WeightsConfig::from_weights(&self.weights)),
            ..scoring
        });

        match crate::config::save_config(&self.config_path, &self.config) {
            Ok(()) => {
                self.weights_dirty = false;
                self.show_flash(format!("Saved weights to {}", self.config_path.display()));
            }
            Err(e) => self.show_flash(format!("Failed to save weights: {:#}", e)),
        }
    }

    /// Quit, asking for a second press when there are unsaved edits
    pub fn request_quit(&mut self) {
        if (self.sheet_dirty || self.weights_dirty) && !self.quit_requested {
            self.quit_requested = true;
            self.show_flash("Unsaved changes (s: sheet, w: weights). Press q again to quit".to_string());
        } else {
            self.should_quit = true;
        }
    }

    /// Toggle between Rankings and Weights views
    pub fn toggle_view(&mut self) {
        self.current_view = match self.current_view {
            View::Rankings => View::Weights,
            View::Weights => View::Rankings,
        };
    }

    /// Show help overlay
    pub fn show_help(&mut self) {
        self.input_mode = InputMode::Help;
    }

    /// Dismiss help overlay
    pub fn dismiss_help(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    /// Show the per-criterion breakdown for the selected program
    pub fn show_breakdown(&mut self) {
        if self.current_view == View::Rankings && self.selected_entry().is_some() {
            self.input_mode = InputMode::Breakdown;
        }
    }

    /// Dismiss breakdown overlay
    pub fn dismiss_breakdown(&mut self) {
        self.input_mode = InputMode::Normal;
    }
}
