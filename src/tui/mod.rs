pub mod app;
pub mod event;
pub mod theme;
pub mod ui;

pub use app::App;
pub use theme::{resolve_theme, ThemeColors};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use event::{Event, EventHandler};

pub fn run_tui(mut app: App) -> anyhow::Result<()> {
    // Buffer log output while the TUI is active to prevent it corrupting the display
    crate::stderr_buffer::activate();

    // Init terminal (sets up panic hooks automatically)
    let mut terminal = ratatui::init();
    let events = EventHandler::new(250);

    let result = run_loop(&mut terminal, &events, &mut app);

    ratatui::restore();

    // Flush buffered messages now that the terminal is restored
    for msg in crate::stderr_buffer::drain() {
        eprintln!("{}", msg);
    }

    result
}

fn run_loop(
    terminal: &mut ratatui::DefaultTerminal,
    events: &EventHandler,
    app: &mut App,
) -> anyhow::Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::draw(frame, app))?;

        match events.next()? {
            Event::Key(key) => handle_key_event(app, key),
            Event::Tick => app.update_flash(),
        }
    }
    Ok(())
}

fn handle_key_event(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.input_mode {
        app::InputMode::Normal => match key.code {
            KeyCode::Char('q') => app.request_quit(),

            // Navigation
            KeyCode::Char('j') | KeyCode::Down => app.next_row(),
            KeyCode::Char('k') | KeyCode::Up => app.previous_row(),
            KeyCode::Tab => app.toggle_view(),

            // Weight slider
            KeyCode::Char('h') | KeyCode::Char('-') | KeyCode::Left
                if app.current_view == app::View::Weights =>
            {
                app.adjust_weight(-1.0)
            }
            KeyCode::Char('l') | KeyCode::Char('+') | KeyCode::Right
                if app.current_view == app::View::Weights =>
            {
                app.adjust_weight(1.0)
            }

            KeyCode::Char('b') | KeyCode::Enter => app.show_breakdown(),
            KeyCode::Char('m') => app.toggle_mark(),
            KeyCode::Char('c') => app.show_compare(),

            // Program edits, also available while the ranking is invalid
            KeyCode::Char('a') => app.start_add_program(),
            KeyCode::Char('r') if app.current_view == app::View::Rankings => {
                app.start_rename_program()
            }
            KeyCode::Char('d') if app.current_view == app::View::Rankings => {
                app.delete_selected()
            }

            KeyCode::Char('z') => app.undo_last(),
            KeyCode::Char('s') => app.save_sheet(),
            KeyCode::Char('w') => app.save_weights(),
            KeyCode::Char('?') => app.show_help(),
            _ => {}
        },
        app::InputMode::Breakdown => match key.code {
            KeyCode::Esc | KeyCode::Char('b') | KeyCode::Char('q') => app.dismiss_breakdown(),
            KeyCode::Char('j') | KeyCode::Down => app.next_row(),
            KeyCode::Char('k') | KeyCode::Up => app.previous_row(),
            KeyCode::Char('h') | KeyCode::Char('-') | KeyCode::Left => app.adjust_rating(-1),
            KeyCode::Char('l') | KeyCode::Char('+') | KeyCode::Right => app.adjust_rating(1),
            KeyCode::Char('z') => app.undo_last(),
            _ => {}
        },
        app::InputMode::Compare => match key.code {
            KeyCode::Esc | KeyCode::Char('c') | KeyCode::Char('q') => app.dismiss_compare(),
            _ => {}
        },
        app::InputMode::NameInput => match key.code {
            KeyCode::Enter => app.confirm_name_input(),
            KeyCode::Esc => app.cancel_name_input(),
            KeyCode::Backspace => {
                app.name_input.pop();
            }
            KeyCode::Char(c) => app.name_input.push(c),
            _ => {}
        },
        app::InputMode::Help => {
            // Any key exits help
            app.dismiss_help();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::scoring::{Criterion, ProgramRatings};

    fn press(app: &mut App, code: KeyCode) {
        handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn sample_app() -> App {
        App::new(
            vec![
                ProgramRatings::with_ratings("Mercy", [4; 9]),
                ProgramRatings::with_ratings("County", [3; 9]),
            ],
            Config::default(),
            "sheet.csv".into(),
            "config.yaml".into(),
            ThemeColors::dark(),
        )
    }

    #[test]
    fn test_weight_keys_only_in_weights_view() {
        let mut app = sample_app();
        press(&mut app, KeyCode::Char('l'));
        assert_eq!(app.weights.get(Criterion::ResidentHappiness), 10.0);

        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Char('l'));
        press(&mut app, KeyCode::Char('+'));
        assert_eq!(app.weights.get(Criterion::ResidentHappiness), 12.0);
        press(&mut app, KeyCode::Char('z'));
        assert_eq!(app.weights.get(Criterion::ResidentHappiness), 11.0);
    }

    #[test]
    fn test_breakdown_mode_edits_ratings() {
        let mut app = sample_app();
        press(&mut app, KeyCode::Char('b'));
        assert_eq!(app.input_mode, app::InputMode::Breakdown);

        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('l'));
        assert_eq!(app.programs[0].rating(Criterion::CaseExposure), Some(5.0));

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.input_mode, app::InputMode::Normal);
    }

    #[test]
    fn test_add_program_by_typing() {
        let mut app = sample_app();
        press(&mut app, KeyCode::Char('a'));
        assert_eq!(app.input_mode, app::InputMode::NameInput);

        for c in "Oaks".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Backspace);
        // 'q' is typed, not a quit
        press(&mut app, KeyCode::Char('q'));
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Enter);

        assert!(!app.should_quit);
        assert_eq!(app.programs.len(), 3);
        assert_eq!(app.programs[2].name, "Oak");
        assert_eq!(app.selected_entry().map(|e| e.name.as_str()), Some("Oak"));
    }

    #[test]
    fn test_delete_and_undo_keys() {
        let mut app = sample_app();
        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.programs.len(), 1);
        press(&mut app, KeyCode::Char('z'));
        assert_eq!(app.programs.len(), 2);
        assert_eq!(app.programs[0].name, "Mercy");
    }

    #[test]
    fn test_rename_key_from_error_view() {
        let mut app = App::new(
            vec![ProgramRatings::with_ratings("", [3; 9])],
            Config::default(),
            "sheet.csv".into(),
            "config.yaml".into(),
            ThemeColors::dark(),
        );
        assert!(!app.errors.is_empty());

        press(&mut app, KeyCode::Char('r'));
        press(&mut app, KeyCode::Char('X'));
        press(&mut app, KeyCode::Enter);
        assert!(app.errors.is_empty());
        assert_eq!(app.entries()[0].name, "X");
    }

    #[test]
    fn test_mark_and_compare_keys() {
        let mut app = sample_app();
        press(&mut app, KeyCode::Char('m'));
        press(&mut app, KeyCode::Char('c'));
        assert_eq!(app.input_mode, app::InputMode::Compare);
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.table_state.selected(), Some(0));
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.input_mode, app::InputMode::Normal);
    }

    #[test]
    fn test_help_and_quit() {
        let mut app = sample_app();
        press(&mut app, KeyCode::Char('?'));
        assert_eq!(app.input_mode, app::InputMode::Help);
        press(&mut app, KeyCode::Char('q'));
        assert_eq!(app.input_mode, app::InputMode::Normal);
        assert!(!app.should_quit);

        handle_key_event(
            &mut app,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        );
        assert!(app.should_quit);
    }
}
