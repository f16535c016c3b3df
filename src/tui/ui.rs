use crate::output::{format_score, format_weight};
use crate::scoring::{Criterion, RankedProgram, CRITERIA_COUNT, MAX_SLIDER_WEIGHT};
use crate::tui::app::{App, InputMode, NameTarget, View};
use crate::tui::theme::ThemeColors;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Cell, Clear, Paragraph, Row, Table, Tabs, Wrap};

pub fn draw(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Handle very small terminal sizes gracefully
    if area.height < 6 || area.width < 30 {
        let msg = Paragraph::new("Terminal too small").alignment(Alignment::Center);
        frame.render_widget(msg, area);
        return;
    }

    // Layout: Title(1) + Tabs(1) + Body(fill) + Status(1)
    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .split(area);

    render_title(frame, chunks[0], app);
    render_tabs(frame, chunks[1], app);
    if !app.errors.is_empty() {
        render_errors(frame, chunks[2], app);
    } else {
        match app.current_view {
            View::Rankings => render_rankings(frame, chunks[2], app),
            View::Weights => render_weights(frame, chunks[2], app),
        }
    }
    render_status_bar(frame, chunks[3], app);

    match app.input_mode {
        InputMode::Breakdown => render_breakdown_popup(frame, app),
        InputMode::Compare => render_compare_popup(frame, app),
        InputMode::NameInput => render_name_popup(frame, app),
        InputMode::Help => render_help_popup(frame, &app.theme),
        InputMode::Normal => {}
    }
}

fn render_title(frame: &mut Frame, area: Rect, app: &App) {
    let title = "Residency Ranker";
    let mut spans = vec![Span::styled(
        title,
        Style::default().fg(app.theme.title_color).bold(),
    )];

    let sheet = app
        .sheet_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let dirty = if app.sheet_dirty || app.weights_dirty {
        " [modified]"
    } else {
        ""
    };
    let right = format!("{}{}", sheet, dirty);
    let padding_len = (area.width as usize).saturating_sub(title.len() + right.chars().count());
    spans.push(Span::raw(" ".repeat(padding_len)));
    spans.push(Span::styled(right, Style::default().fg(app.theme.muted)));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_tabs(frame: &mut Frame, area: Rect, app: &App) {
    let selected = match app.current_view {
        View::Rankings => 0,
        View::Weights => 1,
    };

    let tabs = Tabs::new(vec!["Rankings", "Weights"])
        .select(selected)
        .style(app.theme.tab_inactive_style)
        .highlight_style(app.theme.tab_active_style)
        .divider(" | ");

    frame.render_widget(tabs, area);
}

fn render_errors(frame: &mut Frame, area: Rect, app: &mut App) {
    let theme = &app.theme;
    let mut lines = vec![Line::from(Span::styled(
        "Cannot rank programs until these are fixed:",
        Style::default().fg(theme.error_color).bold(),
    ))];
    for error in &app.errors {
        lines.push(Line::from(vec![
            Span::styled("  - ", Style::default().fg(theme.error_color)),
            Span::raw(error.clone()),
        ]));
    }
    lines.push(Line::from(Span::styled(
        "Rename (r) or delete (d) a program below, edit weights, or undo (z)",
        Style::default().fg(theme.muted),
    )));

    let list_height = (lines.len() as u16 + 1).min(area.height / 2).max(1);
    let [list_area, table_area] =
        Layout::vertical([Constraint::Length(list_height), Constraint::Fill(1)]).areas(area);
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), list_area);

    let rows: Vec<Row> = app
        .programs
        .iter()
        .enumerate()
        .map(|(idx, program)| {
            let name = if program.name.trim().is_empty() {
                Span::styled("(no name)", Style::default().fg(theme.error_color))
            } else {
                Span::raw(program.name.clone())
            };
            Row::new(vec![
                Cell::from(format!("{}.", idx + 1)).style(Style::default().fg(theme.index_color)),
                Cell::from(format!("{}/{}", program.ratings.len(), CRITERIA_COUNT))
                    .style(Style::default().fg(theme.muted)),
                Cell::from(Line::from(name)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(4),
        Constraint::Length(6),
        Constraint::Fill(1),
    ];
    let table = Table::new(rows, widths)
        .header(Row::new(vec!["Row", "Rated", "Program"]).style(theme.header_style))
        .row_highlight_style(theme.row_selected);

    frame.render_stateful_widget(table, table_area, &mut app.table_state);
}

fn bar_spans(value: f64, max: f64, width: usize, color: Color, empty: Color) -> Vec<Span<'static>> {
    let ratio = if max > 0.0 {
        (value / max).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let filled = (ratio * width as f64).round() as usize;
    let rest = width.saturating_sub(filled);

    let mut spans = Vec::new();
    if filled > 0 {
        spans.push(Span::styled("█".repeat(filled), Style::default().fg(color)));
    }
    if rest > 0 {
        spans.push(Span::styled("░".repeat(rest), Style::default().fg(empty)));
    }
    spans
}

fn render_rankings(frame: &mut Frame, area: Rect, app: &mut App) {
    let Some(ranking) = app.ranking.as_ref() else {
        return;
    };
    let theme = &app.theme;

    if ranking.is_empty() {
        let empty_msg = Paragraph::new("No programs to rank")
            .alignment(Alignment::Center)
            .block(Block::default());
        frame.render_widget(empty_msg, area);
        return;
    }

    let max_score = ranking.max_score;
    let rows: Vec<Row> = ranking
        .entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let score = entry.result.score;
            let color = theme.score_color(score, max_score);

            let mut score_spans = vec![Span::styled(
                format!("{:>6} ", format_score(score, entry.result.incomplete)),
                Style::default().fg(color),
            )];
            score_spans.extend(bar_spans(score, max_score, 10, color, theme.bar_empty));

            // Alternating row background
            let row_style = if idx % 2 == 1 {
                Style::default().bg(theme.row_alt_bg)
            } else {
                Style::default()
            };

            let marker = if app.is_marked(&entry.name) { "●" } else { "" };

            Row::new(vec![
                Cell::from(format!("{}.", entry.rank)).style(Style::default().fg(theme.index_color)),
                Cell::from(marker).style(Style::default().fg(theme.status_key_color)),
                Cell::from(Line::from(score_spans)),
                Cell::from(entry.name.clone()),
            ])
            .style(row_style)
        })
        .collect();

    let widths = [
        Constraint::Length(4),
        Constraint::Length(1),
        Constraint::Length(18),
        Constraint::Fill(1),
    ];

    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["#", "", "Score", "Program"])
                .style(theme.header_style)
                .bottom_margin(1),
        )
        .row_highlight_style(theme.row_selected);

    frame.render_stateful_widget(table, area, &mut app.table_state);
}

fn render_weights(frame: &mut Frame, area: Rect, app: &mut App) {
    let theme = &app.theme;
    let total = app.weights.total();

    let rows: Vec<Row> = app
        .weights
        .iter()
        .map(|(criterion, weight)| {
            let share = if total > 0.0 {
                format!("{:>5.1}%", weight / total * 100.0)
            } else {
                "    -".to_string()
            };
            let slider = bar_spans(weight, MAX_SLIDER_WEIGHT, 20, theme.slider_filled, theme.bar_empty);

            Row::new(vec![
                Cell::from(criterion.label()),
                Cell::from(Line::from(slider)),
                Cell::from(format!("{:>5}", format_weight(weight))),
                Cell::from(share).style(Style::default().fg(theme.muted)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(28),
        Constraint::Length(21),
        Constraint::Length(6),
        Constraint::Length(7),
    ];

    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["Criterion", "Weight", "", "Share"])
                .style(theme.header_style)
                .bottom_margin(1),
        )
        .row_highlight_style(theme.row_selected);

    frame.render_stateful_widget(table, area, &mut app.weights_state);
}

fn flash_color(theme: &ThemeColors, msg: &str) -> Color {
    if msg.starts_with("Failed") || msg.starts_with("Unsaved") {
        theme.flash_error
    } else if msg.starts_with("Saved") || msg.starts_with("Undid") {
        theme.flash_success
    } else {
        theme.muted
    }
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let text = if let Some((ref msg, _)) = app.flash_message {
        Line::from(Span::styled(
            msg.clone(),
            Style::default().fg(flash_color(theme, msg)),
        ))
    } else {
        let count = format!("{} programs", app.programs.len());
        let hints: &[(&str, &str)] = match (app.current_view.clone(), app.input_mode.clone()) {
            (_, InputMode::Breakdown) => &[
                ("j/k", ":criterion "),
                ("h/l", ":rating "),
                ("z", ":undo "),
                ("Esc", ":close"),
            ],
            (_, InputMode::NameInput) => &[("Enter", ":confirm "), ("Esc", ":cancel")],
            (_, InputMode::Compare) => &[("Esc", ":close")],
            (View::Rankings, _) if !app.errors.is_empty() => &[
                ("j/k", ":nav "),
                ("r", ":rename "),
                ("d", ":delete "),
                ("a", ":add "),
                ("z", ":undo "),
                ("q", ":quit"),
            ],
            (View::Rankings, _) => &[
                ("j/k", ":nav "),
                ("b", ":breakdown "),
                ("m", ":mark "),
                ("c", ":compare "),
                ("a/r/d", ":edit "),
                ("s", ":save "),
                ("?", ":help "),
                ("q", ":quit"),
            ],
            (View::Weights, _) => &[
                ("j/k", ":nav "),
                ("h/l", ":adjust "),
                ("z", ":undo "),
                ("w", ":write "),
                ("Tab", ":rankings "),
                ("q", ":quit"),
            ],
        };

        let mut spans = vec![
            Span::styled(count, Style::default().fg(theme.muted)),
            Span::raw("  "),
        ];
        for (i, (key, label)) in hints.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(" "));
            }
            spans.push(Span::styled(*key, Style::default().fg(theme.status_key_color)));
            spans.push(Span::raw(*label));
        }
        Line::from(spans)
    };

    frame.render_widget(
        Paragraph::new(text).style(Style::default().bg(theme.status_bar_bg)),
        area,
    );
}

fn breakdown_lines(entry: &RankedProgram, cursor: Criterion, theme: &ThemeColors) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for c in &entry.result.breakdown.contributions {
        let label_style = if c.criterion == cursor {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        let rating_style = if c.substituted {
            Style::default().fg(theme.substituted_color)
        } else {
            Style::default().fg(theme.score_color(c.rating.as_f64(), 5.0))
        };
        let mark = if c.substituted { "*" } else { " " };

        lines.push(Line::from(vec![
            Span::styled(format!("{:<26}", c.criterion.label()), label_style),
            Span::styled(format!(" {}{}", c.rating.value(), mark), rating_style),
            Span::styled(
                format!(" x {:>5}", format_weight(c.weight)),
                Style::default().fg(theme.muted),
            ),
            Span::raw(format!(" = {:>7.2}", c.contribution)),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("Score".to_string(), Style::default().bold()),
        Span::raw(format!(
            "  {}  (total weight {})",
            format_score(entry.result.score, entry.result.incomplete),
            format_weight(entry.result.breakdown.total_weight)
        )),
    ]));
    if entry.result.incomplete {
        lines.push(Line::from(Span::styled(
            "* rating missing, neutral 3 used".to_string(),
            Style::default().fg(theme.substituted_color),
        )));
    }
    lines.push(Line::from(Span::styled(
        "j/k: criterion | h/l: rating | Esc: close".to_string(),
        Style::default().fg(theme.muted),
    )));
    lines
}

/// Render the per-criterion score breakdown popup
fn render_breakdown_popup(frame: &mut Frame, app: &App) {
    let Some(entry) = app.selected_entry() else {
        return;
    };
    let theme = &app.theme;

    let lines = breakdown_lines(entry, app.breakdown_criterion(), theme);
    let height = lines.len() as u16 + 2;
    let popup_area = centered_rect_fixed(60, height, frame.area());

    frame.render_widget(Clear, popup_area);

    let block = Block::bordered()
        .title(Span::styled(
            format!(" #{} {} ", entry.rank, entry.name),
            theme.popup_title,
        ))
        .border_style(Style::default().fg(theme.popup_border))
        .style(Style::default().bg(theme.popup_bg));
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);
    frame.render_widget(Paragraph::new(lines), inner);
}

const COMPARE_LABEL_WIDTH: u16 = 10;
const COMPARE_COLUMN_WIDTH: u16 = 14;

fn compare_cell(rating: u8, substituted: bool, theme: &ThemeColors) -> Cell<'static> {
    let color = if substituted {
        theme.substituted_color
    } else {
        theme.score_color(rating as f64, 5.0)
    };
    let mark = if substituted { "*" } else { " " };
    let mut spans = vec![Span::styled(
        format!("{}{} ", rating, mark),
        Style::default().fg(color),
    )];
    spans.extend(bar_spans(rating as f64, 5.0, 5, color, theme.bar_empty));
    Cell::from(Line::from(spans))
}

/// Render marked programs side by side, one column each
fn render_compare_popup(frame: &mut Frame, app: &App) {
    let entries = app.compared_entries();
    if entries.is_empty() {
        return;
    }
    let theme = &app.theme;
    let max_score = app.ranking.as_ref().map(|r| r.max_score).unwrap_or(5.0);

    let header = std::iter::once(Cell::from(""))
        .chain(entries.iter().map(|e| {
            let title: String = format!("#{} {}", e.rank, e.name)
                .chars()
                .take(COMPARE_COLUMN_WIDTH as usize - 1)
                .collect();
            Cell::from(title)
        }))
        .collect::<Vec<_>>();

    let mut rows: Vec<Row> = Criterion::ALL
        .iter()
        .map(|&criterion| {
            let mut cells = vec![Cell::from(criterion.short_label())];
            for entry in &entries {
                let cell = entry
                    .result
                    .breakdown
                    .contributions
                    .iter()
                    .find(|c| c.criterion == criterion)
                    .map(|c| compare_cell(c.rating.value(), c.substituted, theme))
                    .unwrap_or_else(|| Cell::from("-"));
                cells.push(cell);
            }
            Row::new(cells)
        })
        .collect();

    let mut score_cells = vec![Cell::from(Span::styled("Score", Style::default().bold()))];
    for entry in &entries {
        score_cells.push(
            Cell::from(format_score(entry.result.score, entry.result.incomplete))
                .style(Style::default().fg(theme.score_color(entry.result.score, max_score))),
        );
    }
    rows.push(Row::new(score_cells).top_margin(1));

    let widths: Vec<Constraint> = std::iter::once(Constraint::Length(COMPARE_LABEL_WIDTH))
        .chain(entries.iter().map(|_| Constraint::Length(COMPARE_COLUMN_WIDTH)))
        .collect();

    // Border, header, nine criteria, gap, score
    let width = COMPARE_LABEL_WIDTH + COMPARE_COLUMN_WIDTH * entries.len() as u16 + 2;
    let height = CRITERIA_COUNT as u16 + 5;
    let popup_area = centered_rect_fixed(width, height, frame.area());

    frame.render_widget(Clear, popup_area);

    let block = Block::bordered()
        .title(Span::styled(" Compare ", theme.popup_title))
        .border_style(Style::default().fg(theme.popup_border))
        .style(Style::default().bg(theme.popup_bg));
    let table = Table::new(rows, widths)
        .header(Row::new(header).style(theme.header_style))
        .column_spacing(0)
        .block(block);
    frame.render_widget(table, popup_area);
}

/// Render the program name prompt
fn render_name_popup(frame: &mut Frame, app: &App) {
    let theme = &app.theme;
    let title = match app.name_target {
        NameTarget::Add => " Add program ",
        NameTarget::Rename(_) => " Rename program ",
    };
    let popup_area = centered_rect_fixed(50, 3, frame.area());

    frame.render_widget(Clear, popup_area);

    let block = Block::bordered()
        .title(Span::styled(title, theme.popup_title))
        .border_style(Style::default().fg(theme.popup_border))
        .style(Style::default().bg(theme.popup_bg));
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let line = Line::from(vec![
        Span::raw(app.name_input.clone()),
        Span::styled("_", Style::default().fg(theme.status_key_color)),
    ]);
    frame.render_widget(Paragraph::new(line), inner);
}

/// Create a centered rectangle with fixed width and height
fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);

    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;

    Rect {
        x,
        y,
        width,
        height,
    }
}

/// Render the help overlay popup
fn render_help_popup(frame: &mut Frame, theme: &ThemeColors) {
    let popup_area = centered_rect_fixed(50, 22, frame.area());

    frame.render_widget(Clear, popup_area);

    let block = Block::bordered()
        .title(Span::styled(" Keyboard Shortcuts ", theme.popup_title))
        .border_style(Style::default().fg(theme.popup_border))
        .style(Style::default().bg(theme.popup_bg));
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let key_style = Style::default().fg(theme.status_key_color).bold();
    let entries = [
        ("j / Down      ", "Move down"),
        ("k / Up        ", "Move up"),
        ("Tab           ", "Toggle Rankings/Weights"),
        ("h / l, - / +  ", "Adjust weight or rating"),
        ("b / Enter     ", "Score breakdown"),
        ("m             ", "Mark for comparison"),
        ("c             ", "Compare marked programs"),
        ("a             ", "Add program"),
        ("r             ", "Rename program"),
        ("d             ", "Delete program"),
        ("z             ", "Undo last edit"),
        ("s             ", "Save sheet"),
        ("w             ", "Write weights to config"),
        ("?             ", "Show/hide this help"),
        ("q / Ctrl-c    ", "Quit"),
    ];

    let mut help_lines: Vec<Line> = entries
        .iter()
        .map(|(key, desc)| Line::from(vec![Span::styled(*key, key_style), Span::raw(*desc)]))
        .collect();
    help_lines.push(Line::from(""));
    help_lines.push(Line::from(Span::styled(
        "Press any key to close",
        Style::default().fg(theme.muted),
    )));

    frame.render_widget(Paragraph::new(help_lines), inner);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::scoring::ProgramRatings;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn sample_app(programs: Vec<ProgramRatings>) -> App {
        App::new(
            programs,
            Config::default(),
            "sheet.csv".into(),
            "config.yaml".into(),
            ThemeColors::dark(),
        )
    }

    #[test]
    fn test_centered_rect_clamps_to_area() {
        let area = Rect::new(0, 0, 20, 10);
        let rect = centered_rect_fixed(50, 4, area);
        assert_eq!(rect, Rect::new(0, 3, 20, 4));
    }

    #[test]
    fn test_draw_rankings_and_weights() {
        let mut app = sample_app(vec![
            ProgramRatings::with_ratings("Mercy General", [5; 9]),
            ProgramRatings::with_ratings("County", [2; 9]),
        ]);
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();

        terminal.draw(|f| draw(f, &mut app)).unwrap();
        let text = buffer_text(&terminal);
        assert!(text.contains("Mercy General"));
        assert!(text.contains("5.00"));

        app.toggle_view();
        terminal.draw(|f| draw(f, &mut app)).unwrap();
        let text = buffer_text(&terminal);
        assert!(text.contains("Resident Happiness"));
    }

    #[test]
    fn test_draw_errors_view() {
        let mut app = sample_app(vec![ProgramRatings::with_ratings("  ", [3; 9])]);
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();

        terminal.draw(|f| draw(f, &mut app)).unwrap();
        assert!(buffer_text(&terminal).contains("Cannot rank programs"));
    }

    #[test]
    fn test_draw_errors_lists_programs() {
        let mut app = sample_app(vec![
            ProgramRatings::with_ratings("Mercy", [3; 9]),
            ProgramRatings::with_ratings("mercy", [3; 9]),
        ]);
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();

        terminal.draw(|f| draw(f, &mut app)).unwrap();
        let text = buffer_text(&terminal);
        assert!(text.contains("Cannot rank programs"));
        assert!(text.contains("9/9"));
        assert!(text.contains("mercy"));
    }

    #[test]
    fn test_draw_compare_popup() {
        let mut app = sample_app(vec![
            ProgramRatings::with_ratings("Mercy", [5; 9]),
            ProgramRatings::with_ratings("County", [2; 9]),
        ]);
        app.toggle_mark();
        app.next_row();
        app.toggle_mark();
        app.show_compare();
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();

        terminal.draw(|f| draw(f, &mut app)).unwrap();
        let text = buffer_text(&terminal);
        assert!(text.contains("Compare"));
        assert!(text.contains("#1 Mercy"));
        assert!(text.contains("#2 County"));
        assert!(text.contains(Criterion::SalaryVsCostOfLiving.short_label()));
        assert!(text.contains("5  █████"));
        assert!(text.contains("2  ██░░░"));
    }

    #[test]
    fn test_draw_name_prompt() {
        let mut app = sample_app(vec![ProgramRatings::with_ratings("Mercy", [3; 9])]);
        app.start_rename_program();
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();

        terminal.draw(|f| draw(f, &mut app)).unwrap();
        let text = buffer_text(&terminal);
        assert!(text.contains("Rename program"));
        assert!(text.contains("Mercy_"));
    }

    #[test]
    fn test_breakdown_marks_substituted() {
        let mut program = ProgramRatings::with_ratings("Partial", [4; 9]);
        program.ratings.remove(&Criterion::Schedule);
        let app = sample_app(vec![program]);

        let entry = app.selected_entry().unwrap();
        let lines = breakdown_lines(entry, Criterion::ResidentHappiness, &app.theme);
        let text: String = lines
            .iter()
            .flat_map(|l| l.spans.iter().map(|s| s.content.to_string()))
            .collect();
        assert!(text.contains("3*"));
        assert!(text.contains("neutral 3 used"));
    }
}
