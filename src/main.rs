mod app;
mod config;
mod event;
mod ui;

use std::io;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::event::{
    DisableBracketedPaste, EnableBracketedPaste, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use timestable::engine::navigation::Direction;
use timestable::session::table::QuizState;
use timestable::store::json_store::JsonStore;
use timestable::store::settings::{SettingsStore, ShareParams, TableSettings};

use app::{App, AppScreen, direction_for_key};
use config::Config;
use event::{AppEvent, EventHandler};
use ui::components::confirm::ConfirmDialog;
use ui::components::progress_bar::ProgressBar;
use ui::components::results::ResultsDialog;
use ui::components::settings_form::SettingsDialog;
use ui::components::table_grid::TableGrid;
use ui::layout::{AppLayout, centered_rect, pack_hint_lines};

#[derive(Parser)]
#[command(name = "timestable", version, about = "Times-table practice in the terminal")]
struct Cli {
    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(long, help = "Table width (6-24), saved as the new default")]
    width: Option<u16>,

    #[arg(long, help = "Table height (6-24), saved as the new default")]
    height: Option<u16>,

    #[arg(short, long, value_name = "QUERY", help = "Shared settings, e.g. \"width=8&height=10\"")]
    share: Option<String>,

    #[arg(long, help = "List bundled themes and exit")]
    list_themes: bool,

    #[arg(long, help = "Write the effective config (e.g. --theme) to the config file")]
    save_config: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.list_themes {
        for name in ui::theme::Theme::available_themes() {
            println!("{name}");
        }
        return Ok(());
    }

    let mut config = Config::load().unwrap_or_default();
    config.normalize_log_level();
    if let Some(theme) = cli.theme {
        config.theme = theme;
    }
    if cli.save_config {
        config.save()?;
    }
    if let Err(e) = config::init_logging(&config) {
        eprintln!("Logging disabled: {e:#}");
    }

    let share = cli.share.as_deref().map(ShareParams::parse).unwrap_or_default();
    let mut settings = SettingsStore::new(JsonStore::new()?, share);
    if cli.width.is_some() || cli.height.is_some() {
        let current = settings.settings();
        settings.save(TableSettings {
            width: cli.width.unwrap_or(current.width),
            height: cli.height.unwrap_or(current.height),
        })?;
    }

    let mut app = App::new(&config, settings);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(250));

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        log::error!("{err:?}");
        eprintln!("Error: {err:?}");
    }

    println!("Share this table: ?{}", app.table.settings().share_query());
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Paste(text) => handle_paste(app, &text),
            AppEvent::Tick | AppEvent::Resize => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    // Confirmation prompt takes priority
    if app.pending.is_some() {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => app.answer_pending(true),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.answer_pending(false),
            _ => {}
        }
        return;
    }

    match app.screen {
        AppScreen::Quiz => handle_quiz_key(app, key),
        AppScreen::Settings => handle_settings_key(app, key),
        AppScreen::Results => handle_results_key(app, key),
    }
}

fn handle_quiz_key(app: &mut App, key: KeyEvent) {
    if let Some(direction) = direction_for_key(key.code) {
        app.move_focus(direction);
        return;
    }
    match key.code {
        KeyCode::Char(ch) if ch.is_ascii_digit() => app.type_digit(ch),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Delete => app.clear_cell(),
        KeyCode::Tab => app.move_focus(Direction::Right),
        KeyCode::BackTab => app.move_focus(Direction::Left),
        KeyCode::Enter => app.request_validate(),
        KeyCode::Char('r') => app.request_reset(),
        KeyCode::Char('s') => app.open_settings(),
        KeyCode::Char('q') => app.request_quit(),
        KeyCode::Esc => {
            if app.table.focused_cell().is_some() {
                app.clear_focus();
            } else {
                app.request_quit();
            }
        }
        _ => {}
    }
}

fn handle_settings_key(app: &mut App, key: KeyEvent) {
    let Some(form) = app.settings_form.as_mut() else {
        app.close_settings();
        return;
    };
    match key.code {
        KeyCode::Esc => app.close_settings(),
        KeyCode::Enter => app.submit_settings(),
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => form.toggle_field(),
        KeyCode::Char('+') | KeyCode::Right => form.adjust(1),
        KeyCode::Char('-') | KeyCode::Left => form.adjust(-1),
        KeyCode::Backspace => form.backspace(),
        KeyCode::Char(ch) => form.type_text(&ch.to_string()),
        _ => {}
    }
}

fn handle_results_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ') => app.close_results(),
        KeyCode::Char('r') => app.request_reset(),
        KeyCode::Char('q') => app.request_quit(),
        _ => {}
    }
}

fn handle_paste(app: &mut App, text: &str) {
    match app.screen {
        AppScreen::Quiz if app.pending.is_none() => app.paste(text),
        AppScreen::Settings => {
            if let Some(form) = app.settings_form.as_mut() {
                form.type_text(text);
            }
        }
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;
    let buf = frame.buffer_mut();

    Block::default()
        .style(Style::default().bg(colors.bg()))
        .render(area, buf);

    let layout = AppLayout::new(area);

    let state_label = match app.table.state() {
        QuizState::Answering => "Enter answers below and then check them!",
        QuizState::Validated => "Answers checked",
    };
    let header = Paragraph::new(vec![
        Line::from(Span::styled(
            " Times Tables",
            Style::default()
                .fg(colors.accent())
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled(format!(" {state_label}"), Style::default().fg(colors.fg())),
            Span::styled(
                format!("   #{}", app.table.id_seed()),
                Style::default().fg(colors.muted()),
            ),
        ]),
    ]);
    header.render(layout.header, buf);

    TableGrid::new(&app.table, app.theme).render(layout.main, buf);

    ProgressBar::new(
        "Answered",
        app.table.completed_count(),
        app.table.len(),
        app.theme,
    )
    .render(layout.progress, buf);

    let hints = [
        "[\u{2190}\u{2191}\u{2193}\u{2192}] Move",
        "[0-9] Answer",
        "[Enter] Check",
        "[r] Reset",
        "[s] Settings",
        "[q] Quit",
    ];
    let share = format!("?{}", app.table.settings().share_query());
    let status = app.status.as_deref().unwrap_or(share.as_str());
    let mut footer: Vec<Line> = pack_hint_lines(&hints, usize::from(layout.footer.width))
        .into_iter()
        .take(1)
        .map(|l| Line::from(Span::styled(l, Style::default().fg(colors.accent()))))
        .collect();
    footer.push(Line::from(Span::styled(
        format!("  {status}"),
        Style::default().fg(colors.muted()),
    )));
    Paragraph::new(footer).render(layout.footer, buf);

    match app.screen {
        AppScreen::Quiz => {}
        AppScreen::Settings => {
            if let Some(form) = app.settings_form.as_ref() {
                let popup = centered_rect(34, 10, area);
                SettingsDialog::new(form, app.theme).render(popup, buf);
            }
        }
        AppScreen::Results => {
            if let Some(result) = app.last_result.as_ref() {
                let popup = centered_rect(40, 9, area);
                ResultsDialog::new(result, app.theme).render(popup, buf);
            }
        }
    }

    if let Some(action) = app.pending {
        let popup = centered_rect(52, 8, area);
        ConfirmDialog::new(action.message(), app.theme).render(popup, buf);
    }
}
