use std::sync::mpsc;

use crossterm::event::KeyCode;

use timestable::engine::navigation::Direction;
use timestable::session::input;
use timestable::session::result::QuizResult;
use timestable::session::table::{QuizState, TableEvent, TimesTable};
use timestable::store::settings::{SettingsStore, TableSettings};

use crate::config::Config;
use crate::ui::components::settings_form::SettingsForm;
use crate::ui::theme::Theme;

/// Arrow keys plus vim-style hjkl.
pub fn direction_for_key(code: KeyCode) -> Option<Direction> {
    match code {
        KeyCode::Up | KeyCode::Char('k') => Some(Direction::Up),
        KeyCode::Down | KeyCode::Char('j') => Some(Direction::Down),
        KeyCode::Left | KeyCode::Char('h') => Some(Direction::Left),
        KeyCode::Right | KeyCode::Char('l') => Some(Direction::Right),
        _ => None,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Quiz,
    Settings,
    Results,
}

/// Destructive actions that wait for a yes/no answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PendingAction {
    Reset,
    ApplySettings(TableSettings),
    Validate,
    Quit,
}

impl PendingAction {
    pub fn message(self) -> &'static str {
        match self {
            PendingAction::Reset => {
                "You have unanswered questions. Starting over will clear the board. Continue?"
            }
            PendingAction::ApplySettings(_) => {
                "You have unanswered questions. Updating your settings will reset the board. Continue?"
            }
            PendingAction::Validate => {
                "Some questions are still unanswered. Check your answers anyway?"
            }
            PendingAction::Quit => "You are in the middle of a table. Quit anyway?",
        }
    }
}

pub struct App {
    pub screen: AppScreen,
    pub table: TimesTable,
    pub theme: &'static Theme,
    pub settings_form: Option<SettingsForm>,
    pub pending: Option<PendingAction>,
    pub last_result: Option<QuizResult>,
    pub status: Option<String>,
    pub should_quit: bool,
    table_events: mpsc::Receiver<TableEvent>,
}

impl App {
    pub fn new(config: &Config, settings: SettingsStore) -> Self {
        let loaded_theme = Theme::load(&config.theme).unwrap_or_default();
        let theme: &'static Theme = Box::leak(Box::new(loaded_theme));

        let mut table = TimesTable::new(settings);
        let table_events = table.subscribe();

        Self {
            screen: AppScreen::Quiz,
            table,
            theme,
            settings_form: None,
            pending: None,
            last_result: None,
            status: None,
            should_quit: false,
            table_events,
        }
    }

    /// React to state machine transitions since the last call.
    pub fn drain_table_events(&mut self) {
        while let Ok(event) = self.table_events.try_recv() {
            match event {
                TableEvent::Reset { settings, .. } => {
                    self.last_result = None;
                    self.status = Some(format!(
                        "New {} \u{00d7} {} table",
                        settings.width, settings.height
                    ));
                }
                TableEvent::Validated { .. } => {
                    self.last_result = Some(QuizResult::from_table(&self.table));
                    self.screen = AppScreen::Results;
                    self.status = None;
                }
                TableEvent::CellChanged { .. } => {}
            }
        }
    }

    fn ask(&mut self, action: PendingAction) {
        log::debug!("asking for confirmation: {action:?}");
        self.pending = Some(action);
    }

    /// Resolve the open confirmation prompt.
    pub fn answer_pending(&mut self, confirmed: bool) {
        let Some(action) = self.pending.take() else {
            return;
        };
        if confirmed {
            self.run(action);
        }
    }

    fn run(&mut self, action: PendingAction) {
        match action {
            PendingAction::Reset => {
                let current = self.table.settings().settings();
                self.table
                    .reset(i64::from(current.width), i64::from(current.height));
                self.screen = AppScreen::Quiz;
            }
            PendingAction::ApplySettings(settings) => {
                self.table
                    .reset(i64::from(settings.width), i64::from(settings.height));
                self.settings_form = None;
                self.screen = AppScreen::Quiz;
            }
            PendingAction::Validate => self.table.validate(),
            PendingAction::Quit => self.should_quit = true,
        }
        self.drain_table_events();
    }

    pub fn request_reset(&mut self) {
        if self.table.state() == QuizState::Answering && self.table.has_partial_progress() {
            self.ask(PendingAction::Reset);
        } else {
            self.run(PendingAction::Reset);
        }
    }

    pub fn request_validate(&mut self) {
        match self.table.state() {
            QuizState::Validated => {
                if self.last_result.is_some() {
                    self.screen = AppScreen::Results;
                }
            }
            QuizState::Answering if self.table.has_unanswered() => {
                self.ask(PendingAction::Validate);
            }
            QuizState::Answering => self.run(PendingAction::Validate),
        }
    }

    pub fn request_quit(&mut self) {
        if self.table.state() == QuizState::Answering && self.table.has_partial_progress() {
            self.ask(PendingAction::Quit);
        } else {
            self.should_quit = true;
        }
    }

    pub fn open_settings(&mut self) {
        self.settings_form = Some(SettingsForm::new(self.table.settings().settings()));
        self.screen = AppScreen::Settings;
    }

    pub fn close_settings(&mut self) {
        self.settings_form = None;
        self.screen = AppScreen::Quiz;
    }

    pub fn submit_settings(&mut self) {
        let Some(form) = self.settings_form.as_ref() else {
            return;
        };
        let (width, height) = form.values();
        let settings = TableSettings::clamped(width, height);
        let action = PendingAction::ApplySettings(settings);
        if self.table.state() == QuizState::Answering && self.table.has_partial_progress() {
            self.ask(action);
        } else {
            self.run(action);
        }
    }

    pub fn close_results(&mut self) {
        self.screen = AppScreen::Quiz;
    }

    pub fn move_focus(&mut self, direction: Direction) {
        self.table.move_focus(direction);
    }

    pub fn clear_focus(&mut self) {
        self.table.clear_focus();
    }

    fn edit_focused(&mut self, edit: impl FnOnce(Option<u32>) -> Option<u32>) {
        if self.table.state() != QuizState::Answering {
            return;
        }
        let index = match self.table.focused_cell() {
            Some(index) => index,
            None => {
                self.table.focus_cell(0);
                0
            }
        };
        let current = self.table.cell(index).and_then(|c| c.answer);
        if let Err(e) = self.table.set_cell_value(index, edit(current)) {
            self.status = Some(e.to_string());
        }
        self.drain_table_events();
    }

    pub fn type_digit(&mut self, ch: char) {
        self.edit_focused(|answer| input::push_digit(answer, ch));
    }

    pub fn backspace(&mut self) {
        self.edit_focused(input::pop_digit);
    }

    pub fn clear_cell(&mut self) {
        self.edit_focused(|_| None);
    }

    pub fn paste(&mut self, text: &str) {
        if let Some(answer) = input::parse_answer(text) {
            self.edit_focused(|_| Some(answer));
        }
    }
}
