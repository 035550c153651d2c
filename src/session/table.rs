use std::fmt;
use std::sync::mpsc;

use chrono::Utc;
use rand::Rng;
use thiserror::Error;

use crate::engine::grid::{self, Cell};
use crate::engine::navigation::{self, Direction};
use crate::store::settings::{SettingsStore, TableSettings};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuizState {
    Answering,
    Validated,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuizError {
    #[error("cell index {index} is out of range for a grid of {len} cells")]
    CellOutOfRange { index: usize, len: usize },
}

/// Opaque token identifying one generation of the grid.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct IdSeed(String);

impl IdSeed {
    pub fn generate() -> Self {
        let millis = Utc::now().timestamp_millis();
        let salt: u16 = rand::thread_rng().r#gen();
        Self(format!("{millis:x}{salt:04x}"))
    }

    /// A fresh seed that is guaranteed to differ from `previous`.
    fn next_after(previous: &IdSeed) -> Self {
        loop {
            let seed = Self::generate();
            if &seed != previous {
                return seed;
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Transition notifications delivered to subscribers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TableEvent {
    Reset {
        settings: TableSettings,
        id_seed: IdSeed,
    },
    CellChanged {
        index: usize,
        answer: Option<u32>,
    },
    Validated {
        completed: usize,
        correct: usize,
    },
}

/// The quiz: a grid of cells, a focus cursor and the answering/validated
/// lifecycle. All operations run to completion synchronously.
pub struct TimesTable {
    settings: SettingsStore,
    rows: Vec<u32>,
    cols: Vec<u32>,
    cells: Vec<Cell>,
    state: QuizState,
    focused: Option<usize>,
    id_seed: IdSeed,
    observers: Vec<mpsc::Sender<TableEvent>>,
}

impl TimesTable {
    pub fn new(settings: SettingsStore) -> Self {
        let initial = settings.settings();
        let mut table = Self {
            settings,
            rows: Vec::new(),
            cols: Vec::new(),
            cells: Vec::new(),
            state: QuizState::Answering,
            focused: None,
            id_seed: IdSeed::generate(),
            observers: Vec::new(),
        };
        table.reset(i64::from(initial.width), i64::from(initial.height));
        table
    }

    /// Build a fresh grid and persist its dimensions.
    pub fn reset(&mut self, width: i64, height: i64) -> TableSettings {
        let dims = TableSettings::clamped(width, height);
        self.rows = grid::build_range(dims.height);
        self.cols = grid::build_range(dims.width);
        self.cells = grid::build_cells(&self.rows, &self.cols);
        self.id_seed = IdSeed::next_after(&self.id_seed);
        self.focused = None;
        self.state = QuizState::Answering;

        if let Err(e) = self.settings.save(dims) {
            log::warn!("could not persist table settings: {e:#}");
        }
        log::info!(
            "new {}x{} table (seed {})",
            dims.width,
            dims.height,
            self.id_seed
        );

        self.notify(TableEvent::Reset {
            settings: dims,
            id_seed: self.id_seed.clone(),
        });
        dims
    }

    /// Move the cursor to `index`. Never rejects: anything outside the grid
    /// clears the focus instead.
    pub fn focus_cell(&mut self, index: usize) {
        if index < self.cells.len() {
            self.focused = Some(index);
        } else {
            log::debug!("focus {index} outside grid, clearing focus");
            self.focused = None;
        }
    }

    pub fn clear_focus(&mut self) {
        self.focused = None;
    }

    /// Keyboard navigation with edge wraparound. Without a current focus the
    /// first cell is selected.
    pub fn move_focus(&mut self, direction: Direction) {
        if self.cells.is_empty() {
            return;
        }
        let next = match self.focused {
            Some(current) => {
                navigation::resolve(direction, current, self.cols.len(), self.rows.len())
            }
            None => 0,
        };
        self.focused = Some(next);
    }

    pub fn set_cell_value(&mut self, index: usize, value: Option<u32>) -> Result<(), QuizError> {
        let len = self.cells.len();
        let Some(slot) = self.cells.get_mut(index) else {
            log::warn!("rejected answer for cell {index} (grid has {len})");
            return Err(QuizError::CellOutOfRange { index, len });
        };
        if self.state == QuizState::Validated {
            log::warn!("answer for cell {index} changed after validation");
        }
        *slot = Cell {
            answer: value,
            is_correct: None,
            ..*slot
        };
        self.notify(TableEvent::CellChanged {
            index,
            answer: value,
        });
        Ok(())
    }

    /// Mark every answered cell right or wrong and finish the round.
    pub fn validate(&mut self) {
        for cell in &mut self.cells {
            cell.is_correct = cell.answer.map(|answer| answer == cell.product());
        }
        self.state = QuizState::Validated;

        let completed = self.completed_count();
        let correct = self.correct_count();
        log::info!(
            "validated: {completed} answered, {correct} correct of {}",
            self.cells.len()
        );
        self.notify(TableEvent::Validated { completed, correct });
    }

    pub fn subscribe(&mut self) -> mpsc::Receiver<TableEvent> {
        let (tx, rx) = mpsc::channel();
        self.observers.push(tx);
        rx
    }

    fn notify(&mut self, event: TableEvent) {
        self.observers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn rows(&self) -> &[u32] {
        &self.rows
    }

    pub fn cols(&self) -> &[u32] {
        &self.cols
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    /// Cell in column `col_idx` of row `row_idx` (both zero-based).
    pub fn cell_at(&self, col_idx: usize, row_idx: usize) -> Option<&Cell> {
        if col_idx >= self.cols.len() || row_idx >= self.rows.len() {
            return None;
        }
        self.cells
            .get(grid::cell_index(row_idx, col_idx, self.cols.len()))
    }

    pub fn focused_cell(&self) -> Option<usize> {
        self.focused
    }

    pub fn state(&self) -> QuizState {
        self.state
    }

    pub fn id_seed(&self) -> &IdSeed {
        &self.id_seed
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn width(&self) -> usize {
        self.cols.len()
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn completed_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_answered()).count()
    }

    pub fn correct_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|c| c.is_correct == Some(true))
            .count()
    }

    /// Some, but not all, questions answered.
    pub fn has_partial_progress(&self) -> bool {
        let completed = self.completed_count();
        completed != 0 && completed != self.cells.len()
    }

    pub fn has_unanswered(&self) -> bool {
        self.completed_count() < self.cells.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::json_store::JsonStore;
    use crate::store::settings::ShareParams;
    use tempfile::TempDir;

    fn make_table(width: i64, height: i64) -> (TempDir, TimesTable) {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        let mut table = TimesTable::new(SettingsStore::new(store, ShareParams::default()));
        table.reset(width, height);
        (dir, table)
    }

    #[test]
    fn test_new_table_uses_loaded_settings() {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        let table = TimesTable::new(SettingsStore::new(store, ShareParams::default()));
        assert_eq!(table.width(), 12);
        assert_eq!(table.height(), 12);
        assert_eq!(table.len(), 144);
        assert_eq!(table.state(), QuizState::Answering);
        assert_eq!(table.focused_cell(), None);
    }

    #[test]
    fn test_reset_clamps_and_rebuilds() {
        let (_dir, mut table) = make_table(6, 6);
        table.set_cell_value(0, Some(1)).unwrap();
        table.focus_cell(3);
        table.validate();

        let dims = table.reset(40, 2);
        assert_eq!(dims, TableSettings { width: 24, height: 6 });
        assert_eq!(table.len(), 144);
        assert_eq!(table.cols().len(), 24);
        assert_eq!(table.rows().len(), 6);
        assert_eq!(table.state(), QuizState::Answering);
        assert_eq!(table.focused_cell(), None);
        assert!(table.cells().iter().all(|c| c.answer.is_none() && c.is_correct.is_none()));
        assert_eq!(table.settings().settings(), dims);
    }

    #[test]
    fn test_reset_regenerates_seed() {
        let (_dir, mut table) = make_table(6, 6);
        let first = table.id_seed().clone();
        table.reset(6, 6);
        assert_ne!(table.id_seed(), &first);
        assert!(!table.id_seed().as_str().is_empty());
    }

    #[test]
    fn test_six_by_six_scenario() {
        let (_dir, mut table) = make_table(6, 6);
        assert_eq!(table.len(), 36);
        assert!(table.cells().iter().all(|c| c.answer.is_none()));

        let cell = table.cell(7).unwrap();
        assert_eq!((cell.x, cell.y), (2, 2));
        table.set_cell_value(7, Some(4)).unwrap();
        table.validate();
        assert_eq!(table.cell(7).unwrap().is_correct, Some(true));

        table.set_cell_value(0, Some(5)).unwrap();
        table.validate();
        assert_eq!(table.cell(0).unwrap().is_correct, Some(false));
        assert_eq!(table.cell(7).unwrap().is_correct, Some(true));
    }

    #[test]
    fn test_validate_formula_for_every_cell() {
        let (_dir, mut table) = make_table(7, 8);
        for i in 0..table.len() {
            let cell = *table.cell(i).unwrap();
            let answer = match i % 3 {
                0 => Some(cell.product()),
                1 => Some(cell.product() + 1),
                _ => None,
            };
            table.set_cell_value(i, answer).unwrap();
        }
        table.validate();
        assert_eq!(table.state(), QuizState::Validated);
        for cell in table.cells() {
            match cell.answer {
                Some(answer) => assert_eq!(cell.is_correct, Some(answer == cell.x * cell.y)),
                None => assert_eq!(cell.is_correct, None),
            }
        }
    }

    #[test]
    fn test_validate_is_idempotent() {
        let (_dir, mut table) = make_table(6, 6);
        table.set_cell_value(3, Some(4)).unwrap();
        table.set_cell_value(8, Some(9)).unwrap();
        table.validate();
        let first: Vec<Cell> = table.cells().to_vec();
        table.validate();
        assert_eq!(table.cells(), first.as_slice());
    }

    #[test]
    fn test_validate_with_nothing_answered() {
        let (_dir, mut table) = make_table(6, 6);
        table.validate();
        assert_eq!(table.state(), QuizState::Validated);
        assert!(table.cells().iter().all(|c| c.is_correct.is_none()));
        assert_eq!(table.correct_count(), 0);
    }

    #[test]
    fn test_set_cell_value_out_of_range_is_reported() {
        let (_dir, mut table) = make_table(6, 6);
        let before = table.cells().to_vec();
        let err = table.set_cell_value(36, Some(1)).unwrap_err();
        assert_eq!(err, QuizError::CellOutOfRange { index: 36, len: 36 });
        assert!(err.to_string().contains("36"));
        assert_eq!(table.cells(), before.as_slice());
    }

    #[test]
    fn test_set_cell_value_only_touches_one_slot() {
        let (_dir, mut table) = make_table(6, 6);
        table.set_cell_value(10, Some(12)).unwrap();
        for (i, cell) in table.cells().iter().enumerate() {
            if i == 10 {
                assert_eq!(cell.answer, Some(12));
            } else {
                assert_eq!(cell.answer, None);
            }
        }
        table.set_cell_value(10, None).unwrap();
        assert_eq!(table.completed_count(), 0);
    }

    #[test]
    fn test_set_after_validation_clears_verdict_until_revalidated() {
        let (_dir, mut table) = make_table(6, 6);
        table.set_cell_value(0, Some(1)).unwrap();
        table.validate();
        table.set_cell_value(0, Some(9)).unwrap();
        let cell = table.cell(0).unwrap();
        assert_eq!(cell.answer, Some(9));
        assert_eq!(cell.is_correct, None);
        assert_eq!(table.state(), QuizState::Validated);
        table.validate();
        assert_eq!(table.cell(0).unwrap().is_correct, Some(false));
    }

    #[test]
    fn test_clearing_after_validation_keeps_counters_consistent() {
        let (_dir, mut table) = make_table(6, 6);
        table.set_cell_value(0, Some(1)).unwrap();
        table.validate();
        assert_eq!(table.correct_count(), 1);

        table.set_cell_value(0, None).unwrap();
        let cell = table.cell(0).unwrap();
        assert_eq!((cell.answer, cell.is_correct), (None, None));
        assert_eq!(table.completed_count(), 0);
        assert_eq!(table.correct_count(), 0);
        assert!(table.cells().iter().all(|c| c.answer.is_some() || c.is_correct.is_none()));
    }

    #[test]
    fn test_focus_cell_out_of_range_clears_focus() {
        let (_dir, mut table) = make_table(6, 6);
        table.focus_cell(35);
        assert_eq!(table.focused_cell(), Some(35));
        table.focus_cell(36);
        assert_eq!(table.focused_cell(), None);
        table.focus_cell(2);
        table.clear_focus();
        assert_eq!(table.focused_cell(), None);
    }

    #[test]
    fn test_move_focus_wraps() {
        let (_dir, mut table) = make_table(6, 6);
        table.move_focus(Direction::Down);
        assert_eq!(table.focused_cell(), Some(0));
        table.move_focus(Direction::Left);
        assert_eq!(table.focused_cell(), Some(5));
        table.move_focus(Direction::Up);
        assert_eq!(table.focused_cell(), Some(35));
    }

    #[test]
    fn test_cell_at_matches_row_major_index() {
        let (_dir, table) = make_table(8, 6);
        let cell = table.cell_at(3, 2).unwrap();
        assert_eq!((cell.x, cell.y), (4, 3));
        assert!(table.cell_at(8, 0).is_none());
        assert!(table.cell_at(0, 6).is_none());
    }

    #[test]
    fn test_progress_counters() {
        let (_dir, mut table) = make_table(6, 6);
        assert!(!table.has_partial_progress());
        assert!(table.has_unanswered());
        table.set_cell_value(1, Some(2)).unwrap();
        assert!(table.has_partial_progress());
        for i in 0..table.len() {
            let product = table.cell(i).unwrap().product();
            table.set_cell_value(i, Some(product)).unwrap();
        }
        assert!(!table.has_partial_progress());
        assert!(!table.has_unanswered());
        table.validate();
        assert_eq!(table.correct_count(), 36);
    }

    #[test]
    fn test_subscribers_see_transitions() {
        let (_dir, mut table) = make_table(6, 6);
        let rx = table.subscribe();
        table.focus_cell(4);
        table.set_cell_value(4, Some(5)).unwrap();
        table.validate();
        let dims = table.reset(7, 7);

        let events: Vec<TableEvent> = rx.try_iter().collect();
        assert_eq!(events.len(), 3);
        assert_eq!(
            events[0],
            TableEvent::CellChanged {
                index: 4,
                answer: Some(5)
            }
        );
        assert_eq!(
            events[1],
            TableEvent::Validated {
                completed: 1,
                correct: 1
            }
        );
        assert!(matches!(&events[2], TableEvent::Reset { settings, .. } if *settings == dims));
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let (_dir, mut table) = make_table(6, 6);
        drop(table.subscribe());
        table.validate();
        assert!(table.observers.is_empty());
    }
}
