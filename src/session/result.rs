use crate::session::table::TimesTable;

/// Score card for one validated grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuizResult {
    pub completed: usize,
    pub correct: usize,
    pub total: usize,
}

impl QuizResult {
    pub fn from_table(table: &TimesTable) -> Self {
        Self {
            completed: table.completed_count(),
            correct: table.correct_count(),
            total: table.len(),
        }
    }

    pub fn incorrect(&self) -> usize {
        self.completed.saturating_sub(self.correct)
    }

    pub fn unanswered(&self) -> usize {
        self.total.saturating_sub(self.completed)
    }

    /// Correct answers as a percentage of all questions on the grid.
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.correct as f64 / self.total as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        let result = QuizResult {
            completed: 30,
            correct: 27,
            total: 36,
        };
        assert_eq!(result.incorrect(), 3);
        assert_eq!(result.unanswered(), 6);
        assert!((result.accuracy() - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_grid_is_zero() {
        let result = QuizResult {
            completed: 0,
            correct: 0,
            total: 0,
        };
        assert_eq!(result.accuracy(), 0.0);
    }

    #[test]
    fn test_counts_never_underflow() {
        let result = QuizResult {
            completed: 0,
            correct: 1,
            total: 0,
        };
        assert_eq!(result.incorrect(), 0);
        assert_eq!(result.unanswered(), 0);
    }
}
