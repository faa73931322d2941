use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::LotteryVariant;

/// Reasons a draw payload is rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("expected {expected} numbers, got {actual}")]
    WrongCount { expected: usize, actual: usize },

    #[error("number {number} outside [{min}, {max}]")]
    OutOfRange { number: i64, min: u8, max: u8 },

    #[error("number {0} drawn twice")]
    Duplicate(u8),

    #[error("not a number: {0}")]
    NotANumber(String),

    #[error("contest must be positive")]
    ZeroContest,

    #[error("asked for contest {expected}, feed returned {actual}")]
    ContestMismatch { expected: u32, actual: u32 },
}

/// One lottery outcome, in the on-disk field layout.
///
/// Only constructed through [`DrawRecord::new`], which enforces the variant's
/// count and range rules and sorts the numbers. Records are never modified
/// after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawRecord {
    #[serde(rename = "concurso")]
    contest: u32,
    #[serde(rename = "data")]
    date: String,
    #[serde(rename = "numeros")]
    numbers: Vec<u8>,
    #[serde(rename = "acumulado", default)]
    accumulated: bool,
    #[serde(rename = "valorEstimadoProximoConcurso", default)]
    next_estimate: f64,
    #[serde(rename = "dataProximoConcurso", default)]
    next_date: Option<String>,
}

impl DrawRecord {
    pub fn new(
        variant: &LotteryVariant,
        contest: u32,
        date: impl Into<String>,
        mut numbers: Vec<u8>,
    ) -> Result<Self, ValidationError> {
        if contest == 0 {
            return Err(ValidationError::ZeroContest);
        }
        if numbers.len() != variant.draw_count {
            return Err(ValidationError::WrongCount {
                expected: variant.draw_count,
                actual: numbers.len(),
            });
        }
        if let Some(&bad) = numbers.iter().find(|&&n| !variant.accepts(n)) {
            return Err(ValidationError::OutOfRange {
                number: bad as i64,
                min: variant.min_number,
                max: variant.max_number,
            });
        }

        numbers.sort_unstable();
        if let Some(pair) = numbers.windows(2).find(|w| w[0] == w[1]) {
            return Err(ValidationError::Duplicate(pair[0]));
        }

        Ok(Self {
            contest,
            date: date.into(),
            numbers,
            accumulated: false,
            next_estimate: 0.0,
            next_date: None,
        })
    }

    /// Attach jackpot details for the following contest.
    pub fn with_jackpot(mut self, accumulated: bool, next_estimate: f64, next_date: Option<String>) -> Self {
        self.accumulated = accumulated;
        self.next_estimate = next_estimate;
        self.next_date = next_date;
        self
    }

    pub fn contest(&self) -> u32 {
        self.contest
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    /// Drawn numbers, ascending.
    pub fn numbers(&self) -> &[u8] {
        &self.numbers
    }

    pub fn accumulated(&self) -> bool {
        self.accumulated
    }

    pub fn next_estimate(&self) -> f64 {
        self.next_estimate
    }

    pub fn next_date(&self) -> Option<&str> {
        self.next_date.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::variant::DEFAULT_BASE_URL;

    fn megasena() -> LotteryVariant {
        LotteryVariant::find_builtin("megasena", DEFAULT_BASE_URL).unwrap()
    }

    #[test]
    fn test_new_sorts_numbers() {
        let draw = DrawRecord::new(&megasena(), 10, "01/02/2020", vec![60, 3, 17, 1, 42, 9]).unwrap();
        assert_eq!(draw.numbers(), &[1, 3, 9, 17, 42, 60]);
        assert_eq!(draw.contest(), 10);
    }

    #[test]
    fn test_new_rejects_wrong_count() {
        let err = DrawRecord::new(&megasena(), 1, "x", vec![1, 2, 3]).unwrap_err();
        assert_eq!(err, ValidationError::WrongCount { expected: 6, actual: 3 });
    }

    #[test]
    fn test_new_rejects_out_of_range() {
        let err = DrawRecord::new(&megasena(), 1, "x", vec![1, 2, 3, 4, 5, 61]).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { number: 61, .. }));
    }

    #[test]
    fn test_new_rejects_duplicates() {
        let err = DrawRecord::new(&megasena(), 1, "x", vec![5, 2, 3, 4, 5, 6]).unwrap_err();
        assert_eq!(err, ValidationError::Duplicate(5));
    }

    #[test]
    fn test_new_rejects_zero_contest() {
        let err = DrawRecord::new(&megasena(), 0, "x", vec![1, 2, 3, 4, 5, 6]).unwrap_err();
        assert_eq!(err, ValidationError::ZeroContest);
    }

    #[test]
    fn test_serialized_field_names() {
        let draw = DrawRecord::new(&megasena(), 2700, "20/03/2024", vec![1, 2, 3, 4, 5, 6])
            .unwrap()
            .with_jackpot(true, 45_000_000.0, Some("23/03/2024".to_string()));
        let json = serde_json::to_value(&draw).unwrap();
        assert_eq!(json["concurso"], 2700);
        assert_eq!(json["data"], "20/03/2024");
        assert_eq!(json["numeros"], serde_json::json!([1, 2, 3, 4, 5, 6]));
        assert_eq!(json["acumulado"], true);
        assert_eq!(json["valorEstimadoProximoConcurso"], 45_000_000.0);
        assert_eq!(json["dataProximoConcurso"], "23/03/2024");
    }
}
