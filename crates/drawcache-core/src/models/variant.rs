//! Lottery game configurations.

use serde::{Deserialize, Serialize};

/// Base URL of the public results feed.
pub const DEFAULT_BASE_URL: &str = "https://servicebus2.caixa.gov.br/portaldeloterias/api";

/// Static configuration for one lottery game.
///
/// Built once at startup and never mutated. `endpoint` is the feed URL for the
/// game; the latest draw lives at `{endpoint}` and a specific contest at
/// `{endpoint}/{contest}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotteryVariant {
    pub id: String,
    pub name: String,
    pub draw_count: usize,
    pub min_number: u8,
    pub max_number: u8,
    pub endpoint: String,
}

impl LotteryVariant {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        draw_count: usize,
        min_number: u8,
        max_number: u8,
        base_url: &str,
    ) -> Self {
        let id = id.into();
        let endpoint = format!("{}/{}", base_url.trim_end_matches('/'), id);
        Self {
            id,
            name: name.into(),
            draw_count,
            min_number,
            max_number,
            endpoint,
        }
    }

    /// Same game, served from a different feed.
    pub fn with_base_url(&self, base_url: &str) -> Self {
        Self::new(
            self.id.clone(),
            self.name.clone(),
            self.draw_count,
            self.min_number,
            self.max_number,
            base_url,
        )
    }

    pub fn latest_url(&self) -> String {
        self.endpoint.clone()
    }

    pub fn contest_url(&self, contest: u32) -> String {
        format!("{}/{}", self.endpoint, contest)
    }

    pub fn accepts(&self, number: u8) -> bool {
        (self.min_number..=self.max_number).contains(&number)
    }

    /// Built-in games, pointed at `base_url`.
    pub fn builtin(base_url: &str) -> Vec<LotteryVariant> {
        vec![
            Self::new("megasena", "Mega-Sena", 6, 1, 60, base_url),
            Self::new("lotofacil", "Lotofácil", 15, 1, 25, base_url),
            Self::new("quina", "Quina", 5, 1, 80, base_url),
            Self::new("lotomania", "Lotomania", 20, 0, 99, base_url),
            Self::new("timemania", "Timemania", 7, 1, 80, base_url),
            Self::new("diadesorte", "Dia de Sorte", 7, 1, 31, base_url),
        ]
    }

    pub fn find_builtin(id: &str, base_url: &str) -> Option<LotteryVariant> {
        Self::builtin(base_url).into_iter().find(|v| v.id == id)
    }
}

impl std::fmt::Display for LotteryVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({} numbers from {} to {})",
            self.name, self.draw_count, self.min_number, self.max_number
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_urls() {
        let v = LotteryVariant::new("lotofacil", "Lotofácil", 15, 1, 25, "http://feed.test/api/");
        assert_eq!(v.latest_url(), "http://feed.test/api/lotofacil");
        assert_eq!(v.contest_url(3200), "http://feed.test/api/lotofacil/3200");
    }

    #[test]
    fn test_with_base_url_keeps_rules() {
        let v = LotteryVariant::find_builtin("megasena", DEFAULT_BASE_URL).unwrap();
        let moved = v.with_base_url("http://localhost:9000");
        assert_eq!(moved.endpoint, "http://localhost:9000/megasena");
        assert_eq!(moved.draw_count, 6);
        assert_eq!(moved.max_number, 60);
    }

    #[test]
    fn test_builtin_ids_are_unique() {
        let all = LotteryVariant::builtin(DEFAULT_BASE_URL);
        let mut ids: Vec<&str> = all.iter().map(|v| v.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), all.len());
    }

    #[test]
    fn test_accepts_range() {
        let v = LotteryVariant::find_builtin("lotomania", DEFAULT_BASE_URL).unwrap();
        assert!(v.accepts(0));
        assert!(v.accepts(99));
        assert!(!v.accepts(100));
    }
}
