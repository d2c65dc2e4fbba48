use serde::{Deserialize, Serialize};

use crate::{Difficulty, GameData, GameError};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 6;
pub const DEFAULT_MAX_PAGE_SIZE: i64 = 100;

/// The value of `difficulty` that disables the difficulty filter
pub const ALL_DIFFICULTIES: &str = "all";

/// Listing parameters as they arrive from a caller
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GameQuery {
    pub search: Option<String>,
    pub difficulty: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Which games a listing should contain
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameFilter {
    /// Case-insensitive substring of the title or description
    pub search: Option<String>,
    pub difficulty: Option<Difficulty>,
}

/// A slice of an ordered listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: i64,
    /// No limit when `None`
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Number of games matching the filter across all pages
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

#[derive(Debug, Clone)]
pub struct GamePage {
    pub items: Vec<GameData>,
    pub pagination: Pagination,
}

impl GameQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn difficulty(mut self, difficulty: impl Into<String>) -> Self {
        self.difficulty = Some(difficulty.into());
        self
    }

    pub fn page(mut self, page: i64) -> Self {
        self.page = Some(page);
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Builds the filter, rejecting unknown difficulties
    pub fn filter(&self) -> Result<GameFilter, GameError> {
        let search = self.search.clone().filter(|s| !s.is_empty());

        let difficulty = match self.difficulty.as_deref() {
            None | Some("") | Some(ALL_DIFFICULTIES) => None,
            Some(other) => Some(other.parse::<Difficulty>().map_err(GameError::Validation)?),
        };

        Ok(GameFilter { search, difficulty })
    }

    /// Returns the clamped page and limit
    pub fn bounds(&self, max_page_size: i64) -> (i64, i64) {
        let page = self.page.unwrap_or(DEFAULT_PAGE).max(1);
        let limit = self
            .limit
            .unwrap_or(DEFAULT_LIMIT)
            .clamp(1, max_page_size.max(1));

        (page, limit)
    }
}

impl GameFilter {
    pub fn matches(&self, game: &GameData) -> bool {
        let matches_search = self.search.as_ref().map_or(true, |search| {
            let needle = search.to_lowercase();

            game.title.to_lowercase().contains(&needle)
                || game.description.to_lowercase().contains(&needle)
        });

        let matches_difficulty = self.difficulty.map_or(true, |d| game.difficulty == d);

        matches_search && matches_difficulty
    }
}

impl PageWindow {
    pub fn all() -> Self {
        Self {
            offset: 0,
            limit: None,
        }
    }

    pub fn page(page: i64, limit: i64) -> Self {
        Self {
            offset: (page - 1).saturating_mul(limit),
            limit: Some(limit),
        }
    }
}

impl Pagination {
    pub fn new(total: i64, page: i64, limit: i64) -> Self {
        Self {
            total,
            page,
            limit,
            total_pages: (total + limit - 1) / limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_sentinel_disables_difficulty() {
        let filter = GameQuery::new().difficulty("all").filter().unwrap();
        assert_eq!(filter.difficulty, None);

        let filter = GameQuery::new().difficulty("Hard").filter().unwrap();
        assert_eq!(filter.difficulty, Some(Difficulty::Hard));
    }

    #[test]
    fn unknown_difficulty_is_rejected() {
        let result = GameQuery::new().difficulty("Impossible").filter();
        assert!(matches!(result, Err(GameError::Validation(_))));
    }

    #[test]
    fn empty_search_is_ignored() {
        let filter = GameQuery::new().search("").filter().unwrap();
        assert_eq!(filter.search, None);
    }

    #[test]
    fn bounds_are_clamped() {
        assert_eq!(GameQuery::new().bounds(100), (1, 6));
        assert_eq!(GameQuery::new().page(0).limit(0).bounds(100), (1, 1));
        assert_eq!(GameQuery::new().page(3).limit(5000).bounds(100), (3, 100));
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(Pagination::new(0, 1, 6).total_pages, 0);
        assert_eq!(Pagination::new(6, 1, 6).total_pages, 1);
        assert_eq!(Pagination::new(7, 1, 6).total_pages, 2);
    }

    #[test]
    fn window_skips_previous_pages() {
        assert_eq!(
            PageWindow::page(3, 6),
            PageWindow {
                offset: 12,
                limit: Some(6)
            }
        );
    }

    #[test]
    fn window_offset_saturates() {
        assert_eq!(PageWindow::page(i64::MAX, 100).offset, i64::MAX);
    }
}
