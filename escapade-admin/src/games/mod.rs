mod input;
mod query;
mod questions;
mod stats;

pub use input::*;
pub use query::*;
pub use questions::*;
pub use stats::*;

use chrono::Utc;
use log::info;
use thiserror::Error;

use crate::{
    AdminEvent, DatabaseError, EventSender, GameChange, GameData, PrimaryKey, SharedDatabase,
};

#[derive(Debug, Error)]
pub enum GameError {
    /// The input breaks one of the rules of a game
    #[error("{0}")]
    Validation(String),
    #[error("Game not found")]
    NotFound,
    #[error(transparent)]
    Db(DatabaseError),
}

impl From<DatabaseError> for GameError {
    fn from(value: DatabaseError) -> Self {
        match value {
            DatabaseError::NotFound { .. } => GameError::NotFound,
            e => GameError::Db(e),
        }
    }
}

/// Reads and writes games, signalling every change to listeners.
///
/// Failed writes leave the stored game untouched.
pub struct GameManager {
    db: SharedDatabase,
    events: EventSender,
    max_page_size: i64,
}

impl GameManager {
    pub fn new(db: &SharedDatabase, events: EventSender, max_page_size: i64) -> Self {
        Self {
            db: db.clone(),
            events,
            max_page_size,
        }
    }

    /// Returns a page of matching games, newest first, with the total
    /// number of matches across all pages.
    pub async fn list_games(&self, query: GameQuery) -> Result<GamePage, GameError> {
        let filter = query.filter()?;
        let (page, limit) = query.bounds(self.max_page_size);

        let (total, items) = tokio::try_join!(
            self.db.count_games(&filter),
            self.db.list_games(&filter, PageWindow::page(page, limit))
        )?;

        Ok(GamePage {
            items,
            pagination: Pagination::new(total, page, limit),
        })
    }

    pub async fn game_by_id(&self, game_id: PrimaryKey) -> Result<GameData, GameError> {
        Ok(self.db.game_by_id(game_id).await?)
    }

    pub async fn create(&self, input: &RawGameInput) -> Result<GameData, GameError> {
        let mut draft = GameDraft::default();
        draft.apply(input)?;

        let game = self.db.create_game(draft.finish()?).await?;

        info!("Created game {} ({})", game.id, game.title);
        self.emit(game.id, GameChange::Created);

        Ok(game)
    }

    /// Merges the given fields over the stored game and checks the result
    pub async fn update(
        &self,
        game_id: PrimaryKey,
        input: &RawGameInput,
    ) -> Result<GameData, GameError> {
        let existing = self.db.game_by_id(game_id).await?;

        let mut draft = GameDraft::from(&existing);
        draft.apply(input)?;

        let game = self.db.update_game(game_id, draft.finish()?).await?;

        info!("Updated game {} ({})", game.id, game.title);
        self.emit(game.id, GameChange::Updated);

        Ok(game)
    }

    pub async fn delete(&self, game_id: PrimaryKey) -> Result<(), GameError> {
        self.db.delete_game(game_id).await?;

        info!("Deleted game {}", game_id);
        self.emit(game_id, GameChange::Deleted);

        Ok(())
    }

    pub async fn toggle_active(&self, game_id: PrimaryKey) -> Result<GameData, GameError> {
        let game = self.db.toggle_game_active(game_id).await?;

        info!("Game {} is now active: {}", game.id, game.is_active);
        self.emit(game.id, GameChange::Toggled);

        Ok(game)
    }

    pub async fn dashboard_stats(&self) -> Result<DashboardStats, GameError> {
        let games = self
            .db
            .list_games(&GameFilter::default(), PageWindow::all())
            .await?;

        Ok(DashboardStats::compute(&games, Utc::now()))
    }

    fn emit(&self, game_id: PrimaryKey, change: GameChange) {
        // Nobody listening is fine
        let _ = self
            .events
            .send(AdminEvent::GamesInvalidated { game_id, change });
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashSet, sync::Arc};

    use crossbeam::channel::unbounded;

    use super::*;
    use crate::{Difficulty, EventReceiver, MemoryDatabase};

    fn manager() -> (GameManager, EventReceiver) {
        let db: SharedDatabase = Arc::new(MemoryDatabase::new());
        let (sender, receiver) = unbounded();

        (GameManager::new(&db, sender, DEFAULT_MAX_PAGE_SIZE), receiver)
    }

    fn input(title: &str, difficulty: &str) -> RawGameInput {
        RawGameInput::new()
            .with("title", title)
            .with("description", "Find the way out before time runs out")
            .with("difficulty", difficulty)
            .with("duration", "60")
            .with("price", "25")
            .with("minPlayers", "2")
            .with("maxPlayers", "6")
            .with("thumbnail", "https://example.com/thumb.jpg")
    }

    async fn create_many(manager: &GameManager, count: usize) -> Vec<GameData> {
        let mut games = vec![];

        for i in 0..count {
            games.push(manager.create(&input(&format!("Room {i}"), "Medium")).await.unwrap());
        }

        games
    }

    #[tokio::test]
    async fn filters_by_difficulty() {
        let (manager, _) = manager();

        for (title, difficulty) in [
            ("Haunted Manor", "Easy"),
            ("Pirate Cove", "Easy"),
            ("Lost Temple", "Easy"),
            ("Cyber Heist", "Hard"),
            ("Prison Break", "Hard"),
        ] {
            manager.create(&input(title, difficulty)).await.unwrap();
        }

        let page = manager
            .list_games(GameQuery::new().difficulty("Easy"))
            .await
            .unwrap();

        assert_eq!(page.items.len(), 3);
        assert_eq!(page.pagination.total, 3);
        assert!(page.items.iter().all(|g| g.difficulty == Difficulty::Easy));

        let page = manager
            .list_games(GameQuery::new().difficulty("all"))
            .await
            .unwrap();
        assert_eq!(page.pagination.total, 5);
    }

    #[tokio::test]
    async fn search_matches_title_or_description() {
        let (manager, _) = manager();

        manager.create(&input("Haunted Manor", "Easy")).await.unwrap();
        manager
            .create(&input("Pirate Cove", "Easy").with("description", "Sail among GHOSTLY ships"))
            .await
            .unwrap();
        manager.create(&input("Lost Temple", "Easy")).await.unwrap();

        let page = manager
            .list_games(GameQuery::new().search("ghost"))
            .await
            .unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].title, "Pirate Cove");

        let page = manager
            .list_games(GameQuery::new().search("MANOR"))
            .await
            .unwrap();
        assert_eq!(page.items[0].title, "Haunted Manor");
    }

    #[tokio::test]
    async fn pages_cover_every_match_once() {
        let (manager, _) = manager();
        let created = create_many(&manager, 14).await;

        let first = manager.list_games(GameQuery::new().limit(4)).await.unwrap();
        assert_eq!(first.pagination.total, 14);
        assert_eq!(first.pagination.total_pages, 4);

        let mut seen = vec![];
        for page in 1..=first.pagination.total_pages {
            let result = manager
                .list_games(GameQuery::new().page(page).limit(4))
                .await
                .unwrap();

            assert_eq!(result.pagination.total, 14);
            seen.extend(result.items.into_iter().map(|g| g.id));
        }

        let unique: HashSet<_> = seen.iter().collect();
        assert_eq!(seen.len(), 14);
        assert_eq!(unique.len(), 14);

        let newest_first: Vec<_> = created.iter().rev().map(|g| g.id).collect();
        assert_eq!(seen, newest_first);
    }

    #[tokio::test]
    async fn page_past_the_end_is_empty() {
        let (manager, _) = manager();
        create_many(&manager, 3).await;

        let page = manager
            .list_games(GameQuery::new().page(5).limit(2))
            .await
            .unwrap();

        assert!(page.items.is_empty());
        assert_eq!(page.pagination.total, 3);
        assert_eq!(page.pagination.total_pages, 2);
    }

    #[tokio::test]
    async fn huge_page_numbers_are_empty() {
        let (manager, _) = manager();
        create_many(&manager, 1).await;

        let page = manager
            .list_games(GameQuery::new().page(i64::MAX))
            .await
            .unwrap();

        assert!(page.items.is_empty());
        assert_eq!(page.pagination.total, 1);
        assert_eq!(page.pagination.page, i64::MAX);
    }

    #[tokio::test]
    async fn filtered_pages_cover_every_match_once() {
        let (manager, _) = manager();
        let mut expected = vec![];

        for i in 0..18 {
            let difficulty = if i % 2 == 0 { "Easy" } else { "Hard" };
            let title = if i % 3 == 0 {
                format!("Room {i}")
            } else {
                format!("Vault {i}")
            };

            let game = manager.create(&input(&title, difficulty)).await.unwrap();
            if i % 2 == 0 && i % 3 != 0 {
                expected.push(game.id);
            }
        }
        expected.reverse();

        let query = || GameQuery::new().difficulty("Easy").search("vault").limit(4);

        let first = manager.list_games(query()).await.unwrap();
        assert_eq!(first.pagination.total, 6);
        assert_eq!(first.pagination.total_pages, 2);

        let mut seen = vec![];
        for page in 1..=first.pagination.total_pages {
            let result = manager.list_games(query().page(page)).await.unwrap();

            assert_eq!(result.pagination.total, 6);
            assert!(result.items.len() <= 4);
            seen.extend(result.items.into_iter().map(|g| g.id));
        }

        assert_eq!(seen, expected);
    }

    #[tokio::test]
    async fn comma_separated_images_are_split() {
        let (manager, _) = manager();

        let game = manager
            .create(&input("Haunted Manor", "Easy").with("images", "a.jpg, b.jpg"))
            .await
            .unwrap();

        assert_eq!(game.images, vec!["a.jpg", "b.jpg"]);
        assert_eq!(manager.game_by_id(game.id).await.unwrap().images, game.images);
    }

    #[tokio::test]
    async fn invalid_player_range_is_not_persisted() {
        let (manager, receiver) = manager();

        let result = manager
            .create(&input("Haunted Manor", "Easy").with("minPlayers", "8"))
            .await;
        assert!(matches!(result, Err(GameError::Validation(_))));

        let page = manager.list_games(GameQuery::new()).await.unwrap();
        assert_eq!(page.pagination.total, 0);

        let game = manager.create(&input("Haunted Manor", "Easy")).await.unwrap();
        let result = manager
            .update(game.id, &RawGameInput::new().with("maxPlayers", "1"))
            .await;
        assert!(matches!(result, Err(GameError::Validation(_))));

        let stored = manager.game_by_id(game.id).await.unwrap();
        assert_eq!(stored, game);

        // Only the successful create was signalled
        assert_eq!(receiver.try_iter().count(), 1);
    }

    #[tokio::test]
    async fn update_merges_given_fields() {
        let (manager, _) = manager();
        let game = manager.create(&input("Haunted Manor", "Easy")).await.unwrap();

        let updated = manager
            .update(
                game.id,
                &RawGameInput::new()
                    .with("price", "40")
                    .with("questions", r#"[{"name": "Door"}, {"name": "Key", "index": 7}]"#),
            )
            .await
            .unwrap();

        assert_eq!(updated.price, 40.0);
        assert_eq!(updated.title, "Haunted Manor");
        assert_eq!(updated.questions.len(), 2);
        assert_eq!(updated.questions[1].index, 1);
    }

    #[tokio::test]
    async fn missing_games_are_not_found() {
        let (manager, _) = manager();

        assert!(matches!(manager.game_by_id(42).await, Err(GameError::NotFound)));
        assert!(matches!(manager.delete(42).await, Err(GameError::NotFound)));
        assert!(matches!(manager.toggle_active(42).await, Err(GameError::NotFound)));
        assert!(matches!(
            manager.update(42, &RawGameInput::new()).await,
            Err(GameError::NotFound)
        ));
    }

    #[tokio::test]
    async fn toggling_twice_restores_the_flag() {
        let (manager, _) = manager();
        let game = manager.create(&input("Haunted Manor", "Easy")).await.unwrap();

        let once = manager.toggle_active(game.id).await.unwrap();
        let twice = manager.toggle_active(game.id).await.unwrap();

        assert_eq!(once.is_active, !game.is_active);
        assert_eq!(twice.is_active, game.is_active);
    }

    #[tokio::test]
    async fn mutations_are_signalled() {
        let (manager, receiver) = manager();

        let game = manager.create(&input("Haunted Manor", "Easy")).await.unwrap();
        manager
            .update(game.id, &RawGameInput::new().with("price", "30"))
            .await
            .unwrap();
        manager.toggle_active(game.id).await.unwrap();
        manager.delete(game.id).await.unwrap();

        let changes: Vec<_> = receiver
            .try_iter()
            .map(|AdminEvent::GamesInvalidated { game_id, change }| {
                assert_eq!(game_id, game.id);
                change
            })
            .collect();

        assert_eq!(
            changes,
            vec![
                GameChange::Created,
                GameChange::Updated,
                GameChange::Toggled,
                GameChange::Deleted
            ]
        );
    }

    #[tokio::test]
    async fn stats_cover_every_game() {
        let (manager, _) = manager();
        create_many(&manager, 8).await;

        let stats = manager.dashboard_stats().await.unwrap();

        assert_eq!(stats.total_games, 8);
        assert_eq!(stats.recent_games.len(), 3);
        assert_eq!(stats.distribution.medium, 100);
    }
}
