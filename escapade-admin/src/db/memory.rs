use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use crate::{
    Database, DatabaseError, GameData, GameFields, GameFilter, NewUser,
    PageWindow, PrimaryKey, Result, UserData,
};

/// An in-process store with the same semantics as [crate::PgDatabase]
#[derive(Default)]
pub struct MemoryDatabase {
    state: RwLock<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    users: Vec<UserData>,
    games: Vec<GameData>,
    last_user_id: PrimaryKey,
    last_game_id: PrimaryKey,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    fn game_not_found() -> DatabaseError {
        DatabaseError::NotFound {
            resource: "game",
            identifier: "id",
        }
    }
}

impl MemoryState {
    fn game_mut(&mut self, game_id: PrimaryKey) -> Result<&mut GameData> {
        self.games
            .iter_mut()
            .find(|g| g.id == game_id)
            .ok_or_else(MemoryDatabase::game_not_found)
    }

    /// Matching games, newest first
    fn matching(&self, filter: &GameFilter) -> Vec<&GameData> {
        let mut games: Vec<_> = self.games.iter().filter(|g| filter.matches(g)).collect();

        games.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        games
    }
}

#[async_trait]
impl Database for MemoryDatabase {
    async fn user_count(&self) -> Result<i64> {
        Ok(self.state.read().users.len() as i64)
    }

    async fn user_by_email(&self, email: &str) -> Result<UserData> {
        self.state
            .read()
            .users
            .iter()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(DatabaseError::NotFound {
                resource: "user",
                identifier: "email",
            })
    }

    async fn create_user(&self, new_user: NewUser) -> Result<UserData> {
        let mut state = self.state.write();

        if state.users.iter().any(|u| u.email == new_user.email) {
            return Err(DatabaseError::Conflict {
                resource: "user",
                field: "email",
                value: new_user.email,
            });
        }

        state.last_user_id += 1;

        let now = Utc::now();
        let user = UserData {
            id: state.last_user_id,
            name: new_user.name,
            email: new_user.email,
            password: new_user.password,
            role: new_user.role,
            created_at: now,
            updated_at: now,
        };

        state.users.push(user.clone());
        Ok(user)
    }

    async fn game_by_id(&self, game_id: PrimaryKey) -> Result<GameData> {
        self.state
            .read()
            .games
            .iter()
            .find(|g| g.id == game_id)
            .cloned()
            .ok_or_else(Self::game_not_found)
    }

    async fn list_games(&self, filter: &GameFilter, window: PageWindow) -> Result<Vec<GameData>> {
        let state = self.state.read();
        let offset = usize::try_from(window.offset.max(0)).unwrap_or(usize::MAX);
        let limit = window
            .limit
            .map_or(usize::MAX, |l| usize::try_from(l.max(0)).unwrap_or(usize::MAX));

        Ok(state
            .matching(filter)
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count_games(&self, filter: &GameFilter) -> Result<i64> {
        Ok(self.state.read().matching(filter).len() as i64)
    }

    async fn create_game(&self, fields: GameFields) -> Result<GameData> {
        let mut state = self.state.write();
        state.last_game_id += 1;

        let now = Utc::now();
        let game = GameData {
            id: state.last_game_id,
            title: fields.title,
            description: fields.description,
            difficulty: fields.difficulty,
            duration: fields.duration,
            price: fields.price,
            min_players: fields.min_players,
            max_players: fields.max_players,
            thumbnail: fields.thumbnail,
            images: fields.images,
            tags: fields.tags,
            is_active: fields.is_active,
            lat: fields.lat,
            lng: fields.lng,
            place: fields.place,
            distance: fields.distance,
            questions: fields.questions,
            created_at: now,
            updated_at: now,
        };

        state.games.push(game.clone());
        Ok(game)
    }

    async fn update_game(&self, game_id: PrimaryKey, fields: GameFields) -> Result<GameData> {
        let mut state = self.state.write();
        let game = state.game_mut(game_id)?;

        game.title = fields.title;
        game.description = fields.description;
        game.difficulty = fields.difficulty;
        game.duration = fields.duration;
        game.price = fields.price;
        game.min_players = fields.min_players;
        game.max_players = fields.max_players;
        game.thumbnail = fields.thumbnail;
        game.images = fields.images;
        game.tags = fields.tags;
        game.is_active = fields.is_active;
        game.lat = fields.lat;
        game.lng = fields.lng;
        game.place = fields.place;
        game.distance = fields.distance;
        game.questions = fields.questions;
        game.updated_at = Utc::now();

        Ok(game.clone())
    }

    async fn delete_game(&self, game_id: PrimaryKey) -> Result<()> {
        let mut state = self.state.write();
        let before = state.games.len();

        state.games.retain(|g| g.id != game_id);

        if state.games.len() == before {
            return Err(Self::game_not_found());
        }

        Ok(())
    }

    async fn toggle_game_active(&self, game_id: PrimaryKey) -> Result<GameData> {
        let mut state = self.state.write();
        let game = state.game_mut(game_id)?;

        game.is_active = !game.is_active;
        game.updated_at = Utc::now();

        Ok(game.clone())
    }

    async fn clear(&self) -> Result<()> {
        *self.state.write() = MemoryState::default();
        Ok(())
    }
}
