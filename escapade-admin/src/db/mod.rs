use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

mod data;
pub use data::*;

mod memory;
pub use memory::*;

mod pg;
pub use pg::*;

use crate::{GameFilter, PageWindow};

pub type Result<T> = std::result::Result<T, DatabaseError>;
pub type SharedDatabase = Arc<dyn Database>;

#[derive(Debug, Error)]
pub enum DatabaseError {
    /// An unknown or internal error happened with the database
    #[error(transparent)]
    Internal(Box<dyn std::error::Error + Send + Sync>),
    /// A resource already exists
    #[error("{resource} with {field} of value {value} already exists")]
    Conflict {
        /// The resource in question
        resource: &'static str,
        /// The field that is conflicting
        field: &'static str,
        /// The conflicting value
        value: String,
    },
    /// A resource in the database doesn't exist
    #[error("{resource}:{identifier} doesn't exist")]
    NotFound {
        resource: &'static str,
        identifier: &'static str,
    },
}

/// Helper trait to reduce boilerplate
pub trait IntoDatabaseError {
    fn not_found_or(self, resource: &'static str, identifier: &'static str) -> DatabaseError;
    fn any(self) -> DatabaseError;
}

/// Helper trait to reduce boilerplate
pub trait DatabaseResult {
    /// Turns the Result into a conflict error if it's Ok()
    fn conflict_or_ok(self, resource: &'static str, field: &'static str, value: &str)
        -> Result<()>;
}

impl<T> DatabaseResult for Result<T> {
    fn conflict_or_ok(
        self,
        resource: &'static str,
        field: &'static str,
        value: &str,
    ) -> Result<()> {
        match self {
            Ok(_) => Err(DatabaseError::Conflict {
                resource,
                field,
                value: value.to_string(),
            }),
            Err(DatabaseError::NotFound { .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// Represents a store that holds the dashboard's users and games.
///
/// Every write is atomic per document. Concurrent writes to the same game
/// are last-write-wins.
#[async_trait]
pub trait Database: Send + Sync {
    async fn user_count(&self) -> Result<i64>;
    async fn user_by_email(&self, email: &str) -> Result<UserData>;
    async fn create_user(&self, new_user: NewUser) -> Result<UserData>;

    async fn game_by_id(&self, game_id: PrimaryKey) -> Result<GameData>;
    /// Games matching the filter, newest first, sliced by the window
    async fn list_games(&self, filter: &GameFilter, window: PageWindow) -> Result<Vec<GameData>>;
    /// Number of games matching the filter, regardless of any window
    async fn count_games(&self, filter: &GameFilter) -> Result<i64>;
    async fn create_game(&self, fields: GameFields) -> Result<GameData>;
    /// Replaces every field of a game
    async fn update_game(&self, game_id: PrimaryKey, fields: GameFields) -> Result<GameData>;
    async fn delete_game(&self, game_id: PrimaryKey) -> Result<()>;
    /// Flips `is_active` within a single write
    async fn toggle_game_active(&self, game_id: PrimaryKey) -> Result<GameData>;

    /// Removes every user and game
    async fn clear(&self) -> Result<()>;
}

#[derive(Debug)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    /// Must already be hashed
    pub password: String,
    pub role: Role,
}

/// The writable fields of a game, already validated
#[derive(Debug, Clone, PartialEq)]
pub struct GameFields {
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub duration: i32,
    pub price: f64,
    pub min_players: i32,
    pub max_players: i32,
    pub thumbnail: String,
    pub images: Vec<String>,
    pub tags: Vec<String>,
    pub is_active: bool,
    pub lat: f64,
    pub lng: f64,
    pub place: String,
    pub distance: String,
    pub questions: Vec<Question>,
}
