use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    postgres::{PgArguments, PgPoolOptions},
    query, query_as, query_scalar,
    query::QueryAs,
    types::Json,
    Error as SqlxError, FromRow, PgPool, Postgres, QueryBuilder,
};

use crate::{
    Database, DatabaseError, DatabaseResult, GameData, GameFields, GameFilter, IntoDatabaseError,
    NewUser, PageWindow, PrimaryKey, Question, Result, UserData,
};

const USER_COLUMNS: &str = "id, name, email, password, role, created_at, updated_at";
const GAME_COLUMNS: &str = "id, title, description, difficulty, duration, price, min_players, \
    max_players, thumbnail, images, tags, is_active, lat, lng, place, distance, questions, \
    created_at, updated_at";

/// A postgres database implementation for the dashboard
pub struct PgDatabase {
    pool: PgPool,
}

impl PgDatabase {
    /// Connects and brings the schema up to date
    pub async fn new(url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await
            .map_err(|e| e.any())?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| DatabaseError::Internal(Box::new(e)))?;

        Ok(Self { pool })
    }
}

#[derive(FromRow)]
struct UserRow {
    id: i32,
    name: String,
    email: String,
    password: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct GameRow {
    id: i32,
    title: String,
    description: String,
    difficulty: String,
    duration: i32,
    price: f64,
    min_players: i32,
    max_players: i32,
    thumbnail: String,
    images: Json<Vec<String>>,
    tags: Json<Vec<String>>,
    is_active: bool,
    lat: f64,
    lng: f64,
    place: String,
    distance: String,
    questions: Json<Vec<Question>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for UserData {
    type Error = DatabaseError;

    fn try_from(row: UserRow) -> Result<Self> {
        Ok(UserData {
            id: row.id,
            name: row.name,
            email: row.email,
            password: row.password,
            role: row.role.parse().map_err(|e: String| DatabaseError::Internal(e.into()))?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl TryFrom<GameRow> for GameData {
    type Error = DatabaseError;

    fn try_from(row: GameRow) -> Result<Self> {
        Ok(GameData {
            id: row.id,
            title: row.title,
            description: row.description,
            difficulty: row
                .difficulty
                .parse()
                .map_err(|e: String| DatabaseError::Internal(e.into()))?,
            duration: row.duration,
            price: row.price,
            min_players: row.min_players,
            max_players: row.max_players,
            thumbnail: row.thumbnail,
            images: row.images.0,
            tags: row.tags.0,
            is_active: row.is_active,
            lat: row.lat,
            lng: row.lng,
            place: row.place,
            distance: row.distance,
            questions: row.questions.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

type GameQueryAs<'q> = QueryAs<'q, Postgres, GameRow, PgArguments>;

/// Binds the fields in the column order of [GAME_COLUMNS], starting at $1
fn bind_fields(query: GameQueryAs<'_>, fields: GameFields) -> GameQueryAs<'_> {
    query
        .bind(fields.title)
        .bind(fields.description)
        .bind(fields.difficulty.as_str())
        .bind(fields.duration)
        .bind(fields.price)
        .bind(fields.min_players)
        .bind(fields.max_players)
        .bind(fields.thumbnail)
        .bind(Json(fields.images))
        .bind(Json(fields.tags))
        .bind(fields.is_active)
        .bind(fields.lat)
        .bind(fields.lng)
        .bind(fields.place)
        .bind(fields.distance)
        .bind(Json(fields.questions))
}

/// Turns a search term into an ILIKE pattern matching it anywhere
fn like_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');

    for c in search.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }

    pattern.push('%');
    pattern
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &GameFilter) {
    builder.push(" WHERE TRUE");

    if let Some(search) = &filter.search {
        let pattern = like_pattern(search);

        builder
            .push(" AND (title ILIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR description ILIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }

    if let Some(difficulty) = filter.difficulty {
        builder
            .push(" AND difficulty = ")
            .push_bind(difficulty.as_str());
    }
}

#[async_trait]
impl Database for PgDatabase {
    async fn user_count(&self) -> Result<i64> {
        query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.any())
    }

    async fn user_by_email(&self, email: &str) -> Result<UserData> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");

        query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("user", "email"))?
            .try_into()
    }

    async fn create_user(&self, new_user: NewUser) -> Result<UserData> {
        self.user_by_email(&new_user.email)
            .await
            .conflict_or_ok("user", "email", &new_user.email)?;

        let sql = format!(
            "INSERT INTO users (name, email, password, role) VALUES ($1, $2, $3, $4) \
             RETURNING {USER_COLUMNS}"
        );

        query_as::<_, UserRow>(&sql)
            .bind(&new_user.name)
            .bind(&new_user.email)
            .bind(&new_user.password)
            .bind(new_user.role.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                // Lost a race against another registration with the same email
                SqlxError::Database(ref db) if db.is_unique_violation() => {
                    DatabaseError::Conflict {
                        resource: "user",
                        field: "email",
                        value: new_user.email.clone(),
                    }
                }
                e => e.any(),
            })?
            .try_into()
    }

    async fn game_by_id(&self, game_id: PrimaryKey) -> Result<GameData> {
        let sql = format!("SELECT {GAME_COLUMNS} FROM games WHERE id = $1");

        query_as::<_, GameRow>(&sql)
            .bind(game_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("game", "id"))?
            .try_into()
    }

    async fn list_games(&self, filter: &GameFilter, window: PageWindow) -> Result<Vec<GameData>> {
        let mut builder = QueryBuilder::new(format!("SELECT {GAME_COLUMNS} FROM games"));
        push_filter(&mut builder, filter);

        builder.push(" ORDER BY created_at DESC, id DESC");

        if let Some(limit) = window.limit {
            builder.push(" LIMIT ").push_bind(limit);
        }

        builder.push(" OFFSET ").push_bind(window.offset);

        builder
            .build_query_as::<GameRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| e.any())?
            .into_iter()
            .map(GameData::try_from)
            .collect()
    }

    async fn count_games(&self, filter: &GameFilter) -> Result<i64> {
        let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM games");
        push_filter(&mut builder, filter);

        builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.any())
    }

    async fn create_game(&self, fields: GameFields) -> Result<GameData> {
        let sql = format!(
            "INSERT INTO games (title, description, difficulty, duration, price, min_players, \
                max_players, thumbnail, images, tags, is_active, lat, lng, place, distance, \
                questions)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING {GAME_COLUMNS}"
        );

        bind_fields(query_as::<_, GameRow>(&sql), fields)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.any())?
            .try_into()
    }

    async fn update_game(&self, game_id: PrimaryKey, fields: GameFields) -> Result<GameData> {
        let sql = format!(
            "UPDATE games SET
                title = $1, description = $2, difficulty = $3, duration = $4, price = $5,
                min_players = $6, max_players = $7, thumbnail = $8, images = $9, tags = $10,
                is_active = $11, lat = $12, lng = $13, place = $14, distance = $15,
                questions = $16, updated_at = now()
            WHERE id = $17
            RETURNING {GAME_COLUMNS}"
        );

        bind_fields(query_as::<_, GameRow>(&sql), fields)
            .bind(game_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("game", "id"))?
            .try_into()
    }

    async fn delete_game(&self, game_id: PrimaryKey) -> Result<()> {
        let result = query("DELETE FROM games WHERE id = $1")
            .bind(game_id)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound {
                resource: "game",
                identifier: "id",
            });
        }

        Ok(())
    }

    async fn toggle_game_active(&self, game_id: PrimaryKey) -> Result<GameData> {
        let sql = format!(
            "UPDATE games SET is_active = NOT is_active, updated_at = now()
            WHERE id = $1
            RETURNING {GAME_COLUMNS}"
        );

        query_as::<_, GameRow>(&sql)
            .bind(game_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("game", "id"))?
            .try_into()
    }

    async fn clear(&self) -> Result<()> {
        query("TRUNCATE games, users RESTART IDENTITY")
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())
            .map(|_| ())
    }
}

impl IntoDatabaseError for SqlxError {
    fn any(self) -> DatabaseError {
        DatabaseError::Internal(Box::new(self))
    }

    fn not_found_or(self, resource: &'static str, identifier: &'static str) -> DatabaseError {
        match self {
            SqlxError::RowNotFound => DatabaseError::NotFound {
                resource,
                identifier,
            },
            e => Self::any(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::like_pattern;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("cyber"), "%cyber%");
        assert_eq!(like_pattern("100%_off\\"), "%100\\%\\_off\\\\%");
    }
}
