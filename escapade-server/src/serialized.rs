//! All schemas that are exposed from endpoints are defined here
//! along with the conversions from the admin types

use escapade_admin::{
    DashboardStats as AdminDashboardStats, DifficultyDistribution, Explanation as AdminExplanation,
    GameData, Hint as AdminHint, Pagination as AdminPagination, Principal,
    Question as AdminQuestion,
};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct User {
    id: i32,
    name: String,
    email: String,
    #[schema(example = "admin")]
    role: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    id: i32,
    title: String,
    description: String,
    #[schema(example = "Medium")]
    difficulty: String,
    /// In minutes
    duration: i32,
    price: f64,
    min_players: i32,
    max_players: i32,
    thumbnail: String,
    images: Vec<String>,
    tags: Vec<String>,
    is_active: bool,
    lat: f64,
    lng: f64,
    place: String,
    distance: String,
    questions: Vec<Question>,
    /// RFC 3339
    created_at: String,
    updated_at: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    name: String,
    text: String,
    riddle: String,
    intro: String,
    index: usize,
    lat: f64,
    lng: f64,
    #[schema(example = "textChoices")]
    question_type: String,
    options: Vec<String>,
    right_answer: String,
    right_answer_image: String,
    question_hint: String,
    map_image: String,
    images: Vec<String>,
    hints: Vec<Hint>,
    explanation: Explanation,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Hint {
    text: String,
    images: Vec<String>,
    index: usize,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Explanation {
    text: String,
    images: Vec<String>,
    info: String,
    info_explanation: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    total: i64,
    page: i64,
    limit: i64,
    total_pages: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Distribution {
    #[serde(rename = "Easy")]
    easy: i64,
    #[serde(rename = "Medium")]
    medium: i64,
    /// Hard and expert games
    #[serde(rename = "Hard")]
    hard: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    total_games: i64,
    active_games: i64,
    total_value: f64,
    difficulty_rate: i64,
    recent_games: Vec<Game>,
    distribution: Distribution,
    active_percentage: i64,
    new_games_count: i64,
    avg_price: f64,
}

/// Helper trait to convert any type into a serialized version
pub trait ToSerialized<T>
where
    T: Serialize,
{
    fn to_serialized(&self) -> T;
}

impl<I, O> ToSerialized<Vec<O>> for Vec<I>
where
    I: ToSerialized<O>,
    O: Serialize,
{
    fn to_serialized(&self) -> Vec<O> {
        self.iter().map(|x| x.to_serialized()).collect()
    }
}

impl ToSerialized<User> for Principal {
    fn to_serialized(&self) -> User {
        User {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role.to_string(),
        }
    }
}

impl ToSerialized<Game> for GameData {
    fn to_serialized(&self) -> Game {
        Game {
            id: self.id,
            title: self.title.clone(),
            description: self.description.clone(),
            difficulty: self.difficulty.to_string(),
            duration: self.duration,
            price: self.price,
            min_players: self.min_players,
            max_players: self.max_players,
            thumbnail: self.thumbnail.clone(),
            images: self.images.clone(),
            tags: self.tags.clone(),
            is_active: self.is_active,
            lat: self.lat,
            lng: self.lng,
            place: self.place.clone(),
            distance: self.distance.clone(),
            questions: self.questions.to_serialized(),
            created_at: self.created_at.to_rfc3339(),
            updated_at: self.updated_at.to_rfc3339(),
        }
    }
}

impl ToSerialized<Question> for AdminQuestion {
    fn to_serialized(&self) -> Question {
        // Serializes to a bare string
        let question_type = serde_json::to_value(self.question_type)
            .ok()
            .and_then(|v| v.as_str().map(String::from))
            .unwrap_or_default();

        Question {
            name: self.name.clone(),
            text: self.text.clone(),
            riddle: self.riddle.clone(),
            intro: self.intro.clone(),
            index: self.index,
            lat: self.lat,
            lng: self.lng,
            question_type,
            options: self.options.clone(),
            right_answer: self.right_answer.clone(),
            right_answer_image: self.right_answer_image.clone(),
            question_hint: self.question_hint.clone(),
            map_image: self.map_image.clone(),
            images: self.images.clone(),
            hints: self.hints.to_serialized(),
            explanation: self.explanation.to_serialized(),
        }
    }
}

impl ToSerialized<Hint> for AdminHint {
    fn to_serialized(&self) -> Hint {
        Hint {
            text: self.text.clone(),
            images: self.images.clone(),
            index: self.index,
        }
    }
}

impl ToSerialized<Explanation> for AdminExplanation {
    fn to_serialized(&self) -> Explanation {
        Explanation {
            text: self.text.clone(),
            images: self.images.clone(),
            info: self.info.clone(),
            info_explanation: self.info_explanation.clone(),
        }
    }
}

impl ToSerialized<Pagination> for AdminPagination {
    fn to_serialized(&self) -> Pagination {
        Pagination {
            total: self.total,
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
        }
    }
}

impl ToSerialized<Distribution> for DifficultyDistribution {
    fn to_serialized(&self) -> Distribution {
        Distribution {
            easy: self.easy,
            medium: self.medium,
            hard: self.hard,
        }
    }
}

impl ToSerialized<DashboardStats> for AdminDashboardStats {
    fn to_serialized(&self) -> DashboardStats {
        DashboardStats {
            total_games: self.total_games,
            active_games: self.active_games,
            total_value: self.total_value,
            difficulty_rate: self.difficulty_rate,
            recent_games: self.recent_games.to_serialized(),
            distribution: self.distribution.to_serialized(),
            active_percentage: self.active_percentage,
            new_games_count: self.new_games_count,
            avg_price: self.avg_price,
        }
    }
}
