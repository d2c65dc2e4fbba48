use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The type used for primary keys in the database.
pub type PrimaryKey = i32;

/// What an account is allowed to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            other => Err(format!("Unknown role {other}")),
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An account that can sign in to the dashboard
#[derive(Debug, Clone)]
pub struct UserData {
    pub id: PrimaryKey,
    pub name: String,
    /// Unique, stored lowercased
    pub email: String,
    /// The PHC string of the hashed password
    pub password: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Expert,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Expert,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
            Difficulty::Expert => "Expert",
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| "Difficulty must be one of Easy, Medium, Hard, Expert".to_string())
    }
}

impl Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An escape room experience listed in the dashboard
#[derive(Debug, Clone, PartialEq)]
pub struct GameData {
    pub id: PrimaryKey,
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    /// In minutes
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuestionType {
    #[default]
    TextChoices,
    ImageChoices,
    TextField,
}

/// A riddle, one objective of a game.
///
/// `index` always equals the position of the question in its game,
/// see [crate::renumber].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Question {
    pub name: String,
    pub text: String,
    pub riddle: String,
    pub intro: String,
    pub index: usize,
    pub lat: f64,
    pub lng: f64,
    pub question_type: QuestionType,
    pub options: Vec<String>,
    pub right_answer: String,
    pub right_answer_image: String,
    pub question_hint: String,
    pub map_image: String,
    pub images: Vec<String>,
    pub hints: Vec<Hint>,
    pub explanation: Explanation,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "HintInput")]
pub struct Hint {
    pub text: String,
    pub images: Vec<String>,
    pub index: usize,
}

/// Hints may be written as plain text as well as the full object
#[derive(Deserialize)]
#[serde(untagged)]
enum HintInput {
    Text(String),
    Detailed {
        #[serde(default)]
        text: String,
        #[serde(default)]
        images: Vec<String>,
        #[serde(default)]
        index: usize,
    },
}

impl From<HintInput> for Hint {
    fn from(value: HintInput) -> Self {
        match value {
            HintInput::Text(text) => Hint {
                text,
                ..Default::default()
            },
            HintInput::Detailed {
                text,
                images,
                index,
            } => Hint {
                text,
                images,
                index,
            },
        }
    }
}

/// Shown to players after a riddle is solved
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Explanation {
    pub text: String,
    pub images: Vec<String>,
    pub info: String,
    pub info_explanation: String,
}
