//! Decoding of loosely typed game payloads.
//!
//! Forms send every value as text: numbers as digits, lists either as a
//! JSON array or comma separated, riddles as a JSON array. [RawGameInput]
//! holds that text and [GameDraft::apply] turns it into typed fields once,
//! rejecting anything it cannot read.

use std::collections::{BTreeMap, HashMap};

use serde_json::{Map, Value};
use validator::Validate;

use super::questions::renumber;
use crate::{validation::first_violation, Difficulty, GameData, GameError, GameFields, Question};

/// Field order used to pick the first violation
const GAME_FIELDS: [&str; 8] = [
    "title",
    "description",
    "difficulty",
    "duration",
    "price",
    "max_players",
    "min_players",
    "thumbnail",
];

/// Untyped game fields keyed by their camelCase names
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawGameInput {
    fields: BTreeMap<String, String>,
}

impl RawGameInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Strings are taken as they are, `null` is left out, and anything
    /// else is kept as its JSON text.
    pub fn from_json(map: Map<String, Value>) -> Self {
        map.into_iter()
            .filter_map(|(key, value)| match value {
                Value::Null => None,
                Value::String(s) => Some((key, s)),
                other => Some((key, other.to_string())),
            })
            .collect()
    }
}

impl FromIterator<(String, String)> for RawGameInput {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl From<HashMap<String, String>> for RawGameInput {
    fn from(value: HashMap<String, String>) -> Self {
        value.into_iter().collect()
    }
}

/// A game being edited, before it is checked and written
#[derive(Debug, Clone, Validate)]
pub struct GameDraft {
    #[validate(length(min = 3, message = "Title must be at least 3 characters"))]
    pub title: String,
    #[validate(length(min = 10, message = "Description must be at least 10 characters"))]
    pub description: String,
    #[validate(required(message = "Difficulty must be one of Easy, Medium, Hard, Expert"))]
    pub difficulty: Option<Difficulty>,
    #[validate(range(min = 15, message = "Duration must be at least 15 minutes"))]
    pub duration: i32,
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: f64,
    #[validate(range(min = 1, message = "Must allow at least 1 player"))]
    pub max_players: i32,
    #[validate(range(min = 1, message = "Must require at least 1 player"))]
    pub min_players: i32,
    #[validate(url(message = "Invalid thumbnail URL"))]
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

impl Default for GameDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            difficulty: None,
            duration: 0,
            price: 0.0,
            max_players: 0,
            min_players: 0,
            thumbnail: String::new(),
            images: vec![],
            tags: vec![],
            is_active: true,
            lat: 0.0,
            lng: 0.0,
            place: String::new(),
            distance: String::new(),
            questions: vec![],
        }
    }
}

impl From<&GameData> for GameDraft {
    fn from(game: &GameData) -> Self {
        Self {
            title: game.title.clone(),
            description: game.description.clone(),
            difficulty: Some(game.difficulty),
            duration: game.duration,
            price: game.price,
            max_players: game.max_players,
            min_players: game.min_players,
            thumbnail: game.thumbnail.clone(),
            images: game.images.clone(),
            tags: game.tags.clone(),
            is_active: game.is_active,
            lat: game.lat,
            lng: game.lng,
            place: game.place.clone(),
            distance: game.distance.clone(),
            questions: game.questions.clone(),
        }
    }
}

impl GameDraft {
    /// Overwrites every field present in the input
    pub fn apply(&mut self, input: &RawGameInput) -> Result<(), GameError> {
        if let Some(title) = input.get("title") {
            self.title = title.trim().to_string();
        }
        if let Some(description) = input.get("description") {
            self.description = description.to_string();
        }
        if let Some(difficulty) = input.get("difficulty") {
            self.difficulty = Some(difficulty.trim().parse().map_err(GameError::Validation)?);
        }
        if let Some(duration) = input.get("duration") {
            self.duration = parse_whole(duration, "Duration")?;
        }
        if let Some(price) = input.get("price") {
            self.price = parse_number(price, "Price")?;
        }
        if let Some(max_players) = input.get("maxPlayers") {
            self.max_players = parse_whole(max_players, "Max players")?;
        }
        if let Some(min_players) = input.get("minPlayers") {
            self.min_players = parse_whole(min_players, "Min players")?;
        }
        if let Some(thumbnail) = input.get("thumbnail") {
            self.thumbnail = thumbnail.trim().to_string();
        }
        if let Some(images) = input.get("images") {
            self.images = parse_list(images, "Images")?;
        }
        if let Some(is_active) = input.get("isActive") {
            self.is_active = parse_flag(is_active)?;
        }
        if let Some(tags) = input.get("tags") {
            self.tags = parse_list(tags, "Tags")?;
        }
        if let Some(lat) = input.get("lat") {
            self.lat = parse_number(lat, "Latitude")?;
        }
        if let Some(lng) = input.get("lng") {
            self.lng = parse_number(lng, "Longitude")?;
        }
        if let Some(place) = input.get("place") {
            self.place = place.to_string();
        }
        if let Some(distance) = input.get("distance") {
            self.distance = distance.to_string();
        }
        if let Some(questions) = input.get("questions") {
            self.questions = parse_questions(questions)?;
        }

        Ok(())
    }

    /// Checks every invariant of a game and returns the fields to write
    pub fn finish(mut self) -> Result<GameFields, GameError> {
        self.validate()
            .map_err(|e| GameError::Validation(first_violation(&e, &GAME_FIELDS)))?;

        if self.min_players > self.max_players {
            return Err(GameError::Validation(
                "Min players cannot exceed max players".to_string(),
            ));
        }

        let difficulty = self.difficulty.ok_or_else(|| {
            GameError::Validation("Difficulty must be one of Easy, Medium, Hard, Expert".into())
        })?;

        renumber(&mut self.questions);

        Ok(GameFields {
            title: self.title,
            description: self.description,
            difficulty,
            duration: self.duration,
            price: self.price,
            min_players: self.min_players,
            max_players: self.max_players,
            thumbnail: self.thumbnail,
            images: self.images,
            tags: self.tags,
            is_active: self.is_active,
            lat: self.lat,
            lng: self.lng,
            place: self.place,
            distance: self.distance,
            questions: self.questions,
        })
    }
}

/// A JSON array, or comma separated text.
///
/// Text that looks like JSON must be an array.
pub fn parse_list(input: &str, label: &str) -> Result<Vec<String>, GameError> {
    let trimmed = input.trim();

    if trimmed.starts_with(['[', '{', '"']) {
        return match serde_json::from_str::<Value>(trimmed) {
            Ok(Value::Array(items)) => Ok(items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => s,
                    other => other.to_string(),
                })
                .collect()),
            _ => Err(GameError::Validation(format!(
                "{label} must be a JSON array or comma separated text"
            ))),
        };
    }

    Ok(trimmed
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect())
}

/// Blank text counts as zero
fn parse_number(input: &str, label: &str) -> Result<f64, GameError> {
    let input = input.trim();

    if input.is_empty() {
        return Ok(0.0);
    }

    input
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| GameError::Validation(format!("{label} must be a number")))
}

fn parse_whole(input: &str, label: &str) -> Result<i32, GameError> {
    let input = input.trim();

    if input.is_empty() {
        return Ok(0);
    }

    input
        .parse::<i32>()
        .map_err(|_| GameError::Validation(format!("{label} must be a whole number")))
}

fn parse_flag(input: &str) -> Result<bool, GameError> {
    match input.trim() {
        "true" | "on" => Ok(true),
        "false" | "" => Ok(false),
        _ => Err(GameError::Validation(
            "Active status must be true or false".to_string(),
        )),
    }
}

fn parse_questions(input: &str) -> Result<Vec<Question>, GameError> {
    if input.trim().is_empty() {
        return Ok(vec![]);
    }

    serde_json::from_str::<Vec<Question>>(input).map_err(|_| {
        GameError::Validation("Questions must be a JSON array of riddles".to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::QuestionType;

    fn valid_input() -> RawGameInput {
        RawGameInput::new()
            .with("title", "Cyber Heist")
            .with("description", "Break into a high-tech facility")
            .with("difficulty", "Hard")
            .with("duration", "75")
            .with("price", "39.99")
            .with("minPlayers", "3")
            .with("maxPlayers", "8")
            .with("thumbnail", "https://example.com/heist.jpg")
    }

    fn finish(input: RawGameInput) -> Result<GameFields, GameError> {
        let mut draft = GameDraft::default();
        draft.apply(&input)?;
        draft.finish()
    }

    fn validation_message(result: Result<GameFields, GameError>) -> String {
        match result {
            Err(GameError::Validation(message)) => message,
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    #[test]
    fn lists_accept_json_and_comma_separated_text() {
        let list = |input: &str| parse_list(input, "Images").unwrap();

        assert_eq!(list(r#"["a.jpg","b.jpg"]"#), vec!["a.jpg", "b.jpg"]);
        assert_eq!(list("a.jpg, b.jpg"), vec!["a.jpg", "b.jpg"]);
        assert_eq!(list(" , a ,,"), vec!["a"]);
        assert_eq!(list("[1, true]"), vec!["1", "true"]);
        assert_eq!(list("5"), vec!["5"]);
        assert!(list("").is_empty());
    }

    #[test]
    fn json_that_is_not_an_array_is_rejected() {
        for input in [r#""a.jpg""#, r#"{"a": 1}"#, "[a.jpg, b.jpg"] {
            let result = parse_list(input, "Images");
            assert!(
                matches!(&result, Err(GameError::Validation(m)) if m == "Images must be a JSON array or comma separated text"),
                "{input} gave {result:?}"
            );
        }

        let message = validation_message(finish(valid_input().with("tags", r#""heist""#)));
        assert_eq!(message, "Tags must be a JSON array or comma separated text");
    }

    #[test]
    fn typed_fields_are_decoded() {
        let fields = finish(
            valid_input()
                .with("images", "a.jpg, b.jpg")
                .with("tags", r#"["tech","heist"]"#)
                .with("lat", "48.85")
                .with("isActive", "false"),
        )
        .unwrap();

        assert_eq!(fields.title, "Cyber Heist");
        assert_eq!(fields.difficulty, Difficulty::Hard);
        assert_eq!(fields.duration, 75);
        assert_eq!(fields.price, 39.99);
        assert_eq!(fields.images, vec!["a.jpg", "b.jpg"]);
        assert_eq!(fields.tags, vec!["tech", "heist"]);
        assert_eq!(fields.lat, 48.85);
        assert!(!fields.is_active);
    }

    #[test]
    fn new_games_are_active_by_default() {
        assert!(finish(valid_input()).unwrap().is_active);
    }

    #[test]
    fn min_players_may_not_exceed_max_players() {
        let message = validation_message(finish(
            valid_input().with("minPlayers", "6").with("maxPlayers", "2"),
        ));

        assert_eq!(message, "Min players cannot exceed max players");
    }

    #[test]
    fn field_violations_are_reported_in_order() {
        let message = validation_message(finish(
            valid_input().with("duration", "10").with("thumbnail", "nope"),
        ));
        assert_eq!(message, "Duration must be at least 15 minutes");

        let message = validation_message(finish(valid_input().with("title", " ab ")));
        assert_eq!(message, "Title must be at least 3 characters");

        let message = validation_message(finish(valid_input().with("price", "-1")));
        assert_eq!(message, "Price cannot be negative");

        let message = validation_message(finish(valid_input().with("thumbnail", "heist.jpg")));
        assert_eq!(message, "Invalid thumbnail URL");
    }

    #[test]
    fn missing_difficulty_is_rejected() {
        let mut draft = GameDraft::default();
        draft
            .apply(
                &valid_input()
                    .with("difficulty", "Hard")
                    .with("title", "Cyber Heist"),
            )
            .unwrap();
        draft.difficulty = None;

        let message = validation_message(draft.finish());
        assert_eq!(message, "Difficulty must be one of Easy, Medium, Hard, Expert");
    }

    #[test]
    fn unreadable_values_are_rejected() {
        let message = validation_message(finish(valid_input().with("duration", "an hour")));
        assert_eq!(message, "Duration must be a whole number");

        let message = validation_message(finish(valid_input().with("price", "free")));
        assert_eq!(message, "Price must be a number");

        let message = validation_message(finish(valid_input().with("difficulty", "Brutal")));
        assert_eq!(message, "Difficulty must be one of Easy, Medium, Hard, Expert");

        let message = validation_message(finish(valid_input().with("isActive", "maybe")));
        assert_eq!(message, "Active status must be true or false");

        let message = validation_message(finish(valid_input().with("questions", "{oops")));
        assert_eq!(message, "Questions must be a JSON array of riddles");
    }

    #[test]
    fn questions_are_renumbered() {
        let questions = r#"[
            {"name": "First", "index": 4, "questionType": "textField"},
            {"name": "Second", "index": 4, "hints": ["Look up", {"text": "Look down"}]}
        ]"#;

        let fields = finish(valid_input().with("questions", questions)).unwrap();

        assert_eq!(fields.questions[0].index, 0);
        assert_eq!(fields.questions[0].question_type, QuestionType::TextField);
        assert_eq!(fields.questions[1].index, 1);
        assert_eq!(fields.questions[1].hints[0].text, "Look up");
        assert_eq!(fields.questions[1].hints[1].text, "Look down");
        assert_eq!(fields.questions[1].hints[1].index, 1);
    }

    #[test]
    fn json_values_become_text() {
        let map = serde_json::json!({
            "title": "Cyber Heist",
            "duration": 75,
            "isActive": true,
            "images": ["a.jpg"],
            "place": null
        });

        let input = RawGameInput::from_json(map.as_object().unwrap().clone());

        assert_eq!(input.get("duration"), Some("75"));
        assert_eq!(input.get("isActive"), Some("true"));
        assert_eq!(input.get("images"), Some(r#"["a.jpg"]"#));
        assert_eq!(input.get("place"), None);
    }

    #[test]
    fn updates_only_touch_given_fields() {
        let original = finish(valid_input()).unwrap();

        let mut draft = GameDraft {
            title: original.title.clone(),
            description: original.description.clone(),
            difficulty: Some(original.difficulty),
            duration: original.duration,
            price: original.price,
            max_players: original.max_players,
            min_players: original.min_players,
            thumbnail: original.thumbnail.clone(),
            ..Default::default()
        };
        draft
            .apply(&RawGameInput::new().with("price", "45"))
            .unwrap();

        let updated = draft.finish().unwrap();
        assert_eq!(updated.price, 45.0);
        assert_eq!(updated.title, original.title);
    }
}
