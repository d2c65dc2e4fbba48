use std::collections::HashMap;

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    http::header,
    Form, Json,
};
use escapade_admin::{first_violation, GameQuery, RawGameInput};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{Map, Value};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::errors::ServerError;

const INVALID_BODY: &str = "Invalid request body";

#[derive(Debug, Default, ToSchema, Validate, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoginSchema {
    #[validate(length(min = 1, message = "Email and password are required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Email and password are required"))]
    pub password: String,
}

#[derive(Debug, Default, ToSchema, Validate, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterSchema {
    #[validate(length(max = 128, message = "Name is too long"))]
    pub name: String,
    #[validate(length(max = 254, message = "Email is too long"))]
    pub email: String,
    #[validate(length(max = 128, message = "Password is too long"))]
    pub password: String,
    pub confirm_password: String,
}

/// Query string of the game listing
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GameListParams {
    /// Matched against title and description, ignoring case
    pub search: Option<String>,
    /// One of Easy, Medium, Hard, Expert, or `all`
    pub difficulty: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl From<GameListParams> for GameQuery {
    fn from(value: GameListParams) -> Self {
        GameQuery {
            search: value.search,
            difficulty: value.difficulty,
            page: value.page,
            limit: value.limit,
        }
    }
}

/// Fields of a game as sent by a client. Any of them may be left out on
/// update. Lists may be a JSON array or comma separated text.
#[derive(Debug, ToSchema, Deserialize)]
#[allow(dead_code)]
#[serde(rename_all = "camelCase")]
pub struct GameInputSchema {
    title: Option<String>,
    description: Option<String>,
    #[schema(example = "Medium")]
    difficulty: Option<String>,
    #[schema(example = "60")]
    duration: Option<String>,
    #[schema(example = "29.99")]
    price: Option<String>,
    max_players: Option<String>,
    min_players: Option<String>,
    thumbnail: Option<String>,
    #[schema(example = "a.jpg, b.jpg")]
    images: Option<String>,
    tags: Option<String>,
    is_active: Option<String>,
    lat: Option<String>,
    lng: Option<String>,
    place: Option<String>,
    distance: Option<String>,
    /// A JSON array of riddles
    questions: Option<String>,
}

pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body): Json<T> = Json::from_request(req, state)
            .await
            .map_err(|_| ServerError::BadRequest(INVALID_BODY.to_string()))?;

        body.validate()
            .map_err(|e| ServerError::BadRequest(first_violation(&e, &[])))?;

        Ok(Self(body))
    }
}

/// A game body, either form encoded or a JSON object
pub struct GameBody(pub RawGameInput);

#[async_trait]
impl<S> FromRequest<S> for GameBody
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("application/x-www-form-urlencoded"));

        let input = if is_form {
            let Form(fields): Form<HashMap<String, String>> = Form::from_request(req, state)
                .await
                .map_err(|_| ServerError::BadRequest(INVALID_BODY.to_string()))?;

            RawGameInput::from(fields)
        } else {
            let Json(fields): Json<Map<String, Value>> = Json::from_request(req, state)
                .await
                .map_err(|_| ServerError::BadRequest(INVALID_BODY.to_string()))?;

            RawGameInput::from_json(fields)
        };

        Ok(Self(input))
    }
}
