use log::info;
use thiserror::Error;

use crate::{
    push_new_question, Admin, AuthError, GameError, Principal, Question, RawGameInput,
    Registration,
};

pub const SEED_ADMIN_EMAIL: &str = "admin@example.com";
pub const SEED_ADMIN_PASSWORD: &str = "admin123";

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Could not clear the store: {0}")]
    Clear(crate::DatabaseError),
    #[error("Could not create the admin account: {0}")]
    Admin(#[from] AuthError),
    #[error("Could not create sample game {title}: {error}")]
    Game {
        title: &'static str,
        error: GameError,
    },
    #[error("Could not encode riddles: {0}")]
    Riddles(#[from] serde_json::Error),
}

struct SampleGame {
    title: &'static str,
    description: &'static str,
    difficulty: &'static str,
    duration: u32,
    price: f64,
    max_players: u32,
    min_players: u32,
    thumbnail: &'static str,
    images: &'static [&'static str],
    is_active: bool,
    tags: &'static [&'static str],
    place: &'static str,
    lat: f64,
    lng: f64,
    riddles: &'static [SampleRiddle],
}

struct SampleRiddle {
    riddle: &'static str,
    options: &'static [&'static str],
    answer: &'static str,
    hint: &'static str,
}

const SAMPLE_GAMES: &[SampleGame] = &[
    SampleGame {
        title: "The Mystery Mansion",
        description: "Explore a haunted mansion and uncover its dark secrets. Can you escape before time runs out?",
        difficulty: "Medium",
        duration: 60,
        price: 29.99,
        max_players: 6,
        min_players: 2,
        thumbnail: "https://images.unsplash.com/photo-1571003123894-1f0594d2b5d9?w=800",
        images: &[
            "https://images.unsplash.com/photo-1571003123894-1f0594d2b5d9?w=800",
            "https://images.unsplash.com/photo-1513694203232-719a280e022f?w=800",
        ],
        is_active: true,
        tags: &["horror", "mystery", "popular"],
        place: "Old Town",
        lat: 50.0875,
        lng: 14.4213,
        riddles: &[
            SampleRiddle {
                riddle: "I have keys but open no locks. What am I?",
                options: &["A piano", "A map", "A door"],
                answer: "A piano",
                hint: "Listen to the music room",
            },
            SampleRiddle {
                riddle: "The more you take, the more you leave behind. What are they?",
                options: &["Footsteps", "Coins", "Candles"],
                answer: "Footsteps",
                hint: "Look at the dusty floor",
            },
        ],
    },
    SampleGame {
        title: "Cyber Heist",
        description: "Break into a high-tech facility and steal the data before security catches you!",
        difficulty: "Hard",
        duration: 75,
        price: 39.99,
        max_players: 8,
        min_players: 3,
        thumbnail: "https://images.unsplash.com/photo-1550751827-4bd374c3f58b?w=800",
        images: &["https://images.unsplash.com/photo-1550751827-4bd374c3f58b?w=800"],
        is_active: true,
        tags: &["tech", "heist", "challenging"],
        place: "Tech District",
        lat: 50.1032,
        lng: 14.4501,
        riddles: &[SampleRiddle {
            riddle: "What has to be broken before you can use it?",
            options: &["An egg", "A firewall", "A promise"],
            answer: "An egg",
            hint: "Check the break room",
        }],
    },
    SampleGame {
        title: "Pirate's Treasure",
        description: "Find the legendary pirate treasure hidden on a mysterious island!",
        difficulty: "Easy",
        duration: 45,
        price: 24.99,
        max_players: 5,
        min_players: 2,
        thumbnail: "https://images.unsplash.com/photo-1559827260-dc66d52bef19?w=800",
        images: &["https://images.unsplash.com/photo-1559827260-dc66d52bef19?w=800"],
        is_active: true,
        tags: &["adventure", "family-friendly"],
        place: "Harbour",
        lat: 50.0755,
        lng: 14.4378,
        riddles: &[],
    },
    SampleGame {
        title: "Zombie Apocalypse",
        description: "Survive the zombie outbreak and find the cure in this intense escape room!",
        difficulty: "Expert",
        duration: 90,
        price: 49.99,
        max_players: 10,
        min_players: 4,
        thumbnail: "https://images.unsplash.com/photo-1509248961158-e54f6934749c?w=800",
        images: &["https://images.unsplash.com/photo-1509248961158-e54f6934749c?w=800"],
        is_active: true,
        tags: &["horror", "action", "challenging"],
        place: "Abandoned Hospital",
        lat: 50.0689,
        lng: 14.4205,
        riddles: &[],
    },
    SampleGame {
        title: "Ancient Egypt",
        description: "Uncover the secrets of the pharaohs in this archaeological adventure!",
        difficulty: "Medium",
        duration: 60,
        price: 34.99,
        max_players: 6,
        min_players: 2,
        thumbnail: "https://images.unsplash.com/photo-1503177119275-0aa32b3a9368?w=800",
        images: &["https://images.unsplash.com/photo-1503177119275-0aa32b3a9368?w=800"],
        is_active: false,
        tags: &["history", "puzzle"],
        place: "Museum Quarter",
        lat: 50.0794,
        lng: 14.4306,
        riddles: &[],
    },
];

/// Replaces everything in the store with an admin account and sample games.
///
/// Everything is written through [crate::Auth] and [crate::GameManager], so
/// the seeded data obeys the same rules as data entered by hand.
pub async fn seed(admin: &Admin) -> Result<Principal, SeedError> {
    admin.db.clear().await.map_err(SeedError::Clear)?;
    info!("Cleared existing data");

    let principal = admin
        .auth
        .register(Registration {
            name: "Admin User".to_string(),
            email: SEED_ADMIN_EMAIL.to_string(),
            password: SEED_ADMIN_PASSWORD.to_string(),
            confirm_password: SEED_ADMIN_PASSWORD.to_string(),
        })
        .await?;
    info!("Created admin account {}", principal.email);

    for sample in SAMPLE_GAMES {
        admin
            .games
            .create(&sample_input(sample)?)
            .await
            .map_err(|error| SeedError::Game {
                title: sample.title,
                error,
            })?;
    }

    info!("Created {} sample games", SAMPLE_GAMES.len());
    Ok(principal)
}

fn sample_input(sample: &SampleGame) -> Result<RawGameInput, SeedError> {
    Ok(RawGameInput::new()
        .with("title", sample.title)
        .with("description", sample.description)
        .with("difficulty", sample.difficulty)
        .with("duration", sample.duration.to_string())
        .with("price", sample.price.to_string())
        .with("maxPlayers", sample.max_players.to_string())
        .with("minPlayers", sample.min_players.to_string())
        .with("thumbnail", sample.thumbnail)
        .with("images", serde_json::to_string(sample.images)?)
        .with("isActive", sample.is_active.to_string())
        .with("tags", sample.tags.join(", "))
        .with("place", sample.place)
        .with("lat", sample.lat.to_string())
        .with("lng", sample.lng.to_string())
        .with("questions", serde_json::to_string(&riddles(sample))?))
}

fn riddles(sample: &SampleGame) -> Vec<Question> {
    let mut questions = vec![];

    for riddle in sample.riddles {
        let position = push_new_question(&mut questions, sample.lat, sample.lng);
        let question = &mut questions[position];

        question.riddle = riddle.riddle.to_string();
        question.options = riddle.options.iter().map(|o| o.to_string()).collect();
        question.right_answer = riddle.answer.to_string();
        question.hints = vec![crate::Hint {
            text: riddle.hint.to_string(),
            ..Default::default()
        }];
    }

    questions
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use argon2::Params;

    use super::*;
    use crate::{AdminOptions, Credentials, Difficulty, GameQuery, MemoryDatabase, Role};

    fn admin() -> Admin {
        Admin::new(
            Arc::new(MemoryDatabase::new()),
            AdminOptions {
                argon_params: Some(Params::new(Params::MIN_M_COST, 1, 1, None).unwrap()),
                ..AdminOptions::new(b"seed-secret".to_vec())
            },
        )
    }

    #[tokio::test]
    async fn seeds_an_admin_and_sample_games() {
        let admin = admin();

        let principal = seed(&admin).await.unwrap();
        assert_eq!(principal.role, Role::Admin);

        let page = admin
            .games
            .list_games(GameQuery::new().limit(20))
            .await
            .unwrap();
        assert_eq!(page.pagination.total, SAMPLE_GAMES.len() as i64);

        let mansion = page
            .items
            .iter()
            .find(|g| g.title == "The Mystery Mansion")
            .unwrap();
        assert_eq!(mansion.difficulty, Difficulty::Medium);
        assert_eq!(mansion.questions.len(), 2);
        assert_eq!(mansion.questions[1].name, "Objective #2");
        assert_eq!(mansion.questions[1].right_answer, "Footsteps");

        let logged_in = admin
            .auth
            .login(Credentials {
                email: SEED_ADMIN_EMAIL.to_string(),
                password: SEED_ADMIN_PASSWORD.to_string(),
            })
            .await
            .unwrap();
        assert_eq!(logged_in, principal);
    }

    #[tokio::test]
    async fn seeding_twice_starts_over() {
        let admin = admin();

        seed(&admin).await.unwrap();
        let principal = seed(&admin).await.unwrap();

        assert_eq!(principal.role, Role::Admin);
        assert_eq!(admin.db.user_count().await.unwrap(), 1);
    }
}
