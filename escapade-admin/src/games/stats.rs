use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::{Difficulty, GameData};

/// How many of the newest games are listed on the dashboard
const RECENT_GAMES: usize = 3;
/// Games younger than this count as new
const NEW_GAME_DAYS: i64 = 7;

/// Share of games per difficulty, in whole percent. Expert counts as hard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyDistribution {
    pub easy: i64,
    pub medium: i64,
    pub hard: i64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardStats {
    pub total_games: i64,
    pub active_games: i64,
    /// Sum of every game's price
    pub total_value: f64,
    /// Percentage of games that are hard or expert
    pub difficulty_rate: i64,
    /// Newest first
    pub recent_games: Vec<GameData>,
    pub distribution: DifficultyDistribution,
    pub active_percentage: i64,
    pub new_games_count: i64,
    /// Rounded to cents
    pub avg_price: f64,
}

impl DashboardStats {
    pub fn compute(games: &[GameData], now: DateTime<Utc>) -> Self {
        if games.is_empty() {
            return Self::default();
        }

        let total = games.len() as i64;
        let count = |f: &dyn Fn(&GameData) -> bool| games.iter().filter(|g| f(g)).count() as i64;

        let easy = count(&|g| g.difficulty == Difficulty::Easy);
        let medium = count(&|g| g.difficulty == Difficulty::Medium);
        let hard = count(&|g| matches!(g.difficulty, Difficulty::Hard | Difficulty::Expert));
        let active = count(&|g| g.is_active);
        let new_since = now - Duration::days(NEW_GAME_DAYS);
        let new_games = count(&|g| g.created_at >= new_since);

        let total_value: f64 = games.iter().map(|g| g.price).sum();

        let mut newest: Vec<&GameData> = games.iter().collect();
        newest.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        Self {
            total_games: total,
            active_games: active,
            total_value,
            difficulty_rate: percent(hard, total),
            recent_games: newest
                .into_iter()
                .take(RECENT_GAMES)
                .cloned()
                .collect(),
            distribution: DifficultyDistribution {
                easy: percent(easy, total),
                medium: percent(medium, total),
                hard: percent(hard, total),
            },
            active_percentage: percent(active, total),
            new_games_count: new_games,
            avg_price: (total_value / total as f64 * 100.0).round() / 100.0,
        }
    }
}

fn percent(part: i64, total: i64) -> i64 {
    (part as f64 / total as f64 * 100.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(id: i32, difficulty: Difficulty, price: f64, age_days: i64, now: DateTime<Utc>) -> GameData {
        GameData {
            id,
            title: format!("Game {id}"),
            description: "A sample description".to_string(),
            difficulty,
            duration: 60,
            price,
            min_players: 2,
            max_players: 6,
            thumbnail: "https://example.com/t.jpg".to_string(),
            images: vec![],
            tags: vec![],
            is_active: id % 2 == 1,
            lat: 0.0,
            lng: 0.0,
            place: String::new(),
            distance: String::new(),
            questions: vec![],
            created_at: now - Duration::days(age_days),
            updated_at: now - Duration::days(age_days),
        }
    }

    #[test]
    fn no_games_means_zeros() {
        assert_eq!(DashboardStats::compute(&[], Utc::now()), DashboardStats::default());
    }

    #[test]
    fn computes_every_figure() {
        let now = Utc::now();
        let games = vec![
            game(1, Difficulty::Easy, 20.0, 30, now),
            game(2, Difficulty::Medium, 25.0, 1, now),
            game(3, Difficulty::Hard, 30.0, 2, now),
            game(4, Difficulty::Expert, 35.5, 10, now),
        ];

        let stats = DashboardStats::compute(&games, now);

        assert_eq!(stats.total_games, 4);
        assert_eq!(stats.active_games, 2);
        assert_eq!(stats.total_value, 110.5);
        assert_eq!(stats.difficulty_rate, 50);
        let recent: Vec<_> = stats.recent_games.iter().map(|g| g.id).collect();
        assert_eq!(recent, vec![2, 3, 4]);
        assert_eq!(
            stats.distribution,
            DifficultyDistribution {
                easy: 25,
                medium: 25,
                hard: 50
            }
        );
        assert_eq!(stats.active_percentage, 50);
        assert_eq!(stats.new_games_count, 2);
        assert_eq!(stats.avg_price, 27.63);
    }
}
