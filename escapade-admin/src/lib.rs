mod auth;
mod db;
mod events;
mod games;
mod guard;
mod seed;
mod session;
mod util;
mod validation;

pub use auth::*;
pub use db::*;
pub use events::*;
pub use games::*;
pub use guard::*;
pub use seed::*;
pub use session::*;
pub use util::*;
pub use validation::first_violation;

use argon2::Params;
use crossbeam::channel::unbounded;

/// Settings the admin system is created with
pub struct AdminOptions {
    /// Key that session tokens are signed with
    pub session_secret: Vec<u8>,
    /// Upper bound of `limit` when listing games
    pub max_page_size: i64,
    /// Password hashing costs, the argon2 defaults when `None`
    pub argon_params: Option<Params>,
}

impl AdminOptions {
    pub fn new(session_secret: impl Into<Vec<u8>>) -> Self {
        Self {
            session_secret: session_secret.into(),
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
            argon_params: None,
        }
    }
}

/// The escape room admin system: accounts, sessions, and game listings.
pub struct Admin {
    pub db: SharedDatabase,
    pub auth: Auth,
    pub games: GameManager,
    pub sessions: SessionCodec,
    pub guard: AccessGuard,
    /// Receives an event for every change to the games
    pub events: EventReceiver,
}

impl Admin {
    pub fn new(db: SharedDatabase, options: AdminOptions) -> Self {
        let (sender, receiver) = unbounded();

        let auth = match options.argon_params {
            Some(params) => Auth::with_params(&db, params),
            None => Auth::new(&db),
        };

        Self {
            games: GameManager::new(&db, sender, options.max_page_size),
            sessions: SessionCodec::new(&options.session_secret),
            guard: AccessGuard::default(),
            events: receiver,
            auth,
            db,
        }
    }
}
