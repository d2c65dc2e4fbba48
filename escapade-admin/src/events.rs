use crossbeam::channel::{Receiver, Sender};
use serde::Serialize;

use crate::PrimaryKey;

pub type EventSender = Sender<AdminEvent>;
pub type EventReceiver = Receiver<AdminEvent>;

/// Events emitted by the admin system
#[derive(Debug, Clone, PartialEq)]
pub enum AdminEvent {
    /// Game listings changed, readers should fetch them again
    GamesInvalidated {
        game_id: PrimaryKey,
        change: GameChange,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GameChange {
    Created,
    Updated,
    Deleted,
    Toggled,
}
