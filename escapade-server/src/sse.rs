use axum::{
    response::{
        sse::{Event, KeepAlive},
        Sse,
    },
    routing::get,
};
use escapade_admin::{AdminEvent, EventReceiver, GameChange};
use futures_util::Stream;
use log::{error, info};
use parking_lot::Mutex;
use serde::Serialize;
use std::{
    collections::VecDeque,
    convert::Infallible,
    pin::Pin,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Weak,
    },
    task::{Context, Poll, Waker},
    thread,
};
use utoipa::ToSchema;

use crate::{auth::AdminSession, context::ServerContext, errors::ErrorBody, Router};

type ConnectionId = u64;

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "kebab-case", tag = "type")]
pub enum ServerEvent {
    /// Game listings changed and should be fetched again
    GamesInvalidated {
        #[serde(rename = "gameId")]
        game_id: i32,
        /// One of created, updated, deleted, toggled
        #[schema(value_type = String)]
        change: GameChange,
    },
}

impl From<AdminEvent> for ServerEvent {
    fn from(value: AdminEvent) -> Self {
        match value {
            AdminEvent::GamesInvalidated { game_id, change } => {
                Self::GamesInvalidated { game_id, change }
            }
        }
    }
}

/// Manages server sent event connections
pub struct ServerSentEvents {
    me: Weak<Self>,
    next_id: AtomicU64,
    connections: Mutex<Vec<Connection>>,
}

struct Connection {
    id: ConnectionId,
    pending_messages: Arc<Mutex<VecDeque<ServerEvent>>>,
    waker: Arc<Mutex<Option<Waker>>>,
}

pub struct ConnectionHandle {
    id: ConnectionId,
    /// A reference to [Connection]'s pending messages
    pending_messages: Arc<Mutex<VecDeque<ServerEvent>>>,
    /// A reference to [Connection]'s stored [Waker]
    waker: Arc<Mutex<Option<Waker>>>,
    /// Required to remove connection when dropped
    manager: Weak<ServerSentEvents>,
}

impl ServerSentEvents {
    pub fn new() -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            me: me.clone(),
            next_id: AtomicU64::new(0),
            connections: Default::default(),
        })
    }

    pub fn broadcast(&self, event: ServerEvent) {
        let connections = self.connections.lock();

        for connection in connections.iter() {
            connection.send(event.clone())
        }
    }

    pub fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }

    /// Forwards admin events to every connection until the sending side
    /// is gone
    pub fn forward(self: &Arc<Self>, events: EventReceiver) {
        let me = Arc::downgrade(self);

        let spawned = thread::Builder::new()
            .name("sse-forward".to_string())
            .spawn(move || {
                for event in events.iter() {
                    let Some(sse) = me.upgrade() else {
                        break;
                    };

                    sse.broadcast(event.into());
                }

                info!("Event forwarding stopped");
            });

        if let Err(e) = spawned {
            error!("Could not start event forwarding: {}", e);
        }
    }

    fn connect(&self) -> ConnectionHandle {
        let connection = Connection::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let handle = connection.handle(self.me.clone());

        self.connections.lock().push(connection);
        handle
    }

    fn disconnect(&self, id: ConnectionId) {
        self.connections.lock().retain(|c| c.id != id)
    }
}

impl Connection {
    fn new(id: ConnectionId) -> Self {
        Self {
            id,
            pending_messages: Default::default(),
            waker: Default::default(),
        }
    }

    fn send(&self, message: ServerEvent) {
        self.pending_messages.lock().push_back(message);

        if let Some(waker) = self.waker.lock().take() {
            waker.wake()
        }
    }

    fn handle(&self, manager: Weak<ServerSentEvents>) -> ConnectionHandle {
        ConnectionHandle {
            id: self.id,
            pending_messages: self.pending_messages.clone(),
            waker: self.waker.clone(),
            manager,
        }
    }
}

impl Stream for ConnectionHandle {
    type Item = Result<Event, Infallible>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut pending_messages = self.pending_messages.lock();

        while let Some(message) = pending_messages.pop_front() {
            match Event::default().json_data(&message) {
                Ok(event) => return Poll::Ready(Some(Ok(event))),
                Err(e) => error!("Could not serialize event: {}", e),
            }
        }

        // Stored while the queue is locked so a send cannot slip in between
        *self.waker.lock() = Some(cx.waker().clone());
        Poll::Pending
    }
}

impl Drop for ConnectionHandle {
    fn drop(&mut self) {
        if let Some(manager) = self.manager.upgrade() {
            manager.disconnect(self.id)
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/events",
    tag = "events",
    security(
        ("SessionCookie" = [])
    ),
    responses(
        (
            status = 200,
            content_type = "text/event-stream",
            description = "Tells admins when game listings change",
            body = ServerEvent
        ),
        (status = 401, body = ErrorBody),
        (status = 403, body = ErrorBody)
    )
)]
async fn event_stream(_session: AdminSession, context: ServerContext) -> Sse<ConnectionHandle> {
    Sse::new(context.sse.connect()).keep_alive(KeepAlive::default())
}

pub fn router() -> Router {
    Router::new().route("/", get(event_stream))
}
