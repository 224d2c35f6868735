//! Room lifecycle, seat assignment and reconnection.
//!
//! All room and session state sits in one [`Lobby`] behind a single mutex.
//! Each operation takes the lock, validates, mutates, pushes the resulting
//! views and releases, so no two mutations interleave. Grace timers are the
//! only deferred work; they re-enter through the same lock and re-check the
//! seat before touching it.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use ulid::Ulid;

use crate::error::GameError;
use crate::game::Role;
use crate::protocol::{move_index, ClientMessage, ServerMessage};
use crate::room::registry::RoomRegistry;
use crate::room::view::{Broadcaster, PeerSender};
use crate::session::SessionTable;
use crate::util::id::{ConnId, PlayerToken, RoomCode};

pub const DEFAULT_GRACE: Duration = Duration::from_secs(60);

#[derive(Debug, Default)]
struct Lobby {
    rooms: RoomRegistry,
    sessions: SessionTable,
}

/// Seat handed to a connection by create, join or rejoin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Joined {
    pub code: RoomCode,
    pub role: Role,
    pub token: PlayerToken,
}

#[derive(Clone)]
pub struct RoomManager {
    lobby: Arc<Mutex<Lobby>>,
    peers: Arc<Broadcaster>,
    grace: Duration,
}

impl Default for RoomManager {
    fn default() -> Self {
        Self::new(DEFAULT_GRACE)
    }
}

impl RoomManager {
    pub fn new(grace: Duration) -> Self {
        Self {
            lobby: Arc::new(Mutex::new(Lobby::default())),
            peers: Arc::new(Broadcaster::new()),
            grace,
        }
    }

    pub fn grace_period(&self) -> Duration {
        self.grace
    }

    /// Registers the outbound channel of a new connection.
    pub fn connect(&self, conn: ConnId, tx: PeerSender) {
        self.peers.register(conn, tx);
    }

    /// Sends `msg` to one connection outside any room operation.
    pub fn reply(&self, conn: ConnId, msg: ServerMessage) {
        self.peers.send_to(conn, msg);
    }

    /// Routes one inbound event. Failures go back to `conn` only.
    pub fn handle(&self, conn: ConnId, msg: ClientMessage) {
        let result = match msg {
            ClientMessage::CreateRoom => self.create_room(conn).map(drop),
            ClientMessage::JoinRoom { room_code } => self.join_room(conn, &room_code).map(drop),
            ClientMessage::RejoinRoom { room_code, player_token } => self
                .rejoin_room(conn, &room_code, &PlayerToken::new(player_token))
                .map(drop),
            ClientMessage::LeaveRoom => {
                self.leave_room(conn);
                Ok(())
            }
            ClientMessage::MakeMove { index } => self.make_move(conn, move_index(&index)),
            ClientMessage::RestartRound => self.restart_round(conn),
            ClientMessage::ResetScore => self.reset_score(conn),
        };
        if let Err(err) = result {
            tracing::debug!(%conn, error = ?err, "request rejected");
            self.peers.send_to(conn, err.into());
        }
    }

    pub fn create_room(&self, conn: ConnId) -> Result<Joined, GameError> {
        let mut lobby = self.lobby.lock();
        self.detach(&mut lobby, conn);

        let room = lobby.rooms.create_room();
        let code = room.code.clone();
        let token = room.claim(Role::X, conn)?;
        tracing::info!(room = %code, %conn, "room created");

        Ok(self.seat_connection(&mut lobby, conn, code, Role::X, token))
    }

    pub fn join_room(&self, conn: ConnId, raw_code: &str) -> Result<Joined, GameError> {
        let code = RoomCode::normalize(raw_code).ok_or(GameError::MissingRoomCode)?;
        let mut lobby = self.lobby.lock();

        let room = lobby.rooms.get(&code).ok_or(GameError::RoomNotFound)?;
        // Joining the room the caller already sits in keeps that seat.
        if let Some(session) = lobby.sessions.get(conn).filter(|s| s.code == code) {
            let (role, token) = (session.role, session.token.clone());
            return Ok(self.seat_connection(&mut lobby, conn, code, role, token));
        }
        room.open_role()?;

        self.detach(&mut lobby, conn);
        let room = lobby.rooms.get_mut(&code).ok_or(GameError::RoomNotFound)?;
        let role = room.open_role()?;
        let token = room.claim(role, conn)?;
        tracing::info!(room = %code, %role, %conn, "player joined");

        Ok(self.seat_connection(&mut lobby, conn, code, role, token))
    }

    /// Resumes a seat by token. The seat keeps its token.
    pub fn rejoin_room(
        &self,
        conn: ConnId,
        raw_code: &str,
        token: &PlayerToken,
    ) -> Result<Joined, GameError> {
        let code = RoomCode::normalize(raw_code).ok_or(GameError::RoomGone)?;
        let mut lobby = self.lobby.lock();

        let room = lobby.rooms.get(&code).ok_or(GameError::RoomGone)?;
        let role = room.role_for_token(token).ok_or(GameError::TokenUnrecognized)?;

        if !lobby.sessions.get(conn).is_some_and(|s| s.holds(&code, role)) {
            self.detach(&mut lobby, conn);
        }

        let room = lobby.rooms.get_mut(&code).ok_or(GameError::RoomGone)?;
        let seat = room.seat_mut(role).ok_or(GameError::TokenUnrecognized)?;
        if &seat.token != token {
            return Err(GameError::TokenUnrecognized);
        }
        let superseded = seat.conn.filter(|c| *c != conn);
        seat.bind(conn);
        let token = seat.token.clone();

        if let Some(old) = superseded {
            if lobby.sessions.get(old).is_some_and(|s| s.holds(&code, role)) {
                lobby.sessions.remove(old);
                tracing::debug!(room = %code, %role, conn = %old, "session superseded by rejoin");
            }
        }
        tracing::info!(room = %code, %role, %conn, "player rejoined");

        Ok(self.seat_connection(&mut lobby, conn, code, role, token))
    }

    /// Gives up the caller's seat immediately. No-op without a session.
    pub fn leave_room(&self, conn: ConnId) {
        let mut lobby = self.lobby.lock();
        if self.detach(&mut lobby, conn) {
            self.peers.send_to(conn, ServerMessage::RoomLeft);
        }
    }

    pub fn make_move(&self, conn: ConnId, index: usize) -> Result<(), GameError> {
        let mut lobby = self.lobby.lock();
        let lobby = &mut *lobby;
        let session = lobby.sessions.get(conn).ok_or(GameError::NoSession)?;
        let room = lobby.rooms.get_mut(&session.code).ok_or(GameError::NoSession)?;

        // Bounds are checked by the board so that turn and round errors win.
        room.play(session.role, index)?;
        if room.game_over {
            tracing::info!(room = %room.code, winner = ?room.winner, "round over");
        }
        self.peers.push_room_state(room);
        Ok(())
    }

    pub fn restart_round(&self, conn: ConnId) -> Result<(), GameError> {
        let mut lobby = self.lobby.lock();
        let lobby = &mut *lobby;
        let session = lobby.sessions.get(conn).ok_or(GameError::NoSession)?;
        let room = lobby.rooms.get_mut(&session.code).ok_or(GameError::NoSession)?;
        room.restart_round();
        self.peers.push_room_state(room);
        Ok(())
    }

    pub fn reset_score(&self, conn: ConnId) -> Result<(), GameError> {
        let mut lobby = self.lobby.lock();
        let lobby = &mut *lobby;
        let session = lobby.sessions.get(conn).ok_or(GameError::NoSession)?;
        let room = lobby.rooms.get_mut(&session.code).ok_or(GameError::NoSession)?;
        room.reset_scores();
        self.peers.push_room_state(room);
        Ok(())
    }

    /// Abrupt loss of a connection. The seat is held open for the grace
    /// period; the opponent sees it as disconnected.
    pub fn disconnect(&self, conn: ConnId) {
        self.peers.unregister(conn);
        let mut lobby = self.lobby.lock();
        let Some(session) = lobby.sessions.remove(conn) else { return };
        let Some(room) = lobby.rooms.get_mut(&session.code) else { return };
        let Some(seat) = room.seat_mut(session.role) else { return };
        if seat.conn != Some(conn) {
            return;
        }

        let timer = seat.release();
        let (timer_id, cancel) = (timer.id, timer.cancellation());
        tracing::info!(room = %session.code, role = %session.role, %conn, "player disconnected, holding seat");
        self.peers.push_room_state(room);

        let manager = self.clone();
        let grace = self.grace;
        let (code, role, token) = (session.code, session.role, session.token);
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(grace) => manager.expire_seat(&code, role, &token, timer_id),
            }
        });
    }

    pub fn room_count(&self) -> usize {
        self.lobby.lock().rooms.len()
    }

    pub fn session_count(&self) -> usize {
        self.lobby.lock().sessions.len()
    }

    /// Grace timer callback. Acts only if the seat is still the one the
    /// timer was armed for.
    fn expire_seat(&self, code: &RoomCode, role: Role, token: &PlayerToken, timer_id: Ulid) {
        let mut lobby = self.lobby.lock();
        let still_pending = lobby
            .rooms
            .get(code)
            .and_then(|room| room.seat(role))
            .is_some_and(|seat| {
                !seat.connected
                    && &seat.token == token
                    && seat.grace.as_ref().is_some_and(|t| t.id == timer_id)
            });
        if !still_pending {
            return;
        }
        tracing::info!(room = %code, %role, "grace period expired");
        self.vacate_seat(&mut lobby, code, role);
    }

    /// Drops whatever seat `conn` holds, without a grace period. Returns
    /// whether there was one.
    fn detach(&self, lobby: &mut Lobby, conn: ConnId) -> bool {
        let Some(session) = lobby.sessions.remove(conn) else { return false };
        let bound_here = lobby
            .rooms
            .get(&session.code)
            .and_then(|room| room.seat(session.role))
            .is_some_and(|seat| seat.conn == Some(conn));
        if bound_here {
            self.vacate_seat(lobby, &session.code, session.role);
        }
        true
    }

    /// Empties a seat. The room goes away when no seat is left, otherwise the
    /// round starts over for whoever remains.
    fn vacate_seat(&self, lobby: &mut Lobby, code: &RoomCode, role: Role) {
        let Some(room) = lobby.rooms.get_mut(code) else { return };
        room.vacate(role);
        tracing::info!(room = %code, %role, "seat vacated");

        if room.is_empty() {
            lobby.rooms.delete(code);
            tracing::info!(room = %code, "room destroyed");
            return;
        }
        room.restart_round();
        self.peers.push_room_state(room);
    }

    fn seat_connection(
        &self,
        lobby: &mut Lobby,
        conn: ConnId,
        code: RoomCode,
        role: Role,
        token: PlayerToken,
    ) -> Joined {
        lobby.sessions.bind(conn, code.clone(), role, token.clone());
        self.peers.send_to(
            conn,
            ServerMessage::RoomJoined {
                room_code: code.clone(),
                role,
                player_token: token.clone(),
            },
        );
        if let Some(room) = lobby.rooms.get(&code) {
            self.peers.push_room_state(room);
        }
        Joined { code, role, token }
    }
}
