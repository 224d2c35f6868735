//! Per-role room views and the outbound peer table.

use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::mpsc;

use crate::game::{Board, Cell, Role};
use crate::protocol::ServerMessage;
use crate::room::model::{Phase, Room, Scores};
use crate::util::id::{ConnId, RoomCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Presence {
    #[serde(rename = "X")]
    pub x: bool,
    #[serde(rename = "O")]
    pub o: bool,
}

/// What one seat sees of its room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomView {
    pub room_code: RoomCode,
    pub board: Board,
    pub players: Presence,
    pub turn: Role,
    pub game_over: bool,
    pub winner: Cell,
    pub scores: Scores,
    pub you_role: Role,
    pub phase: Phase,
}

impl RoomView {
    pub fn for_role(room: &Room, role: Role) -> Self {
        Self {
            room_code: room.code.clone(),
            board: room.board,
            players: Presence {
                x: room.is_connected(Role::X),
                o: room.is_connected(Role::O),
            },
            turn: room.turn,
            game_over: room.game_over,
            winner: room.winner.into(),
            scores: room.scores,
            you_role: role,
            phase: room.phase(),
        }
    }
}

pub type PeerSender = mpsc::UnboundedSender<ServerMessage>;

/// Outbound channels of live connections.
#[derive(Debug, Default)]
pub struct Broadcaster {
    peers: DashMap<ConnId, PeerSender>,
}

impl Broadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, conn: ConnId, tx: PeerSender) {
        self.peers.insert(conn, tx);
    }

    pub fn unregister(&self, conn: ConnId) {
        self.peers.remove(&conn);
    }

    pub fn send_to(&self, conn: ConnId, msg: ServerMessage) {
        if let Some(tx) = self.peers.get(&conn) {
            if tx.send(msg).is_err() {
                tracing::debug!(%conn, "peer channel closed");
            }
        }
    }

    /// Pushes a fresh view to every connected seat. Disconnected seats get
    /// nothing; they resync through rejoin.
    pub fn push_room_state(&self, room: &Room) {
        for (role, conn) in room.connected_conns() {
            self.send_to(conn, ServerMessage::RoomState(RoomView::for_role(room, role)));
        }
    }
}
