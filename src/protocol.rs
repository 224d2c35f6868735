//! Wire messages exchanged over the game socket.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::GameError;
use crate::game::Role;
use crate::room::view::RoomView;
use crate::util::id::{PlayerToken, RoomCode};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    CreateRoom,
    #[serde(rename_all = "camelCase")]
    JoinRoom {
        #[serde(default)]
        room_code: String,
    },
    #[serde(rename_all = "camelCase")]
    RejoinRoom {
        #[serde(default)]
        room_code: String,
        #[serde(default)]
        player_token: String,
    },
    LeaveRoom,
    /// `index` is kept raw; anything but an integer in range is rejected by
    /// the move checks, after session and turn.
    MakeMove {
        #[serde(default)]
        index: Value,
    },
    RestartRound,
    ResetScore,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    #[serde(rename_all = "camelCase")]
    RoomJoined {
        room_code: RoomCode,
        role: Role,
        player_token: PlayerToken,
    },
    RoomLeft,
    RoomState(RoomView),
    RejoinFailed { message: String },
    ServerError { message: String },
}

/// Board index carried by a `make_move` event. Non-integers and values that
/// do not fit map to `usize::MAX`, which the board reports as out of range.
pub fn move_index(raw: &Value) -> usize {
    raw.as_u64()
        .and_then(|i| usize::try_from(i).ok())
        .unwrap_or(usize::MAX)
}

impl From<GameError> for ServerMessage {
    fn from(err: GameError) -> Self {
        let message = err.to_string();
        if err.is_rejoin_failure() {
            ServerMessage::RejoinFailed { message }
        } else {
            ServerMessage::ServerError { message }
        }
    }
}
