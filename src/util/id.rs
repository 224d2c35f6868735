//! ID utilities (room codes, player tokens, connection ids).

use std::fmt;

use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Room code alphabet. `I`, `O`, `0` and `1` are left out so codes survive
/// being read aloud or copied by hand.
pub const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
pub const ROOM_CODE_LEN: usize = 6;
pub const PLAYER_TOKEN_LEN: usize = 32;

/// Short human-shareable room code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    /// Normalizes user input: surrounding whitespace is dropped and letters
    /// are upper-cased. Returns `None` when nothing is left.
    pub fn normalize(raw: &str) -> Option<Self> {
        let code = raw.trim().to_ascii_uppercase();
        if code.is_empty() { None } else { Some(Self(code)) }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Secret that proves the right to resume a seat.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerToken(String);

impl PlayerToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Tokens end up in logs through `Debug` on sessions and seats; keep them out.
impl fmt::Debug for PlayerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PlayerToken(..)")
    }
}

/// Identity of one live socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnId(Ulid);

impl ConnId {
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for ConnId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Draw a random room code. Uniqueness is the registry's job.
pub fn new_room_code() -> RoomCode {
    let mut rng = rand::thread_rng();
    let code = (0..ROOM_CODE_LEN)
        .map(|_| ROOM_CODE_ALPHABET[rng.gen_range(0..ROOM_CODE_ALPHABET.len())] as char)
        .collect();
    RoomCode(code)
}

/// Generate a player token (URL-safe alphanumeric, ~190 bits).
pub fn new_player_token() -> PlayerToken {
    let token = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(PLAYER_TOKEN_LEN)
        .map(char::from)
        .collect();
    PlayerToken(token)
}
