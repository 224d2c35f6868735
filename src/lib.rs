//! Two-player tic-tac-toe rooms over WebSocket.

pub mod config;
pub mod error;
pub mod game;
pub mod http;
pub mod protocol;
pub mod room;
pub mod session;
pub mod telemetry;
pub mod util;
pub mod ws;

pub use error::GameError;
pub use room::manager::{Joined, RoomManager};
