//! In-memory table of live rooms keyed by code.

use std::collections::HashMap;

use crate::room::model::Room;
use crate::util::id::{new_room_code, RoomCode};

#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: HashMap<RoomCode, Room>,
}

impl RoomRegistry {
    /// Registers an empty room under a freshly drawn, unused code.
    pub fn create_room(&mut self) -> &mut Room {
        self.create_room_with(new_room_code)
    }

    /// Same as [`create_room`](Self::create_room) with a caller-supplied code
    /// source. Draws until a code is not in use.
    pub fn create_room_with(&mut self, mut next_code: impl FnMut() -> RoomCode) -> &mut Room {
        let code = loop {
            let code = next_code();
            if !self.rooms.contains_key(&code) {
                break code;
            }
            tracing::debug!(room = %code, "room code collision, retrying");
        };
        self.rooms.entry(code.clone()).or_insert_with(|| Room::new(code))
    }

    pub fn get(&self, code: &RoomCode) -> Option<&Room> {
        self.rooms.get(code)
    }

    pub fn get_mut(&mut self, code: &RoomCode) -> Option<&mut Room> {
        self.rooms.get_mut(code)
    }

    pub fn delete(&mut self, code: &RoomCode) -> Option<Room> {
        self.rooms.remove(code)
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
