//! Per-connection bindings to a seat.

use std::collections::HashMap;

use crate::game::Role;
use crate::util::id::{ConnId, PlayerToken, RoomCode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub conn: ConnId,
    pub code: RoomCode,
    pub role: Role,
    pub token: PlayerToken,
}

impl Session {
    pub fn holds(&self, code: &RoomCode, role: Role) -> bool {
        &self.code == code && self.role == role
    }
}

#[derive(Debug, Default)]
pub struct SessionTable {
    sessions: HashMap<ConnId, Session>,
}

impl SessionTable {
    pub fn get(&self, conn: ConnId) -> Option<&Session> {
        self.sessions.get(&conn)
    }

    /// Binds `conn`, replacing whatever it held before.
    pub fn bind(&mut self, conn: ConnId, code: RoomCode, role: Role, token: PlayerToken) {
        self.sessions.insert(conn, Session { conn, code, role, token });
    }

    pub fn remove(&mut self, conn: ConnId) -> Option<Session> {
        self.sessions.remove(&conn)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_replaces_previous_binding() {
        let mut table = SessionTable::default();
        let conn = ConnId::new();
        let a = RoomCode::normalize("AAAAAA").unwrap();
        let b = RoomCode::normalize("BBBBBB").unwrap();
        table.bind(conn, a.clone(), Role::X, PlayerToken::new("t1"));
        table.bind(conn, b.clone(), Role::O, PlayerToken::new("t2"));

        let session = table.get(conn).unwrap();
        assert!(session.holds(&b, Role::O));
        assert!(!session.holds(&a, Role::X));
        assert_eq!(table.len(), 1);

        assert!(table.remove(conn).is_some());
        assert!(table.remove(conn).is_none());
        assert!(table.is_empty());
    }
}
