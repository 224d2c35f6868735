//! Room and seat records.

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use ulid::Ulid;

use crate::error::GameError;
use crate::game::{Board, Role};
use crate::util::id::{new_player_token, ConnId, PlayerToken, RoomCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Scores {
    #[serde(rename = "X")]
    pub x: u32,
    #[serde(rename = "O")]
    pub o: u32,
    pub draw: u32,
}

impl Scores {
    fn credit(&mut self, winner: Option<Role>) {
        match winner {
            Some(Role::X) => self.x += 1,
            Some(Role::O) => self.o += 1,
            None => self.draw += 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    AwaitingSecondPlayer,
    InProgress,
    RoundOver,
}

/// Pending grace-period expiry for a disconnected seat.
#[derive(Debug)]
pub struct GraceTimer {
    pub id: Ulid,
    cancel: CancellationToken,
}

impl GraceTimer {
    pub fn new() -> Self {
        Self { id: Ulid::new(), cancel: CancellationToken::new() }
    }

    /// Token the timer task waits on.
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn cancel(self) {
        self.cancel.cancel();
    }
}

impl Default for GraceTimer {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct Seat {
    pub conn: Option<ConnId>,
    pub token: PlayerToken,
    pub connected: bool,
    pub grace: Option<GraceTimer>,
}

impl Seat {
    fn occupied_by(conn: ConnId) -> Self {
        Self { conn: Some(conn), token: new_player_token(), connected: true, grace: None }
    }

    pub fn cancel_grace(&mut self) {
        if let Some(timer) = self.grace.take() {
            timer.cancel();
        }
    }

    /// Binds the seat to a (new) live connection.
    pub fn bind(&mut self, conn: ConnId) {
        self.cancel_grace();
        self.conn = Some(conn);
        self.connected = true;
    }

    /// Drops the live connection but keeps the token. The returned timer
    /// must be armed by the caller.
    pub fn release(&mut self) -> &GraceTimer {
        self.cancel_grace();
        self.conn = None;
        self.connected = false;
        self.grace.insert(GraceTimer::new())
    }
}

/// Authoritative state for one game session.
#[derive(Debug)]
pub struct Room {
    pub code: RoomCode,
    pub board: Board,
    pub turn: Role,
    pub game_over: bool,
    pub winner: Option<Role>,
    pub scores: Scores,
    seats: [Option<Seat>; 2],
}

impl Room {
    pub fn new(code: RoomCode) -> Self {
        Self {
            code,
            board: Board::new(),
            turn: Role::X,
            game_over: false,
            winner: None,
            scores: Scores::default(),
            seats: [None, None],
        }
    }

    pub fn seat(&self, role: Role) -> Option<&Seat> {
        self.seats[role.index()].as_ref()
    }

    pub fn seat_mut(&mut self, role: Role) -> Option<&mut Seat> {
        self.seats[role.index()].as_mut()
    }

    pub fn is_connected(&self, role: Role) -> bool {
        self.seat(role).is_some_and(|s| s.connected)
    }

    pub fn is_empty(&self) -> bool {
        self.seats.iter().all(Option::is_none)
    }

    /// "X" if free, else "O".
    pub fn open_role(&self) -> Result<Role, GameError> {
        Role::ALL
            .into_iter()
            .find(|r| self.seat(*r).is_none())
            .ok_or(GameError::RoomFull)
    }

    pub fn role_for_token(&self, token: &PlayerToken) -> Option<Role> {
        Role::ALL
            .into_iter()
            .find(|r| self.seat(*r).is_some_and(|s| &s.token == token))
    }

    /// Creates the seat for `role` with a fresh token. Fails if taken.
    pub fn claim(&mut self, role: Role, conn: ConnId) -> Result<PlayerToken, GameError> {
        let slot = &mut self.seats[role.index()];
        if slot.is_some() {
            return Err(GameError::RoomFull);
        }
        let seat = slot.insert(Seat::occupied_by(conn));
        Ok(seat.token.clone())
    }

    /// Empties the seat, cancelling any pending grace timer.
    pub fn vacate(&mut self, role: Role) -> Option<Seat> {
        let mut seat = self.seats[role.index()].take()?;
        seat.cancel_grace();
        Some(seat)
    }

    pub fn connected_conns(&self) -> impl Iterator<Item = (Role, ConnId)> + '_ {
        Role::ALL.into_iter().filter_map(|r| {
            let seat = self.seat(r)?;
            if seat.connected { seat.conn.map(|c| (r, c)) } else { None }
        })
    }

    pub fn phase(&self) -> Phase {
        if !Role::ALL.iter().all(|r| self.is_connected(*r)) {
            Phase::AwaitingSecondPlayer
        } else if self.game_over {
            Phase::RoundOver
        } else {
            Phase::InProgress
        }
    }

    /// Applies a move for `role`, ending the round or passing the turn.
    pub fn play(&mut self, role: Role, index: usize) -> Result<(), GameError> {
        if !Role::ALL.iter().all(|r| self.is_connected(*r)) {
            return Err(GameError::OpponentMissing);
        }
        if self.game_over {
            return Err(GameError::RoundAlreadyOver);
        }
        if role != self.turn {
            return Err(GameError::NotYourTurn);
        }
        self.board = self.board.apply_move(role, index)?;

        let eval = self.board.evaluate();
        if eval.is_over() {
            self.game_over = true;
            self.winner = eval.winner;
            self.scores.credit(eval.winner);
        } else {
            self.turn = role.opponent();
        }
        Ok(())
    }

    /// Clears the board for a fresh round. Scores are kept.
    pub fn restart_round(&mut self) {
        self.board = Board::new();
        self.turn = Role::X;
        self.game_over = false;
        self.winner = None;
    }

    pub fn reset_scores(&mut self) {
        self.scores = Scores::default();
        self.restart_round();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Cell;
    use crate::game::board::CELLS;

    fn full_room() -> Room {
        let mut room = Room::new(RoomCode::normalize("AB23CD").unwrap());
        room.claim(Role::X, ConnId::new()).unwrap();
        room.claim(Role::O, ConnId::new()).unwrap();
        room
    }

    #[test]
    fn open_role_fills_x_then_o() {
        let mut room = Room::new(RoomCode::normalize("AAAAAA").unwrap());
        assert_eq!(room.open_role(), Ok(Role::X));
        room.claim(Role::X, ConnId::new()).unwrap();
        assert_eq!(room.open_role(), Ok(Role::O));
        room.claim(Role::O, ConnId::new()).unwrap();
        assert_eq!(room.open_role(), Err(GameError::RoomFull));
        assert_eq!(room.claim(Role::O, ConnId::new()), Err(GameError::RoomFull));
    }

    #[test]
    fn open_role_reuses_a_vacated_x() {
        let mut room = full_room();
        room.vacate(Role::X);
        assert_eq!(room.open_role(), Ok(Role::X));
    }

    #[test]
    fn tokens_identify_seats() {
        let room = full_room();
        let x = room.seat(Role::X).unwrap().token.clone();
        let o = room.seat(Role::O).unwrap().token.clone();
        assert_ne!(x, o);
        assert_eq!(room.role_for_token(&x), Some(Role::X));
        assert_eq!(room.role_for_token(&o), Some(Role::O));
        assert_eq!(room.role_for_token(&PlayerToken::new("nope")), None);
    }

    #[test]
    fn turn_alternates_until_round_ends() {
        let mut room = full_room();
        room.play(Role::X, 0).unwrap();
        assert_eq!(room.turn, Role::O);
        room.play(Role::O, 3).unwrap();
        assert_eq!(room.turn, Role::X);
        room.play(Role::X, 1).unwrap();
        room.play(Role::O, 4).unwrap();
        room.play(Role::X, 2).unwrap();
        assert!(room.game_over);
        assert_eq!(room.winner, Some(Role::X));
        assert_eq!(room.turn, Role::X);
        assert_eq!(room.scores, Scores { x: 1, o: 0, draw: 0 });
        assert_eq!(room.phase(), Phase::RoundOver);
    }

    #[test]
    fn rejected_moves_do_not_mutate() {
        let mut room = full_room();
        assert_eq!(room.play(Role::O, 0), Err(GameError::NotYourTurn));
        room.play(Role::X, 0).unwrap();
        assert_eq!(room.play(Role::O, 0), Err(GameError::CellOccupied));
        assert_eq!(room.play(Role::O, 9), Err(GameError::InvalidIndex));
        assert_eq!(room.turn, Role::O);
        assert_eq!(room.board.cells()[0], Cell::X);
    }

    #[test]
    fn move_needs_a_connected_opponent() {
        let mut room = full_room();
        room.seat_mut(Role::O).unwrap().release();
        assert_eq!(room.play(Role::X, 0), Err(GameError::OpponentMissing));
        assert!(room.board.is_empty());
        assert_eq!(room.phase(), Phase::AwaitingSecondPlayer);
    }

    #[test]
    fn draw_is_counted() {
        let mut room = full_room();
        for (role, i) in [
            (Role::X, 0),
            (Role::O, 1),
            (Role::X, 2),
            (Role::O, 4),
            (Role::X, 3),
            (Role::O, 5),
            (Role::X, 7),
            (Role::O, 6),
            (Role::X, 8),
        ] {
            room.play(role, i).unwrap();
        }
        assert!(room.game_over);
        assert_eq!(room.winner, None);
        assert_eq!(room.scores.draw, 1);
        assert_eq!(room.play(Role::O, 0), Err(GameError::RoundAlreadyOver));
    }

    #[test]
    fn turn_alternates_across_the_whole_game_tree() {
        let mut room = full_room();
        let mut stack = vec![(Board::new(), Role::X)];
        let mut moves = 0usize;
        while let Some((board, turn)) = stack.pop() {
            for i in 0..CELLS {
                room.board = board;
                room.turn = turn;
                room.game_over = false;
                room.winner = None;
                let before = room.scores;
                if room.play(turn, i).is_err() {
                    assert_eq!(room.board, board);
                    continue;
                }
                moves += 1;
                let eval = room.board.evaluate();
                assert_eq!(room.game_over, eval.is_over());
                assert_eq!(room.winner, eval.winner);
                if room.game_over {
                    assert_eq!(room.turn, turn);
                    let mut expected = before;
                    expected.credit(eval.winner);
                    assert_eq!(room.scores, expected);
                } else {
                    assert_eq!(room.turn, turn.opponent());
                    assert_eq!(room.scores, before);
                    stack.push((room.board, room.turn));
                }
            }
        }
        assert_eq!(moves, 549_945);
    }

    #[test]
    fn restart_keeps_scores_reset_zeroes_them() {
        let mut room = full_room();
        room.scores = Scores { x: 2, o: 1, draw: 3 };
        room.play(Role::X, 4).unwrap();
        room.restart_round();
        assert!(room.board.is_empty());
        assert_eq!(room.turn, Role::X);
        assert_eq!(room.scores, Scores { x: 2, o: 1, draw: 3 });

        room.play(Role::X, 4).unwrap();
        room.reset_scores();
        assert!(room.board.is_empty());
        assert_eq!(room.scores, Scores::default());
    }

    #[test]
    fn release_keeps_token_and_bind_cancels_grace() {
        let mut room = full_room();
        let token = room.seat(Role::X).unwrap().token.clone();
        let cancel = room.seat_mut(Role::X).unwrap().release().cancellation();
        assert!(!room.is_connected(Role::X));
        assert_eq!(room.role_for_token(&token), Some(Role::X));
        assert!(!cancel.is_cancelled());

        let conn = ConnId::new();
        room.seat_mut(Role::X).unwrap().bind(conn);
        assert!(cancel.is_cancelled());
        assert!(room.is_connected(Role::X));
        assert_eq!(room.seat(Role::X).unwrap().conn, Some(conn));
    }
}
