//! The fixed move <-> index bijection spanning the policy vector.
//!
//! Every geometrically reachable (from, to, flag) triple gets a slot, in a
//! fixed enumeration order that evaluator outputs are keyed by: queen-line
//! rays first, then knight offsets, pawn moves, king steps, and the four
//! castling pairs. Later categories re-derive queen-line geometry (a king
//! step is a length-one ray), so insertion dedups on membership; only the
//! pawn promotions and the castles survive as new entries there.
//!
//! The table is built once and never mutated, so one instance can be shared
//! by any number of concurrent searches.

use std::collections::HashMap;

use tracing::debug;

use crate::game::GameState;
use crate::moves::{Move, MoveFlag, MoveKey, Role, Square};

const QUEEN_DIRECTIONS: [(i8, i8); 8] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, -1),
    (-1, 1),
    (1, -1),
    (1, 1),
];

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (2, -1),
    (2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
];

/// Kingside and queenside castling for both colors: e1g1, e1c1, e8g8, e8c8.
const CASTLE_SQUARES: [(u8, u8); 4] = [(4, 6), (4, 2), (60, 62), (60, 58)];

/// How many entries each enumeration category contributed.
///
/// Counts cover newly inserted triples only: king steps and plain pawn moves
/// dedup into the queen-line entries, so `pawn` counts promotions and `king`
/// is zero on the standard board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveCounts {
    pub queen_like: usize,
    pub knight: usize,
    pub pawn: usize,
    pub king: usize,
    pub castle: usize,
}

impl MoveCounts {
    pub fn total(&self) -> usize {
        self.queen_like + self.knight + self.pawn + self.king + self.castle
    }
}

/// Immutable bijection between canonical moves and action-space slots.
#[derive(Debug, Clone)]
pub struct MoveIndex {
    forward: HashMap<MoveKey, u16>,
    reverse: Vec<MoveKey>,
    counts: MoveCounts,
}

impl MoveIndex {
    /// Build the table. The enumeration order below is part of the contract:
    /// evaluator outputs are aligned to it and any change silently breaks
    /// them.
    pub fn new() -> Self {
        let mut index = MoveIndex {
            forward: HashMap::new(),
            reverse: Vec::new(),
            counts: MoveCounts::default(),
        };

        index.enumerate_queen_lines();
        index.enumerate_knights();
        index.enumerate_pawns();
        index.enumerate_kings();
        index.enumerate_castles();

        assert_eq!(
            index.forward.len(),
            index.reverse.len(),
            "duplicate (from, to, flag) triple while building the move index"
        );

        let counts = index.counts;
        debug!(
            total = index.reverse.len(),
            queen_like = counts.queen_like,
            knight = counts.knight,
            pawn = counts.pawn,
            king = counts.king,
            castle = counts.castle,
            "move index built"
        );

        index
    }

    fn insert(&mut self, key: MoveKey) -> bool {
        if self.forward.contains_key(&key) {
            return false;
        }
        let id = self.reverse.len() as u16;
        self.forward.insert(key, id);
        self.reverse.push(key);
        true
    }

    fn enumerate_queen_lines(&mut self) {
        for sq in 0..Square::COUNT as u8 {
            let from = Square::new(sq);
            for (dr, df) in QUEEN_DIRECTIONS {
                for steps in 1..8i8 {
                    let Some(to) = Square::at(from.rank() + dr * steps, from.file() + df * steps)
                    else {
                        break;
                    };
                    if self.insert(MoveKey::plain(from, to)) {
                        self.counts.queen_like += 1;
                    }
                }
            }
        }
    }

    fn enumerate_knights(&mut self) {
        for sq in 0..Square::COUNT as u8 {
            let from = Square::new(sq);
            for (dr, df) in KNIGHT_OFFSETS {
                if let Some(to) = Square::at(from.rank() + dr, from.file() + df) {
                    if self.insert(MoveKey::plain(from, to)) {
                        self.counts.knight += 1;
                    }
                }
            }
        }
    }

    /// Pawn moves, white then black semantics per from-square: push and
    /// diagonal captures one rank ahead, promotion entries from the rank
    /// before last, and the double-step from the starting rank. No
    /// under-promotions, no en-passant.
    fn enumerate_pawns(&mut self) {
        for sq in 0..Square::COUNT as u8 {
            let from = Square::new(sq);
            let (rank, file) = (from.rank(), from.file());

            // White, one rank up.
            for df in [-1, 0, 1] {
                if let Some(to) = Square::at(rank + 1, file + df) {
                    let inserted = if rank == 6 {
                        self.insert(MoveKey::new(from, to, MoveFlag::PromoteQueen))
                    } else {
                        self.insert(MoveKey::plain(from, to))
                    };
                    if inserted {
                        self.counts.pawn += 1;
                    }
                }
            }
            if rank == 1 {
                if let Some(to) = Square::at(rank + 2, file) {
                    if self.insert(MoveKey::plain(from, to)) {
                        self.counts.pawn += 1;
                    }
                }
            }

            // Black, one rank down.
            for df in [-1, 0, 1] {
                if let Some(to) = Square::at(rank - 1, file + df) {
                    let inserted = if rank == 1 {
                        self.insert(MoveKey::new(from, to, MoveFlag::PromoteQueen))
                    } else {
                        self.insert(MoveKey::plain(from, to))
                    };
                    if inserted {
                        self.counts.pawn += 1;
                    }
                }
            }
            if rank == 6 {
                if let Some(to) = Square::at(rank - 2, file) {
                    if self.insert(MoveKey::plain(from, to)) {
                        self.counts.pawn += 1;
                    }
                }
            }
        }
    }

    fn enumerate_kings(&mut self) {
        for sq in 0..Square::COUNT as u8 {
            let from = Square::new(sq);
            for (dr, df) in QUEEN_DIRECTIONS {
                if let Some(to) = Square::at(from.rank() + dr, from.file() + df) {
                    if self.insert(MoveKey::plain(from, to)) {
                        self.counts.king += 1;
                    }
                }
            }
        }
    }

    fn enumerate_castles(&mut self) {
        for (from, to) in CASTLE_SQUARES {
            let key = MoveKey::new(Square::new(from), Square::new(to), MoveFlag::Castle);
            if self.insert(key) {
                self.counts.castle += 1;
            }
        }
    }

    /// Number of slots in the action space.
    #[inline]
    pub fn len(&self) -> usize {
        self.reverse.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.reverse.is_empty()
    }

    /// Per-category construction diagnostics.
    pub fn counts(&self) -> MoveCounts {
        self.counts
    }

    /// Map a legal move to its action slot, deriving the flag from game
    /// context: castling first, then queen promotion, else the plain triple.
    ///
    /// Returns `None` for moves outside the representable vocabulary
    /// (under-promotions); callers drop those from consideration.
    pub fn resolve<S: GameState>(&self, state: &S, mv: Move) -> Option<usize> {
        if state.is_castling(mv) {
            return self.lookup(MoveKey::new(mv.from, mv.to, MoveFlag::Castle));
        }
        match mv.promotion {
            Some(Role::Queen) => self.lookup(MoveKey::new(mv.from, mv.to, MoveFlag::PromoteQueen)),
            Some(_) => None,
            None => self.lookup(MoveKey::plain(mv.from, mv.to)),
        }
    }

    fn lookup(&self, key: MoveKey) -> Option<usize> {
        self.forward.get(&key).map(|&id| id as usize)
    }

    /// Inverse lookup. Out-of-range indices yield the null move rather than
    /// an error. Castle entries unresolve to the bare king move.
    pub fn unresolve(&self, index: usize) -> Move {
        let Some(key) = self.reverse.get(index) else {
            return Move::NULL;
        };
        match key.flag {
            MoveFlag::PromoteQueen => Move::promoting(key.from, key.to, Role::Queen),
            _ => Move::new(key.from, key.to),
        }
    }

    /// The canonical triple stored at `index`, if any.
    pub fn key_at(&self, index: usize) -> Option<MoveKey> {
        self.reverse.get(index).copied()
    }
}

impl Default for MoveIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Color, GameStatus};

    /// Rules stub: reports castling for a configured set of square pairs and
    /// nothing else. Enough context for resolution tests without a real
    /// rules engine.
    #[derive(Debug, Clone, Default)]
    struct StubState {
        castles: Vec<(Square, Square)>,
    }

    impl StubState {
        fn with_standard_castles() -> Self {
            let castles = CASTLE_SQUARES
                .iter()
                .map(|&(f, t)| (Square::new(f), Square::new(t)))
                .collect();
            StubState { castles }
        }
    }

    impl GameState for StubState {
        fn side_to_move(&self) -> Color {
            Color::White
        }

        fn legal_moves(&self) -> Vec<Move> {
            Vec::new()
        }

        fn is_castling(&self, mv: Move) -> bool {
            self.castles.contains(&(mv.from, mv.to))
        }

        fn apply(&self, _mv: Move) -> Self {
            self.clone()
        }

        fn status(&self) -> GameStatus {
            GameStatus::Ongoing
        }
    }

    fn sq(name: &str) -> Square {
        let bytes = name.as_bytes();
        Square::at((bytes[1] - b'1') as i8, (bytes[0] - b'a') as i8).unwrap()
    }

    #[test]
    fn test_category_counts() {
        let index = MoveIndex::new();
        let counts = index.counts();

        assert_eq!(counts.queen_like, 1456);
        assert_eq!(counts.knight, 336);
        // Plain pushes, captures and double-steps all dedup into queen-line
        // entries; only the 44 promotion triples are new.
        assert_eq!(counts.pawn, 44);
        assert_eq!(counts.king, 0);
        assert_eq!(counts.castle, 4);
        assert_eq!(counts.total(), 1840);
        assert_eq!(index.len(), 1840);
    }

    #[test]
    fn test_construction_is_deterministic() {
        let a = MoveIndex::new();
        let b = MoveIndex::new();

        assert_eq!(a.len(), b.len());
        for i in 0..a.len() {
            assert_eq!(a.key_at(i), b.key_at(i), "mismatch at slot {i}");
        }
    }

    #[test]
    fn test_round_trip_non_castle_entries() {
        let index = MoveIndex::new();
        let state = StubState::default();

        for i in 0..index.len() {
            let key = index.key_at(i).unwrap();
            if key.flag == MoveFlag::Castle {
                continue;
            }
            let mv = index.unresolve(i);
            assert_eq!(index.resolve(&state, mv), Some(i), "slot {i} ({mv})");
            assert_eq!(mv.from, key.from);
            assert_eq!(mv.to, key.to);
        }
    }

    #[test]
    fn test_round_trip_castles() {
        let index = MoveIndex::new();
        let state = StubState::with_standard_castles();

        for i in 0..index.len() {
            let key = index.key_at(i).unwrap();
            if key.flag != MoveFlag::Castle {
                continue;
            }
            let mv = index.unresolve(i);
            assert!(mv.promotion.is_none());
            assert_eq!(index.resolve(&state, mv), Some(i));
        }
    }

    #[test]
    fn test_castle_and_plain_king_move_share_squares_not_slots() {
        let index = MoveIndex::new();
        let plain = index
            .resolve(&StubState::default(), Move::new(sq("e1"), sq("g1")))
            .unwrap();
        let castle = index
            .resolve(
                &StubState::with_standard_castles(),
                Move::new(sq("e1"), sq("g1")),
            )
            .unwrap();
        assert_ne!(plain, castle);
    }

    #[test]
    fn test_promotion_resolution() {
        let index = MoveIndex::new();
        let state = StubState::default();

        let queen = Move::promoting(sq("a7"), sq("a8"), Role::Queen);
        let idx = index.resolve(&state, queen).unwrap();
        assert_eq!(index.unresolve(idx), queen);

        // The queen-promotion slot is distinct from the plain a7a8 ray entry.
        let plain = index
            .resolve(&state, Move::new(sq("a7"), sq("a8")))
            .unwrap();
        assert_ne!(idx, plain);

        // Under-promotions are outside the vocabulary.
        for role in [Role::Knight, Role::Bishop, Role::Rook] {
            let mv = Move::promoting(sq("a7"), sq("a8"), role);
            assert_eq!(index.resolve(&state, mv), None);
        }
    }

    #[test]
    fn test_unresolve_out_of_range_is_null() {
        let index = MoveIndex::new();
        assert!(index.unresolve(index.len()).is_null());
        assert!(index.unresolve(usize::MAX).is_null());
    }

    #[test]
    fn test_double_step_shares_queen_line_slot() {
        let index = MoveIndex::new();
        let state = StubState::default();

        // a2a4 is enumerated both as a queen-line ray and as a pawn
        // double-step; the table holds a single slot for it.
        let idx = index
            .resolve(&state, Move::new(sq("a2"), sq("a4")))
            .unwrap();
        assert_eq!(index.key_at(idx).unwrap().flag, MoveFlag::Plain);
    }

    #[test]
    fn test_enumeration_starts_with_first_queen_ray() {
        let index = MoveIndex::new();
        // From a1, the first direction with any on-board reach is (1, 0):
        // slot 0 is a1a2, walking up the a-file.
        assert_eq!(index.key_at(0).unwrap(), MoveKey::plain(sq("a1"), sq("a2")));
        assert_eq!(index.key_at(1).unwrap(), MoveKey::plain(sq("a1"), sq("a3")));
    }
}
