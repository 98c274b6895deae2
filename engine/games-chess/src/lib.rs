//! Chess rules adapter for the search engine
//!
//! Wraps the `chess` crate's board behind the `chess-core` `GameState`
//! contract: legality, termination, and move application stay in the rules
//! library, while the search only ever sees geometric moves and statuses.
//!
//! # Usage
//!
//! ```rust
//! use chess_core::GameState;
//! use games_chess::ChessPosition;
//!
//! let position = ChessPosition::startpos();
//! assert_eq!(position.legal_moves().len(), 20);
//! ```

use std::str::FromStr;

use chess::{Board, BoardStatus, ChessMove, MoveGen, Piece};
use chess_core::{Color, GameState, GameStatus, Move, Role, Square};
use thiserror::Error;


/// Errors raised when constructing a position.
#[derive(Debug, Error)]
pub enum PositionError {
    #[error("invalid FEN: {0}")]
    InvalidFen(String),
}

/// A chess position snapshot.
///
/// Cheap to clone; `apply` produces a fresh successor and never mutates the
/// receiver, matching the snapshot semantics the search relies on.
#[derive(Debug, Clone)]
pub struct ChessPosition {
    board: Board,
}

impl ChessPosition {
    /// The standard starting position.
    pub fn startpos() -> Self {
        ChessPosition {
            board: Board::default(),
        }
    }

    pub fn from_fen(fen: &str) -> Result<Self, PositionError> {
        let board = Board::from_str(fen).map_err(|e| PositionError::InvalidFen(e.to_string()))?;
        Ok(ChessPosition { board })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }
}

impl GameState for ChessPosition {
    fn side_to_move(&self) -> Color {
        match self.board.side_to_move() {
            chess::Color::White => Color::White,
            chess::Color::Black => Color::Black,
        }
    }

    fn legal_moves(&self) -> Vec<Move> {
        MoveGen::new_legal(&self.board).map(to_engine_move).collect()
    }

    fn is_castling(&self, mv: Move) -> bool {
        // A king travelling two files is castling; a plain king move never
        // covers that distance.
        self.board.piece_on(square_into(mv.from)) == Some(Piece::King)
            && (mv.from.file() - mv.to.file()).abs() >= 2
    }

    fn apply(&self, mv: Move) -> Self {
        ChessPosition {
            board: self.board.make_move_new(to_chess_move(mv)),
        }
    }

    fn status(&self) -> GameStatus {
        match self.board.status() {
            BoardStatus::Ongoing => GameStatus::Ongoing,
            BoardStatus::Checkmate => GameStatus::Checkmate,
            BoardStatus::Stalemate => GameStatus::Draw,
        }
    }
}

fn square_from(sq: chess::Square) -> Square {
    Square::new(sq.to_index() as u8)
}

fn square_into(sq: Square) -> chess::Square {
    chess::Square::make_square(
        chess::Rank::from_index(sq.rank() as usize),
        chess::File::from_index(sq.file() as usize),
    )
}

fn to_engine_move(mv: ChessMove) -> Move {
    Move {
        from: square_from(mv.get_source()),
        to: square_from(mv.get_dest()),
        promotion: mv.get_promotion().and_then(role_from),
    }
}

fn to_chess_move(mv: Move) -> ChessMove {
    ChessMove::new(
        square_into(mv.from),
        square_into(mv.to),
        mv.promotion.map(role_into),
    )
}

fn role_from(piece: Piece) -> Option<Role> {
    match piece {
        Piece::Knight => Some(Role::Knight),
        Piece::Bishop => Some(Role::Bishop),
        Piece::Rook => Some(Role::Rook),
        Piece::Queen => Some(Role::Queen),
        Piece::Pawn | Piece::King => None,
    }
}

fn role_into(role: Role) -> Piece {
    match role {
        Role::Knight => Piece::Knight,
        Role::Bishop => Piece::Bishop,
        Role::Rook => Piece::Rook,
        Role::Queen => Piece::Queen,
    }
}
