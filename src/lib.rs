//! Entente adjudication library.
//!
//! Adjudicates one turn of Diplomacy: given a board position and the orders
//! submitted by every power, computes the single rules-consistent outcome and
//! produces the next turn. Exposes the board graph, the piece/order data
//! model, and the turn state machine for use by an orchestrating front end.

pub mod board;
pub mod error;
pub mod turn;

pub use board::{
    Area, AreaId, Coast, Location, Map, MapBuilder, Power, Province, UnitType, ALL_POWERS,
    ALL_PROVINCES, PROVINCE_COUNT,
};
pub use error::{EngineError, MapError, SubmitError};
pub use turn::{
    AdjustmentTurn, MovementTurn, Order, OrderKind, OrderSpec, Piece, PieceId, ResultTag,
    RetreatTurn, Season, Turn, TurnPower,
};
