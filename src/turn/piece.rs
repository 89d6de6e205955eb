//! Pieces: armies and fleets on the board.

use serde::{Deserialize, Serialize};

use crate::board::{AreaId, Power, UnitType};

use super::order::{Order, ResultTag};

/// Index of a piece within one turn's arena. Never reused within a turn;
/// meaningless across turns.
pub(crate) type PieceIx = usize;

/// Stable identity of a physical unit.
///
/// Assigned once when the unit is created (opening position or build) and
/// carried on every turn-to-turn copy, so the same unit can be followed
/// through history by value rather than by reference identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PieceId(pub u32);

impl std::fmt::Display for PieceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A unit on the board, together with its per-turn adjudication state.
#[derive(Debug, Clone)]
pub struct Piece {
    pub id: PieceId,
    pub unit_type: UnitType,
    pub owner: Power,
    pub area: AreaId,
    /// Pieces whose valid, uncut supports back this piece's order.
    pub(crate) supports: Vec<PieceIx>,
    /// Fleets whose convoy orders name this piece.
    pub(crate) convoys: Vec<PieceIx>,
    pub(crate) order: Option<Order>,
    /// Areas this piece may retreat to once dislodged.
    pub(crate) retreats: Vec<AreaId>,
    pub(crate) dislodged: bool,
    /// Set when a disband removes the piece mid-turn; the arena slot stays.
    pub(crate) removed: bool,
}

impl Piece {
    pub(crate) fn new(id: PieceId, unit_type: UnitType, owner: Power, area: AreaId) -> Self {
        Piece {
            id,
            unit_type,
            owner,
            area,
            supports: Vec::new(),
            convoys: Vec::new(),
            order: None,
            retreats: Vec::new(),
            dislodged: false,
            removed: false,
        }
    }

    /// Combined weight of this piece's order: one, plus one per support.
    pub fn strength(&self) -> u32 {
        1 + self.supports.len() as u32
    }

    pub fn order(&self) -> Option<&Order> {
        self.order.as_ref()
    }

    /// True once the piece has been forced out of its province this turn.
    pub fn is_dislodged(&self) -> bool {
        self.dislodged
            || self
                .order
                .as_ref()
                .is_some_and(|o| o.results.contains(ResultTag::Dislodged))
    }

    /// The areas this piece may still retreat to.
    pub fn retreats(&self) -> &[AreaId] {
        &self.retreats
    }

    pub(crate) fn add_support(&mut self, supporter: PieceIx) {
        if !self.supports.contains(&supporter) {
            self.supports.push(supporter);
        }
    }

    pub(crate) fn remove_support(&mut self, supporter: PieceIx) {
        self.supports.retain(|s| *s != supporter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strength_follows_supports() {
        let mut piece = Piece::new(PieceId(1), UnitType::Army, Power::Austria, AreaId(0));
        assert_eq!(piece.strength(), 1);
        piece.add_support(7);
        piece.add_support(9);
        assert_eq!(piece.strength(), 3);
        // Duplicate supporters count once.
        piece.add_support(7);
        assert_eq!(piece.strength(), 3);
        piece.remove_support(7);
        assert_eq!(piece.strength(), 2);
    }
}
