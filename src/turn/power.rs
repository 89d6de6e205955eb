//! Per-turn, per-power bookkeeping.

use std::collections::BTreeSet;

use crate::board::{Power, Province};

use super::piece::PieceIx;

/// One power's view of a single turn: the provinces it owns, its pieces, and
/// whether it has submitted orders yet.
#[derive(Debug, Clone)]
pub struct TurnPower {
    pub power: Power,
    pub(crate) provinces: BTreeSet<Province>,
    pub(crate) pieces: Vec<PieceIx>,
    pub(crate) dislodged: Vec<PieceIx>,
    pub(crate) submitted: bool,
}

impl TurnPower {
    pub(crate) fn new(power: Power) -> Self {
        TurnPower {
            power,
            provinces: BTreeSet::new(),
            pieces: Vec::new(),
            dislodged: Vec::new(),
            submitted: false,
        }
    }

    /// The provinces this power currently owns.
    pub fn provinces(&self) -> impl Iterator<Item = Province> + '_ {
        self.provinces.iter().copied()
    }

    pub fn owns(&self, province: Province) -> bool {
        self.provinces.contains(&province)
    }

    /// True if the province is one of this power's home supply centres.
    pub fn is_home(&self, province: Province) -> bool {
        province.home_power() == Some(self.power)
    }

    /// The owned supply centres.
    pub fn supply_centres(&self) -> impl Iterator<Item = Province> + '_ {
        self.provinces().filter(|p| p.is_supply_centre())
    }

    pub fn supply_centre_count(&self) -> usize {
        self.supply_centres().count()
    }

    /// Units on the board plus units awaiting retreat.
    pub fn piece_count(&self) -> usize {
        self.pieces.len() + self.dislodged.len()
    }

    pub fn submitted(&self) -> bool {
        self.submitted
    }

    pub(crate) fn remove_piece(&mut self, ix: PieceIx) {
        self.pieces.retain(|p| *p != ix);
        self.dislodged.retain(|p| *p != ix);
    }
}
