//! The turn state machine.
//!
//! A game is a chain of turns: movement (Spring or Autumn), retreats after a
//! movement turn with dislodgements, and an adjustment turn after Autumn when
//! any power's piece count disagrees with its supply-centre count. Each turn
//! owns its pieces and per-power bookkeeping; `next_turn` resolves the
//! submitted orders and produces the following turn. A resolved turn is never
//! mutated again.

pub mod adjustment;
pub mod movement;
pub mod order;
pub mod piece;
pub mod power;
pub mod retreat;

pub use adjustment::AdjustmentTurn;
pub use movement::MovementTurn;
pub use order::{Order, OrderKind, OrderSpec, ResultSet, ResultTag};
pub use piece::{Piece, PieceId};
pub use power::TurnPower;
pub use retreat::RetreatTurn;

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::board::{AreaId, Coast, Location, Map, Power, Province, UnitType, ALL_POWERS};
use crate::error::{EngineError, SubmitError};

use piece::PieceIx;

/// The season of a movement turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    Spring,
    Autumn,
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Season::Spring => f.write_str("Spring"),
            Season::Autumn => f.write_str("Autumn"),
        }
    }
}

/// A turn of any phase.
pub enum Turn {
    Movement(MovementTurn),
    Retreat(RetreatTurn),
    Adjustment(AdjustmentTurn),
}

impl Turn {
    /// Resolves this turn and produces the next one.
    pub fn next_turn(self) -> Result<Turn, EngineError> {
        match self {
            Turn::Movement(t) => t.next_turn(),
            Turn::Retreat(t) => t.next_turn(),
            Turn::Adjustment(t) => t.next_turn(),
        }
    }

    /// Submits a batch of orders for one power, all-or-nothing.
    pub fn submit_orders(&mut self, power: Power, specs: &[OrderSpec]) -> Result<(), SubmitError> {
        match self {
            Turn::Movement(t) => t.submit_orders(power, specs),
            Turn::Retreat(t) => t.submit_orders(power, specs),
            Turn::Adjustment(t) => t.submit_orders(power, specs),
        }
    }

    /// Submits orders without the strict validation pass; illegal orders
    /// collect their result tags at resolution instead.
    pub fn submit_orders_unchecked(
        &mut self,
        power: Power,
        specs: &[OrderSpec],
    ) -> Result<(), SubmitError> {
        match self {
            Turn::Movement(t) => t.submit_orders_unchecked(power, specs),
            Turn::Retreat(t) => t.submit_orders_unchecked(power, specs),
            Turn::Adjustment(t) => t.submit_orders_unchecked(power, specs),
        }
    }

    /// A human-readable prompt listing the orders still wanted from `power`.
    pub fn orders_template(&self, power: Power) -> String {
        match self {
            Turn::Movement(t) => t.orders_template(power),
            Turn::Retreat(t) => t.orders_template(power),
            Turn::Adjustment(t) => t.orders_template(power),
        }
    }

    pub fn year(&self) -> u16 {
        self.base().year
    }

    /// The phase name: "Movement", "Retreats" or "Adjustment".
    pub fn phase_name(&self) -> &'static str {
        match self {
            Turn::Movement(_) => "Movement",
            Turn::Retreat(_) => "Retreats",
            Turn::Adjustment(_) => "Adjustment",
        }
    }

    /// The season label, "Winter" for adjustment turns.
    pub fn season_name(&self) -> String {
        match self {
            Turn::Movement(t) => t.season().to_string(),
            Turn::Retreat(t) => t.season().to_string(),
            Turn::Adjustment(_) => "Winter".to_string(),
        }
    }

    pub fn pieces(&self) -> impl Iterator<Item = &Piece> {
        self.base().live_pieces()
    }

    pub fn pieces_dislodged(&self) -> impl Iterator<Item = &Piece> {
        self.base().dislodged_pieces()
    }

    pub fn piece_at(&self, province: Province) -> Option<&Piece> {
        self.base().piece_at(province).map(|ix| &self.base().pieces[ix])
    }

    pub fn piece_dislodged_at(&self, province: Province) -> Option<&Piece> {
        self.base()
            .dislodged_at(province)
            .map(|ix| &self.base().pieces[ix])
    }

    pub fn power(&self, power: Power) -> &TurnPower {
        self.base().power(power)
    }

    pub fn owner(&self, province: Province) -> Option<Power> {
        self.base().owner(province)
    }

    /// The powers that still have orders outstanding.
    pub fn unsubmitted_powers(&self) -> Vec<Power> {
        match self {
            Turn::Movement(_) => ALL_POWERS
                .into_iter()
                .filter(|p| {
                    let tp = self.base().power(*p);
                    tp.piece_count() > 0 && !tp.submitted
                })
                .collect(),
            Turn::Retreat(_) => ALL_POWERS
                .into_iter()
                .filter(|p| {
                    let tp = self.base().power(*p);
                    !tp.dislodged.is_empty() && !tp.submitted
                })
                .collect(),
            Turn::Adjustment(t) => t.unsubmitted_powers(),
        }
    }

    pub fn as_movement(&self) -> Option<&MovementTurn> {
        match self {
            Turn::Movement(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_retreat(&self) -> Option<&RetreatTurn> {
        match self {
            Turn::Retreat(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_adjustment(&self) -> Option<&AdjustmentTurn> {
        match self {
            Turn::Adjustment(t) => Some(t),
            _ => None,
        }
    }

    fn base(&self) -> &TurnBase {
        match self {
            Turn::Movement(t) => &t.base,
            Turn::Retreat(t) => &t.base,
            Turn::Adjustment(t) => &t.base,
        }
    }
}

impl std::fmt::Display for Turn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.season_name(), self.year(), self.phase_name())
    }
}

/// State shared by the three turn kinds: the map handle, the piece arena,
/// occupancy and contention indexes, and the per-power views.
pub(crate) struct TurnBase {
    pub(crate) map: Arc<Map>,
    pub(crate) year: u16,
    pub(crate) powers: Vec<TurnPower>,
    pub(crate) pieces: Vec<Piece>,
    pub(crate) by_province: HashMap<Province, PieceIx>,
    pub(crate) dislodged_by_province: HashMap<Province, PieceIx>,
    pub(crate) contenders: HashMap<Province, Vec<PieceIx>>,
    pub(crate) next_piece_id: u32,
    /// Whether pieces copied into this turn claim the supply centres they
    /// stand on. True for Spring movement and adjustment turns, so ownership
    /// changes land after Autumn resolves.
    pub(crate) claims_on_copy: bool,
}

impl TurnBase {
    pub(crate) fn new(map: Arc<Map>, year: u16, claims_on_copy: bool) -> Self {
        TurnBase {
            map,
            year,
            powers: ALL_POWERS.into_iter().map(TurnPower::new).collect(),
            pieces: Vec::new(),
            by_province: HashMap::new(),
            dislodged_by_province: HashMap::new(),
            contenders: HashMap::new(),
            next_piece_id: 0,
            claims_on_copy,
        }
    }

    /// A fresh base for the following turn. Powers that still have pieces
    /// keep their provinces; powers with none are eliminated and own nothing.
    pub(crate) fn successor(&self, year: u16, claims_on_copy: bool) -> TurnBase {
        let mut next = TurnBase::new(Arc::clone(&self.map), year, claims_on_copy);
        next.next_piece_id = self.next_piece_id;
        for power in ALL_POWERS {
            if self.power(power).piece_count() > 0 {
                next.power_mut(power).provinces = self.power(power).provinces.clone();
            }
        }
        next
    }

    pub(crate) fn power(&self, power: Power) -> &TurnPower {
        &self.powers[power as usize]
    }

    pub(crate) fn power_mut(&mut self, power: Power) -> &mut TurnPower {
        &mut self.powers[power as usize]
    }

    pub(crate) fn owner(&self, province: Province) -> Option<Power> {
        self.powers
            .iter()
            .find(|p| p.owns(province))
            .map(|p| p.power)
    }

    pub(crate) fn claim_province(&mut self, province: Province, power: Power) {
        if let Some(old) = self.owner(province) {
            if old == power {
                return;
            }
            self.power_mut(old).provinces.remove(&province);
        }
        self.power_mut(power).provinces.insert(province);
    }

    pub(crate) fn province_of(&self, ix: PieceIx) -> Province {
        self.map.area(self.pieces[ix].area).province
    }

    pub(crate) fn piece_at(&self, province: Province) -> Option<PieceIx> {
        self.by_province.get(&province).copied()
    }

    pub(crate) fn dislodged_at(&self, province: Province) -> Option<PieceIx> {
        self.dislodged_by_province.get(&province).copied()
    }

    /// Indexes of the pieces on the board (not dislodged, not removed), in
    /// stable insertion order.
    pub(crate) fn live(&self) -> Vec<PieceIx> {
        (0..self.pieces.len())
            .filter(|&ix| !self.pieces[ix].dislodged && !self.pieces[ix].removed)
            .collect()
    }

    pub(crate) fn dislodged_ixs(&self) -> Vec<PieceIx> {
        (0..self.pieces.len())
            .filter(|&ix| self.pieces[ix].dislodged && !self.pieces[ix].removed)
            .collect()
    }

    pub(crate) fn live_pieces(&self) -> impl Iterator<Item = &Piece> {
        self.pieces.iter().filter(|p| !p.dislodged && !p.removed)
    }

    pub(crate) fn dislodged_pieces(&self) -> impl Iterator<Item = &Piece> {
        self.pieces.iter().filter(|p| p.dislodged && !p.removed)
    }

    /// Creates a brand-new unit with a fresh identity.
    pub(crate) fn new_piece(
        &mut self,
        owner: Power,
        unit_type: UnitType,
        area: AreaId,
    ) -> Result<PieceIx, EngineError> {
        let id = PieceId(self.next_piece_id);
        self.next_piece_id += 1;
        self.insert(Piece::new(id, unit_type, owner, area))
    }

    /// Places a piece on the board, enforcing the one-piece-per-province
    /// invariant.
    pub(crate) fn insert(&mut self, piece: Piece) -> Result<PieceIx, EngineError> {
        let province = self.map.area(piece.area).province;
        if let Some(&existing) = self.by_province.get(&province) {
            if self.pieces[existing].id != piece.id {
                return Err(EngineError::ProvinceOccupied {
                    province: province.name().to_string(),
                    existing: self.pieces[existing].id.0,
                    incoming: piece.id.0,
                });
            }
        }
        let owner = piece.owner;
        let ix = self.pieces.len();
        self.pieces.push(piece);
        self.by_province.insert(province, ix);
        self.power_mut(owner).pieces.push(ix);
        Ok(ix)
    }

    pub(crate) fn insert_dislodged(&mut self, mut piece: Piece) -> PieceIx {
        piece.dislodged = true;
        let province = self.map.area(piece.area).province;
        let owner = piece.owner;
        let ix = self.pieces.len();
        self.pieces.push(piece);
        self.dislodged_by_province.insert(province, ix);
        self.power_mut(owner).dislodged.push(ix);
        ix
    }

    /// Carries a piece into this turn at the given area, claiming the
    /// province's supply centre when this turn claims on copy.
    pub(crate) fn copy_piece_to(&mut self, src: &Piece, area: AreaId) -> Result<PieceIx, EngineError> {
        let ix = self.insert(Piece::new(src.id, src.unit_type, src.owner, area))?;
        let province = self.map.area(area).province;
        if self.claims_on_copy && province.is_supply_centre() {
            self.claim_province(province, src.owner);
        }
        Ok(ix)
    }

    /// Carries a dislodged piece into this turn, keeping its retreat options.
    pub(crate) fn copy_piece_dislodged(&mut self, src: &Piece) -> PieceIx {
        let mut piece = Piece::new(src.id, src.unit_type, src.owner, src.area);
        piece.retreats = src.retreats.clone();
        self.insert_dislodged(piece)
    }

    /// Removes the unit with the given identity from the board.
    pub(crate) fn remove_piece_by_id(&mut self, id: PieceId) -> Result<(), EngineError> {
        let ix = self
            .pieces
            .iter()
            .position(|p| p.id == id && !p.removed)
            .ok_or(EngineError::UnknownPiece(id.0))?;
        let province = self.province_of(ix);
        self.pieces[ix].removed = true;
        if self.by_province.get(&province) == Some(&ix) {
            self.by_province.remove(&province);
        }
        if self.dislodged_by_province.get(&province) == Some(&ix) {
            self.dislodged_by_province.remove(&province);
        }
        let owner = self.pieces[ix].owner;
        self.power_mut(owner).remove_piece(ix);
        Ok(())
    }

    pub(crate) fn strength(&self, ix: PieceIx) -> u32 {
        self.pieces[ix].strength()
    }

    /// True while the piece's order is a move that has not failed.
    pub(crate) fn moving(&self, ix: PieceIx) -> bool {
        match &self.pieces[ix].order {
            Some(o) => {
                matches!(o.kind, OrderKind::Move { .. } | OrderKind::ConvoyedMove { .. })
                    && o.successful()
            }
            None => false,
        }
    }

    /// The destination an order stakes a claim to, if any. A hold claims the
    /// piece's own area.
    pub(crate) fn order_destination(&self, ix: PieceIx) -> Option<AreaId> {
        match &self.pieces[ix].order {
            Some(o) => match &o.kind {
                OrderKind::Hold => Some(self.pieces[ix].area),
                OrderKind::Move { dest } => Some(*dest),
                OrderKind::ConvoyedMove { dest, .. } => Some(*dest),
                OrderKind::Retreat { dest } => Some(*dest),
                _ => None,
            },
            None => None,
        }
    }

    /// Where the piece is headed: its order's destination, or where it
    /// stands.
    pub(crate) fn piece_destination(&self, ix: PieceIx) -> AreaId {
        self.order_destination(ix).unwrap_or(self.pieces[ix].area)
    }

    /// Assigns an order to a piece. A second, different order marks the
    /// existing one ambiguous and is refused.
    pub(crate) fn assign_order(&mut self, ix: PieceIx, order: Order) -> Result<(), ()> {
        if let Some(existing) = self.pieces[ix].order.as_mut() {
            existing.add_result(ResultTag::Ambiguous);
            return Err(());
        }
        self.pieces[ix].order = Some(order);
        Ok(())
    }

    /// Detaches a piece's order, unregistering any convoy bookkeeping the
    /// attach performed.
    pub(crate) fn clear_order(&mut self, ix: PieceIx) {
        if let Some(order) = self.pieces[ix].order.take() {
            if let OrderKind::Convoy { convoyed, .. } = order.kind {
                self.pieces[convoyed].convoys.retain(|c| *c != ix);
            }
        }
    }

    pub(crate) fn add_contender(&mut self, province: Province, ix: PieceIx) {
        let list = self.contenders.entry(province).or_default();
        if !list.contains(&ix) {
            list.push(ix);
        }
    }

    pub(crate) fn remove_contender(&mut self, province: Province, ix: PieceIx) {
        if let Some(list) = self.contenders.get_mut(&province) {
            list.retain(|c| *c != ix);
        }
    }

    /// The pieces competing for a province with their effective strengths:
    /// every registered contender at full strength, plus a stationary
    /// occupant at base strength if it is not contending itself.
    pub(crate) fn contender_field(&self, province: Province) -> Vec<(PieceIx, u32)> {
        let mut field: Vec<(PieceIx, u32)> = self
            .contenders
            .get(&province)
            .map(|list| list.iter().map(|&ix| (ix, self.strength(ix))).collect())
            .unwrap_or_default();
        if let Some(occ) = self.piece_at(province) {
            if !self.moving(occ) && !field.iter().any(|(ix, _)| *ix == occ) {
                field.push((occ, 1));
            }
        }
        field
    }

    /// The strongest rivals `attacker` faces over a province: the
    /// maximal-strength members of the contender field, minus the attacker
    /// itself. Empty exactly when the attacker stands strictly strongest.
    pub(crate) fn opponents(&self, province: Province, attacker: PieceIx) -> Vec<PieceIx> {
        let field = self.contender_field(province);
        let Some(max) = field.iter().map(|(_, s)| *s).max() else {
            return Vec::new();
        };
        field
            .into_iter()
            .filter(|(ix, s)| *s == max && *ix != attacker)
            .map(|(ix, _)| ix)
            .collect()
    }

    /// Supply-centre/piece differences per power; positive means builds owed.
    pub(crate) fn adjustments(&self) -> Vec<(Power, i32)> {
        let mut result = Vec::new();
        for power in ALL_POWERS {
            let tp = self.power(power);
            if tp.piece_count() == 0 && tp.supply_centre_count() == 0 {
                continue;
            }
            let diff = tp.supply_centre_count() as i32 - tp.piece_count() as i32;
            if diff != 0 {
                result.push((power, diff));
            }
        }
        result
    }

    pub(crate) fn needs_adjustments(&self) -> bool {
        !self.adjustments().is_empty()
    }

    /// "A vie"-style label for a piece.
    pub(crate) fn describe(&self, ix: PieceIx) -> String {
        let piece = &self.pieces[ix];
        format!(
            "{} {}",
            piece.unit_type.letter(),
            self.map.area(piece.area).location()
        )
    }

    // --- submission binding helpers ---------------------------------------

    /// Finds the piece standing at a location, checking ownership when the
    /// submission requires one of the submitter's own.
    pub(crate) fn bind_unit(
        &self,
        submitter: Power,
        location: Location,
        mine: bool,
    ) -> Result<PieceIx, SubmitError> {
        let ix = self
            .piece_at(location.province)
            .ok_or_else(|| SubmitError::NoSuchPiece(location.to_string()))?;
        if location.coast != Coast::None
            && self.map.area(self.pieces[ix].area).coast != location.coast
        {
            return Err(SubmitError::NoSuchPiece(location.to_string()));
        }
        if mine && self.pieces[ix].owner != submitter {
            return Err(SubmitError::ForeignPiece {
                location: location.to_string(),
                owner: self.pieces[ix].owner.to_string(),
                submitter: submitter.to_string(),
            });
        }
        Ok(ix)
    }

    pub(crate) fn bind_dislodged(
        &self,
        submitter: Power,
        location: Location,
    ) -> Result<PieceIx, SubmitError> {
        let ix = self
            .dislodged_at(location.province)
            .ok_or_else(|| SubmitError::NoDislodgedPiece(location.to_string()))?;
        if self.pieces[ix].owner != submitter {
            return Err(SubmitError::ForeignPiece {
                location: location.to_string(),
                owner: self.pieces[ix].owner.to_string(),
                submitter: submitter.to_string(),
            });
        }
        Ok(ix)
    }

    /// Resolves a destination location for a given piece. A missing coast is
    /// tolerated when the destination province has a single area of the
    /// piece's type, or exactly one reachable from where the piece stands.
    pub(crate) fn resolve_dest(
        &self,
        ix: PieceIx,
        location: Location,
    ) -> Result<AreaId, SubmitError> {
        let piece = &self.pieces[ix];
        if let Some(area) = self.map.locate(piece.unit_type, location) {
            return Ok(area);
        }
        let candidates: Vec<AreaId> = self
            .map
            .areas_for(location.province, piece.unit_type)
            .filter(|a| location.coast == Coast::None || self.map.area(*a).coast == location.coast)
            .collect();
        match candidates.len() {
            0 => Err(SubmitError::BadLocation(crate::error::MapError::NoSuchArea {
                unit_type: piece.unit_type.to_string(),
                location: location.to_string(),
            })),
            _ => {
                let reachable: Vec<AreaId> = candidates
                    .iter()
                    .copied()
                    .filter(|a| self.map.connected(piece.area, *a))
                    .collect();
                if reachable.len() == 1 {
                    Ok(reachable[0])
                } else {
                    Err(SubmitError::AmbiguousLocation(location.to_string()))
                }
            }
        }
    }
}
