//! Movement turns and the order-resolution fixpoint.
//!
//! Resolution runs in a fixed phase order: fill defaults, validate (and
//! register contenders), check convoy disruptions, cut supports, tally
//! strengths, then check bounces in descending piece strength. The bounce
//! pass is iterative: resolving one order can invalidate or revive another,
//! so affected orders are fed back through an explicit work queue until the
//! turn reaches a fixed point. A per-piece re-arm bound guarantees
//! termination.

use std::collections::VecDeque;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::board::standard::OPENING_UNITS;
use crate::board::{AreaId, Location, Map, Power, Province, UnitType, ALL_PROVINCES};
use crate::error::{EngineError, OrderFailure, SubmitError};

use super::adjustment::AdjustmentTurn;
use super::order::{Order, OrderKind, OrderSpec, ResultTag};
use super::piece::{Piece, PieceId, PieceIx};
use super::power::TurnPower;
use super::retreat::RetreatTurn;
use super::{Season, Turn, TurnBase};

/// A Spring or Autumn movement turn.
pub struct MovementTurn {
    pub(crate) base: TurnBase,
    season: Season,
    resolved: bool,
}

impl MovementTurn {
    /// An empty board for the given season and year.
    pub fn new(map: Arc<Map>, season: Season, year: u16) -> Self {
        let claims = season == Season::Spring;
        MovementTurn { base: TurnBase::new(map, year, claims), season, resolved: false }
    }

    pub(crate) fn from_base(base: TurnBase, season: Season) -> Self {
        MovementTurn { base, season, resolved: false }
    }

    /// The standard Spring 1901 opening: 22 units, home centres owned.
    pub fn opening(map: Arc<Map>) -> Self {
        let mut turn = MovementTurn::new(map, Season::Spring, 1901);
        for province in ALL_PROVINCES {
            if let Some(power) = province.home_power() {
                turn.base.claim_province(province, power);
            }
        }
        for &(power, unit_type, province, coast) in &OPENING_UNITS {
            turn.add_unit(power, unit_type, Location::with_coast(province, coast))
                .expect("opening position is well-formed");
        }
        turn
    }

    pub fn season(&self) -> Season {
        self.season
    }

    pub fn year(&self) -> u16 {
        self.base.year
    }

    /// Places a unit for scenario setup. Does not claim the province.
    pub fn add_unit(
        &mut self,
        power: Power,
        unit_type: UnitType,
        location: impl Into<Location>,
    ) -> Result<PieceId, EngineError> {
        let location = location.into();
        let area = self
            .base
            .map
            .locate(unit_type, location)
            .ok_or(crate::error::MapError::NoSuchArea {
                unit_type: unit_type.to_string(),
                location: location.to_string(),
            })?;
        let ix = self.base.new_piece(power, unit_type, area)?;
        Ok(self.base.pieces[ix].id)
    }

    /// Hands a province to a power, for scenario setup.
    pub fn claim(&mut self, power: Power, province: Province) {
        self.base.claim_province(province, power);
    }

    pub fn pieces(&self) -> impl Iterator<Item = &Piece> {
        self.base.live_pieces()
    }

    pub fn piece_at(&self, province: Province) -> Option<&Piece> {
        self.base.piece_at(province).map(|ix| &self.base.pieces[ix])
    }

    pub fn power(&self, power: Power) -> &TurnPower {
        self.base.power(power)
    }

    pub fn owner(&self, province: Province) -> Option<Power> {
        self.base.owner(province)
    }

    /// Lists the pieces of `power` still wanting an order, one per line.
    pub fn orders_template(&self, power: Power) -> String {
        let mut lines: Vec<String> = self
            .base
            .live()
            .into_iter()
            .filter(|&ix| {
                self.base.pieces[ix].owner == power && self.base.pieces[ix].order.is_none()
            })
            .map(|ix| self.base.describe(ix))
            .collect();
        lines.sort();
        lines.join("\n")
    }

    // --- submission --------------------------------------------------------

    /// Submits one power's movement orders under strict validation: if any
    /// order is illegal the whole batch is rejected with every failure
    /// listed, and nothing is attached.
    pub fn submit_orders(&mut self, power: Power, specs: &[OrderSpec]) -> Result<(), SubmitError> {
        self.submit(power, specs, true)
    }

    /// Attaches orders without the strict validation pass. Illegal orders
    /// pick up their result tags during resolution instead.
    pub fn submit_orders_unchecked(
        &mut self,
        power: Power,
        specs: &[OrderSpec],
    ) -> Result<(), SubmitError> {
        self.submit(power, specs, false)
    }

    fn submit(
        &mut self,
        power: Power,
        specs: &[OrderSpec],
        strict: bool,
    ) -> Result<(), SubmitError> {
        if self.resolved {
            return Err(SubmitError::WrongPhase(
                "any".to_string(),
                "already-resolved Movement",
            ));
        }
        let mut bound = Vec::with_capacity(specs.len());
        for spec in specs {
            bound.push(self.bind_spec(power, spec)?);
        }

        let mut attached: Vec<PieceIx> = Vec::new();
        for (ix, kind) in bound {
            let convoy_target = match &kind {
                OrderKind::Convoy { convoyed, .. } => Some(*convoyed),
                _ => None,
            };
            if self.base.assign_order(ix, Order::new(kind)).is_err() {
                let place = self.base.describe(ix);
                for &a in &attached {
                    self.base.clear_order(a);
                }
                return Err(SubmitError::AmbiguousConflict(place));
            }
            if let Some(c) = convoy_target {
                self.base.pieces[c].convoys.push(ix);
            }
            attached.push(ix);
        }

        if strict {
            // Trial validation: all or nothing, report every failure.
            let mut failures = Vec::new();
            for &ix in &attached {
                self.validate_order(ix);
                let piece = &self.base.pieces[ix];
                if let Some(order) = &piece.order {
                    if !order.successful() {
                        failures.push(OrderFailure {
                            order: self.describe_order(ix),
                            reasons: order.results().iter().map(|t| t.to_string()).collect(),
                        });
                    }
                }
            }
            if !failures.is_empty() {
                for &a in &attached {
                    self.base.clear_order(a);
                }
                self.scrub_trial_results();
                return Err(SubmitError::Rejected(failures));
            }
            // Resolution re-validates from scratch.
            self.scrub_trial_results();
        }
        self.base.power_mut(power).submitted = true;
        Ok(())
    }

    /// Clears result tags left over from trial validation, everywhere —
    /// validating a convoyed move can touch other powers' convoy orders.
    /// Ambiguity marks survive; they record a real double assignment.
    fn scrub_trial_results(&mut self) {
        for piece in &mut self.base.pieces {
            piece.supports.clear();
            if let Some(order) = piece.order.as_mut() {
                let keep = order.results.contains(ResultTag::Ambiguous);
                order.results = Default::default();
                if keep {
                    order.results.insert(ResultTag::Ambiguous);
                }
            }
        }
    }

    fn bind_spec(
        &self,
        power: Power,
        spec: &OrderSpec,
    ) -> Result<(PieceIx, OrderKind), SubmitError> {
        match spec {
            OrderSpec::Hold { unit } => {
                let ix = self.base.bind_unit(power, *unit, true)?;
                Ok((ix, OrderKind::Hold))
            }
            OrderSpec::Move { unit, dest } => {
                let ix = self.base.bind_unit(power, *unit, true)?;
                let dest = self.base.resolve_dest(ix, *dest)?;
                Ok((ix, OrderKind::Move { dest }))
            }
            OrderSpec::ConvoyedMove { unit, path, dest } => {
                let ix = self.base.bind_unit(power, *unit, true)?;
                let mut hops = Vec::with_capacity(path.len());
                for hop in path {
                    let area = self.base.map.locate(UnitType::Fleet, *hop).ok_or(
                        crate::error::MapError::NoSuchArea {
                            unit_type: UnitType::Fleet.to_string(),
                            location: hop.to_string(),
                        },
                    )?;
                    hops.push(area);
                }
                let unit_type = self.base.pieces[ix].unit_type;
                let dest = self.base.map.locate(unit_type, *dest).ok_or(
                    crate::error::MapError::NoSuchArea {
                        unit_type: unit_type.to_string(),
                        location: dest.to_string(),
                    },
                )?;
                Ok((ix, OrderKind::ConvoyedMove { path: hops, dest }))
            }
            OrderSpec::Convoy { unit, convoyed, dest } => {
                let ix = self.base.bind_unit(power, *unit, true)?;
                let convoyed = self.base.bind_unit(power, *convoyed, false)?;
                let unit_type = self.base.pieces[convoyed].unit_type;
                let dest = self.base.map.locate(unit_type, *dest).ok_or(
                    crate::error::MapError::NoSuchArea {
                        unit_type: unit_type.to_string(),
                        location: dest.to_string(),
                    },
                )?;
                Ok((ix, OrderKind::Convoy { convoyed, dest }))
            }
            OrderSpec::Support { unit, supported } => {
                let ix = self.base.bind_unit(power, *unit, true)?;
                let supported = self.base.bind_unit(power, *supported, false)?;
                Ok((ix, OrderKind::Support { supported }))
            }
            other => Err(SubmitError::WrongPhase(other.to_string(), "Movement")),
        }
    }

    fn describe_order(&self, ix: PieceIx) -> String {
        let piece = &self.base.pieces[ix];
        let here = self.base.describe(ix);
        match piece.order.as_ref().map(|o| &o.kind) {
            Some(OrderKind::Hold) | None => format!("{} hold", here),
            Some(OrderKind::Move { dest }) => {
                format!("{} - {}", here, self.base.map.area(*dest).location())
            }
            Some(OrderKind::ConvoyedMove { path, dest }) => {
                let mut s = here;
                for hop in path {
                    s.push_str(&format!(" - {}", self.base.map.area(*hop).location()));
                }
                s.push_str(&format!(" - {}", self.base.map.area(*dest).location()));
                s
            }
            Some(OrderKind::Convoy { convoyed, dest }) => format!(
                "{} convoy {} - {}",
                here,
                self.base.describe(*convoyed),
                self.base.map.area(*dest).location()
            ),
            Some(OrderKind::Support { supported }) => {
                format!("{} support {}", here, self.base.describe(*supported))
            }
            Some(other) => format!("{} {:?}", here, other),
        }
    }

    // --- resolution --------------------------------------------------------

    /// Runs the resolution phases. Idempotent; `next_turn` calls it if the
    /// caller has not already.
    pub fn resolve(&mut self) {
        if self.resolved {
            return;
        }
        self.resolved = true;
        debug!(year = self.base.year, season = %self.season, "resolving movement turn");
        self.orders_fill();
        self.orders_validate();
        self.orders_check_convoys();
        self.orders_cut_supports();
        self.orders_tally_strengths();
        self.orders_check_bounces();
    }

    /// Resolves the turn and produces its successor: a retreat turn when
    /// anything was dislodged, otherwise the next movement turn, with an
    /// adjustment turn interposed after Autumn when the books disagree.
    pub fn next_turn(mut self) -> Result<Turn, EngineError> {
        self.resolve();

        if self.dislodgements() {
            let mut base = self.base.successor(self.base.year, false);
            self.execute_into(&mut base)?;
            narrow_retreats(&mut base);
            return Ok(Turn::Retreat(RetreatTurn::new(base, self.season)));
        }

        let (next_season, next_year) = match self.season {
            Season::Spring => (Season::Autumn, self.base.year),
            Season::Autumn => (Season::Spring, self.base.year + 1),
        };
        let mut base = self.base.successor(next_year, next_season == Season::Spring);
        self.execute_into(&mut base)?;
        let next = MovementTurn { base, season: next_season, resolved: false };

        if self.season == Season::Autumn && next.base.needs_adjustments() {
            let mut adj_base = self.base.successor(self.base.year, true);
            self.execute_into(&mut adj_base)?;
            let adjustments = next.base.adjustments();
            return Ok(Turn::Adjustment(AdjustmentTurn::new(adj_base, next, adjustments)));
        }
        Ok(Turn::Movement(next))
    }

    fn dislodgements(&self) -> bool {
        self.base
            .live_pieces()
            .any(|p| p.order.as_ref().is_some_and(|o| o.dislodged()))
    }

    fn orders_fill(&mut self) {
        debug!("fill default orders");
        for ix in self.base.live() {
            if self.base.pieces[ix].order.is_none() {
                trace!(piece = %self.base.describe(ix), "defaulting to hold");
                self.base.pieces[ix].order = Some(Order::new(OrderKind::Hold));
            }
        }
    }

    fn orders_validate(&mut self) {
        debug!("validate");
        for ix in self.base.live() {
            self.validate_order(ix);
            let successful = self.base.pieces[ix]
                .order
                .as_ref()
                .is_some_and(|o| o.successful());
            if successful {
                if let Some(dest) = self.base.order_destination(ix) {
                    let province = self.base.map.area(dest).province;
                    self.base.add_contender(province, ix);
                }
            }
            trace!(order = %self.describe_order(ix), ok = successful, "validated");
        }
    }

    fn validate_order(&mut self, ix: PieceIx) {
        let kind = match &self.base.pieces[ix].order {
            Some(o) => o.kind.clone(),
            None => return,
        };
        match kind {
            OrderKind::Hold | OrderKind::Convoy { .. } => {}
            OrderKind::Move { dest } => {
                let from = self.base.pieces[ix].area;
                if !self.base.map.connected(from, dest) {
                    self.add_result(ix, ResultTag::Impossible);
                }
                if self.attacking_own_stationary(ix, dest) {
                    self.add_result(ix, ResultTag::Impossible);
                }
            }
            OrderKind::ConvoyedMove { ref path, dest } => {
                for &hop in path {
                    let province = self.base.map.area(hop).province;
                    let ok = match self.base.piece_at(province) {
                        Some(cix) => matches!(
                            self.base.pieces[cix].order.as_ref().map(|o| &o.kind),
                            Some(OrderKind::Convoy { convoyed, dest: cdest })
                                if *convoyed == ix && *cdest == dest
                        ),
                        None => false,
                    };
                    if !ok {
                        trace!(
                            hop = %self.base.map.area(hop).location(),
                            "no matching convoy on this leg"
                        );
                        self.add_result(ix, ResultTag::Failed);
                        break;
                    }
                }
                self.notify_convoys(ix);
            }
            OrderKind::Support { supported } => {
                if supported == ix {
                    self.add_result(ix, ResultTag::Impossible);
                    return;
                }
                let goal = self.base.piece_destination(supported);
                let goal_province = self.base.map.area(goal).province;
                let from = self.base.pieces[ix].area;
                let reachable = self
                    .base
                    .map
                    .connections(from)
                    .iter()
                    .any(|&a| self.base.map.area(a).province == goal_province);
                if !reachable {
                    self.add_result(ix, ResultTag::Impossible);
                }
                // Supporting an attack that would dislodge a friend is out.
                if self.base.moving(supported) {
                    if let Some(tix) = self.base.piece_at(goal_province) {
                        if tix != supported
                            && self.base.pieces[tix].owner == self.base.pieces[ix].owner
                            && !self.base.moving(tix)
                        {
                            self.add_result(ix, ResultTag::Impossible);
                        }
                    }
                }
            }
            _ => self.add_result(ix, ResultTag::Impossible),
        }
    }

    fn orders_check_convoys(&mut self) {
        debug!("check convoys");
        for ix in self.base.live() {
            let is_convoyed = matches!(
                self.base.pieces[ix].order.as_ref().map(|o| &o.kind),
                Some(OrderKind::ConvoyedMove { .. })
            );
            if is_convoyed && self.order_successful(ix) {
                self.check_disruptions(ix);
            }
        }
    }

    fn orders_cut_supports(&mut self) {
        debug!("cut supports");
        for ix in self.base.live() {
            self.cut_support(ix);
        }
    }

    fn orders_tally_strengths(&mut self) {
        debug!("tally strengths");
        for ix in self.base.live() {
            let supported = match self.base.pieces[ix].order.as_ref() {
                Some(o) if o.successful() => match o.kind {
                    OrderKind::Support { supported } => supported,
                    _ => continue,
                },
                _ => continue,
            };
            trace!(
                supporter = %self.base.describe(ix),
                supported = %self.base.describe(supported),
                "support tallied"
            );
            self.base.pieces[supported].add_support(ix);
        }
    }

    fn orders_check_bounces(&mut self) {
        debug!("check bounces");
        let mut ixs = self.base.live();
        ixs.sort_by_key(|&ix| std::cmp::Reverse(self.base.strength(ix)));

        // Re-check work queue. Each entry re-evaluates one order because a
        // dependency changed; the pass cap bounds the whole fixpoint.
        let mut queue: VecDeque<PieceIx> = VecDeque::new();
        let mut passes = vec![0u32; self.base.pieces.len()];
        let cap = (self.base.pieces.len() as u32).saturating_mul(2).max(4);

        for ix in ixs {
            let eligible = match self.base.pieces[ix].order.as_ref() {
                Some(o) => o.successful() && !o.checked,
                None => false,
            };
            if eligible {
                passes[ix] += 1;
                self.check_order(ix, &mut queue);
            }
            while let Some(r) = queue.pop_front() {
                if passes[r] >= cap {
                    continue;
                }
                let blocked = match self.base.pieces[r].order.as_ref() {
                    Some(o) => o.invalidated(),
                    None => true,
                };
                if blocked {
                    continue;
                }
                passes[r] += 1;
                self.check_order(r, &mut queue);
            }
        }
    }

    /// Re-evaluates one order's bounce/disruption outcome against current
    /// state. Only moves have a dynamic outcome; everything else just gets
    /// its checked flag.
    fn check_order(&mut self, ix: PieceIx, queue: &mut VecDeque<PieceIx>) {
        let probe: Option<(bool, AreaId)> = match self.base.pieces[ix].order.as_ref() {
            Some(o) => match &o.kind {
                OrderKind::Move { dest } => Some((true, *dest)),
                OrderKind::ConvoyedMove { dest, .. } => Some((false, *dest)),
                _ => None,
            },
            None => return,
        };
        let Some((plain_move, dest)) = probe else {
            if let Some(o) = self.base.pieces[ix].order.as_mut() {
                o.checked = true;
            }
            return;
        };
        trace!(order = %self.describe_order(ix), "checking");
        if let Some(o) = self.base.pieces[ix].order.as_mut() {
            o.results.remove(ResultTag::Bounced);
            o.checked = true;
        }

        let dest_province = self.base.map.area(dest).province;
        let my_province = self.base.province_of(ix);

        // Head-to-head: two plain moves aimed at each other bounce unless
        // one strictly outweighs the other. An opponent that has merely
        // bounced still opposes with full strength; one that was invalidated
        // or dislodged does not.
        if plain_move {
            if let Some(tix) = self.base.piece_at(dest_province) {
                if tix != ix
                    && self.head_to_head(ix, tix)
                    && self.base.strength(tix) >= self.base.strength(ix)
                {
                    trace!(
                        mover = %self.base.describe(ix),
                        other = %self.base.describe(tix),
                        "swap bounce"
                    );
                    self.add_result(ix, ResultTag::Bounced);
                }
            }
        }

        if self.order_successful(ix) {
            self.check_weak_bounce(ix, plain_move, dest_province, my_province, queue);
        }

        let bounced = self.base.pieces[ix]
            .order
            .as_ref()
            .is_some_and(|o| o.bounced());
        if bounced {
            // Attacks on this piece's province may now fail; recheck them.
            for op in self.base.opponents(my_province, ix) {
                queue.push_back(op);
            }
        }
        if !plain_move {
            if bounced {
                self.notify_convoys(ix);
            } else if self.order_successful(ix) {
                self.check_disruptions(ix);
            }
        }
    }

    /// True if `tix`'s order is a plain move back into `ix`'s province that
    /// is still in the fight (at worst bounced).
    fn head_to_head(&self, ix: PieceIx, tix: PieceIx) -> bool {
        let my_province = self.base.province_of(ix);
        match self.base.pieces[tix].order.as_ref() {
            Some(o) => match o.kind {
                OrderKind::Move { dest } => {
                    self.base.map.area(dest).province == my_province
                        && o.results().at_worst(ResultTag::Bounced)
                }
                _ => false,
            },
            None => false,
        }
    }

    fn check_weak_bounce(
        &mut self,
        ix: PieceIx,
        plain_move: bool,
        dest_province: Province,
        my_province: Province,
        queue: &mut VecDeque<PieceIx>,
    ) {
        let rivals = self.base.opponents(dest_province, ix);
        if !rivals.is_empty() {
            trace!(
                mover = %self.base.describe(ix),
                rivals = rivals.len(),
                "weak bounce"
            );
            self.add_result(ix, ResultTag::Bounced);
            return;
        }
        let Some(tix) = self.base.piece_at(dest_province) else {
            return;
        };
        if tix == ix {
            return;
        }
        if self.attacking_own_stationary(ix, self.base.pieces[tix].area) {
            self.add_result(ix, ResultTag::Bounced);
            return;
        }

        // Strictly strongest, province occupied: dislodge the occupant if it
        // is not getting out of the way.
        let mut attackers: Vec<PieceIx> = vec![ix];
        attackers.extend(self.base.pieces[ix].supports.iter().copied());
        let attacked_from: Vec<Province> =
            attackers.iter().map(|&a| self.base.province_of(a)).collect();

        let target_approaching = plain_move
            && self.base.moving(tix)
            && self
                .base
                .order_destination(tix)
                .map(|a| self.base.map.area(a).province)
                == Some(my_province)
            && matches!(
                self.base.pieces[tix].order.as_ref().map(|o| &o.kind),
                Some(OrderKind::Move { .. })
            );

        if target_approaching {
            // Never dislodge a friend, however the strengths fall.
            if self.base.pieces[tix].owner == self.base.pieces[ix].owner {
                self.add_result(ix, ResultTag::Bounced);
                return;
            }
            // Head-to-head loser: its claim on our province dies with it.
            self.base.remove_contender(my_province, tix);
            self.dislodge(tix, attacked_from, queue);
        } else if !self.base.moving(tix) {
            self.dislodge(tix, attacked_from, queue);
        }
        // Otherwise the occupant is successfully moving elsewhere and the
        // province will be vacated.
    }

    /// Forces `victim` out: computes its retreat options, marks the order,
    /// and fires the per-kind dislodgement hooks.
    fn dislodge(&mut self, victim: PieceIx, attacked_from: Vec<Province>, queue: &mut VecDeque<PieceIx>) {
        let victim_province = self.base.province_of(victim);
        trace!(
            victim = %self.base.describe(victim),
            from = ?attacked_from.iter().map(|p| p.abbr()).collect::<Vec<_>>(),
            "dislodged"
        );
        // No retreat towards any attacker, nor to wherever the victim's own
        // order was headed.
        let own_goal = self
            .base
            .order_destination(victim)
            .map(|a| self.base.map.area(a).province);
        let victim_area = self.base.pieces[victim].area;
        let retreats: Vec<AreaId> = self
            .base
            .map
            .connections(victim_area)
            .iter()
            .copied()
            .filter(|&a| {
                let p = self.base.map.area(a).province;
                !attacked_from.contains(&p) && Some(p) != own_goal
            })
            .collect();
        self.base.pieces[victim].retreats = retreats;
        self.add_result(victim, ResultTag::Dislodged);

        let kind = self.base.pieces[victim].order.as_ref().map(|o| o.kind.clone());
        match kind {
            Some(OrderKind::Move { .. }) | Some(OrderKind::ConvoyedMove { .. }) => {
                // With the victim out, contests on its province may resolve
                // differently.
                for op in self.base.opponents(victim_province, victim) {
                    queue.push_back(op);
                }
            }
            Some(OrderKind::Support { supported }) => {
                self.base.pieces[supported].remove_support(victim);
                queue.push_back(supported);
            }
            Some(OrderKind::Convoy { convoyed, .. }) => {
                self.add_result(convoyed, ResultTag::Failed);
                self.notify_convoys(convoyed);
            }
            _ => {}
        }
    }

    /// Marks every convoy leg of a failed convoyed move as failed and drops
    /// the army's accumulated supports. No-op while the move is successful.
    fn notify_convoys(&mut self, army: PieceIx) {
        if self.order_successful(army) {
            return;
        }
        self.base.pieces[army].supports.clear();
        let legs = self.base.pieces[army].convoys.clone();
        for leg in legs {
            let is_mine = matches!(
                self.base.pieces[leg].order.as_ref().map(|o| &o.kind),
                Some(OrderKind::Convoy { convoyed, .. }) if *convoyed == army
            );
            if is_mine {
                self.add_result(leg, ResultTag::Failed);
            }
        }
    }

    /// A convoyed move is disrupted as soon as any rival contests one of its
    /// hop provinces; the land piece fails outright and the legs follow.
    fn check_disruptions(&mut self, ix: PieceIx) {
        let path = match self.base.pieces[ix].order.as_ref() {
            Some(o) => match &o.kind {
                OrderKind::ConvoyedMove { path, .. } => path.clone(),
                _ => return,
            },
            None => return,
        };
        for hop in path {
            let province = self.base.map.area(hop).province;
            let mut rivals = self.base.opponents(province, ix);
            rivals.retain(|&r| {
                !matches!(
                    self.base.pieces[r].order.as_ref().map(|o| &o.kind),
                    Some(OrderKind::Convoy { convoyed, .. }) if *convoyed == ix
                )
            });
            if !rivals.is_empty() {
                trace!(
                    army = %self.base.describe(ix),
                    hop = %province.abbr(),
                    "convoy attacked"
                );
                self.add_result(ix, ResultTag::ConvoyAttacked);
                self.add_result(ix, ResultTag::Failed);
                self.notify_convoys(ix);
                return;
            }
        }
    }

    /// A validated move into a supporter's province cuts the support, with
    /// three exceptions: the attack comes from the very province the support
    /// is aimed at, the attacker is the supported piece itself, or attacker
    /// and supporter share a power.
    fn cut_support(&mut self, ix: PieceIx) {
        let (dest, attacking_from) = match self.base.pieces[ix].order.as_ref() {
            Some(o) if o.successful() => match &o.kind {
                OrderKind::Move { dest } => (*dest, self.base.province_of(ix)),
                OrderKind::ConvoyedMove { path, dest } => {
                    let from = match path.last() {
                        Some(&hop) => self.base.map.area(hop).province,
                        None => self.base.province_of(ix),
                    };
                    (*dest, from)
                }
                _ => return,
            },
            _ => return,
        };
        let dest_province = self.base.map.area(dest).province;
        let Some(tix) = self.base.piece_at(dest_province) else {
            return;
        };
        let supported = match self.base.pieces[tix].order.as_ref() {
            Some(o) => match o.kind {
                OrderKind::Support { supported } => supported,
                _ => return,
            },
            None => return,
        };
        if self.base.pieces[tix].owner == self.base.pieces[ix].owner {
            return;
        }
        if supported == ix {
            return;
        }
        let goal = self.base.piece_destination(supported);
        if self.base.map.area(goal).province == attacking_from {
            return;
        }
        trace!(
            supporter = %self.base.describe(tix),
            attacker = %self.base.describe(ix),
            "support cut"
        );
        self.add_result(tix, ResultTag::Cut);
        self.base.pieces[supported].remove_support(tix);
    }

    /// True if `ix` would be attacking its own stationary unit at `dest`.
    fn attacking_own_stationary(&self, ix: PieceIx, dest: AreaId) -> bool {
        let province = self.base.map.area(dest).province;
        match self.base.piece_at(province) {
            Some(tix) => {
                tix != ix
                    && self.base.pieces[tix].owner == self.base.pieces[ix].owner
                    && !self.base.moving(tix)
            }
            None => false,
        }
    }

    fn order_successful(&self, ix: PieceIx) -> bool {
        self.base.pieces[ix]
            .order
            .as_ref()
            .is_some_and(|o| o.successful())
    }

    fn add_result(&mut self, ix: PieceIx, tag: ResultTag) {
        if let Some(order) = self.base.pieces[ix].order.as_mut() {
            order.add_result(tag);
        }
    }

    // --- execution ---------------------------------------------------------

    fn execute_into(&self, target: &mut TurnBase) -> Result<(), EngineError> {
        debug!("executing into next turn");
        for ix in self.base.live() {
            let piece = &self.base.pieces[ix];
            let order = piece.order.as_ref();
            let (successful, dislodged, move_dest) = match order {
                Some(o) => (
                    o.successful(),
                    o.dislodged(),
                    match &o.kind {
                        OrderKind::Move { dest } => Some(*dest),
                        OrderKind::ConvoyedMove { dest, .. } => Some(*dest),
                        _ => None,
                    },
                ),
                None => (true, false, None),
            };
            if dislodged {
                target.copy_piece_dislodged(piece);
            } else if let (true, Some(dest)) = (successful, move_dest) {
                target.copy_piece_to(piece, dest)?;
            } else {
                target.copy_piece_to(piece, piece.area)?;
            }
        }
        Ok(())
    }
}

/// Strips retreat options that point at provinces occupied in the new turn.
fn narrow_retreats(base: &mut TurnBase) {
    for ix in base.dislodged_ixs() {
        let retained: Vec<AreaId> = base.pieces[ix]
            .retreats
            .iter()
            .copied()
            .filter(|&a| {
                let province = base.map.area(a).province;
                base.piece_at(province).is_none()
            })
            .collect();
        base.pieces[ix].retreats = retained;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Province;

    fn spring(map: Arc<Map>) -> MovementTurn {
        MovementTurn::new(map, Season::Spring, 1901)
    }

    #[test]
    fn opening_position_shape() {
        let turn = MovementTurn::opening(Map::standard());
        assert_eq!(turn.pieces().count(), 22);
        assert_eq!(turn.power(Power::Russia).supply_centre_count(), 4);
        assert_eq!(turn.power(Power::France).supply_centre_count(), 3);
        assert_eq!(turn.owner(Province::Bel), None);
        assert_eq!(turn.owner(Province::Par), Some(Power::France));
    }

    #[test]
    fn add_unit_enforces_occupancy() {
        let mut turn = spring(Map::standard());
        turn.add_unit(Power::Austria, UnitType::Army, Province::Vie).unwrap();
        let err = turn
            .add_unit(Power::Germany, UnitType::Army, Province::Vie)
            .unwrap_err();
        assert!(matches!(err, EngineError::ProvinceOccupied { .. }));
    }

    #[test]
    fn duplicate_order_is_ambiguous_conflict() {
        let mut turn = spring(Map::standard());
        turn.add_unit(Power::Austria, UnitType::Army, Province::Vie).unwrap();
        turn.submit_orders(Power::Austria, &[OrderSpec::hold(Province::Vie)])
            .unwrap();
        let err = turn
            .submit_orders(
                Power::Austria,
                &[OrderSpec::move_to(Province::Vie, Province::Tyr)],
            )
            .unwrap_err();
        assert!(matches!(err, SubmitError::AmbiguousConflict(_)));
        // The existing order is marked ambiguous, not replaced.
        let order = turn.piece_at(Province::Vie).unwrap().order().unwrap();
        assert!(order.results().contains(ResultTag::Ambiguous));
    }

    #[test]
    fn rejected_batch_attaches_nothing() {
        let mut turn = spring(Map::standard());
        turn.add_unit(Power::Austria, UnitType::Army, Province::Vie).unwrap();
        turn.add_unit(Power::Austria, UnitType::Army, Province::Bud).unwrap();
        // Vienna cannot reach Munich directly; whole batch must bounce back.
        let err = turn
            .submit_orders(
                Power::Austria,
                &[
                    OrderSpec::move_to(Province::Bud, Province::Ser),
                    OrderSpec::move_to(Province::Vie, Province::Mun),
                ],
            )
            .unwrap_err();
        match err {
            SubmitError::Rejected(failures) => {
                assert_eq!(failures.len(), 1);
                assert!(failures[0].reasons.contains(&"impossible".to_string()));
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert!(turn.piece_at(Province::Bud).unwrap().order().is_none());
        assert!(turn.piece_at(Province::Vie).unwrap().order().is_none());
        assert!(!turn.power(Power::Austria).submitted());
    }

    #[test]
    fn foreign_piece_is_rejected() {
        let mut turn = spring(Map::standard());
        turn.add_unit(Power::Austria, UnitType::Army, Province::Vie).unwrap();
        let err = turn
            .submit_orders(Power::Germany, &[OrderSpec::hold(Province::Vie)])
            .unwrap_err();
        assert!(matches!(err, SubmitError::ForeignPiece { .. }));
    }

    #[test]
    fn orders_template_lists_unordered_pieces() {
        let mut turn = spring(Map::standard());
        turn.add_unit(Power::Austria, UnitType::Army, Province::Vie).unwrap();
        turn.add_unit(Power::Austria, UnitType::Fleet, Province::Tri).unwrap();
        assert_eq!(turn.orders_template(Power::Austria), "A vie\nF tri");
        turn.submit_orders(Power::Austria, &[OrderSpec::hold(Province::Vie)])
            .unwrap();
        assert_eq!(turn.orders_template(Power::Austria), "F tri");
    }
}
