//! Retreat turns.
//!
//! Only dislodged pieces act here; everything else is carried forward
//! untouched. A dislodged piece without an order disbands. Retreats are the
//! one place where clashing orders simply all fail: every retreat sharing a
//! destination province bounces, with no strength comparison, and the pieces
//! involved are lost.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::board::{Power, Province};
use crate::error::{EngineError, OrderFailure, SubmitError};

use super::adjustment::AdjustmentTurn;
use super::movement::MovementTurn;
use super::order::{Order, OrderKind, OrderSpec, ResultTag};
use super::piece::{Piece, PieceIx};
use super::power::TurnPower;
use super::{Season, Turn, TurnBase};

/// The retreat phase following a movement turn with dislodgements.
pub struct RetreatTurn {
    pub(crate) base: TurnBase,
    season: Season,
    resolved: bool,
}

impl RetreatTurn {
    pub(crate) fn new(base: TurnBase, season: Season) -> Self {
        RetreatTurn { base, season, resolved: false }
    }

    /// The season of the movement turn this retreat belongs to.
    pub fn season(&self) -> Season {
        self.season
    }

    pub fn year(&self) -> u16 {
        self.base.year
    }

    pub fn pieces(&self) -> impl Iterator<Item = &Piece> {
        self.base.live_pieces()
    }

    pub fn pieces_dislodged(&self) -> impl Iterator<Item = &Piece> {
        self.base.dislodged_pieces()
    }

    pub fn piece_at(&self, province: Province) -> Option<&Piece> {
        self.base.piece_at(province).map(|ix| &self.base.pieces[ix])
    }

    pub fn piece_dislodged_at(&self, province: Province) -> Option<&Piece> {
        self.base
            .dislodged_at(province)
            .map(|ix| &self.base.pieces[ix])
    }

    pub fn power(&self, power: Power) -> &TurnPower {
        self.base.power(power)
    }

    pub fn owner(&self, province: Province) -> Option<Power> {
        self.base.owner(province)
    }

    /// One line per dislodged piece: its retreat options, or a disband.
    pub fn orders_template(&self, power: Power) -> String {
        let mut lines = Vec::new();
        for ix in self.base.dislodged_ixs() {
            let piece = &self.base.pieces[ix];
            if piece.owner != power {
                continue;
            }
            if piece.retreats.is_empty() {
                lines.push(format!("disband {}", self.base.describe(ix)));
            } else {
                let options: Vec<String> = piece
                    .retreats
                    .iter()
                    .map(|&a| self.base.map.area(a).location().to_string())
                    .collect();
                lines.push(format!(
                    "{} - {}",
                    self.base.describe(ix),
                    options.join(" or ")
                ));
            }
        }
        lines.sort();
        lines.join("\n")
    }

    /// Submits one power's retreat-phase orders, all-or-nothing.
    pub fn submit_orders(&mut self, power: Power, specs: &[OrderSpec]) -> Result<(), SubmitError> {
        self.submit(power, specs, true)
    }

    /// Attaches retreat orders without the strict validation pass.
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
                "already-resolved Retreats",
            ));
        }
        let mut bound = Vec::with_capacity(specs.len());
        for spec in specs {
            let (ix, kind) = match spec {
                OrderSpec::Retreat { unit, dest } => {
                    let ix = self.base.bind_dislodged(power, *unit)?;
                    let dest = self.base.resolve_dest(ix, *dest)?;
                    (ix, OrderKind::Retreat { dest })
                }
                OrderSpec::Disband { unit } => {
                    let ix = self.base.bind_dislodged(power, *unit)?;
                    (ix, OrderKind::Disband)
                }
                other => return Err(SubmitError::WrongPhase(other.to_string(), "Retreats")),
            };
            bound.push((ix, kind));
        }

        let mut attached = Vec::new();
        for (ix, kind) in bound {
            if self.base.assign_order(ix, Order::new(kind)).is_err() {
                let place = self.base.describe(ix);
                for &a in &attached {
                    self.base.clear_order(a);
                }
                return Err(SubmitError::AmbiguousConflict(place));
            }
            attached.push(ix);
        }

        if strict {
            let mut failures = Vec::new();
            for &ix in &attached {
                self.validate_order(ix);
                if let Some(order) = self.base.pieces[ix].order.as_ref() {
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
                return Err(SubmitError::Rejected(failures));
            }
            for &a in &attached {
                if let Some(order) = self.base.pieces[a].order.as_mut() {
                    order.results = Default::default();
                }
            }
        }
        self.base.power_mut(power).submitted = true;
        Ok(())
    }

    fn describe_order(&self, ix: PieceIx) -> String {
        let here = self.base.describe(ix);
        match self.base.pieces[ix].order.as_ref().map(|o| &o.kind) {
            Some(OrderKind::Retreat { dest }) => {
                format!("{} - {}", here, self.base.map.area(*dest).location())
            }
            _ => format!("disband {}", here),
        }
    }

    fn validate_order(&mut self, ix: PieceIx) {
        let dest = match self.base.pieces[ix].order.as_ref() {
            Some(o) => match o.kind {
                OrderKind::Retreat { dest } => dest,
                _ => return,
            },
            None => return,
        };
        let piece = &self.base.pieces[ix];
        let impossible = !self.base.map.connected(piece.area, dest)
            || !piece.retreats.contains(&dest);
        if impossible {
            trace!(piece = %self.base.describe(ix), "retreat not available");
            if let Some(order) = self.base.pieces[ix].order.as_mut() {
                order.add_result(ResultTag::Impossible);
            }
        }
    }

    /// Fills defaults, validates, and bounces clashing retreats. Idempotent.
    pub fn resolve(&mut self) {
        if self.resolved {
            return;
        }
        self.resolved = true;
        debug!(year = self.base.year, season = %self.season, "resolving retreat turn");

        // Unordered dislodged pieces disband.
        for ix in self.base.dislodged_ixs() {
            if self.base.pieces[ix].order.is_none() {
                trace!(piece = %self.base.describe(ix), "defaulting to disband");
                self.base.pieces[ix].order = Some(Order::new(OrderKind::Disband));
            }
        }
        for ix in self.base.dislodged_ixs() {
            self.validate_order(ix);
        }

        // Mutual failure: every retreat aimed at a contested province
        // bounces, validity notwithstanding.
        let mut targets: HashMap<Province, Vec<PieceIx>> = HashMap::new();
        for ix in self.base.dislodged_ixs() {
            if let Some(OrderKind::Retreat { dest }) =
                self.base.pieces[ix].order.as_ref().map(|o| o.kind.clone())
            {
                let province = self.base.map.area(dest).province;
                targets.entry(province).or_default().push(ix);
            }
        }
        for (province, pieces) in targets {
            if pieces.len() < 2 {
                continue;
            }
            debug!(province = %province.abbr(), count = pieces.len(), "clashing retreats");
            for ix in pieces {
                if let Some(order) = self.base.pieces[ix].order.as_mut() {
                    order.add_result(ResultTag::Bounced);
                }
            }
        }
    }

    /// Resolves and produces the next movement turn, or an adjustment turn
    /// after Autumn retreats when the books disagree.
    pub fn next_turn(mut self) -> Result<Turn, EngineError> {
        self.resolve();

        let (next_season, next_year) = match self.season {
            Season::Spring => (Season::Autumn, self.base.year),
            Season::Autumn => (Season::Spring, self.base.year + 1),
        };
        let mut base = self.base.successor(next_year, next_season == Season::Spring);
        self.execute_into(&mut base)?;
        let next = MovementTurn::from_base(base, next_season);

        if self.season == Season::Autumn && next.base.needs_adjustments() {
            let mut adj_base = self.base.successor(self.base.year, true);
            self.execute_into(&mut adj_base)?;
            let adjustments = next.base.adjustments();
            return Ok(Turn::Adjustment(AdjustmentTurn::new(adj_base, next, adjustments)));
        }
        Ok(Turn::Movement(next))
    }

    fn execute_into(&self, target: &mut TurnBase) -> Result<(), EngineError> {
        debug!("executing retreats into next turn");
        for ix in self.base.live() {
            let piece = &self.base.pieces[ix];
            target.copy_piece_to(piece, piece.area)?;
        }
        for ix in self.base.dislodged_ixs() {
            let piece = &self.base.pieces[ix];
            match piece.order.as_ref() {
                Some(o) if o.successful() => {
                    if let OrderKind::Retreat { dest } = o.kind {
                        trace!(piece = %self.base.describe(ix), "retreated");
                        target.copy_piece_to(piece, dest)?;
                    }
                    // A successful disband simply leaves the piece behind.
                }
                _ => {
                    trace!(piece = %self.base.describe(ix), "lost");
                }
            }
        }
        Ok(())
    }
}
