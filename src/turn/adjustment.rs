//! Adjustment turns.
//!
//! After Autumn resolves, each power reconciles its piece count with its
//! supply-centre count: builds in owned, empty home centres when it has grown,
//! disbands when it has shrunk. Build and waive orders belong to the power
//! rather than to any piece; disbands name a piece. Defaults fill the gaps:
//! waives for unused builds, and disbands picked farthest-first by
//! breadth-first distance from the power's home centres.

use std::cmp::Reverse;

use tracing::{debug, trace};

use crate::board::{Power, Province, ALL_POWERS};
use crate::error::{EngineError, OrderFailure, SubmitError};

use super::movement::MovementTurn;
use super::order::{Order, OrderKind, OrderSpec, ResultTag};
use super::piece::{Piece, PieceIx};
use super::power::TurnPower;
use super::{Turn, TurnBase};

/// An adjustment-phase order with its owner and, for disbands, its target.
pub(crate) struct AdjOrder {
    power: Power,
    piece: Option<PieceIx>,
    order: Order,
}

/// The Winter adjustment phase, interposed between Autumn and Spring.
pub struct AdjustmentTurn {
    pub(crate) base: TurnBase,
    next: MovementTurn,
    adjustments: Vec<(Power, i32)>,
    orders: Vec<AdjOrder>,
    resolved: bool,
}

impl AdjustmentTurn {
    pub(crate) fn new(
        base: TurnBase,
        next: MovementTurn,
        adjustments: Vec<(Power, i32)>,
    ) -> Self {
        AdjustmentTurn { base, next, adjustments, orders: Vec::new(), resolved: false }
    }

    pub fn year(&self) -> u16 {
        self.base.year
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

    /// Builds this power is owed: positive supply-centre surplus.
    pub fn builds_owed(&self, power: Power) -> u32 {
        match self.adjustments.iter().find(|(p, _)| *p == power) {
            Some(&(_, diff)) if diff > 0 => diff as u32,
            _ => 0,
        }
    }

    /// Disbands this power owes: positive piece surplus.
    pub fn disbands_owed(&self, power: Power) -> u32 {
        match self.adjustments.iter().find(|(p, _)| *p == power) {
            Some(&(_, diff)) if diff < 0 => (-diff) as u32,
            _ => 0,
        }
    }

    /// The orders attached for a power so far, in submission order.
    pub fn orders(&self, power: Power) -> impl Iterator<Item = &Order> {
        self.orders
            .iter()
            .filter(move |o| o.power == power)
            .map(|o| &o.order)
    }

    pub fn unsubmitted_powers(&self) -> Vec<Power> {
        ALL_POWERS
            .into_iter()
            .filter(|p| {
                (self.builds_owed(*p) > 0 || self.disbands_owed(*p) > 0)
                    && !self.base.power(*p).submitted
            })
            .collect()
    }

    /// One placeholder line per owed build or disband.
    pub fn orders_template(&self, power: Power) -> String {
        let mut lines = Vec::new();
        for _ in 0..self.builds_owed(power) {
            lines.push("build".to_string());
        }
        for _ in 0..self.disbands_owed(power) {
            lines.push("disband".to_string());
        }
        lines.join("\n")
    }

    /// Submits one power's adjustment orders, all-or-nothing.
    pub fn submit_orders(&mut self, power: Power, specs: &[OrderSpec]) -> Result<(), SubmitError> {
        self.submit(power, specs, true)
    }

    /// Attaches adjustment orders without the strict validation pass.
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
                "already-resolved Adjustment",
            ));
        }
        let mut new_orders = Vec::with_capacity(specs.len());
        for spec in specs {
            let adj = match spec {
                OrderSpec::Build { unit_type, at } => {
                    let area = self.base.map.locate(*unit_type, *at).ok_or(
                        crate::error::MapError::NoSuchArea {
                            unit_type: unit_type.to_string(),
                            location: at.to_string(),
                        },
                    )?;
                    AdjOrder {
                        power,
                        piece: None,
                        order: Order::new(OrderKind::Build { unit_type: *unit_type, area }),
                    }
                }
                OrderSpec::Disband { unit } => {
                    let ix = self.base.bind_unit(power, *unit, true)?;
                    let duplicate = self
                        .orders
                        .iter()
                        .chain(new_orders.iter())
                        .any(|o: &AdjOrder| o.piece == Some(ix));
                    if duplicate {
                        return Err(SubmitError::AmbiguousConflict(self.base.describe(ix)));
                    }
                    AdjOrder { power, piece: Some(ix), order: Order::new(OrderKind::Disband) }
                }
                OrderSpec::Waive => {
                    AdjOrder { power, piece: None, order: Order::new(OrderKind::Waive) }
                }
                other => return Err(SubmitError::WrongPhase(other.to_string(), "Adjustment")),
            };
            new_orders.push(adj);
        }

        let keep = self.orders.len();
        self.orders.extend(new_orders);

        if strict {
            // Trial validation over the whole order list, since build caps
            // and duplicate-build checks are positional.
            self.validate_all();
            let mut failures = Vec::new();
            for adj in &self.orders[keep..] {
                if !adj.order.successful() {
                    failures.push(OrderFailure {
                        order: self.describe(adj),
                        reasons: adj.order.results().iter().map(|t| t.to_string()).collect(),
                    });
                }
            }
            let failed = !failures.is_empty();
            if failed {
                self.orders.truncate(keep);
            }
            for adj in &mut self.orders {
                adj.order.results = Default::default();
            }
            if failed {
                return Err(SubmitError::Rejected(failures));
            }
        }
        self.base.power_mut(power).submitted = true;
        Ok(())
    }

    fn describe(&self, adj: &AdjOrder) -> String {
        match &adj.order.kind {
            OrderKind::Build { unit_type, area } => format!(
                "build {} {}",
                unit_type.letter(),
                self.base.map.area(*area).location()
            ),
            OrderKind::Disband => match adj.piece {
                Some(ix) => format!("disband {}", self.base.describe(ix)),
                None => "disband".to_string(),
            },
            _ => "waive".to_string(),
        }
    }

    /// Fills defaults and validates. Idempotent.
    pub fn resolve(&mut self) {
        if self.resolved {
            return;
        }
        self.resolved = true;
        debug!(year = self.base.year, "resolving adjustment turn");
        self.orders_fill();
        self.validate_all();
    }

    fn orders_fill(&mut self) {
        for (power, diff) in self.adjustments.clone() {
            if diff > 0 {
                let have = self
                    .orders
                    .iter()
                    .filter(|o| {
                        o.power == power
                            && matches!(o.order.kind, OrderKind::Build { .. } | OrderKind::Waive)
                    })
                    .count() as i32;
                for _ in have..diff {
                    trace!(power = %power, "defaulting to waive");
                    self.orders.push(AdjOrder {
                        power,
                        piece: None,
                        order: Order::new(OrderKind::Waive),
                    });
                }
            } else {
                let needed = -diff;
                let ordered: Vec<PieceIx> = self
                    .orders
                    .iter()
                    .filter(|o| o.power == power)
                    .filter_map(|o| o.piece)
                    .collect();
                let have = ordered.len() as i32;
                if have >= needed {
                    continue;
                }
                // Farthest from home goes first.
                let mut candidates: Vec<(u32, PieceIx)> = self
                    .base
                    .live()
                    .into_iter()
                    .filter(|ix| {
                        self.base.pieces[*ix].owner == power && !ordered.contains(ix)
                    })
                    .map(|ix| {
                        let province = self.base.province_of(ix);
                        let distance = self
                            .base
                            .map
                            .distance_where(province, |p| p.home_power() == Some(power))
                            .unwrap_or(u32::MAX);
                        (distance, ix)
                    })
                    .collect();
                candidates.sort_by_key(|&(distance, ix)| (Reverse(distance), ix));
                for &(distance, ix) in candidates.iter().take((needed - have) as usize) {
                    trace!(
                        piece = %self.base.describe(ix),
                        distance,
                        "defaulting to disband"
                    );
                    self.orders.push(AdjOrder {
                        power,
                        piece: Some(ix),
                        order: Order::new(OrderKind::Disband),
                    });
                }
            }
        }
    }

    /// Validates every order in submission order, capping builds, waives and
    /// disbands at the counts owed.
    fn validate_all(&mut self) {
        for power in ALL_POWERS {
            let owed_builds = self.builds_owed(power);
            let owed_disbands = self.disbands_owed(power);
            let mut builds_used = 0u32;
            let mut disbands_used = 0u32;
            let mut built_provinces: Vec<Province> = Vec::new();

            for i in 0..self.orders.len() {
                if self.orders[i].power != power {
                    continue;
                }
                match self.orders[i].order.kind.clone() {
                    OrderKind::Build { area, .. } => {
                        if builds_used >= owed_builds {
                            self.orders[i].order.add_result(ResultTag::Failed);
                            continue;
                        }
                        let province = self.base.map.area(area).province;
                        let legal = self.base.power(power).owns(province)
                            && province.home_power() == Some(power)
                            && self.base.piece_at(province).is_none()
                            && !built_provinces.contains(&province);
                        if legal {
                            builds_used += 1;
                            built_provinces.push(province);
                        } else {
                            trace!(province = %province.abbr(), "illegal build");
                            self.orders[i].order.add_result(ResultTag::Impossible);
                        }
                    }
                    OrderKind::Waive => {
                        if builds_used >= owed_builds {
                            self.orders[i].order.add_result(ResultTag::Failed);
                        } else {
                            builds_used += 1;
                        }
                    }
                    OrderKind::Disband => {
                        if disbands_used >= owed_disbands {
                            self.orders[i].order.add_result(ResultTag::Failed);
                        } else {
                            disbands_used += 1;
                        }
                    }
                    _ => self.orders[i].order.add_result(ResultTag::Impossible),
                }
            }
        }
    }

    /// Resolves, applies builds and disbands to the already-built next
    /// movement turn, and hands it over.
    pub fn next_turn(mut self) -> Result<Turn, EngineError> {
        self.resolve();
        debug!("executing adjustments into next turn");
        for adj in &self.orders {
            if !adj.order.successful() {
                continue;
            }
            match adj.order.kind {
                OrderKind::Build { unit_type, area } => {
                    let province = self.base.map.area(area).province;
                    trace!(province = %province.abbr(), "built");
                    self.next.base.new_piece(adj.power, unit_type, area)?;
                }
                OrderKind::Disband => {
                    if let Some(ix) = adj.piece {
                        let id = self.base.pieces[ix].id;
                        trace!(piece = %self.base.describe(ix), "disbanded");
                        self.next.base.remove_piece_by_id(id)?;
                    }
                }
                _ => {}
            }
        }
        Ok(Turn::Movement(self.next))
    }
}
