//! Orders and their outcomes.
//!
//! An order never errors out of resolution: everything that goes wrong with
//! it is recorded as a [`ResultTag`] on the order, and an order is successful
//! exactly while its result set is empty. The nine order kinds are a closed
//! enum — the game's rules fix the set, so there is no open dispatch.
//!
//! [`OrderSpec`] is the public face: orders addressed by board location,
//! bound to concrete pieces when submitted to a turn.

use serde::{Deserialize, Serialize};

use crate::board::{AreaId, Location, UnitType};

use super::piece::PieceIx;

/// Everything that can go wrong with an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ResultTag {
    /// The piece was given more than one order.
    Ambiguous = 0,
    /// The move (or retreat) was repelled by equal or stronger opposition.
    Bounced = 1,
    /// A convoy leg of the move was contested.
    ConvoyAttacked = 2,
    /// The support was cut by an attack on the supporting piece.
    Cut = 3,
    /// The piece was forced out of its province.
    Dislodged = 4,
    /// The order failed for a reason outside the piece's control.
    Failed = 5,
    /// The order never was legal.
    Impossible = 6,
}

/// All tags, for iteration.
pub const ALL_RESULT_TAGS: [ResultTag; 7] = [
    ResultTag::Ambiguous,
    ResultTag::Bounced,
    ResultTag::ConvoyAttacked,
    ResultTag::Cut,
    ResultTag::Dislodged,
    ResultTag::Failed,
    ResultTag::Impossible,
];

impl std::fmt::Display for ResultTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ResultTag::Ambiguous => "ambiguous",
            ResultTag::Bounced => "bounced",
            ResultTag::ConvoyAttacked => "convoy attacked",
            ResultTag::Cut => "cut",
            ResultTag::Dislodged => "dislodged",
            ResultTag::Failed => "failed",
            ResultTag::Impossible => "impossible",
        };
        f.write_str(s)
    }
}

/// A small set of result tags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResultSet(u8);

impl ResultSet {
    const fn bit(tag: ResultTag) -> u8 {
        1 << (tag as u8)
    }

    pub fn insert(&mut self, tag: ResultTag) {
        self.0 |= Self::bit(tag);
    }

    pub fn remove(&mut self, tag: ResultTag) {
        self.0 &= !Self::bit(tag);
    }

    pub fn contains(self, tag: ResultTag) -> bool {
        self.0 & Self::bit(tag) != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True if the set holds nothing beyond `tag` (possibly nothing at all).
    pub fn at_worst(self, tag: ResultTag) -> bool {
        self.0 & !Self::bit(tag) == 0
    }

    pub fn iter(self) -> impl Iterator<Item = ResultTag> {
        ALL_RESULT_TAGS.into_iter().filter(move |t| self.contains(*t))
    }
}

impl std::fmt::Display for ResultSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for tag in self.iter() {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{}", tag)?;
            first = false;
        }
        Ok(())
    }
}

/// The nine order kinds.
///
/// Pieces referenced by an order are named by their arena index within the
/// turn that owns the order; `AreaId`s come from the turn's map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderKind {
    /// Stay put. Also the default for an unordered piece.
    Hold,
    /// Move to an adjacent area.
    Move { dest: AreaId },
    /// Move along a chain of convoying fleets.
    ConvoyedMove { path: Vec<AreaId>, dest: AreaId },
    /// Carry `convoyed` towards `dest` as one leg of a convoy chain.
    Convoy { convoyed: PieceIx, dest: AreaId },
    /// Add this piece's weight to whatever `supported` is doing.
    Support { supported: PieceIx },
    /// Leave a dislodgement towards an adjacent area.
    Retreat { dest: AreaId },
    /// Remove the piece from the board.
    Disband,
    /// Place a new unit (adjustment phase, attached to a power).
    Build { unit_type: UnitType, area: AreaId },
    /// Give up one build slot (adjustment phase, attached to a power).
    Waive,
}

/// An order with its accumulated outcome.
#[derive(Debug, Clone)]
pub struct Order {
    pub kind: OrderKind,
    pub(crate) results: ResultSet,
    pub(crate) checked: bool,
}

impl Order {
    pub(crate) fn new(kind: OrderKind) -> Self {
        Order { kind, results: ResultSet::default(), checked: false }
    }

    /// An order is successful exactly while nothing has gone wrong with it.
    pub fn successful(&self) -> bool {
        self.results.is_empty()
    }

    pub fn results(&self) -> ResultSet {
        self.results
    }

    pub fn bounced(&self) -> bool {
        self.results.contains(ResultTag::Bounced)
    }

    pub fn cut(&self) -> bool {
        self.results.contains(ResultTag::Cut)
    }

    pub fn dislodged(&self) -> bool {
        self.results.contains(ResultTag::Dislodged)
    }

    pub(crate) fn add_result(&mut self, tag: ResultTag) {
        self.results.insert(tag);
    }

    /// Tags that cannot be recomputed away by a re-check. `Bounced` (and
    /// `ConvoyAttacked` for convoyed moves) are dynamic; the rest are final
    /// for the turn.
    pub(crate) fn invalidated(&self) -> bool {
        self.results.contains(ResultTag::Impossible)
            || self.results.contains(ResultTag::Failed)
            || self.results.contains(ResultTag::Cut)
            || self.results.contains(ResultTag::Dislodged)
            || self.results.contains(ResultTag::Ambiguous)
    }
}

/// A submitted order, addressed by board location.
///
/// The turn binds each spec to a concrete piece (or, for builds and waives,
/// to the submitting power) and rejects the whole batch if anything fails to
/// bind or validate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderSpec {
    Hold { unit: Location },
    Move { unit: Location, dest: Location },
    ConvoyedMove { unit: Location, path: Vec<Location>, dest: Location },
    Convoy { unit: Location, convoyed: Location, dest: Location },
    Support { unit: Location, supported: Location },
    Retreat { unit: Location, dest: Location },
    Disband { unit: Location },
    Build { unit_type: UnitType, at: Location },
    Waive,
}

impl OrderSpec {
    pub fn hold(unit: impl Into<Location>) -> Self {
        OrderSpec::Hold { unit: unit.into() }
    }

    pub fn move_to(unit: impl Into<Location>, dest: impl Into<Location>) -> Self {
        OrderSpec::Move { unit: unit.into(), dest: dest.into() }
    }

    pub fn convoyed_move<P: Into<Location>>(
        unit: impl Into<Location>,
        path: impl IntoIterator<Item = P>,
        dest: impl Into<Location>,
    ) -> Self {
        OrderSpec::ConvoyedMove {
            unit: unit.into(),
            path: path.into_iter().map(Into::into).collect(),
            dest: dest.into(),
        }
    }

    pub fn convoy(
        unit: impl Into<Location>,
        convoyed: impl Into<Location>,
        dest: impl Into<Location>,
    ) -> Self {
        OrderSpec::Convoy {
            unit: unit.into(),
            convoyed: convoyed.into(),
            dest: dest.into(),
        }
    }

    pub fn support(unit: impl Into<Location>, supported: impl Into<Location>) -> Self {
        OrderSpec::Support { unit: unit.into(), supported: supported.into() }
    }

    pub fn retreat(unit: impl Into<Location>, dest: impl Into<Location>) -> Self {
        OrderSpec::Retreat { unit: unit.into(), dest: dest.into() }
    }

    pub fn disband(unit: impl Into<Location>) -> Self {
        OrderSpec::Disband { unit: unit.into() }
    }

    pub fn build(unit_type: UnitType, at: impl Into<Location>) -> Self {
        OrderSpec::Build { unit_type, at: at.into() }
    }

    pub fn waive() -> Self {
        OrderSpec::Waive
    }
}

impl std::fmt::Display for OrderSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderSpec::Hold { unit } => write!(f, "{} hold", unit),
            OrderSpec::Move { unit, dest } => write!(f, "{} - {}", unit, dest),
            OrderSpec::ConvoyedMove { unit, path, dest } => {
                write!(f, "{}", unit)?;
                for hop in path {
                    write!(f, " - {}", hop)?;
                }
                write!(f, " - {}", dest)
            }
            OrderSpec::Convoy { unit, convoyed, dest } => {
                write!(f, "{} convoy {} - {}", unit, convoyed, dest)
            }
            OrderSpec::Support { unit, supported } => {
                write!(f, "{} support {}", unit, supported)
            }
            OrderSpec::Retreat { unit, dest } => write!(f, "{} retreat {}", unit, dest),
            OrderSpec::Disband { unit } => write!(f, "disband {}", unit),
            OrderSpec::Build { unit_type, at } => {
                write!(f, "build {} {}", unit_type.letter(), at)
            }
            OrderSpec::Waive => f.write_str("waive"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Province;

    #[test]
    fn successful_means_empty() {
        let mut order = Order::new(OrderKind::Hold);
        assert!(order.successful());
        order.add_result(ResultTag::Bounced);
        assert!(!order.successful());
        // Adding again changes nothing.
        order.add_result(ResultTag::Bounced);
        assert_eq!(order.results().iter().count(), 1);
    }

    #[test]
    fn result_set_operations() {
        let mut set = ResultSet::default();
        assert!(set.is_empty());
        set.insert(ResultTag::Cut);
        set.insert(ResultTag::Dislodged);
        assert!(set.contains(ResultTag::Cut));
        assert!(!set.contains(ResultTag::Bounced));
        set.remove(ResultTag::Cut);
        assert!(!set.contains(ResultTag::Cut));
        assert!(set.contains(ResultTag::Dislodged));
    }

    #[test]
    fn at_worst_bounced() {
        let mut set = ResultSet::default();
        assert!(set.at_worst(ResultTag::Bounced));
        set.insert(ResultTag::Bounced);
        assert!(set.at_worst(ResultTag::Bounced));
        set.insert(ResultTag::Dislodged);
        assert!(!set.at_worst(ResultTag::Bounced));
    }

    #[test]
    fn spec_display() {
        let spec = OrderSpec::move_to(Province::Vie, Province::Tyr);
        assert_eq!(spec.to_string(), "vie - tyr");
        let spec = OrderSpec::convoy(Province::Nth, Province::Lon, Province::Nwy);
        assert_eq!(spec.to_string(), "nth convoy lon - nwy");
        assert_eq!(OrderSpec::waive().to_string(), "waive");
    }

    #[test]
    fn result_set_display() {
        let mut set = ResultSet::default();
        set.insert(ResultTag::Bounced);
        set.insert(ResultTag::ConvoyAttacked);
        assert_eq!(set.to_string(), "bounced, convoy attacked");
    }
}
