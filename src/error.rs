//! Error types.
//!
//! Order legality is never an error: illegal orders pick up result tags and
//! resolution carries on. The enums here cover the other channel — structural
//! and caller mistakes that are reported back so the caller can correct and
//! re-submit without corrupting the turn.

use thiserror::Error;

/// Errors from board-graph lookups and construction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MapError {
    #[error("unknown province '{0}'")]
    UnknownProvince(String),

    #[error("unknown coast '{0}'")]
    UnknownCoast(String),

    #[error("no {unit_type} area at '{location}'")]
    NoSuchArea { unit_type: String, location: String },
}

/// A single rejected order inside a submission batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderFailure {
    /// Display form of the offending order.
    pub order: String,
    /// Why it was rejected, one reason per failed rule.
    pub reasons: Vec<String>,
}

impl std::fmt::Display for OrderFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.order, self.reasons.join(", "))
    }
}

/// Errors raised while submitting a batch of orders.
///
/// Submission is all-or-nothing per power: when any of these is returned,
/// none of the batch has been attached to the turn.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("no unit at {0}")]
    NoSuchPiece(String),

    #[error("unit at {location} belongs to {owner}, not {submitter}")]
    ForeignPiece {
        location: String,
        owner: String,
        submitter: String,
    },

    #[error("no dislodged unit at {0}")]
    NoDislodgedPiece(String),

    #[error(transparent)]
    BadLocation(#[from] MapError),

    #[error("destination '{0}' is ambiguous, specify a coast")]
    AmbiguousLocation(String),

    #[error("unit at {0} already has an order")]
    AmbiguousConflict(String),

    #[error("order '{0}' is not legal in the {1} phase")]
    WrongPhase(String, &'static str),

    #[error("{} order(s) rejected: {}", .0.len(), .0.iter().map(|f| f.to_string()).collect::<Vec<_>>().join("; "))]
    Rejected(Vec<OrderFailure>),
}

/// Structural invariant violations.
///
/// These indicate a programmer error in the caller or the engine itself,
/// never an illegal order. They are recoverable: the turn they were raised
/// from keeps its invariants.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("province {province} already holds unit #{existing}, cannot place unit #{incoming}")]
    ProvinceOccupied {
        province: String,
        existing: u32,
        incoming: u32,
    },

    #[error("no unit with id #{0} on the board")]
    UnknownPiece(u32),

    #[error(transparent)]
    Map(#[from] MapError),
}
