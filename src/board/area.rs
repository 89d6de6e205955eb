//! Typed placement slots within provinces.
//!
//! A province is not itself a node of the movement graph; its areas are. An
//! inland province carries one army area, a sea province one fleet area, and
//! a coastal province one army area plus one fleet area per coast (most have
//! a single unnamed coast; Bulgaria, Spain and St. Petersburg have two).

use serde::{Deserialize, Serialize};

use super::province::{Coast, Province};

/// The kind of a unit, which is also the kind of the areas it may occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitType {
    Army,
    Fleet,
}

impl UnitType {
    /// The single-letter abbreviation used in order notation.
    pub const fn letter(self) -> char {
        match self {
            UnitType::Army => 'A',
            UnitType::Fleet => 'F',
        }
    }
}

impl std::fmt::Display for UnitType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnitType::Army => f.write_str("army"),
            UnitType::Fleet => f.write_str("fleet"),
        }
    }
}

/// Index of an area within its [`Map`](super::Map).
///
/// Only meaningful together with the map that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AreaId(pub(crate) u16);

impl AreaId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// A placement slot: one typed node of the movement graph.
#[derive(Debug, Clone)]
pub struct Area {
    pub province: Province,
    pub unit_type: UnitType,
    pub coast: Coast,
    pub(crate) connections: Vec<AreaId>,
}

impl Area {
    /// The areas a piece standing here may move to.
    pub fn connections(&self) -> &[AreaId] {
        &self.connections
    }

    /// The province-plus-coast address of this area.
    pub fn location(&self) -> Location {
        Location { province: self.province, coast: self.coast }
    }
}

/// A board address: a province with an optional coast specifier.
///
/// This is how the outside world names places; the map resolves a location
/// plus a unit type to a concrete [`AreaId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub province: Province,
    pub coast: Coast,
}

impl Location {
    /// A location with no coast specifier.
    pub fn new(province: Province) -> Self {
        Location { province, coast: Coast::None }
    }

    /// A location naming a specific coast.
    pub fn with_coast(province: Province, coast: Coast) -> Self {
        Location { province, coast }
    }
}

impl From<Province> for Location {
    fn from(province: Province) -> Self {
        Location::new(province)
    }
}

impl From<(Province, Coast)> for Location {
    fn from((province, coast): (Province, Coast)) -> Self {
        Location { province, coast }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.coast == Coast::None {
            write!(f, "{}", self.province.abbr())
        } else {
            write!(f, "{}/{}", self.province.abbr(), self.coast.abbr())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_display() {
        assert_eq!(Location::new(Province::Vie).to_string(), "vie");
        assert_eq!(
            Location::with_coast(Province::Stp, Coast::North).to_string(),
            "stp/nc"
        );
    }

    #[test]
    fn unit_type_letters() {
        assert_eq!(UnitType::Army.letter(), 'A');
        assert_eq!(UnitType::Fleet.letter(), 'F');
    }
}
