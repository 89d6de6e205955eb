//! Board model: provinces, areas, and the connectivity graph.
//!
//! The adjudication core consumes this module read-only. Graph construction
//! goes through [`MapBuilder`]; the standard map of Europe ships as
//! [`Map::standard`].

pub mod area;
pub mod map;
pub mod province;
pub mod standard;

pub use area::{Area, AreaId, Location, UnitType};
pub use map::{BreadthFirst, Map, MapBuilder};
pub use province::{Coast, Power, Province, Terrain, ALL_POWERS, ALL_PROVINCES, PROVINCE_COUNT};
