//! The connectivity graph consumed by the adjudicator.
//!
//! A [`Map`] is read-only once built. Construction goes through
//! [`MapBuilder`]; the adjudication core never loads map definitions itself.

use std::collections::VecDeque;

use crate::error::MapError;

use super::area::{Area, AreaId, Location, UnitType};
use super::province::{Coast, Province, PROVINCE_COUNT};

/// An immutable board graph: typed areas with per-type connections, plus a
/// derived province-level adjacency used for breadth-first traversal.
pub struct Map {
    areas: Vec<Area>,
    by_province: Vec<Vec<AreaId>>,
    neighbours: Vec<Vec<Province>>,
}

/// Assembles a [`Map`] from areas and undirected connections.
#[derive(Default)]
pub struct MapBuilder {
    areas: Vec<Area>,
}

impl MapBuilder {
    pub fn new() -> Self {
        MapBuilder::default()
    }

    /// Adds an area and returns its id.
    pub fn add_area(&mut self, province: Province, unit_type: UnitType, coast: Coast) -> AreaId {
        let id = AreaId(self.areas.len() as u16);
        self.areas.push(Area { province, unit_type, coast, connections: Vec::new() });
        id
    }

    /// Connects two areas in both directions.
    pub fn connect(&mut self, a: AreaId, b: AreaId) {
        if !self.areas[a.index()].connections.contains(&b) {
            self.areas[a.index()].connections.push(b);
        }
        if !self.areas[b.index()].connections.contains(&a) {
            self.areas[b.index()].connections.push(a);
        }
    }

    /// Freezes the graph, deriving the per-province indexes.
    pub fn finish(self) -> Map {
        let mut by_province: Vec<Vec<AreaId>> = vec![Vec::new(); PROVINCE_COUNT];
        for (i, area) in self.areas.iter().enumerate() {
            by_province[area.province as usize].push(AreaId(i as u16));
        }

        let mut neighbours: Vec<Vec<Province>> = vec![Vec::new(); PROVINCE_COUNT];
        for area in &self.areas {
            for conn in &area.connections {
                let there = self.areas[conn.index()].province;
                if there != area.province && !neighbours[area.province as usize].contains(&there) {
                    neighbours[area.province as usize].push(there);
                }
            }
        }
        for list in &mut neighbours {
            list.sort();
        }

        Map { areas: self.areas, by_province, neighbours }
    }
}

impl Map {
    /// The area behind an id.
    pub fn area(&self, id: AreaId) -> &Area {
        &self.areas[id.index()]
    }

    /// Total number of areas.
    pub fn area_count(&self) -> usize {
        self.areas.len()
    }

    /// All areas of a province.
    pub fn areas_in(&self, province: Province) -> &[AreaId] {
        &self.by_province[province as usize]
    }

    /// The areas of a province a given unit type may occupy.
    pub fn areas_for(
        &self,
        province: Province,
        unit_type: UnitType,
    ) -> impl Iterator<Item = AreaId> + '_ {
        self.areas_in(province)
            .iter()
            .copied()
            .filter(move |id| self.area(*id).unit_type == unit_type)
    }

    /// The area of a province matching type and coast exactly.
    pub fn find_area(
        &self,
        province: Province,
        unit_type: UnitType,
        coast: Coast,
    ) -> Option<AreaId> {
        self.areas_for(province, unit_type)
            .find(|id| self.area(*id).coast == coast)
    }

    /// Resolves a location to the area a unit of the given type would stand
    /// in. A missing coast specifier is accepted when the province has a
    /// single area of that type; otherwise the location is ambiguous and
    /// `None` is returned.
    pub fn locate(&self, unit_type: UnitType, location: Location) -> Option<AreaId> {
        if location.coast != Coast::None {
            return self.find_area(location.province, unit_type, location.coast);
        }
        let mut candidates = self.areas_for(location.province, unit_type);
        let first = candidates.next()?;
        match candidates.next() {
            Option::None => Some(first),
            Some(_) => Option::None,
        }
    }

    /// Parses a textual location of the form `"mun"` or `"stp/nc"`.
    pub fn parse_location(&self, text: &str) -> Result<Location, MapError> {
        let text = text.trim().to_ascii_lowercase();
        let (prov, coast) = match text.split_once('/') {
            Some((p, c)) => (p, c),
            Option::None => (text.as_str(), ""),
        };
        let province = Province::from_abbr(prov)
            .ok_or_else(|| MapError::UnknownProvince(prov.to_string()))?;
        let coast =
            Coast::from_abbr(coast).ok_or_else(|| MapError::UnknownCoast(coast.to_string()))?;
        Ok(Location { province, coast })
    }

    /// The areas reachable from `id` in one step.
    pub fn connections(&self, id: AreaId) -> &[AreaId] {
        &self.areas[id.index()].connections
    }

    /// True if `from` connects directly to `to`.
    pub fn connected(&self, from: AreaId, to: AreaId) -> bool {
        self.connections(from).contains(&to)
    }

    /// The provinces a piece somewhere in `from` could touch, regardless of
    /// unit type.
    pub fn adjacent_provinces(&self, province: Province) -> &[Province] {
        &self.neighbours[province as usize]
    }

    /// Breadth-first traversal over provinces, yielding `(province,
    /// distance)` pairs in nondecreasing distance order, starting at
    /// distance 0 with `from` itself. Finite: every province is yielded at
    /// most once.
    pub fn breadth_first(&self, from: Province) -> BreadthFirst<'_> {
        let mut visited = [false; PROVINCE_COUNT];
        visited[from as usize] = true;
        let mut queue = VecDeque::new();
        queue.push_back((from, 0));
        BreadthFirst { map: self, queue, visited }
    }

    /// Distance from `from` to the nearest province satisfying `pred`.
    pub fn distance_where<F>(&self, from: Province, pred: F) -> Option<u32>
    where
        F: Fn(Province) -> bool,
    {
        self.breadth_first(from)
            .find(|(p, _)| pred(*p))
            .map(|(_, d)| d)
    }
}

/// Iterator state for [`Map::breadth_first`].
pub struct BreadthFirst<'a> {
    map: &'a Map,
    queue: VecDeque<(Province, u32)>,
    visited: [bool; PROVINCE_COUNT],
}

impl Iterator for BreadthFirst<'_> {
    type Item = (Province, u32);

    fn next(&mut self) -> Option<(Province, u32)> {
        let (province, distance) = self.queue.pop_front()?;
        for &next in self.map.adjacent_provinces(province) {
            if !self.visited[next as usize] {
                self.visited[next as usize] = true;
                self.queue.push_back((next, distance + 1));
            }
        }
        Some((province, distance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::province::{Terrain, ALL_PROVINCES};

    #[test]
    fn builder_connects_both_ways() {
        let mut b = MapBuilder::new();
        let x = b.add_area(Province::Vie, UnitType::Army, Coast::None);
        let y = b.add_area(Province::Bud, UnitType::Army, Coast::None);
        b.connect(x, y);
        let map = b.finish();
        assert!(map.connected(x, y));
        assert!(map.connected(y, x));
        assert_eq!(map.adjacent_provinces(Province::Vie), &[Province::Bud]);
    }

    #[test]
    fn standard_map_area_shape() {
        let map = Map::standard();
        for p in ALL_PROVINCES {
            let armies = map.areas_for(p, UnitType::Army).count();
            let fleets = map.areas_for(p, UnitType::Fleet).count();
            match p.terrain() {
                Terrain::Inland => assert_eq!((armies, fleets), (1, 0), "{}", p),
                Terrain::Sea => assert_eq!((armies, fleets), (0, 1), "{}", p),
                Terrain::Coastal => {
                    assert_eq!(armies, 1, "{}", p);
                    let expected = p.coasts().len().max(1);
                    assert_eq!(fleets, expected, "{}", p);
                }
            }
        }
    }

    #[test]
    fn standard_map_connection_symmetry() {
        let map = Map::standard();
        for i in 0..map.area_count() {
            let id = AreaId(i as u16);
            for &conn in map.connections(id) {
                assert!(
                    map.connected(conn, id),
                    "{:?} -> {:?} not symmetric",
                    map.area(id).location(),
                    map.area(conn).location()
                );
            }
        }
    }

    #[test]
    fn standard_map_reachability_spot_checks() {
        let map = Map::standard();
        let army = |p| map.find_area(p, UnitType::Army, Coast::None).unwrap();
        let fleet = |p, c| map.find_area(p, UnitType::Fleet, c).unwrap();

        // Armies cross land borders.
        assert!(map.connected(army(Province::Vie), army(Province::Tyr)));
        assert!(map.connected(army(Province::Mos), army(Province::Stp)));
        // Armies never enter the sea.
        assert!(!map.connected(army(Province::Lon), fleet(Province::Nth, Coast::None)));
        // Fleet coasts are distinct nodes.
        assert!(map.connected(
            fleet(Province::Stp, Coast::South),
            fleet(Province::Bot, Coast::None)
        ));
        assert!(!map.connected(
            fleet(Province::Stp, Coast::North),
            fleet(Province::Bot, Coast::None)
        ));
        // Army-only borders carry no fleet edge.
        assert!(map.connected(army(Province::Edi), army(Province::Lvp)));
        assert!(!map.connected(
            fleet(Province::Edi, Coast::None),
            fleet(Province::Lvp, Coast::None)
        ));
    }

    #[test]
    fn breadth_first_distances() {
        let map = Map::standard();
        let from_mun: Vec<(Province, u32)> = map.breadth_first(Province::Mun).collect();
        assert_eq!(from_mun[0], (Province::Mun, 0));
        assert!(from_mun
            .iter()
            .any(|&(p, d)| p == Province::Boh && d == 1));
        // Every province is reachable on the standard map.
        assert_eq!(from_mun.len(), PROVINCE_COUNT);
        // Distances never decrease along the iteration.
        for pair in from_mun.windows(2) {
            assert!(pair[0].1 <= pair[1].1);
        }
    }

    #[test]
    fn locate_resolves_coasts() {
        let map = Map::standard();
        // Unambiguous without a coast.
        assert!(map
            .locate(UnitType::Fleet, Location::new(Province::Bre))
            .is_some());
        // Split coast requires a specifier for fleets.
        assert!(map
            .locate(UnitType::Fleet, Location::new(Province::Stp))
            .is_none());
        assert!(map
            .locate(
                UnitType::Fleet,
                Location::with_coast(Province::Stp, Coast::North)
            )
            .is_some());
        // Armies ignore coasts.
        assert!(map
            .locate(UnitType::Army, Location::new(Province::Stp))
            .is_some());
    }

    #[test]
    fn parse_location_forms() {
        let map = Map::standard();
        assert_eq!(
            map.parse_location("mun").unwrap(),
            Location::new(Province::Mun)
        );
        assert_eq!(
            map.parse_location("STP/NC").unwrap(),
            Location::with_coast(Province::Stp, Coast::North)
        );
        assert!(matches!(
            map.parse_location("xyz"),
            Err(MapError::UnknownProvince(_))
        ));
        assert!(matches!(
            map.parse_location("stp/zz"),
            Err(MapError::UnknownCoast(_))
        ));
    }
}
