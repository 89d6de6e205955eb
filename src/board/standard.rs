//! Data for the standard Diplomacy map of Europe.
//!
//! The link tables below are undirected: each pair appears once and the
//! builder wires both directions. Army links join army areas, fleet lanes
//! join fleet areas (naming the coast where a split-coast province is
//! involved), and dual links join both kinds at once.
//!
//! `Map::standard` assembles the graph; `OPENING_UNITS` is the Spring 1901
//! position.

use std::sync::{Arc, LazyLock};

use super::area::{AreaId, UnitType};
use super::map::{Map, MapBuilder};
use super::province::{Coast, Power, Province, Terrain, ALL_PROVINCES, PROVINCE_COUNT};

use Coast::East as EC;
use Coast::None as N;
use Coast::North as NC;
use Coast::South as SC;
use Province::*;

/// Borders passable by armies only.
static ARMY_LINKS: [(Province, Province); 77] = [
    // Inland-to-inland.
    (Boh, Gal), (Boh, Mun), (Boh, Sil), (Boh, Tyr), (Boh, Vie),
    (Bud, Gal), (Bud, Vie), (Bur, Mun), (Bur, Par), (Bur, Ruh),
    (Gal, Sil), (Gal, Ukr), (Gal, Vie), (Gal, War), (Mos, Ukr),
    (Mos, War), (Mun, Ruh), (Mun, Sil), (Mun, Tyr), (Sil, War),
    (Tyr, Vie), (Ukr, War),
    // Inland-to-coastal.
    (Bud, Rum), (Bud, Ser), (Bud, Tri), (Bur, Bel), (Bur, Gas),
    (Bur, Mar), (Bur, Pic), (Gal, Rum), (Gas, Mar), (Mos, Lvn),
    (Mos, Sev), (Mos, Stp), (Mun, Ber), (Mun, Kie), (Par, Bre),
    (Par, Gas), (Par, Pic), (Ruh, Bel), (Ruh, Hol), (Ruh, Kie),
    (Ser, Alb), (Ser, Bul), (Ser, Gre), (Ser, Rum), (Ser, Tri),
    (Sil, Ber), (Sil, Pru), (Tyr, Pie), (Tyr, Tri), (Tyr, Ven),
    (Ukr, Rum), (Ukr, Sev), (Vie, Tri), (War, Lvn), (War, Pru),
    // Coastal-to-coastal where fleets cannot round the corner.
    (Edi, Lvp), (Fin, Nwy), (Pie, Ven), (Rom, Ven), (Smy, Arm),
    (Wal, Yor),
    // Coastal-to-split-coast (fleets use the coast lanes below).
    (Con, Bul), (Gre, Bul), (Rum, Bul), (Gas, Spa), (Mar, Spa),
    (Por, Spa), (Fin, Stp), (Lvn, Stp), (Nwy, Stp),
    // Coastal-to-coastal across different sea faces.
    (Ank, Smy), (Apu, Rom), (Lvp, Yor), (Tus, Ven), (Arm, Syr),
];

/// Borders passable by both armies and fleets (plain coastal pairs).
static DUAL_LINKS: [(Province, Province); 33] = [
    (Alb, Gre), (Alb, Tri), (Ank, Arm), (Ank, Con), (Apu, Nap),
    (Apu, Ven), (Bel, Hol), (Bel, Pic), (Ber, Kie), (Ber, Pru),
    (Bre, Gas), (Bre, Pic), (Cly, Edi), (Cly, Lvp), (Con, Smy),
    (Den, Kie), (Den, Swe), (Edi, Yor), (Fin, Swe), (Lon, Wal),
    (Lon, Yor), (Lvp, Wal), (Mar, Pie), (Naf, Tun), (Nwy, Swe),
    (Pie, Tus), (Pru, Lvn), (Rom, Nap), (Rom, Tus), (Sev, Arm),
    (Sev, Rum), (Smy, Syr), (Tri, Ven),
];

/// Lanes passable by fleets only, coast-qualified where split coasts apply.
static FLEET_LANES: [(Province, Coast, Province, Coast); 107] = [
    // Sea-to-sea.
    (Adr, N, Ion, N), (Aeg, N, Eas, N), (Aeg, N, Ion, N), (Bal, N, Bot, N),
    (Eng, N, Iri, N), (Eng, N, Mao, N), (Eng, N, Nth, N), (Gol, N, Tys, N),
    (Gol, N, Wes, N), (Hel, N, Nth, N), (Ion, N, Eas, N), (Ion, N, Tys, N),
    (Iri, N, Mao, N), (Iri, N, Nao, N), (Mao, N, Nao, N), (Mao, N, Wes, N),
    (Nao, N, Nrg, N), (Nth, N, Nrg, N), (Nth, N, Ska, N), (Nrg, N, Bar, N),
    (Tys, N, Wes, N),
    // Adriatic Sea.
    (Adr, N, Alb, N), (Adr, N, Apu, N), (Adr, N, Tri, N), (Adr, N, Ven, N),
    // Aegean Sea.
    (Aeg, N, Bul, SC), (Aeg, N, Con, N), (Aeg, N, Gre, N), (Aeg, N, Smy, N),
    // Baltic Sea.
    (Bal, N, Ber, N), (Bal, N, Den, N), (Bal, N, Kie, N), (Bal, N, Lvn, N),
    (Bal, N, Pru, N), (Bal, N, Swe, N),
    // Barents Sea.
    (Bar, N, Nwy, N), (Bar, N, Stp, NC),
    // Black Sea.
    (Bla, N, Ank, N), (Bla, N, Arm, N), (Bla, N, Bul, EC), (Bla, N, Con, N),
    (Bla, N, Rum, N), (Bla, N, Sev, N),
    // Gulf of Bothnia.
    (Bot, N, Fin, N), (Bot, N, Lvn, N), (Bot, N, Stp, SC), (Bot, N, Swe, N),
    // Eastern Mediterranean.
    (Eas, N, Smy, N), (Eas, N, Syr, N),
    // English Channel.
    (Eng, N, Bel, N), (Eng, N, Bre, N), (Eng, N, Lon, N), (Eng, N, Pic, N),
    (Eng, N, Wal, N),
    // Gulf of Lyon.
    (Gol, N, Mar, N), (Gol, N, Pie, N), (Gol, N, Spa, SC), (Gol, N, Tus, N),
    // Heligoland Bight.
    (Hel, N, Den, N), (Hel, N, Hol, N), (Hel, N, Kie, N),
    // Ionian Sea.
    (Ion, N, Alb, N), (Ion, N, Apu, N), (Ion, N, Gre, N), (Ion, N, Nap, N),
    (Ion, N, Tun, N),
    // Irish Sea.
    (Iri, N, Lvp, N), (Iri, N, Wal, N),
    // Mid-Atlantic Ocean.
    (Mao, N, Bre, N), (Mao, N, Gas, N), (Mao, N, Naf, N), (Mao, N, Por, N),
    (Mao, N, Spa, NC), (Mao, N, Spa, SC),
    // North Atlantic Ocean.
    (Nao, N, Cly, N), (Nao, N, Lvp, N),
    // North Sea.
    (Nth, N, Bel, N), (Nth, N, Den, N), (Nth, N, Edi, N), (Nth, N, Hol, N),
    (Nth, N, Lon, N), (Nth, N, Nwy, N), (Nth, N, Yor, N),
    // Norwegian Sea.
    (Nrg, N, Cly, N), (Nrg, N, Edi, N), (Nrg, N, Nwy, N),
    // Skagerrak.
    (Ska, N, Den, N), (Ska, N, Nwy, N), (Ska, N, Swe, N),
    // Tyrrhenian Sea.
    (Tys, N, Nap, N), (Tys, N, Rom, N), (Tys, N, Tun, N), (Tys, N, Tus, N),
    // Western Mediterranean.
    (Wes, N, Naf, N), (Wes, N, Spa, SC), (Wes, N, Tun, N),
    // Coastal lanes along split coasts.
    (Con, N, Bul, EC), (Con, N, Bul, SC), (Gre, N, Bul, SC), (Rum, N, Bul, EC),
    (Gas, N, Spa, NC), (Mar, N, Spa, SC), (Por, N, Spa, NC), (Por, N, Spa, SC),
    (Fin, N, Stp, SC), (Lvn, N, Stp, SC), (Nwy, N, Stp, NC),
];

/// The Spring 1901 units.
pub static OPENING_UNITS: [(Power, UnitType, Province, Coast); 22] = [
    (Power::Austria, UnitType::Army, Vie, N),
    (Power::Austria, UnitType::Army, Bud, N),
    (Power::Austria, UnitType::Fleet, Tri, N),
    (Power::England, UnitType::Fleet, Lon, N),
    (Power::England, UnitType::Fleet, Edi, N),
    (Power::England, UnitType::Army, Lvp, N),
    (Power::France, UnitType::Fleet, Bre, N),
    (Power::France, UnitType::Army, Par, N),
    (Power::France, UnitType::Army, Mar, N),
    (Power::Germany, UnitType::Fleet, Kie, N),
    (Power::Germany, UnitType::Army, Ber, N),
    (Power::Germany, UnitType::Army, Mun, N),
    (Power::Italy, UnitType::Fleet, Nap, N),
    (Power::Italy, UnitType::Army, Rom, N),
    (Power::Italy, UnitType::Army, Ven, N),
    (Power::Russia, UnitType::Fleet, Stp, SC),
    (Power::Russia, UnitType::Army, Mos, N),
    (Power::Russia, UnitType::Army, War, N),
    (Power::Russia, UnitType::Fleet, Sev, N),
    (Power::Turkey, UnitType::Fleet, Ank, N),
    (Power::Turkey, UnitType::Army, Con, N),
    (Power::Turkey, UnitType::Army, Smy, N),
];

/// The standard map is built once and shared.
static STANDARD: LazyLock<Arc<Map>> = LazyLock::new(|| Arc::new(build_standard()));

impl Map {
    /// The standard map of Europe.
    pub fn standard() -> Arc<Map> {
        Arc::clone(&STANDARD)
    }
}

fn build_standard() -> Map {
    let mut builder = MapBuilder::new();

    let mut army: [Option<AreaId>; PROVINCE_COUNT] = [None; PROVINCE_COUNT];
    let mut fleet: Vec<Vec<(Coast, AreaId)>> = vec![Vec::new(); PROVINCE_COUNT];

    for province in ALL_PROVINCES {
        match province.terrain() {
            Terrain::Inland => {
                army[province as usize] = Some(builder.add_area(province, UnitType::Army, N));
            }
            Terrain::Sea => {
                let id = builder.add_area(province, UnitType::Fleet, N);
                fleet[province as usize].push((N, id));
            }
            Terrain::Coastal => {
                army[province as usize] = Some(builder.add_area(province, UnitType::Army, N));
                if province.coasts().is_empty() {
                    let id = builder.add_area(province, UnitType::Fleet, N);
                    fleet[province as usize].push((N, id));
                } else {
                    for &coast in province.coasts() {
                        let id = builder.add_area(province, UnitType::Fleet, coast);
                        fleet[province as usize].push((coast, id));
                    }
                }
            }
        }
    }

    let army_area = |army: &[Option<AreaId>; PROVINCE_COUNT], province: Province| {
        army[province as usize]
            .unwrap_or_else(|| panic!("no army area in {}", province.abbr()))
    };
    let fleet_area = |fleet: &[Vec<(Coast, AreaId)>], province: Province, coast: Coast| {
        fleet[province as usize]
            .iter()
            .find(|(c, _)| *c == coast)
            .map(|(_, id)| *id)
            .unwrap_or_else(|| panic!("no fleet area {}/{}", province.abbr(), coast.abbr()))
    };

    for &(a, b) in &ARMY_LINKS {
        builder.connect(army_area(&army, a), army_area(&army, b));
    }
    for &(a, b) in &DUAL_LINKS {
        builder.connect(army_area(&army, a), army_area(&army, b));
        builder.connect(fleet_area(&fleet, a, N), fleet_area(&fleet, b, N));
    }
    for &(a, ca, b, cb) in &FLEET_LANES {
        builder.connect(fleet_area(&fleet, a, ca), fleet_area(&fleet, b, cb));
    }

    builder.finish()
}
