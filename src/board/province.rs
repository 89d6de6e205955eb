//! Provinces, powers, and coast specifiers for the standard Diplomacy map.
//!
//! The 75 provinces are enumerated in alphabetical order of their 3-letter
//! abbreviation; `#[repr(u8)]` makes the discriminant usable as an index into
//! the compile-time metadata table.

use serde::{Deserialize, Serialize};

/// The number of provinces on the standard map.
pub const PROVINCE_COUNT: usize = 75;

/// A province on the standard Diplomacy map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Province {
    Adr = 0,  // Adriatic Sea
    Aeg = 1,  // Aegean Sea
    Alb = 2,  // Albania
    Ank = 3,  // Ankara
    Apu = 4,  // Apulia
    Arm = 5,  // Armenia
    Bal = 6,  // Baltic Sea
    Bar = 7,  // Barents Sea
    Bel = 8,  // Belgium
    Ber = 9,  // Berlin
    Bla = 10, // Black Sea
    Boh = 11, // Bohemia
    Bot = 12, // Gulf of Bothnia
    Bre = 13, // Brest
    Bud = 14, // Budapest
    Bul = 15, // Bulgaria
    Bur = 16, // Burgundy
    Cly = 17, // Clyde
    Con = 18, // Constantinople
    Den = 19, // Denmark
    Eas = 20, // Eastern Mediterranean
    Edi = 21, // Edinburgh
    Eng = 22, // English Channel
    Fin = 23, // Finland
    Gal = 24, // Galicia
    Gas = 25, // Gascony
    Gol = 26, // Gulf of Lyon
    Gre = 27, // Greece
    Hel = 28, // Heligoland Bight
    Hol = 29, // Holland
    Ion = 30, // Ionian Sea
    Iri = 31, // Irish Sea
    Kie = 32, // Kiel
    Lon = 33, // London
    Lvn = 34, // Livonia
    Lvp = 35, // Liverpool
    Mao = 36, // Mid-Atlantic Ocean
    Mar = 37, // Marseilles
    Mos = 38, // Moscow
    Mun = 39, // Munich
    Naf = 40, // North Africa
    Nao = 41, // North Atlantic Ocean
    Nap = 42, // Naples
    Nrg = 43, // Norwegian Sea
    Nth = 44, // North Sea
    Nwy = 45, // Norway
    Par = 46, // Paris
    Pic = 47, // Picardy
    Pie = 48, // Piedmont
    Por = 49, // Portugal
    Pru = 50, // Prussia
    Rom = 51, // Rome
    Ruh = 52, // Ruhr
    Rum = 53, // Rumania
    Ser = 54, // Serbia
    Sev = 55, // Sevastopol
    Sil = 56, // Silesia
    Ska = 57, // Skagerrak
    Smy = 58, // Smyrna
    Spa = 59, // Spain
    Stp = 60, // St. Petersburg
    Swe = 61, // Sweden
    Syr = 62, // Syria
    Tri = 63, // Trieste
    Tun = 64, // Tunisia
    Tus = 65, // Tuscany
    Tyr = 66, // Tyrolia
    Tys = 67, // Tyrrhenian Sea
    Ukr = 68, // Ukraine
    Ven = 69, // Venice
    Vie = 70, // Vienna
    Wal = 71, // Wales
    War = 72, // Warsaw
    Wes = 73, // Western Mediterranean
    Yor = 74, // Yorkshire
}

/// All provinces in discriminant order.
pub const ALL_PROVINCES: [Province; PROVINCE_COUNT] = [
    Province::Adr, Province::Aeg, Province::Alb, Province::Ank,
    Province::Apu, Province::Arm, Province::Bal, Province::Bar,
    Province::Bel, Province::Ber, Province::Bla, Province::Boh,
    Province::Bot, Province::Bre, Province::Bud, Province::Bul,
    Province::Bur, Province::Cly, Province::Con, Province::Den,
    Province::Eas, Province::Edi, Province::Eng, Province::Fin,
    Province::Gal, Province::Gas, Province::Gol, Province::Gre,
    Province::Hel, Province::Hol, Province::Ion, Province::Iri,
    Province::Kie, Province::Lon, Province::Lvn, Province::Lvp,
    Province::Mao, Province::Mar, Province::Mos, Province::Mun,
    Province::Naf, Province::Nao, Province::Nap, Province::Nrg,
    Province::Nth, Province::Nwy, Province::Par, Province::Pic,
    Province::Pie, Province::Por, Province::Pru, Province::Rom,
    Province::Ruh, Province::Rum, Province::Ser, Province::Sev,
    Province::Sil, Province::Ska, Province::Smy, Province::Spa,
    Province::Stp, Province::Swe, Province::Syr, Province::Tri,
    Province::Tun, Province::Tus, Province::Tyr, Province::Tys,
    Province::Ukr, Province::Ven, Province::Vie, Province::Wal,
    Province::War, Province::Wes, Province::Yor,
];

impl Province {
    /// The 3-letter lowercase abbreviation.
    pub const fn abbr(self) -> &'static str {
        META[self as usize].abbr
    }

    /// The display name, e.g. "Gulf of Bothnia".
    pub const fn name(self) -> &'static str {
        META[self as usize].name
    }

    /// The terrain kind: inland, sea, or coastal.
    pub const fn terrain(self) -> Terrain {
        META[self as usize].terrain
    }

    /// True if this province holds a supply centre.
    pub const fn is_supply_centre(self) -> bool {
        META[self as usize].supply
    }

    /// The power whose home supply centre this is, if any.
    pub const fn home_power(self) -> Option<Power> {
        META[self as usize].home
    }

    /// The named coasts of a split-coast province, empty otherwise.
    pub const fn coasts(self) -> &'static [Coast] {
        META[self as usize].coasts
    }

    /// Looks a province up by its 3-letter abbreviation.
    pub fn from_abbr(abbr: &str) -> Option<Province> {
        ALL_PROVINCES.iter().copied().find(|p| p.abbr() == abbr)
    }
}

impl std::fmt::Display for Province {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Terrain classification of a province.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terrain {
    Inland,
    Sea,
    Coastal,
}

/// Coast specifier distinguishing the fleet areas of a split-coast province.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Coast {
    None,
    North,
    South,
    East,
}

impl Coast {
    /// The 2-letter abbreviation, empty for `None`.
    pub const fn abbr(self) -> &'static str {
        match self {
            Coast::None => "",
            Coast::North => "nc",
            Coast::South => "sc",
            Coast::East => "ec",
        }
    }

    /// Parses a coast from its 2-letter abbreviation.
    pub fn from_abbr(s: &str) -> Option<Coast> {
        match s {
            "" => Some(Coast::None),
            "nc" => Some(Coast::North),
            "sc" => Some(Coast::South),
            "ec" => Some(Coast::East),
            _ => Option::None,
        }
    }
}

/// One of the seven great powers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Power {
    Austria = 0,
    England = 1,
    France = 2,
    Germany = 3,
    Italy = 4,
    Russia = 5,
    Turkey = 6,
}

/// All seven powers in standard order.
pub const ALL_POWERS: [Power; 7] = [
    Power::Austria,
    Power::England,
    Power::France,
    Power::Germany,
    Power::Italy,
    Power::Russia,
    Power::Turkey,
];

impl Power {
    /// The capitalised power name.
    pub const fn name(self) -> &'static str {
        match self {
            Power::Austria => "Austria",
            Power::England => "England",
            Power::France => "France",
            Power::Germany => "Germany",
            Power::Italy => "Italy",
            Power::Russia => "Russia",
            Power::Turkey => "Turkey",
        }
    }

    /// Parses a power by case-insensitive name.
    pub fn from_name(name: &str) -> Option<Power> {
        ALL_POWERS
            .iter()
            .copied()
            .find(|p| p.name().eq_ignore_ascii_case(name))
    }
}

impl std::fmt::Display for Power {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Static per-province metadata.
struct ProvinceMeta {
    abbr: &'static str,
    name: &'static str,
    terrain: Terrain,
    supply: bool,
    home: Option<Power>,
    coasts: &'static [Coast],
}

const fn inland(abbr: &'static str, name: &'static str) -> ProvinceMeta {
    ProvinceMeta { abbr, name, terrain: Terrain::Inland, supply: false, home: None, coasts: &[] }
}
const fn inland_sc(abbr: &'static str, name: &'static str, home: Option<Power>) -> ProvinceMeta {
    ProvinceMeta { abbr, name, terrain: Terrain::Inland, supply: true, home, coasts: &[] }
}
const fn sea(abbr: &'static str, name: &'static str) -> ProvinceMeta {
    ProvinceMeta { abbr, name, terrain: Terrain::Sea, supply: false, home: None, coasts: &[] }
}
const fn coastal(abbr: &'static str, name: &'static str) -> ProvinceMeta {
    ProvinceMeta { abbr, name, terrain: Terrain::Coastal, supply: false, home: None, coasts: &[] }
}
const fn coastal_sc(abbr: &'static str, name: &'static str, home: Option<Power>) -> ProvinceMeta {
    ProvinceMeta { abbr, name, terrain: Terrain::Coastal, supply: true, home, coasts: &[] }
}
const fn split_sc(
    abbr: &'static str,
    name: &'static str,
    home: Option<Power>,
    coasts: &'static [Coast],
) -> ProvinceMeta {
    ProvinceMeta { abbr, name, terrain: Terrain::Coastal, supply: true, home, coasts }
}

/// Metadata table, indexed by `Province as usize`.
static META: [ProvinceMeta; PROVINCE_COUNT] = [
    sea("adr", "Adriatic Sea"),
    sea("aeg", "Aegean Sea"),
    coastal("alb", "Albania"),
    coastal_sc("ank", "Ankara", Some(Power::Turkey)),
    coastal("apu", "Apulia"),
    coastal("arm", "Armenia"),
    sea("bal", "Baltic Sea"),
    sea("bar", "Barents Sea"),
    coastal_sc("bel", "Belgium", None),
    coastal_sc("ber", "Berlin", Some(Power::Germany)),
    sea("bla", "Black Sea"),
    inland("boh", "Bohemia"),
    sea("bot", "Gulf of Bothnia"),
    coastal_sc("bre", "Brest", Some(Power::France)),
    inland_sc("bud", "Budapest", Some(Power::Austria)),
    split_sc("bul", "Bulgaria", None, &[Coast::East, Coast::South]),
    inland("bur", "Burgundy"),
    coastal("cly", "Clyde"),
    coastal_sc("con", "Constantinople", Some(Power::Turkey)),
    coastal_sc("den", "Denmark", None),
    sea("eas", "Eastern Mediterranean"),
    coastal_sc("edi", "Edinburgh", Some(Power::England)),
    sea("eng", "English Channel"),
    coastal("fin", "Finland"),
    inland("gal", "Galicia"),
    coastal("gas", "Gascony"),
    sea("gol", "Gulf of Lyon"),
    coastal_sc("gre", "Greece", None),
    sea("hel", "Heligoland Bight"),
    coastal_sc("hol", "Holland", None),
    sea("ion", "Ionian Sea"),
    sea("iri", "Irish Sea"),
    coastal_sc("kie", "Kiel", Some(Power::Germany)),
    coastal_sc("lon", "London", Some(Power::England)),
    coastal("lvn", "Livonia"),
    coastal_sc("lvp", "Liverpool", Some(Power::England)),
    sea("mao", "Mid-Atlantic Ocean"),
    coastal_sc("mar", "Marseilles", Some(Power::France)),
    inland_sc("mos", "Moscow", Some(Power::Russia)),
    inland_sc("mun", "Munich", Some(Power::Germany)),
    coastal("naf", "North Africa"),
    sea("nao", "North Atlantic Ocean"),
    coastal_sc("nap", "Naples", Some(Power::Italy)),
    sea("nrg", "Norwegian Sea"),
    sea("nth", "North Sea"),
    coastal_sc("nwy", "Norway", None),
    inland_sc("par", "Paris", Some(Power::France)),
    coastal("pic", "Picardy"),
    coastal("pie", "Piedmont"),
    coastal_sc("por", "Portugal", None),
    coastal("pru", "Prussia"),
    coastal_sc("rom", "Rome", Some(Power::Italy)),
    inland("ruh", "Ruhr"),
    coastal_sc("rum", "Rumania", None),
    inland_sc("ser", "Serbia", None),
    coastal_sc("sev", "Sevastopol", Some(Power::Russia)),
    inland("sil", "Silesia"),
    sea("ska", "Skagerrak"),
    coastal_sc("smy", "Smyrna", Some(Power::Turkey)),
    split_sc("spa", "Spain", None, &[Coast::North, Coast::South]),
    split_sc("stp", "St. Petersburg", Some(Power::Russia), &[Coast::North, Coast::South]),
    coastal_sc("swe", "Sweden", None),
    coastal("syr", "Syria"),
    coastal_sc("tri", "Trieste", Some(Power::Austria)),
    coastal_sc("tun", "Tunisia", None),
    coastal("tus", "Tuscany"),
    inland("tyr", "Tyrolia"),
    sea("tys", "Tyrrhenian Sea"),
    inland("ukr", "Ukraine"),
    coastal_sc("ven", "Venice", Some(Power::Italy)),
    inland_sc("vie", "Vienna", Some(Power::Austria)),
    coastal("wal", "Wales"),
    inland_sc("war", "Warsaw", Some(Power::Russia)),
    sea("wes", "Western Mediterranean"),
    coastal("yor", "Yorkshire"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_are_sequential() {
        for (i, p) in ALL_PROVINCES.iter().enumerate() {
            assert_eq!(*p as usize, i, "{:?} out of order", p);
        }
    }

    #[test]
    fn thirty_four_supply_centres() {
        let count = ALL_PROVINCES.iter().filter(|p| p.is_supply_centre()).count();
        assert_eq!(count, 34);
    }

    #[test]
    fn terrain_counts() {
        let inland = ALL_PROVINCES.iter().filter(|p| p.terrain() == Terrain::Inland).count();
        let sea = ALL_PROVINCES.iter().filter(|p| p.terrain() == Terrain::Sea).count();
        let coastal = ALL_PROVINCES.iter().filter(|p| p.terrain() == Terrain::Coastal).count();
        assert_eq!((inland, sea, coastal), (14, 19, 42));
    }

    #[test]
    fn abbr_roundtrip() {
        for p in ALL_PROVINCES {
            assert_eq!(Province::from_abbr(p.abbr()), Some(p));
        }
        assert_eq!(Province::from_abbr("xyz"), None);
    }

    #[test]
    fn home_centre_counts() {
        for power in ALL_POWERS {
            let homes = ALL_PROVINCES
                .iter()
                .filter(|p| p.home_power() == Some(power))
                .count();
            let expected = if power == Power::Russia { 4 } else { 3 };
            assert_eq!(homes, expected, "{} has wrong home count", power);
        }
    }

    #[test]
    fn split_coast_provinces() {
        let split: Vec<Province> = ALL_PROVINCES
            .iter()
            .copied()
            .filter(|p| !p.coasts().is_empty())
            .collect();
        assert_eq!(split, vec![Province::Bul, Province::Spa, Province::Stp]);
    }

    #[test]
    fn home_centres_are_supply_centres() {
        for p in ALL_PROVINCES {
            if p.home_power().is_some() {
                assert!(p.is_supply_centre(), "{} is a home but not a centre", p);
            }
        }
    }

    #[test]
    fn power_name_roundtrip() {
        for power in ALL_POWERS {
            assert_eq!(Power::from_name(power.name()), Some(power));
            assert_eq!(Power::from_name(&power.name().to_lowercase()), Some(power));
        }
    }
}
