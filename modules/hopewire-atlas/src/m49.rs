//! Bundled UN M49 code table: code → name, hierarchy level, parent code.
//!
//! This is the static parent-inference table the resolver walks when a code
//! referenced by an analysis result is missing from the store. Codes absent
//! from both the store and this table are kept as raw links with no name.

use std::collections::HashMap;
use std::sync::OnceLock;

use hopewire_common::{GeoLevel, Location, WORLD_CODE};

#[derive(Debug, Clone, Copy)]
pub struct M49Entry {
    pub code: u32,
    pub name: &'static str,
    pub level: GeoLevel,
    pub parent: Option<u32>,
}

const fn world(code: u32, name: &'static str) -> M49Entry {
    M49Entry {
        code,
        name,
        level: GeoLevel::World,
        parent: None,
    }
}

const fn continent(code: u32, name: &'static str) -> M49Entry {
    M49Entry {
        code,
        name,
        level: GeoLevel::Continent,
        parent: Some(WORLD_CODE),
    }
}

const fn region(code: u32, name: &'static str, parent: u32) -> M49Entry {
    M49Entry {
        code,
        name,
        level: GeoLevel::Region,
        parent: Some(parent),
    }
}

const fn country(code: u32, name: &'static str, parent: u32) -> M49Entry {
    M49Entry {
        code,
        name,
        level: GeoLevel::Country,
        parent: Some(parent),
    }
}

#[rustfmt::skip]
static TABLE: &[M49Entry] = &[
    world(1, "World"),

    continent(2,   "Africa"),
    continent(9,   "Oceania"),
    continent(19,  "Americas"),
    continent(142, "Asia"),
    continent(150, "Europe"),

    // Africa
    region(15, "Northern Africa", 2),
    region(11, "Western Africa",  2),
    region(17, "Middle Africa",   2),
    region(14, "Eastern Africa",  2),
    region(18, "Southern Africa", 2),
    // Americas
    region(21, "Northern America", 19),
    region(13, "Central America",  19),
    region(29, "Caribbean",        19),
    region(5,  "South America",    19),
    // Asia
    region(30,  "Eastern Asia",       142),
    region(34,  "Southern Asia",      142),
    region(35,  "South-eastern Asia", 142),
    region(143, "Central Asia",       142),
    region(145, "Western Asia",       142),
    // Europe
    region(39,  "Southern Europe", 150),
    region(151, "Eastern Europe",  150),
    region(154, "Northern Europe", 150),
    region(155, "Western Europe",  150),
    // Oceania
    region(53, "Australia and New Zealand", 9),
    region(54, "Melanesia",                 9),
    region(57, "Micronesia",                9),
    region(61, "Polynesia",                 9),

    // Northern Africa
    country(12,  "Algeria", 15),
    country(818, "Egypt",   15),
    country(434, "Libya",   15),
    country(504, "Morocco", 15),
    country(729, "Sudan",   15),
    country(788, "Tunisia", 15),
    // Western Africa
    country(384, "Côte d'Ivoire", 11),
    country(288, "Ghana",         11),
    country(466, "Mali",          11),
    country(566, "Nigeria",       11),
    country(686, "Senegal",       11),
    // Middle Africa
    country(24,  "Angola",                           17),
    country(120, "Cameroon",                         17),
    country(180, "Democratic Republic of the Congo", 17),
    // Eastern Africa
    country(231, "Ethiopia",   14),
    country(404, "Kenya",      14),
    country(450, "Madagascar", 14),
    country(508, "Mozambique", 14),
    country(646, "Rwanda",     14),
    country(800, "Uganda",     14),
    country(834, "United Republic of Tanzania", 14),
    country(894, "Zambia",     14),
    country(716, "Zimbabwe",   14),
    // Southern Africa
    country(72,  "Botswana",     18),
    country(516, "Namibia",      18),
    country(710, "South Africa", 18),
    // Northern America
    country(124, "Canada",                   21),
    country(840, "United States of America", 21),
    // Central America
    country(188, "Costa Rica", 13),
    country(320, "Guatemala",  13),
    country(484, "Mexico",     13),
    country(591, "Panama",     13),
    // Caribbean
    country(192, "Cuba",               29),
    country(214, "Dominican Republic", 29),
    country(332, "Haiti",              29),
    country(388, "Jamaica",            29),
    // South America
    country(32,  "Argentina", 5),
    country(68,  "Bolivia",   5),
    country(76,  "Brazil",    5),
    country(152, "Chile",     5),
    country(170, "Colombia",  5),
    country(218, "Ecuador",   5),
    country(600, "Paraguay",  5),
    country(604, "Peru",      5),
    country(858, "Uruguay",   5),
    country(862, "Venezuela", 5),
    // Eastern Asia
    country(156, "China",    30),
    country(392, "Japan",    30),
    country(496, "Mongolia", 30),
    country(408, "Democratic People's Republic of Korea", 30),
    country(410, "Republic of Korea", 30),
    // Southern Asia
    country(4,   "Afghanistan", 34),
    country(50,  "Bangladesh",  34),
    country(356, "India",       34),
    country(364, "Iran",        34),
    country(524, "Nepal",       34),
    country(586, "Pakistan",    34),
    country(144, "Sri Lanka",   34),
    // South-eastern Asia
    country(116, "Cambodia",    35),
    country(360, "Indonesia",   35),
    country(418, "Lao People's Democratic Republic", 35),
    country(458, "Malaysia",    35),
    country(104, "Myanmar",     35),
    country(608, "Philippines", 35),
    country(702, "Singapore",   35),
    country(764, "Thailand",    35),
    country(704, "Viet Nam",    35),
    // Central Asia
    country(398, "Kazakhstan", 143),
    country(860, "Uzbekistan", 143),
    // Western Asia
    country(51,  "Armenia",              145),
    country(31,  "Azerbaijan",           145),
    country(268, "Georgia",              145),
    country(368, "Iraq",                 145),
    country(376, "Israel",               145),
    country(400, "Jordan",               145),
    country(422, "Lebanon",              145),
    country(275, "State of Palestine",   145),
    country(682, "Saudi Arabia",         145),
    country(792, "Türkiye",              145),
    country(784, "United Arab Emirates", 145),
    country(887, "Yemen",                145),
    // Southern Europe
    country(191, "Croatia",  39),
    country(300, "Greece",   39),
    country(380, "Italy",    39),
    country(620, "Portugal", 39),
    country(688, "Serbia",   39),
    country(724, "Spain",    39),
    // Eastern Europe
    country(112, "Belarus",             151),
    country(100, "Bulgaria",            151),
    country(203, "Czechia",             151),
    country(348, "Hungary",             151),
    country(498, "Republic of Moldova", 151),
    country(616, "Poland",              151),
    country(642, "Romania",             151),
    country(643, "Russian Federation",  151),
    country(703, "Slovakia",            151),
    country(804, "Ukraine",             151),
    // Northern Europe
    country(208, "Denmark",        154),
    country(233, "Estonia",        154),
    country(246, "Finland",        154),
    country(352, "Iceland",        154),
    country(372, "Ireland",        154),
    country(428, "Latvia",         154),
    country(440, "Lithuania",      154),
    country(578, "Norway",         154),
    country(752, "Sweden",         154),
    country(826, "United Kingdom", 154),
    // Western Europe
    country(40,  "Austria",     155),
    country(56,  "Belgium",     155),
    country(250, "France",      155),
    country(276, "Germany",     155),
    country(442, "Luxembourg",  155),
    country(528, "Netherlands", 155),
    country(756, "Switzerland", 155),
    // Oceania
    country(36,  "Australia",   53),
    country(554, "New Zealand", 53),
    country(242, "Fiji",             54),
    country(598, "Papua New Guinea", 54),
    country(583, "Micronesia (Federated States of)", 57),
    country(882, "Samoa", 61),
    country(776, "Tonga", 61),
];

fn index() -> &'static HashMap<u32, &'static M49Entry> {
    static INDEX: OnceLock<HashMap<u32, &'static M49Entry>> = OnceLock::new();
    INDEX.get_or_init(|| TABLE.iter().map(|e| (e.code, e)).collect())
}

pub fn m49_entry(code: u32) -> Option<&'static M49Entry> {
    index().get(&code).copied()
}

/// Full chain for a known code, root (World) first, the code itself last.
/// None if the code is not in the table.
pub fn ancestry(code: u32) -> Option<Vec<&'static M49Entry>> {
    let mut chain = Vec::new();
    let mut current = m49_entry(code)?;
    chain.push(current);
    while let Some(parent_code) = current.parent {
        // Table integrity: every parent referenced by an entry is present.
        current = m49_entry(parent_code)?;
        chain.push(current);
    }
    chain.reverse();
    Some(chain)
}

/// Presentation metadata for the top of the hierarchy.
fn emoji_for(code: u32) -> Option<&'static str> {
    match code {
        1 => Some("🌐"),
        2 => Some("🌍"),
        9 => Some("🌏"),
        19 => Some("🌎"),
        142 => Some("🌏"),
        150 => Some("🌍"),
        _ => None,
    }
}

impl M49Entry {
    pub fn to_location(&self) -> Location {
        Location {
            code: self.code,
            name: self.name.to_string(),
            level: self.level,
            parent_code: self.parent,
            emoji: emoji_for(self.code).map(str::to_string),
            aliases: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vietnam_chain_walks_to_world() {
        let chain = ancestry(704).unwrap();
        let codes: Vec<u32> = chain.iter().map(|e| e.code).collect();
        assert_eq!(codes, vec![1, 142, 35, 704]);
        assert_eq!(chain[3].name, "Viet Nam");
        assert_eq!(chain[3].level, GeoLevel::Country);
        assert_eq!(chain[0].level, GeoLevel::World);
    }

    #[test]
    fn unknown_code_has_no_ancestry() {
        assert!(m49_entry(9999).is_none());
        assert!(ancestry(9999).is_none());
    }

    #[test]
    fn every_parent_reference_is_in_the_table() {
        for entry in TABLE {
            if let Some(parent) = entry.parent {
                assert!(
                    m49_entry(parent).is_some(),
                    "code {} references missing parent {}",
                    entry.code,
                    parent
                );
            }
        }
    }

    #[test]
    fn every_non_root_chain_terminates_at_world() {
        for entry in TABLE {
            let chain = ancestry(entry.code).unwrap();
            assert_eq!(chain[0].code, WORLD_CODE, "code {}", entry.code);
        }
    }

    #[test]
    fn codes_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for entry in TABLE {
            assert!(seen.insert(entry.code), "duplicate code {}", entry.code);
        }
    }
}
