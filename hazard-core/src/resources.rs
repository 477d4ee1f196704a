//! Emergency resource reference data.
//!
//! A static table, not pipeline logic: consulted only when an assessment
//! comes back High-Risk or Critical. Entries are matched by lower-cased
//! substring so provider spellings like "Mumbai, IN" still resolve.

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct CityResources {
    pub city: &'static str,
    pub hospitals: &'static [&'static str],
    pub shelters: &'static [&'static str],
}

static RESOURCES: &[CityResources] = &[
    CityResources {
        city: "mumbai",
        hospitals: &[
            "🏥 KEM Hospital - 022-24107000",
            "🏥 Lilavati Hospital - 022-26567891",
            "🏥 Hinduja Hospital - 022-24447000",
        ],
        shelters: &[
            "🏠 BMC Schools (Multiple)",
            "🏠 Community Halls",
            "🏠 Sports Complexes",
        ],
    },
    CityResources {
        city: "delhi",
        hospitals: &[
            "🏥 AIIMS Delhi - 011-26588500",
            "🏥 Safdarjung Hospital - 011-26165060",
            "🏥 RML Hospital - 011-23365525",
        ],
        shelters: &[
            "🏠 Government Schools",
            "🏠 Community Centers - Karol Bagh",
            "🏠 Sports Complex - Dwarka",
        ],
    },
    CityResources {
        city: "chennai",
        hospitals: &[
            "🏥 Apollo Hospital - 044-28296000",
            "🏥 Stanley Medical - 044-25281351",
            "🏥 Rajiv Gandhi Govt - 044-25912121",
        ],
        shelters: &[
            "🏠 Corporation Schools",
            "🏠 Kalyana Mandapams",
            "🏠 Community Halls",
        ],
    },
    CityResources {
        city: "kolkata",
        hospitals: &[
            "🏥 SSKM Hospital - 033-22041000",
            "🏥 Medical College - 033-22413077",
            "🏥 Apollo Gleneagles - 033-23203040",
        ],
        shelters: &["🏠 Municipality Schools", "🏠 Relief Centers"],
    },
    CityResources {
        city: "bangalore",
        hospitals: &[
            "🏥 Victoria Hospital - 080-26700301",
            "🏥 St Johns Hospital - 080-25532979",
            "🏥 Manipal Hospital - 080-25021000",
        ],
        shelters: &["🏠 Government Schools", "🏠 Community Halls"],
    },
];

/// Look a city up by lower-cased substring match.
pub fn for_city(city: &str) -> Option<&'static CityResources> {
    let lower = city.to_lowercase();
    RESOURCES.iter().find(|r| lower.contains(r.city))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_city_matches_case_insensitively() {
        let res = for_city("MUMBAI").expect("mumbai is in the table");
        assert!(!res.hospitals.is_empty());
        assert!(!res.shelters.is_empty());
    }

    #[test]
    fn provider_qualified_name_still_matches() {
        assert!(for_city("Delhi, IN").is_some());
    }

    #[test]
    fn unknown_city_has_no_entry() {
        assert!(for_city("Atlantis").is_none());
    }
}
