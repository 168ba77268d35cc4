/// Datacenter locality table
use std::fmt;

/// Label returned for ids outside the table
pub const UNKNOWN_LOCALITY: &str = "Unknown";

/// Platform datacenter with its geographic locality
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Datacenter {
    pub id: i64,
    pub code: &'static str,
    pub city: &'static str,
    /// Omitted for city-states
    pub country: Option<&'static str>,
    pub iso_code: &'static str,
}

impl fmt::Display for Datacenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.code, self.city)?;
        if let Some(country) = self.country {
            write!(f, ", {}", country)?;
        }
        write!(f, ", {}", self.iso_code)
    }
}

const fn dc(
    id: i64,
    code: &'static str,
    city: &'static str,
    country: Option<&'static str>,
    iso_code: &'static str,
) -> Datacenter {
    Datacenter {
        id,
        code,
        city,
        country,
        iso_code,
    }
}

pub const DATACENTERS: [Datacenter; 15] = [
    dc(1, "MIA", "Miami", Some("USA"), "US"),
    dc(2, "AMS", "Amsterdam", Some("Netherlands"), "NL"),
    dc(3, "MBA", "Mumbai", Some("India"), "IN"),
    dc(4, "STO", "Stockholm", Some("Sweden"), "SE"),
    dc(5, "SIN", "Singapore", None, "SG"),
    dc(6, "LHR", "London", Some("United Kingdom"), "GB"),
    dc(7, "FRA", "Frankfurt", Some("Germany"), "DE"),
    dc(8, "JFK", "New York", Some("USA"), "US"),
    dc(9, "HKG", "Hong Kong", None, "HK"),
    dc(10, "TYO", "Tokyo", Some("Japan"), "JP"),
    dc(11, "SYD", "Sydney", Some("Australia"), "AU"),
    dc(12, "GRU", "São Paulo", Some("Brazil"), "BR"),
    dc(13, "DXB", "Dubai", Some("UAE"), "AE"),
    dc(14, "CDG", "Paris", Some("France"), "FR"),
    dc(15, "ICN", "Seoul", Some("South Korea"), "KR"),
];

/// Find a datacenter by id
pub fn lookup(dc_id: i64) -> Option<&'static Datacenter> {
    DATACENTERS.iter().find(|dc| dc.id == dc_id)
}

/// Locality label for a datacenter id; `"Unknown"` for absent or unlisted ids
pub fn locality(dc_id: Option<i64>) -> String {
    dc_id
        .and_then(lookup)
        .map(|dc| dc.to_string())
        .unwrap_or_else(|| UNKNOWN_LOCALITY.to_string())
}
