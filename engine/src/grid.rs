// ═══════════════════════════════════════════════════════════════════════
// Hex grid — cube coordinate math and board generation
// The board is a radius-bounded hexagonal region around the origin.
// ═══════════════════════════════════════════════════════════════════════

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A cell addressed by cube coordinates. Invariant: q + r + s = 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hex {
    pub q: i32,
    pub r: i32,
    pub s: i32,
}

/// The six cube-coordinate neighbor offsets, clockwise from east.
pub const DIRECTIONS: [(i32, i32, i32); 6] = [
    (1, 0, -1),
    (1, -1, 0),
    (0, -1, 1),
    (-1, 0, 1),
    (-1, 1, 0),
    (0, 1, -1),
];

impl Hex {
    pub fn new(q: i32, r: i32, s: i32) -> Hex {
        debug_assert_eq!(q + r + s, 0, "cube coordinates must sum to zero");
        Hex { q, r, s }
    }

    /// Build from axial coordinates (s derived).
    pub fn axial(q: i32, r: i32) -> Hex {
        Hex::new(q, r, -q - r)
    }

    pub fn neighbors(self) -> [Hex; 6] {
        DIRECTIONS.map(|(dq, dr, ds)| Hex::new(self.q + dq, self.r + dr, self.s + ds))
    }

    /// Cube distance (number of steps between two cells).
    pub fn distance(self, other: Hex) -> i32 {
        ((self.q - other.q).abs() + (self.r - other.r).abs() + (self.s - other.s).abs()) / 2
    }
}

// Hexes cross the wire as "q,r,s", which also works as a JSON map key.

impl fmt::Display for Hex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.q, self.r, self.s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid hex id {0:?}")]
pub struct ParseHexError(pub String);

impl FromStr for Hex {
    type Err = ParseHexError;

    fn from_str(text: &str) -> Result<Hex, ParseHexError> {
        let bad = || ParseHexError(text.to_string());
        let mut parts = text.split(',');
        let mut next = || -> Result<i32, ParseHexError> {
            parts.next().ok_or_else(bad)?.trim().parse().map_err(|_| bad())
        };
        let (q, r, s) = (next()?, next()?, next()?);
        if parts.next().is_some() || q + r + s != 0 {
            return Err(bad());
        }
        Ok(Hex { q, r, s })
    }
}

impl Serialize for Hex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct HexVisitor;

impl Visitor<'_> for HexVisitor {
    type Value = Hex;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a \"q,r,s\" cube coordinate string")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Hex, E> {
        value.parse().map_err(|_| E::invalid_value(de::Unexpected::Str(value), &self))
    }
}

impl<'de> Deserialize<'de> for Hex {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Hex, D::Error> {
        deserializer.deserialize_str(HexVisitor)
    }
}

/// Every hex within `radius` steps of the origin: 3r² + 3r + 1 cells.
pub fn generate(radius: i32) -> Vec<Hex> {
    let mut hexes = Vec::with_capacity((3 * radius * (radius + 1) + 1) as usize);
    for q in -radius..=radius {
        let lo = (-radius).max(-q - radius);
        let hi = radius.min(-q + radius);
        for r in lo..=hi {
            hexes.push(Hex::axial(q, r));
        }
    }
    hexes
}

/// Board radius scales with team count to keep per-team density roughly flat.
pub fn radius_for_teams(team_count: usize) -> i32 {
    if team_count <= 2 { 3 } else { 4 }
}
