use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Wire spelling of "no bound".
pub const INDEFINITE: &str = "INDEFINITE";

/// A count or millisecond duration that may be declared unbounded.
///
/// `Indefinite` is distinct from the field being absent: an absent field is
/// `None` on the enclosing `Option<Limit>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Limit {
    Indefinite,
    Finite(u64),
}

impl Limit {
    pub fn finite(&self) -> Option<u64> {
        match self {
            Limit::Indefinite => None,
            Limit::Finite(n) => Some(*n),
        }
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Limit::Indefinite => f.write_str(INDEFINITE),
            Limit::Finite(n) => write!(f, "{}", n),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected \"INDEFINITE\" or a non-negative integer, got {0:?}")]
pub struct ParseLimitError(pub String);

impl FromStr for Limit {
    type Err = ParseLimitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // the sentinel token is case-sensitive
        if s == INDEFINITE {
            return Ok(Limit::Indefinite);
        }
        s.trim()
            .parse::<u64>()
            .map(Limit::Finite)
            .map_err(|_| ParseLimitError(s.to_string()))
    }
}

impl From<u64> for Limit {
    fn from(n: u64) -> Self {
        Limit::Finite(n)
    }
}

impl Serialize for Limit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Limit::Indefinite => serializer.serialize_str(INDEFINITE),
            Limit::Finite(n) => serializer.serialize_u64(*n),
        }
    }
}

struct LimitVisitor;

impl<'de> Visitor<'de> for LimitVisitor {
    type Value = Limit;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("\"INDEFINITE\" or a non-negative integer")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Limit, E> {
        Ok(Limit::Finite(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Limit, E> {
        u64::try_from(v)
            .map(Limit::Finite)
            .map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Limit, E> {
        v.parse().map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Limit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(LimitVisitor)
    }
}
