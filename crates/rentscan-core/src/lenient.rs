//! Forgiving deserializers for the places where vision models routinely
//! drift from the prompt contract (numbers as strings, empty dates).

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

fn to_i64<E: de::Error>(value: &Value) -> Result<i64, E> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(f as i64),
                _ => Err(E::custom(format!("expected an integer, got {n}"))),
            }
        }
        Value::String(s) => {
            let digits: String = s.trim().chars().filter(|c| *c != ',').collect();
            digits
                .parse::<i64>()
                .map_err(|_| E::custom(format!("expected an integer, got {s:?}")))
        }
        other => Err(E::custom(format!("expected an integer, got {other}"))),
    }
}

fn to_f64<E: de::Error>(value: &Value) -> Result<f64, E> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| E::custom(format!("expected a number, got {n}"))),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| E::custom(format!("expected a number, got {s:?}"))),
        other => Err(E::custom(format!("expected a number, got {other}"))),
    }
}

/// Number that may arrive as `0.95` or `"0.95"`.
pub fn float<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    to_f64(&value)
}

/// Optional number; `null` and `""` map to `None`.
pub fn opt_float<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    match &value {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        _ => to_f64(&value).map(Some),
    }
}

/// Integer that may arrive as `45234`, `45234.0` or `"45,234"`.
pub fn int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    to_i64(&value)
}

/// Non-negative count; `null` counts as zero.
pub fn count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(0);
    }
    let n = to_i64::<D::Error>(&value)?;
    u32::try_from(n).map_err(|_| de::Error::custom(format!("expected a count, got {n}")))
}

/// Tally map such as `{"scratch": 2, "dent": "1"}`. `null` is an empty map;
/// entries whose value is not a count are dropped.
pub fn count_map<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<String, u32>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let object = match value {
        Value::Null => return Ok(BTreeMap::new()),
        Value::Object(object) => object,
        other => return Err(de::Error::custom(format!("expected a map of counts, got {other}"))),
    };
    let mut counts = BTreeMap::new();
    for (key, value) in object {
        let n = if value.is_null() {
            Some(0)
        } else {
            to_i64::<serde_json::Error>(&value)
                .ok()
                .and_then(|n| u32::try_from(n).ok())
        };
        match n {
            Some(n) => {
                counts.insert(key, n);
            }
            None => debug!(key = %key, value = %value, "dropping non-count tally entry"),
        }
    }
    Ok(counts)
}

/// Optional integer; `null` and `""` map to `None`.
pub fn opt_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    match &value {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        _ => to_i64(&value).map(Some),
    }
}

/// Optional ISO date; `null` and `""` map to `None`, anything else must be `YYYY-MM-DD`.
pub fn opt_date<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error> {
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|e| de::Error::custom(format!("invalid date {s:?}: {e}"))),
    }
}
