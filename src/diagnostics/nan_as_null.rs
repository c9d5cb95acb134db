//! Serde adapter storing non-finite `f64` values as `null`
//!
//! JSON has no NaN; scores of a failed fit, NaN outputs and NaN selector
//! diagnostics would otherwise break a save/load round trip. The top-level
//! functions handle a single value; [`vec`] and [`columns`] apply the same
//! rule element-wise.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_finite() {
        serializer.serialize_some(value)
    } else {
        serializer.serialize_none()
    }
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

/// One `f64` carried through the adapter
#[derive(Clone, Copy, Debug, PartialEq)]
struct NanAsNull(f64);

impl Serialize for NanAsNull {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for NanAsNull {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize(deserializer).map(NanAsNull)
    }
}

fn wrap(values: &[f64]) -> Vec<NanAsNull> {
    values.iter().copied().map(NanAsNull).collect()
}

fn unwrap_all(values: Vec<NanAsNull>) -> Vec<f64> {
    values.into_iter().map(|v| v.0).collect()
}

/// Element-wise adapter for `Vec<f64>`
pub mod vec {
    use super::*;

    pub fn serialize<S: Serializer>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(values.iter().copied().map(NanAsNull))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
        Ok(unwrap_all(Vec::<NanAsNull>::deserialize(deserializer)?))
    }
}

/// Element-wise adapter for named columns `Vec<(String, Vec<f64>)>`
pub mod columns {
    use super::*;

    pub fn serialize<S: Serializer>(
        columns: &[(String, Vec<f64>)],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(columns.iter().map(|(name, values)| (name, wrap(values))))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<(String, Vec<f64>)>, D::Error> {
        let raw = Vec::<(String, Vec<NanAsNull>)>::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .map(|(name, values)| (name, unwrap_all(values)))
            .collect())
    }
}
