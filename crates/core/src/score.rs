//! Serde support for scores that may be infinite.
//!
//! Required items carry `f64::INFINITY`, which JSON cannot represent as a
//! number. Infinite scores are written as the string `"Infinity"` and read
//! back from either form.

use serde::{Deserialize, Deserializer, Serializer};

const INFINITY_LABEL: &str = "Infinity";

pub fn serialize<S>(score: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if score.is_infinite() && score.is_sign_positive() {
        serializer.serialize_str(INFINITY_LABEL)
    } else {
        serializer.serialize_f64(*score)
    }
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Label(String),
    }

    match Repr::deserialize(deserializer)? {
        Repr::Number(n) => Ok(n),
        Repr::Label(s) if s == INFINITY_LABEL => Ok(f64::INFINITY),
        Repr::Label(s) => Err(serde::de::Error::custom(format!(
            "expected a number or \"{INFINITY_LABEL}\", got \"{s}\""
        ))),
    }
}
