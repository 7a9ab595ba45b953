//! Serde helper modules for wire formats the backend expects.

/// Serialize a `DateTime<Utc>` as epoch milliseconds (and back).
///
/// Usage: `#[serde(with = "crate::shared::serde_util::timestamp_ms")]`
pub mod timestamp_ms {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(date.timestamp_millis())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let ms = i64::deserialize(deserializer)?;
        DateTime::from_timestamp_millis(ms)
            .ok_or_else(|| serde::de::Error::custom(format!("timestamp out of range: {}", ms)))
    }
}

/// Serialize a `bool` as the strings `"true"` / `"false"` (and back).
///
/// The legacy session slots store flags as strings, so the persisted document
/// keeps that shape.
pub mod bool_str {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(if *value { "true" } else { "false" })
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(s == "true")
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize)]
    struct Stamped {
        #[serde(with = "super::timestamp_ms")]
        at: DateTime<Utc>,
    }

    #[derive(Serialize, Deserialize)]
    struct Flagged {
        #[serde(with = "super::bool_str")]
        connected: bool,
    }

    #[test]
    fn test_timestamp_ms_round_trip() {
        let at = Utc.with_ymd_and_hms(2024, 5, 17, 12, 30, 45).unwrap();
        let json = serde_json::to_string(&Stamped { at }).unwrap();
        assert_eq!(json, format!("{{\"at\":{}}}", at.timestamp_millis()));
        let back: Stamped = serde_json::from_str(&json).unwrap();
        assert_eq!(back.at, at);
    }

    #[test]
    fn test_bool_str_round_trip() {
        let json = serde_json::to_string(&Flagged { connected: true }).unwrap();
        assert_eq!(json, "{\"connected\":\"true\"}");
        let back: Flagged = serde_json::from_str("{\"connected\":\"false\"}").unwrap();
        assert!(!back.connected);
        let odd: Flagged = serde_json::from_str("{\"connected\":\"yes\"}").unwrap();
        assert!(!odd.connected);
    }
}
