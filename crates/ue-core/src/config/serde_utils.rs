//! Serde helpers for the timeout fields in `config.toml`

/// Timeouts are written as whole seconds, e.g. `io_timeout = 3`
///
/// Sub-second precision is dropped on serialization. Negative or
/// fractional values fail to parse.
pub mod duration_secs {
    use serde::{self, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    /// Write the whole seconds of `duration`
    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    /// Read a non-negative integer number of seconds
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
