//! Snowflake ID Generator
//!
//! Twitter-style distributed unique ID generation.

use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;

/// Default epoch (2015-01-01T00:00:00.000Z)
pub const DEFAULT_EPOCH: u64 = 1420070400000;

const SEQUENCE_MASK: u64 = 0xFFF;

/// Snowflake ID generator
///
/// IDs are strictly increasing per generator, which the mention inbox relies
/// on to break timestamp ties.
pub struct SnowflakeGenerator {
    machine_id: u64,
    epoch: u64,
    // (last timestamp, sequence within that millisecond)
    state: Mutex<(u64, u64)>,
}

impl SnowflakeGenerator {
    /// Create a new snowflake generator
    pub fn new(machine_id: u64, epoch: u64) -> Self {
        Self {
            machine_id: machine_id & 0x3FF, // 10 bits
            epoch,
            state: Mutex::new((0, 0)),
        }
    }

    /// Generate a new snowflake ID
    pub fn generate(&self) -> i64 {
        let mut state = self.state.lock();
        let mut timestamp = current_timestamp().max(state.0);

        if timestamp == state.0 {
            state.1 = (state.1 + 1) & SEQUENCE_MASK;
            if state.1 == 0 {
                // Sequence exhausted for this millisecond, borrow the next one
                timestamp += 1;
            }
        } else {
            state.1 = 0;
        }
        state.0 = timestamp;

        (((timestamp.saturating_sub(self.epoch)) << 22) | (self.machine_id << 12) | state.1) as i64
    }
}

fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Serialize snowflake IDs as strings and accept either strings or numbers.
///
/// JavaScript clients lose precision above 2^53, so IDs leave the server as strings.
pub mod serde_id {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(i64),
        Text(String),
    }

    impl RawId {
        fn into_id<E: serde::de::Error>(self) -> Result<i64, E> {
            match self {
                RawId::Number(n) => Ok(n),
                RawId::Text(s) => s.parse().map_err(E::custom),
            }
        }
    }

    pub fn serialize<S: Serializer>(id: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(id)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        RawId::deserialize(deserializer)?.into_id()
    }

    pub mod option {
        use super::RawId;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(id: &Option<i64>, serializer: S) -> Result<S::Ok, S::Error> {
            match id {
                Some(id) => serializer.collect_str(id),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<i64>, D::Error> {
            Option::<RawId>::deserialize(deserializer)?
                .map(RawId::into_id)
                .transpose()
        }
    }
}
