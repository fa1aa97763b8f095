//! Serde support for retry policies (feature-gated)
//!
//! A [`RetryPolicy`] serializes as a flat configuration record. Every field is
//! optional on input and validated on deserialize. `initial_delay_ms` is an
//! integer for whole milliseconds and a fraction otherwise, so sub-millisecond
//! delays load back unchanged.
//!
//! ```rust,ignore
//! let json = r#"{ "max_attempts": 5, "initial_delay_ms": 250 }"#;
//! let policy: RetryPolicy = serde_json::from_str(json).unwrap();
//! assert_eq!(policy.backoff_multiplier(), 2.0);
//!
//! let bad = r#"{ "backoff_multiplier": 0.5 }"#;
//! assert!(serde_json::from_str::<RetryPolicy>(bad).is_err());
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::time::Duration;

use super::{JitterStrategy, PolicyError, RetryPolicy};

#[derive(Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RetryConfig {
    max_attempts: u32,
    #[serde(rename = "initial_delay_ms", with = "millis")]
    initial_delay: Duration,
    backoff_multiplier: f64,
    jitter: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        RetryConfig::from(&RetryPolicy::default())
    }
}

impl From<&RetryPolicy> for RetryConfig {
    fn from(policy: &RetryPolicy) -> Self {
        let jitter = match policy.jitter() {
            JitterStrategy::None => 0.0,
            JitterStrategy::Proportional(factor) => *factor,
        };
        Self {
            max_attempts: policy.max_attempts(),
            initial_delay: policy.initial_delay(),
            backoff_multiplier: policy.backoff_multiplier(),
            jitter,
        }
    }
}

impl TryFrom<RetryConfig> for RetryPolicy {
    type Error = PolicyError;

    fn try_from(config: RetryConfig) -> Result<Self, Self::Error> {
        let policy = RetryPolicy::new(
            config.max_attempts,
            config.initial_delay,
            config.backoff_multiplier,
        )?;
        if !(0.0..=1.0).contains(&config.jitter) {
            return Err(PolicyError::JitterOutOfRange(config.jitter));
        }
        if config.jitter > 0.0 {
            Ok(policy.with_jitter(config.jitter))
        } else {
            Ok(policy)
        }
    }
}

mod millis {
    use serde::{de, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    const NANOS_PER_MILLI: u32 = 1_000_000;

    pub fn serialize<S: Serializer>(delay: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        if delay.subsec_nanos() % NANOS_PER_MILLI == 0 {
            serializer.serialize_u64(delay.as_millis() as u64)
        } else {
            serializer.serialize_f64(delay.as_nanos() as f64 / f64::from(NANOS_PER_MILLI))
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let millis = f64::deserialize(deserializer)?;
        let nanos = (millis * f64::from(NANOS_PER_MILLI)).round();
        if !nanos.is_finite() || nanos < 0.0 || nanos >= u64::MAX as f64 {
            return Err(de::Error::custom(format!(
                "initial_delay_ms out of range: {}",
                millis
            )));
        }
        Ok(Duration::from_nanos(nanos as u64))
    }
}

impl Serialize for RetryPolicy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        RetryConfig::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RetryPolicy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let config = RetryConfig::deserialize(deserializer)?;
        RetryPolicy::try_from(config).map_err(serde::de::Error::custom)
    }
}
