//! Retry policy types and configuration.

use std::fmt;
use std::time::Duration;

use super::FailureClassification;

/// How a failed remote operation is retried.
///
/// Policies are pure data: they describe retry behavior but don't execute it.
/// A `RetryPolicy` is always valid. [`RetryPolicy::new`] rejects out-of-range
/// values, and the `with_*` setters clamp into range.
///
/// # Bounds
///
/// - `max_attempts`: total attempts including the first one, at least 1
/// - `initial_delay`: wait before the second attempt, greater than zero
/// - `backoff_multiplier`: growth factor between waits, greater than 1
///
/// # Examples
///
/// ```rust
/// use scanguard::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::default();
/// assert_eq!(policy.max_attempts(), 3);
/// assert_eq!(policy.initial_delay(), Duration::from_millis(1000));
/// assert_eq!(policy.backoff_multiplier(), 2.0);
///
/// let policy = RetryPolicy::default()
///     .with_max_attempts(5)
///     .with_initial_delay(Duration::from_millis(100));
///
/// assert_eq!(policy.delay_before_attempt(2), Some(Duration::from_millis(100)));
/// assert_eq!(policy.delay_before_attempt(3), Some(Duration::from_millis(200)));
/// assert_eq!(policy.delay_before_attempt(5), Some(Duration::from_millis(800)));
/// assert_eq!(policy.delay_before_attempt(6), None);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_delay: Duration,
    backoff_multiplier: f64,
    jitter: JitterStrategy,
}

/// Strategy for adding randomness to delays.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum JitterStrategy {
    /// No jitter applied.
    #[default]
    None,
    /// Add ±percentage randomness to delay.
    Proportional(f64),
}

/// Information about a scheduled retry, passed to hooks.
#[derive(Debug, Clone)]
pub struct RetryEvent<'a, E> {
    /// Which attempt just failed (1-indexed).
    pub attempt: u32,
    /// The error from the failed attempt.
    pub error: &'a E,
    /// How the error was classified.
    pub classification: FailureClassification,
    /// Delay before the next attempt.
    pub next_delay: Duration,
    /// Total elapsed time since the first attempt.
    pub elapsed: Duration,
}

/// Rejected [`RetryPolicy`] parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PolicyError {
    /// `max_attempts` was zero.
    ZeroAttempts,
    /// `initial_delay` was zero.
    ZeroInitialDelay,
    /// `backoff_multiplier` was not a finite number greater than 1.
    MultiplierOutOfRange(f64),
    /// Jitter factor was outside `0.0..=1.0`.
    JitterOutOfRange(f64),
}

impl fmt::Display for PolicyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroAttempts => f.write_str("max_attempts must be at least 1"),
            Self::ZeroInitialDelay => f.write_str("initial_delay must be greater than zero"),
            Self::MultiplierOutOfRange(m) => {
                write!(f, "backoff_multiplier must be greater than 1, got {}", m)
            }
            Self::JitterOutOfRange(j) => {
                write!(f, "jitter must be between 0 and 1, got {}", j)
            }
        }
    }
}

impl std::error::Error for PolicyError {}

impl RetryPolicy {
    /// Default total attempts.
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
    /// Default wait before the second attempt.
    pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(1000);
    /// Default growth factor between waits.
    pub const DEFAULT_BACKOFF_MULTIPLIER: f64 = 2.0;

    /// Create a policy, rejecting out-of-range parameters.
    ///
    /// ```rust
    /// use scanguard::retry::{PolicyError, RetryPolicy};
    /// use std::time::Duration;
    ///
    /// assert!(RetryPolicy::new(4, Duration::from_millis(250), 1.5).is_ok());
    /// assert_eq!(
    ///     RetryPolicy::new(0, Duration::from_millis(250), 1.5),
    ///     Err(PolicyError::ZeroAttempts)
    /// );
    /// assert_eq!(
    ///     RetryPolicy::new(3, Duration::from_millis(250), 1.0),
    ///     Err(PolicyError::MultiplierOutOfRange(1.0))
    /// );
    /// ```
    pub fn new(
        max_attempts: u32,
        initial_delay: Duration,
        backoff_multiplier: f64,
    ) -> Result<Self, PolicyError> {
        if max_attempts == 0 {
            return Err(PolicyError::ZeroAttempts);
        }
        if initial_delay.is_zero() {
            return Err(PolicyError::ZeroInitialDelay);
        }
        if !valid_multiplier(backoff_multiplier) {
            return Err(PolicyError::MultiplierOutOfRange(backoff_multiplier));
        }
        Ok(Self {
            max_attempts,
            initial_delay,
            backoff_multiplier,
            jitter: JitterStrategy::None,
        })
    }

    /// Set the total number of attempts, including the first.
    ///
    /// Zero is raised to 1.
    pub fn with_max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n.max(1);
        self
    }

    /// Set the wait before the second attempt.
    ///
    /// A zero delay is raised to one millisecond.
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = if delay.is_zero() {
            Duration::from_millis(1)
        } else {
            delay
        };
        self
    }

    /// Set the growth factor between waits.
    ///
    /// Values that are not finite and greater than 1 leave the policy unchanged.
    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        if valid_multiplier(multiplier) {
            self.backoff_multiplier = multiplier;
        } else {
            tracing::warn!(multiplier, "ignoring out-of-range backoff multiplier");
        }
        self
    }

    /// Add proportional jitter to delays.
    ///
    /// The factor determines the range of randomness. For example, `0.25` means
    /// the actual delay will be ±25% of the calculated delay. Growth between
    /// attempts is computed from the un-jittered delay.
    ///
    /// **Note**: The factor is always recorded (and serialized), but it is only
    /// applied to delays when the `jitter` feature is enabled.
    pub fn with_jitter(mut self, factor: f64) -> Self {
        let factor = if factor.is_nan() {
            0.0
        } else {
            factor.clamp(0.0, 1.0)
        };
        self.jitter = JitterStrategy::Proportional(factor);
        self
    }

    /// Total attempts, including the first.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Wait before the second attempt.
    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    /// Growth factor between waits.
    pub fn backoff_multiplier(&self) -> f64 {
        self.backoff_multiplier
    }

    /// Get the jitter strategy.
    pub fn jitter(&self) -> &JitterStrategy {
        &self.jitter
    }

    /// Delay before attempt `attempt` (1-indexed), before jitter.
    ///
    /// `initial_delay * backoff_multiplier^(attempt - 2)` for
    /// `2 <= attempt <= max_attempts`; `None` for the first attempt (which
    /// runs immediately) and for attempts past the limit.
    pub fn delay_before_attempt(&self, attempt: u32) -> Option<Duration> {
        if attempt < 2 || attempt > self.max_attempts {
            return None;
        }
        let mut delay = self.initial_delay;
        for _ in 2..attempt {
            delay = self.next_delay(delay);
        }
        Some(delay)
    }

    /// Sum of every un-jittered wait if all attempts fail transiently.
    pub fn total_backoff(&self) -> Duration {
        (2..=self.max_attempts)
            .filter_map(|attempt| self.delay_before_attempt(attempt))
            .fold(Duration::ZERO, Duration::saturating_add)
    }

    /// Grow a delay by the multiplier, saturating at `Duration::MAX`.
    pub(crate) fn next_delay(&self, current: Duration) -> Duration {
        scale(current, self.backoff_multiplier)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
            initial_delay: Self::DEFAULT_INITIAL_DELAY,
            backoff_multiplier: Self::DEFAULT_BACKOFF_MULTIPLIER,
            jitter: JitterStrategy::None,
        }
    }
}

impl JitterStrategy {
    /// Apply jitter to a base delay.
    pub fn apply(&self, base_delay: Duration) -> Duration {
        match self {
            JitterStrategy::None => base_delay,
            #[cfg(feature = "jitter")]
            JitterStrategy::Proportional(factor) => {
                use rand::Rng;
                let mut rng = rand::rng();
                let base_nanos = base_delay.as_nanos() as f64;
                let jitter_range = base_nanos * factor;
                let min = (base_nanos - jitter_range).max(0.0);
                let max = base_nanos + jitter_range;
                from_nanos_f64(rng.random_range(min..=max))
            }
            #[cfg(not(feature = "jitter"))]
            JitterStrategy::Proportional(_) => base_delay,
        }
    }
}

fn valid_multiplier(m: f64) -> bool {
    m.is_finite() && m > 1.0
}

fn scale(delay: Duration, factor: f64) -> Duration {
    from_nanos_f64(delay.as_nanos() as f64 * factor)
}

/// Rounds to the nearest nanosecond, saturating at `Duration::MAX`.
fn from_nanos_f64(nanos: f64) -> Duration {
    let nanos = nanos.round();
    if nanos >= u64::MAX as f64 {
        Duration::MAX
    } else {
        Duration::from_nanos(nanos as u64)
    }
}
