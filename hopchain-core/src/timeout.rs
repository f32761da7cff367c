//! Per-call connect/read/write timeouts.

use std::time::Duration;

use crate::ChainError;

/// Largest accepted timeout, in milliseconds.
pub const MAX_TIMEOUT_MS: u128 = i32::MAX as u128;

/// Default value for each of the three timeouts.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// The connect/read/write timeout triple carried by every chain view.
///
/// A zero duration means "no timeout".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timeouts {
    pub connect: Duration,
    pub read: Duration,
    pub write: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connect: DEFAULT_TIMEOUT,
            read: DEFAULT_TIMEOUT,
            write: DEFAULT_TIMEOUT,
        }
    }
}

impl Timeouts {
    /// Create a timeout triple.
    pub fn new(connect: Duration, read: Duration, write: Duration) -> Self {
        Self {
            connect,
            read,
            write,
        }
    }

    /// A triple with every timeout disabled.
    pub fn none() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO, Duration::ZERO)
    }

    /// Validate all three values with [`check_duration`].
    pub fn validate(&self) -> Result<(), ChainError> {
        check_duration("connect timeout", self.connect)?;
        check_duration("read timeout", self.read)?;
        check_duration("write timeout", self.write)?;
        Ok(())
    }
}

/// Validate a timeout value.
///
/// Zero is accepted and disables the timeout. Anything above
/// [`MAX_TIMEOUT_MS`] is too large; a non-zero value that truncates to zero
/// milliseconds is too small.
pub fn check_duration(name: &'static str, duration: Duration) -> Result<Duration, ChainError> {
    let millis = duration.as_millis();
    if millis > MAX_TIMEOUT_MS {
        return Err(ChainError::InvalidTimeout {
            name,
            reason: "too large",
        });
    }
    if millis == 0 && !duration.is_zero() {
        return Err(ChainError::InvalidTimeout {
            name,
            reason: "too small",
        });
    }
    Ok(duration)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timeouts() {
        let timeouts = Timeouts::default();
        assert_eq!(timeouts.connect, Duration::from_secs(10));
        assert_eq!(timeouts.read, Duration::from_secs(10));
        assert_eq!(timeouts.write, Duration::from_secs(10));
        assert!(timeouts.validate().is_ok());
    }

    #[test]
    fn test_check_duration_bounds() {
        assert_eq!(check_duration("t", Duration::ZERO).unwrap(), Duration::ZERO);
        assert!(check_duration("t", Duration::from_millis(1)).is_ok());
        assert!(check_duration("t", Duration::from_millis(i32::MAX as u64)).is_ok());

        let err = check_duration("t", Duration::from_millis(i32::MAX as u64 + 1)).unwrap_err();
        assert!(matches!(
            err,
            ChainError::InvalidTimeout {
                reason: "too large",
                ..
            }
        ));

        let err = check_duration("t", Duration::from_micros(500)).unwrap_err();
        assert!(matches!(
            err,
            ChainError::InvalidTimeout {
                reason: "too small",
                ..
            }
        ));
    }

    #[test]
    fn test_validate_names_field() {
        let timeouts = Timeouts::new(
            Duration::from_secs(1),
            Duration::from_nanos(10),
            Duration::ZERO,
        );
        let err = timeouts.validate().unwrap_err();
        assert_eq!(err.to_string(), "invalid read timeout: too small");
    }
}
