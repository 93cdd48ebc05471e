use std::num::IntErrorKind;
use std::time::Duration;

use glowworm_primitives::DurationSinceUnixEpoch;

use super::{Time, Working};
use crate::clock;

/// A clock frozen at a fixed time, settable from test code so that
/// time-dependent behavior (peer expiry, connection-id validity windows) is
/// deterministic to assert on.
pub struct StoppedClock {}

#[allow(clippy::module_name_repetitions)]
pub trait Stopped: clock::Time {
    fn local_set(unix_time: &DurationSinceUnixEpoch);

    fn local_set_to_unix_epoch() {
        Self::local_set(&DurationSinceUnixEpoch::ZERO);
    }

    fn local_set_to_app_start_time() {
        Self::local_set(&detail::get_app_start_time());
    }

    /// # Errors
    ///
    /// Returns `IntErrorKind::PosOverflow` if `duration` would overflow the
    /// internal `Duration`.
    fn local_add(duration: &Duration) -> Result<(), IntErrorKind>;

    /// # Errors
    ///
    /// Returns `IntErrorKind::NegOverflow` if `duration` would underflow the
    /// internal `Duration`.
    fn local_sub(duration: &Duration) -> Result<(), IntErrorKind>;

    fn local_reset();
}

impl Time for clock::Stopped {
    fn now() -> DurationSinceUnixEpoch {
        detail::FIXED_TIME.with(|time| *time.borrow())
    }

    fn dbg_clock_type() -> String {
        "Stopped".to_owned()
    }
}

impl Stopped for clock::Stopped {
    fn local_set(unix_time: &DurationSinceUnixEpoch) {
        detail::FIXED_TIME.with(|time| {
            *time.borrow_mut() = *unix_time;
        });
    }

    fn local_add(duration: &Duration) -> Result<(), IntErrorKind> {
        detail::FIXED_TIME.with(|time| {
            let current = *time.borrow();
            match current.checked_add(*duration) {
                Some(next) => {
                    *time.borrow_mut() = next;
                    Ok(())
                }
                None => Err(IntErrorKind::PosOverflow),
            }
        })
    }

    fn local_sub(duration: &Duration) -> Result<(), IntErrorKind> {
        detail::FIXED_TIME.with(|time| {
            let current = *time.borrow();
            match current.checked_sub(*duration) {
                Some(next) => {
                    *time.borrow_mut() = next;
                    Ok(())
                }
                None => Err(IntErrorKind::NegOverflow),
            }
        })
    }

    fn local_reset() {
        Self::local_set(&detail::get_default_fixed_time());
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use glowworm_primitives::DurationSinceUnixEpoch;

    use crate::clock::stopped::Stopped as _;
    use crate::clock::{Stopped, Time, Working};

    #[test]
    fn it_should_default_to_zero_when_testing() {
        assert_eq!(Stopped::now(), DurationSinceUnixEpoch::ZERO);
    }

    #[test]
    fn it_should_be_possible_to_set_the_time() {
        assert_eq!(Stopped::now(), Duration::ZERO);

        let timestamp = Working::now();
        Stopped::local_set(&timestamp);
        assert_eq!(Stopped::now(), timestamp);

        Stopped::local_add(&timestamp).unwrap();
        assert_eq!(Stopped::now(), timestamp + timestamp);

        Stopped::local_reset();
        assert_eq!(Stopped::now(), Duration::ZERO);
    }

    #[test]
    fn it_should_reset_to_zero_on_thread_exit() {
        assert_eq!(Stopped::now(), Duration::ZERO);
        let after5 = Working::now_add(&Duration::from_secs(5)).unwrap();
        Stopped::local_set(&after5);
        assert_eq!(Stopped::now(), after5);

        let t = thread::spawn(move || {
            assert_eq!(Stopped::now(), Duration::ZERO);
            let timestamp = Working::now();
            Stopped::local_set(&timestamp);
            assert_eq!(Stopped::now(), timestamp);
        });

        t.join().unwrap();

        assert_eq!(Stopped::now(), after5);

        Stopped::local_reset();
        assert_eq!(Stopped::now(), Duration::ZERO);
    }
}

mod detail {
    use std::cell::RefCell;
    use std::sync::OnceLock;
    use std::time::SystemTime;

    use glowworm_primitives::DurationSinceUnixEpoch;

    thread_local!(pub static FIXED_TIME: RefCell<DurationSinceUnixEpoch> = RefCell::new(get_default_fixed_time()));

    static APP_START_TIME: OnceLock<SystemTime> = OnceLock::new();

    pub fn get_app_start_time() -> DurationSinceUnixEpoch {
        (*APP_START_TIME.get_or_init(SystemTime::now))
            .duration_since(SystemTime::UNIX_EPOCH)
            .expect("system clock is never before the Unix epoch")
    }

    #[cfg(not(test))]
    pub fn get_default_fixed_time() -> DurationSinceUnixEpoch {
        get_app_start_time()
    }

    #[cfg(test)]
    pub fn get_default_fixed_time() -> DurationSinceUnixEpoch {
        DurationSinceUnixEpoch::ZERO
    }
}
