use std::time::SystemTime;

use glowworm_primitives::DurationSinceUnixEpoch;

use crate::clock;

pub struct WorkingClock;

impl clock::Time for clock::Working {
    fn now() -> DurationSinceUnixEpoch {
        SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .expect("system clock is never before the Unix epoch")
    }

    fn dbg_clock_type() -> String {
        "Working".to_owned()
    }
}
