use core::fmt::Display;
use std::time::{SystemTime, UNIX_EPOCH};

/// Wall-clock timestamp (UTC) attached to each log message
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct TimeStamp {
    pub year        : u16,
    pub month       : u8,
    pub day         : u8,
    pub hour        : u8,
    pub minute      : u8,
    pub second      : u8,
    pub millisecond : u16,
}

impl TimeStamp {
    /// Build a timestamp from the number of milliseconds since the unix epoch
    pub fn from_unix_millis(millis: u64) -> Self {
        let secs = millis / 1000;
        let days = (secs / 86_400) as i64;
        let secs_of_day = secs % 86_400;

        // Civil-from-days, see http://howardhinnant.github.io/date_algorithms.html
        let z = days + 719_468;
        let era = z.div_euclid(146_097);
        let doe = z.rem_euclid(146_097);
        let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
        let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
        let mp = (5 * doy + 2) / 153;
        let day = doy - (153 * mp + 2) / 5 + 1;
        let month = if mp < 10 { mp + 3 } else { mp - 9 };
        let year = yoe + era * 400 + i64::from(month <= 2);

        Self {
            year: year as u16,
            month: month as u8,
            day: day as u8,
            hour: (secs_of_day / 3600) as u8,
            minute: (secs_of_day / 60 % 60) as u8,
            second: (secs_of_day % 60) as u8,
            millisecond: (millis % 1000) as u16,
        }
    }
}

impl Display for TimeStamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{}-{:02}-{:02} {:02}:{:02}:{:02}.{:03}", self.year, self.month, self.day, self.hour, self.minute, self.second, self.millisecond))
    }
}

/// Get the current timestamp
pub fn get_timestamp() -> TimeStamp {
    // A clock before the epoch is reported as the epoch itself
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |dur| dur.as_millis() as u64);
    TimeStamp::from_unix_millis(millis)
}
