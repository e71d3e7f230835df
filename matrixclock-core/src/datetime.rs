//! Calendar math on seconds since 2000-01-01 00:00:00.
//!
//! The clock counts seconds in a `u32` anchored at the year 2000, which the
//! RTC chips themselves use as their epoch. The math here is valid through
//! 2099; none of the supported chips track the century anyway.

/// Errors from parsing or constructing a date/time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DateTimeError {
    /// Text does not match `mm/dd/yyyy hh:mm:ss`
    BadFormat,
    /// A field is outside its valid range
    OutOfRange,
}

/// Weekday names indexed by [`DateTime::weekday_index`]
pub const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

const DAYS_IN_MONTH: [u8; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

pub const SECS_PER_MINUTE: u32 = 60;
pub const SECS_PER_HOUR: u32 = 3600;
pub const SECS_PER_DAY: u32 = 86_400;

/// A calendar date and time, valid for years 2000 through 2099
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DateTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

fn is_leap(year: u16) -> bool {
    // 2000 is a leap year and 2100 is out of range, so the simple rule holds
    year % 4 == 0
}

fn days_in_month(year: u16, month: u8) -> u8 {
    if month == 2 && is_leap(year) {
        29
    } else {
        DAYS_IN_MONTH[(month - 1) as usize]
    }
}

impl DateTime {
    /// Validate field ranges, returning the value unchanged when legal
    pub fn validated(self) -> Result<Self, DateTimeError> {
        if !(2000..=2099).contains(&self.year)
            || !(1..=12).contains(&self.month)
            || self.day < 1
            || self.day > days_in_month(self.year, self.month)
            || self.hour > 23
            || self.minute > 59
            || self.second > 59
        {
            return Err(DateTimeError::OutOfRange);
        }
        Ok(self)
    }

    /// Seconds since 2000-01-01 00:00:00
    pub fn to_secs(&self) -> u32 {
        let mut days: u32 = 0;
        for y in 2000..self.year {
            days += if is_leap(y) { 366 } else { 365 };
        }
        for m in 1..self.month {
            days += days_in_month(self.year, m) as u32;
        }
        days += (self.day - 1) as u32;
        days * SECS_PER_DAY
            + self.hour as u32 * SECS_PER_HOUR
            + self.minute as u32 * SECS_PER_MINUTE
            + self.second as u32
    }

    /// Rebuild a date and time from seconds since 2000-01-01 00:00:00
    pub fn from_secs(secs: u32) -> Self {
        let mut days = secs / SECS_PER_DAY;
        let rem = secs % SECS_PER_DAY;

        let mut year: u16 = 2000;
        loop {
            let year_days = if is_leap(year) { 366 } else { 365 };
            if days < year_days {
                break;
            }
            days -= year_days;
            year += 1;
        }

        let mut month: u8 = 1;
        loop {
            let month_days = days_in_month(year, month) as u32;
            if days < month_days {
                break;
            }
            days -= month_days;
            month += 1;
        }

        Self {
            year,
            month,
            day: days as u8 + 1,
            hour: (rem / SECS_PER_HOUR) as u8,
            minute: (rem % SECS_PER_HOUR / SECS_PER_MINUTE) as u8,
            second: (rem % SECS_PER_MINUTE) as u8,
        }
    }

    /// Day of week, 0 = Sunday
    ///
    /// 2000-01-01 was a Saturday.
    pub fn weekday_index(&self) -> usize {
        let days = self.to_secs() / SECS_PER_DAY;
        ((days + 6) % 7) as usize
    }

    /// Day of week name
    pub fn weekday(&self) -> &'static str {
        WEEKDAY_NAMES[self.weekday_index()]
    }

    /// Parse `mm/dd/yyyy hh:mm:ss`; single-digit fields are accepted
    pub fn parse(text: &str) -> Result<Self, DateTimeError> {
        let mut parts = text.split_whitespace();
        let date = parts.next().ok_or(DateTimeError::BadFormat)?;
        let time = parts.next().ok_or(DateTimeError::BadFormat)?;
        if parts.next().is_some() {
            return Err(DateTimeError::BadFormat);
        }

        let mut fields = date.split('/');
        let month = parse_field(fields.next())?;
        let day = parse_field(fields.next())?;
        let year: u16 = fields
            .next()
            .ok_or(DateTimeError::BadFormat)?
            .parse()
            .map_err(|_| DateTimeError::BadFormat)?;
        if fields.next().is_some() {
            return Err(DateTimeError::BadFormat);
        }

        let mut fields = time.split(':');
        let hour = parse_field(fields.next())?;
        let minute = parse_field(fields.next())?;
        let second = parse_field(fields.next())?;
        if fields.next().is_some() {
            return Err(DateTimeError::BadFormat);
        }

        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
        .validated()
    }
}

fn parse_field(part: Option<&str>) -> Result<u8, DateTimeError> {
    part.ok_or(DateTimeError::BadFormat)?
        .parse()
        .map_err(|_| DateTimeError::BadFormat)
}

impl core::fmt::Display for DateTime {
    /// `m/dd/yyyy h:mm:ss`, matching the console and log line format
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{}/{:02}/{} {}:{:02}:{:02}",
            self.month, self.day, self.year, self.hour, self.minute, self.second
        )
    }
}
