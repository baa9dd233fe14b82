//! Calendar date and time of day with carry-propagating arithmetic.

use time::{Date, Duration, Month, PrimitiveDateTime, Time};

use crate::config::{MAX_YEAR, MIN_YEAR};
use crate::Error;

/// One calendar field of a [`DateTime`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Field {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
}

/// Gregorian leap year rule.
pub fn is_leap_year(year: u16) -> bool {
    time::util::is_leap_year(i32::from(year))
}

pub fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

fn wrap(value: u8, first: u8, last: u8, forward: bool) -> u8 {
    if forward {
        if value >= last {
            first
        } else {
            value + 1
        }
    } else if value <= first {
        last
    } else {
        value - 1
    }
}

/// A calendar-valid date and time with one second resolution.
///
/// Values are plain `Copy` snapshots; every mutation goes through
/// [`increment`](Self::increment)/[`decrement`](Self::decrement) (with carry)
/// or [`roll`](Self::roll) (single field, no carry), so an invalid calendar
/// value can't be produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateTime(PrimitiveDateTime);

impl DateTime {
    pub const fn new(inner: PrimitiveDateTime) -> Self {
        Self(inner)
    }

    pub fn from_ymd_hms(
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> Result<Self, Error> {
        let month = Month::try_from(month)?;
        let date = Date::from_calendar_date(i32::from(year), month, day)?;
        let time = Time::from_hms(hour, minute, second)?;
        Ok(Self(PrimitiveDateTime::new(date, time)))
    }

    /// A time of day pinned to the first editable date. Used for window
    /// bounds, where only the time part is meaningful.
    pub fn from_hms(hour: u8, minute: u8, second: u8) -> Result<Self, Error> {
        Self::from_ymd_hms(MIN_YEAR, 1, 1, hour, minute, second)
    }

    pub fn year(&self) -> u16 {
        u16::try_from(self.0.year()).unwrap_or(0)
    }

    pub fn month(&self) -> u8 {
        u8::from(self.0.month())
    }

    pub fn day(&self) -> u8 {
        self.0.day()
    }

    pub fn hour(&self) -> u8 {
        self.0.hour()
    }

    pub fn minute(&self) -> u8 {
        self.0.minute()
    }

    pub fn second(&self) -> u8 {
        self.0.second()
    }

    pub fn time_of_day(&self) -> Time {
        self.0.time()
    }

    pub fn inner(&self) -> PrimitiveDateTime {
        self.0
    }

    /// `self` with the calendar date of `other`.
    pub fn with_date_of(self, other: DateTime) -> Self {
        Self(self.0.replace_date(other.0.date()))
    }

    /// `self` with the time of day of `other`.
    pub fn with_time_of(self, other: DateTime) -> Self {
        Self(self.0.replace_time(other.0.time()))
    }

    /// Advance `field` by one, carrying into the larger fields.
    ///
    /// Month and year steps clamp the day to the length of the target month.
    pub fn increment(&mut self, field: Field) {
        match field {
            Field::Second => self.step(Duration::SECOND),
            Field::Minute => self.step(Duration::MINUTE),
            Field::Hour => self.step(Duration::HOUR),
            Field::Day => self.step(Duration::DAY),
            Field::Month => {
                let (year, month) = (self.0.year(), self.0.month());
                let year = if month == Month::December { year + 1 } else { year };
                self.set_date(year, month.next(), self.0.day());
            }
            Field::Year => self.set_date(self.0.year() + 1, self.0.month(), self.0.day()),
        }
    }

    pub fn increment_second(&mut self) {
        self.increment(Field::Second)
    }

    pub fn increment_minute(&mut self) {
        self.increment(Field::Minute)
    }

    pub fn increment_day(&mut self) {
        self.increment(Field::Day)
    }

    pub fn increment_month(&mut self) {
        self.increment(Field::Month)
    }

    /// Step `field` back by one, borrowing from the larger fields.
    pub fn decrement(&mut self, field: Field) {
        match field {
            Field::Second => self.step(-Duration::SECOND),
            Field::Minute => self.step(-Duration::MINUTE),
            Field::Hour => self.step(-Duration::HOUR),
            Field::Day => self.step(-Duration::DAY),
            Field::Month => {
                let (year, month) = (self.0.year(), self.0.month());
                let year = if month == Month::January { year - 1 } else { year };
                self.set_date(year, month.previous(), self.0.day());
            }
            Field::Year => self.set_date(self.0.year() - 1, self.0.month(), self.0.day()),
        }
    }

    /// Move `field` alone by one step, wrapping within its own range.
    ///
    /// Nothing cascades into neighbouring fields. The day is still clamped
    /// when a month or year change shortens the month, and the year saturates
    /// at the editable range.
    pub fn roll(&mut self, field: Field, forward: bool) {
        let (hour, minute, second) = (self.hour(), self.minute(), self.second());
        match field {
            Field::Second => self.set_time(hour, minute, wrap(second, 0, 59, forward)),
            Field::Minute => self.set_time(hour, wrap(minute, 0, 59, forward), second),
            Field::Hour => self.set_time(wrap(hour, 0, 23, forward), minute, second),
            Field::Day => {
                let last = days_in_month(self.year(), self.month());
                let day = wrap(self.day(), 1, last, forward);
                self.set_date(self.0.year(), self.0.month(), day);
            }
            Field::Month => {
                let month = wrap(self.month(), 1, 12, forward);
                if let Ok(month) = Month::try_from(month) {
                    self.set_date(self.0.year(), month, self.0.day());
                }
            }
            Field::Year => {
                let year = if forward {
                    self.year().saturating_add(1).min(MAX_YEAR)
                } else {
                    self.year().saturating_sub(1).max(MIN_YEAR)
                };
                self.set_date(i32::from(year), self.0.month(), self.0.day());
            }
        }
    }

    fn step(&mut self, delta: Duration) {
        match self.0.checked_add(delta) {
            Some(next) if (0..=9999).contains(&next.year()) => self.0 = next,
            _ => warn!("date/time step out of range, ignored"),
        }
    }

    fn set_date(&mut self, year: i32, month: Month, day: u8) {
        let Ok(short_year) = u16::try_from(year) else {
            return;
        };
        if short_year > 9999 {
            return;
        }
        let day = day.min(days_in_month(short_year, u8::from(month)));
        if let Ok(date) = Date::from_calendar_date(year, month, day) {
            self.0 = self.0.replace_date(date);
        }
    }

    fn set_time(&mut self, hour: u8, minute: u8, second: u8) {
        if let Ok(time) = Time::from_hms(hour, minute, second) {
            self.0 = self.0.replace_time(time);
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for DateTime {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "{}-{}-{} {}:{}:{}",
            self.year(),
            self.month(),
            self.day(),
            self.hour(),
            self.minute(),
            self.second()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn dt(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> DateTime {
        DateTime::from_ymd_hms(year, month, day, hour, minute, second).unwrap()
    }

    #[test]
    fn leap_years_follow_gregorian_rule() {
        assert!(is_leap_year(2024));
        assert!(!is_leap_year(2023));
        assert!(!is_leap_year(1900));
        assert!(is_leap_year(2000));
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2023, 4), 30);
        assert_eq!(days_in_month(2023, 12), 31);
    }

    #[test]
    fn rejects_invalid_calendar_fields() {
        assert_eq!(
            DateTime::from_ymd_hms(2023, 2, 29, 0, 0, 0),
            Err(Error::InvalidDateTime)
        );
        assert_eq!(
            DateTime::from_ymd_hms(2023, 13, 1, 0, 0, 0),
            Err(Error::InvalidDateTime)
        );
        assert_eq!(DateTime::from_hms(24, 0, 0), Err(Error::InvalidDateTime));
        assert!(DateTime::from_ymd_hms(2024, 2, 29, 23, 59, 59).is_ok());
    }

    #[test]
    fn sixty_seconds_make_a_minute() {
        let starts = [
            dt(2025, 6, 19, 11, 59, 55),
            dt(2024, 2, 28, 23, 59, 0),
            dt(2023, 12, 31, 23, 59, 30),
            dt(2025, 1, 1, 0, 0, 0),
        ];
        for start in starts {
            let mut by_seconds = start;
            for _ in 0..60 {
                by_seconds.increment_second();
            }
            let mut by_minute = start;
            by_minute.increment_minute();
            assert_eq!(by_seconds, by_minute);
        }
    }

    #[test]
    fn a_month_of_days_makes_a_month() {
        for year in [2023u16, 2024] {
            for month in 1..=12u8 {
                for day in [1u8, 15, 28] {
                    let start = dt(year, month, day, 8, 30, 0);
                    let mut by_days = start;
                    for _ in 0..days_in_month(year, month) {
                        by_days.increment_day();
                    }
                    let mut by_month = start;
                    by_month.increment_month();
                    assert_eq!(by_days, by_month, "{year}-{month}-{day}");
                }
            }
        }
    }

    #[test]
    fn carry_crosses_year_and_leap_day() {
        let mut t = dt(2023, 12, 31, 23, 59, 59);
        t.increment(Field::Second);
        assert_eq!(t, DateTime::new(datetime!(2024-01-01 00:00:00)));

        let mut t = dt(2024, 2, 28, 23, 59, 59);
        t.increment(Field::Second);
        assert_eq!(t, dt(2024, 2, 29, 0, 0, 0));

        let mut t = dt(2023, 2, 28, 23, 59, 59);
        t.increment(Field::Second);
        assert_eq!(t, dt(2023, 3, 1, 0, 0, 0));
    }

    #[test]
    fn decrement_borrows_from_larger_fields() {
        let mut t = dt(2024, 3, 1, 0, 0, 0);
        t.decrement(Field::Second);
        assert_eq!(t, dt(2024, 2, 29, 23, 59, 59));

        let mut t = dt(2025, 1, 1, 0, 0, 0);
        t.decrement(Field::Day);
        assert_eq!(t, dt(2024, 12, 31, 0, 0, 0));
    }

    #[test]
    fn month_and_year_steps_clamp_the_day() {
        let mut t = dt(2023, 1, 31, 10, 0, 0);
        t.increment(Field::Month);
        assert_eq!(t, dt(2023, 2, 28, 10, 0, 0));

        let mut t = dt(2024, 2, 29, 10, 0, 0);
        t.increment(Field::Year);
        assert_eq!(t, dt(2025, 2, 28, 10, 0, 0));

        let mut t = dt(2024, 3, 31, 10, 0, 0);
        t.decrement(Field::Month);
        assert_eq!(t, dt(2024, 2, 29, 10, 0, 0));
    }

    #[test]
    fn roll_never_cascades() {
        let mut t = dt(2025, 6, 19, 23, 59, 59);
        t.roll(Field::Second, true);
        assert_eq!(t, dt(2025, 6, 19, 23, 59, 0));
        t.roll(Field::Minute, true);
        assert_eq!(t, dt(2025, 6, 19, 23, 0, 0));
        t.roll(Field::Hour, true);
        assert_eq!(t, dt(2025, 6, 19, 0, 0, 0));
        t.roll(Field::Hour, false);
        assert_eq!(t, dt(2025, 6, 19, 23, 0, 0));

        let mut d = dt(2025, 6, 30, 12, 0, 0);
        d.roll(Field::Day, true);
        assert_eq!(d, dt(2025, 6, 1, 12, 0, 0));
        d.roll(Field::Day, false);
        assert_eq!(d, dt(2025, 6, 30, 12, 0, 0));

        let mut m = dt(2025, 12, 15, 12, 0, 0);
        m.roll(Field::Month, true);
        assert_eq!(m, dt(2025, 1, 15, 12, 0, 0));
    }

    #[test]
    fn roll_year_saturates_and_clamps() {
        let mut t = dt(MAX_YEAR, 5, 1, 0, 0, 0);
        t.roll(Field::Year, true);
        assert_eq!(t.year(), MAX_YEAR);

        let mut t = dt(MIN_YEAR, 5, 1, 0, 0, 0);
        t.roll(Field::Year, false);
        assert_eq!(t.year(), MIN_YEAR);

        let mut t = dt(2024, 2, 29, 0, 0, 0);
        t.roll(Field::Year, true);
        assert_eq!(t, dt(2025, 2, 28, 0, 0, 0));
    }

    #[test]
    fn date_and_time_parts_merge() {
        let clock = dt(2025, 6, 19, 11, 59, 55);
        let edited = dt(2030, 1, 2, 7, 8, 9);
        assert_eq!(clock.with_date_of(edited), dt(2030, 1, 2, 11, 59, 55));
        assert_eq!(clock.with_time_of(edited), dt(2025, 6, 19, 7, 8, 9));
    }
}
