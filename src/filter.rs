use jiff::{Zoned, civil::Weekday};

/// The BY filters active for one frequency engine.
///
/// Each engine compiles the rule's BY sets it treats as *filters* (as
/// opposed to expansions) into one of these. An empty dimension means
/// "not specified" and always passes, so a default `Filters` accepts
/// everything. The composite check is the logical AND of the per
/// dimension checks.
///
/// Note that the weekday dimension carries bare weekdays: any ordinal
/// qualification on a BYDAY entry is ignored at the filter stage (the
/// monthly and yearly expanders are where ordinals have meaning).
#[derive(Clone, Debug, Default)]
pub(crate) struct Filters {
    pub(crate) seconds: Vec<i8>,
    pub(crate) minutes: Vec<i8>,
    pub(crate) hours: Vec<i8>,
    pub(crate) weekdays: Vec<Weekday>,
    pub(crate) month_days: Vec<i8>,
    pub(crate) months: Vec<i8>,
    pub(crate) week_numbers: Vec<i8>,
    pub(crate) year_days: Vec<i16>,
}

impl Filters {
    /// Returns true if and only if every active filter accepts `t`.
    pub(crate) fn is_valid(&self, t: &Zoned) -> bool {
        self.satisfies_second(t)
            && self.satisfies_minute(t)
            && self.satisfies_hour(t)
            && self.satisfies_weekday(t)
            && self.satisfies_month_day(t)
            && self.satisfies_month(t)
            && self.satisfies_week_number(t)
            && self.satisfies_year_day(t)
    }

    fn satisfies_second(&self, t: &Zoned) -> bool {
        self.seconds.is_empty() || self.seconds.contains(&t.second())
    }

    fn satisfies_minute(&self, t: &Zoned) -> bool {
        self.minutes.is_empty() || self.minutes.contains(&t.minute())
    }

    fn satisfies_hour(&self, t: &Zoned) -> bool {
        self.hours.is_empty() || self.hours.contains(&t.hour())
    }

    fn satisfies_weekday(&self, t: &Zoned) -> bool {
        self.weekdays.is_empty() || self.weekdays.contains(&t.weekday())
    }

    fn satisfies_month_day(&self, t: &Zoned) -> bool {
        self.month_days.is_empty() || self.month_days.contains(&t.day())
    }

    fn satisfies_month(&self, t: &Zoned) -> bool {
        self.months.is_empty() || self.months.contains(&t.month())
    }

    /// A coarse week-of-year check, `1 + yday/7`. This is only ever used
    /// as a filter at sub-yearly frequencies; the yearly engine expands
    /// BYWEEKNO with proper ISO-week anchoring instead.
    fn satisfies_week_number(&self, t: &Zoned) -> bool {
        if self.week_numbers.is_empty() {
            return true;
        }
        let week = 1 + t.day_of_year() / 7;
        self.week_numbers.iter().any(|&w| i16::from(w) == week)
    }

    fn satisfies_year_day(&self, t: &Zoned) -> bool {
        self.year_days.is_empty()
            || self.year_days.contains(&t.day_of_year())
    }
}
