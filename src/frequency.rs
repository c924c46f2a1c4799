use jiff::{Span, ToSpan};

use crate::error::Error;

/// The base cadence at which a recurrence rule repeats.
///
/// The frequency determines how the key-time cursor advances and how the
/// BY rules of an `RRule` are interpreted (as filters or as expansions).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Frequency {
    Secondly,
    Minutely,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    /// Returns the span covered by one `interval` of this frequency.
    ///
    /// Returns `None` when the multiplication overflows what a span can
    /// represent, in which case iteration treats the rule as immediately
    /// exhausted.
    pub(crate) fn to_span(self, interval: u32) -> Option<Span> {
        let base = match self {
            Frequency::Secondly => 1.second(),
            Frequency::Minutely => 1.minute(),
            Frequency::Hourly => 1.hour(),
            Frequency::Daily => 1.day(),
            Frequency::Weekly => 1.week(),
            Frequency::Monthly => 1.month(),
            Frequency::Yearly => 1.year(),
        };
        base.checked_mul(i64::from(interval.max(1))).ok()
    }

    /// The RFC 5545 name of this frequency, as it appears after `FREQ=`.
    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::Secondly => "SECONDLY",
            Frequency::Minutely => "MINUTELY",
            Frequency::Hourly => "HOURLY",
            Frequency::Daily => "DAILY",
            Frequency::Weekly => "WEEKLY",
            Frequency::Monthly => "MONTHLY",
            Frequency::Yearly => "YEARLY",
        }
    }
}

impl std::str::FromStr for Frequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Frequency, Error> {
        use self::Frequency::*;

        let freq = match &*s.to_ascii_lowercase() {
            "secondly" => Secondly,
            "minutely" => Minutely,
            "hourly" => Hourly,
            "daily" => Daily,
            "weekly" => Weekly,
            "monthly" => Monthly,
            "yearly" => Yearly,
            unk => return Err(Error::InvalidFrequency(unk.to_string())),
        };
        Ok(freq)
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_str_is_case_insensitive() {
        let freq: Frequency = "weekly".parse().unwrap();
        assert_eq!(freq, Frequency::Weekly);
        let freq: Frequency = "SECONDLY".parse().unwrap();
        assert_eq!(freq, Frequency::Secondly);
        let freq: Frequency = "Daily".parse().unwrap();
        assert_eq!(freq, Frequency::Daily);
    }

    #[test]
    fn from_str_rejects_unknown() {
        let err = "fortnightly".parse::<Frequency>().unwrap_err();
        insta::assert_snapshot!(
            err,
            @"frequency `fortnightly` is not valid",
        );
    }

    #[test]
    fn round_trips_through_display() {
        for freq in [
            Frequency::Secondly,
            Frequency::Minutely,
            Frequency::Hourly,
            Frequency::Daily,
            Frequency::Weekly,
            Frequency::Monthly,
            Frequency::Yearly,
        ] {
            let parsed: Frequency = freq.as_str().parse().unwrap();
            assert_eq!(parsed, freq);
        }
    }
}
