use jiff::civil::Weekday;

use crate::error::Error;

/// A `BYDAY` entry: a day of the week, optionally qualified by which
/// occurrence of that day within the enclosing period is meant.
///
/// `Any` matches every occurrence of the weekday within the period that
/// the rule's frequency implies. `Nth` selects a single occurrence: a
/// positive `nth` counts from the start of the period and a negative one
/// from its end, so `Nth { nth: -1, weekday: Weekday::Tuesday }` at a
/// monthly frequency is "the last Tuesday of the month". `nth` is never
/// zero; the unqualified form is `Any`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ByWeekday {
    Any(Weekday),
    Nth { nth: i8, weekday: Weekday },
}

impl ByWeekday {
    /// The weekday, with any ordinal qualification stripped.
    pub fn weekday(self) -> Weekday {
        match self {
            ByWeekday::Any(weekday) => weekday,
            ByWeekday::Nth { weekday, .. } => weekday,
        }
    }

    /// The ordinal, or `0` for an unqualified entry.
    pub(crate) fn nth(self) -> i8 {
        match self {
            ByWeekday::Any(_) => 0,
            ByWeekday::Nth { nth, .. } => nth,
        }
    }
}

impl std::str::FromStr for ByWeekday {
    type Err = Error;

    fn from_str(s: &str) -> Result<ByWeekday, Error> {
        if s.is_empty() {
            return Err(Error::InvalidWeekday(s.to_string()));
        }
        let digits_end = if matches!(s.as_bytes()[0], b'-' | b'+') {
            1 + s[1..].bytes().take_while(|b| b.is_ascii_digit()).count()
        } else {
            s.bytes().take_while(|b| b.is_ascii_digit()).count()
        };
        let weekday = parse_weekday(&s[digits_end..])?;
        if digits_end == 0 {
            return Ok(ByWeekday::Any(weekday));
        }
        let nth = s[..digits_end]
            .parse::<i8>()
            .map_err(|_| Error::InvalidInteger(s[..digits_end].to_string()))?;
        if nth == 0 {
            return Ok(ByWeekday::Any(weekday));
        }
        Ok(ByWeekday::Nth { nth, weekday })
    }
}

impl std::fmt::Display for ByWeekday {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            ByWeekday::Any(weekday) => {
                write!(f, "{}", weekday_code(weekday))
            }
            ByWeekday::Nth { nth, weekday } => {
                write!(f, "{nth}{}", weekday_code(weekday))
            }
        }
    }
}

/// Returns the two-letter RFC 5545 code for a weekday.
pub(crate) fn weekday_code(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Monday => "MO",
        Weekday::Tuesday => "TU",
        Weekday::Wednesday => "WE",
        Weekday::Thursday => "TH",
        Weekday::Friday => "FR",
        Weekday::Saturday => "SA",
        Weekday::Sunday => "SU",
    }
}

/// Parses a two-letter RFC 5545 weekday code, case insensitively.
pub(crate) fn parse_weekday(s: &str) -> Result<Weekday, Error> {
    let weekday = match &*s.to_ascii_lowercase() {
        "mo" => Weekday::Monday,
        "tu" => Weekday::Tuesday,
        "we" => Weekday::Wednesday,
        "th" => Weekday::Thursday,
        "fr" => Weekday::Friday,
        "sa" => Weekday::Saturday,
        "su" => Weekday::Sunday,
        _ => return Err(Error::InvalidWeekday(s.to_string())),
    };
    Ok(weekday)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_unqualified() {
        let wd: ByWeekday = "TU".parse().unwrap();
        assert_eq!(wd, ByWeekday::Any(Weekday::Tuesday));
        let wd: ByWeekday = "su".parse().unwrap();
        assert_eq!(wd, ByWeekday::Any(Weekday::Sunday));
    }

    #[test]
    fn parses_ordinals() {
        let wd: ByWeekday = "2TU".parse().unwrap();
        assert_eq!(wd, ByWeekday::Nth { nth: 2, weekday: Weekday::Tuesday });
        let wd: ByWeekday = "-1SU".parse().unwrap();
        assert_eq!(wd, ByWeekday::Nth { nth: -1, weekday: Weekday::Sunday });
        let wd: ByWeekday = "+3FR".parse().unwrap();
        assert_eq!(wd, ByWeekday::Nth { nth: 3, weekday: Weekday::Friday });
    }

    #[test]
    fn zero_ordinal_means_any() {
        let wd: ByWeekday = "0WE".parse().unwrap();
        assert_eq!(wd, ByWeekday::Any(Weekday::Wednesday));
    }

    #[test]
    fn rejects_garbage() {
        let err = "XX".parse::<ByWeekday>().unwrap_err();
        insta::assert_snapshot!(err, @"invalid day of week `XX`");
        let err = "5".parse::<ByWeekday>().unwrap_err();
        insta::assert_snapshot!(err, @"invalid day of week ``");
        let err = "".parse::<ByWeekday>().unwrap_err();
        insta::assert_snapshot!(err, @"invalid day of week ``");
    }

    #[test]
    fn round_trips_through_display() {
        for s in ["MO", "2TU", "-1SU", "53FR"] {
            let wd: ByWeekday = s.parse().unwrap();
            assert_eq!(wd.to_string(), s);
        }
    }
}
