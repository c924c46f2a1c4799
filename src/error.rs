/// The error type for everything that can go wrong at the library boundary.
///
/// Errors come in two flavors. Grammar errors arise while parsing rrule or
/// recurrence text. Semantic errors arise when a structurally fine rule
/// violates an RFC 5545 invariant (for example, carrying both `COUNT` and
/// `UNTIL`). Iteration itself never fails: once an iterator is handed out,
/// it only ever terminates normally on its count, its until bound or
/// exhaustion of the underlying time representation.
///
/// Out-of-range BY values (say, `BYMONTHDAY=57`) are deliberately *not*
/// errors. They parse fine and simply never match anything, which is how
/// the filtering and expansion pipeline treats unknown values.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    /// An rrule segment without a `KEY=VALUE` shape.
    #[error("rrule segment `{0}` is invalid")]
    MalformedSegment(String),

    /// A `KEY=VALUE` segment whose key isn't recognized.
    #[error("`{0}` is not a supported rrule part")]
    UnknownKey(String),

    /// A value that should have been an integer but wasn't.
    #[error("`{0}` is not a valid integer")]
    InvalidInteger(String),

    /// A `FREQ` value that isn't one of the seven RFC 5545 frequencies.
    #[error("frequency `{0}` is not valid")]
    InvalidFrequency(String),

    /// A weekday that isn't one of `MO`-`SU`, optionally preceded by a
    /// signed ordinal.
    #[error("invalid day of week `{0}`")]
    InvalidWeekday(String),

    /// A datetime that matches none of the recognized `YYYYMMDDTHHMMSS`
    /// forms.
    #[error("invalid datetime `{0}`")]
    InvalidTime(String),

    /// A `TZID=` parameter with no terminating `:`.
    #[error("no end to TZID")]
    UnterminatedTzid,

    /// A `TZID` naming a zone the time zone database doesn't know.
    #[error("unknown time zone `{0}`")]
    UnknownTimeZone(String),

    /// A rule that parsed fine but violates an RFC 5545 invariant.
    #[error("{0}")]
    InvalidRule(&'static str),
}
