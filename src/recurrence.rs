use jiff::Zoned;

use crate::{
    error::Error,
    iter::RRuleIter,
    merge::{GroupIter, RecurrenceIter},
    parse::format_line_time,
    rule::RRule,
};

/// The full recurrence for one calendar series: patterns and explicit
/// dates to include, patterns and explicit dates to exclude.
///
/// ```
/// use recurring::Recurrence;
///
/// let text = "DTSTART;TZID=America/New_York:20180825T090807\n\
///             RRULE:FREQ=DAILY;COUNT=5";
/// let recurrence = Recurrence::parse(text, None).unwrap();
/// assert_eq!(recurrence.iterator().unwrap().count(), 5);
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Recurrence {
    /// When to begin the recurrence. Its zone is the zone the whole
    /// recurrence is processed in; it is handed down to every rule at
    /// iteration time.
    pub dtstart: Option<Zoned>,

    /// If true, `dtstart` (and explicit dates) re-encode as local times
    /// with no zone suffix.
    pub floating_location: bool,

    pub rrules: Vec<RRule>,
    /// Patterns whose instants are removed from the output. (EXRULE was
    /// deprecated in RFC 5545, but it remains widely used.)
    pub exrules: Vec<RRule>,
    pub rdates: Vec<Zoned>,
    pub exdates: Vec<Zoned>,
}

impl Recurrence {
    /// Copies `dtstart` into every rule and exclusion rule.
    ///
    /// Iteration does this propagation on its own; this is for callers
    /// that want the rules themselves updated.
    pub fn set_dtstart(&mut self) {
        for rrule in &mut self.rrules {
            rrule.dtstart = self.dtstart.clone();
        }
        for exrule in &mut self.exrules {
            exrule.dtstart = self.dtstart.clone();
        }
    }

    /// Returns a lazy iterator over the recurrence's instants:
    /// everything the rules and dates include, minus everything the
    /// exclusion rules and dates produce, in strictly increasing order
    /// with duplicates collapsed.
    ///
    /// Every rule is validated eagerly; the first invalid one fails the
    /// whole construction.
    pub fn iterator(&self) -> Result<RecurrenceIter, Error> {
        let inclusions = self.group(&self.rrules, &self.rdates)?;
        let exclusions = self.group(&self.exrules, &self.exdates)?;
        Ok(RecurrenceIter::new(inclusions, exclusions))
    }

    fn group(
        &self,
        rules: &[RRule],
        dates: &[Zoned],
    ) -> Result<GroupIter, Error> {
        let mut iters = Vec::with_capacity(rules.len() + 1);
        for rule in rules {
            let rule = match self.dtstart {
                Some(ref dtstart) => {
                    let mut rule = rule.clone();
                    rule.dtstart = Some(dtstart.clone());
                    rule
                }
                None => rule.clone(),
            };
            iters.push(rule.iterator()?);
        }
        iters.push(RRuleIter::from_dates(dates.to_vec()));
        Ok(GroupIter::new(iters))
    }
}

impl std::fmt::Display for Recurrence {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut lines: Vec<String> = vec![];
        if let Some(ref dtstart) = self.dtstart {
            lines.push(format!(
                "DTSTART{}",
                format_line_time(dtstart, self.floating_location),
            ));
        }
        for rrule in &self.rrules {
            lines.push(format!("RRULE:{rrule}"));
        }
        for exrule in &self.exrules {
            lines.push(format!("EXRULE:{exrule}"));
        }
        for rdate in &self.rdates {
            lines.push(format!(
                "RDATE{}",
                format_line_time(rdate, self.floating_location),
            ));
        }
        for exdate in &self.exdates {
            lines.push(format!(
                "EXDATE{}",
                format_line_time(exdate, self.floating_location),
            ));
        }
        write!(f, "{}", lines.join("\n"))
    }
}
