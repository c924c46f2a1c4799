/*!
A library for expanding RFC 5545 recurrence rules ("RRULEs") into lazy,
chronologically ordered sequences of time zone aware instants.

The two entry points are [`RRule`], a single recurrence pattern, and
[`Recurrence`], the composition of include/exclude patterns and explicit
dates that describes one calendar series. Both can be built as plain
values or parsed from their RFC 5545 text forms, and both hand out lazy
iterators of [`jiff::Zoned`] instants.

```
use recurring::Recurrence;

let text = "DTSTART:20180825T090807Z\n\
            RRULE:FREQ=WEEKLY;COUNT=3;BYDAY=TU";
let recurrence = Recurrence::parse(text, None).unwrap();
let instants: Vec<String> = recurrence
    .iterator()
    .unwrap()
    .map(|zdt| zdt.to_string())
    .collect();
assert_eq!(
    instants,
    [
        "2018-08-28T09:08:07+00:00[UTC]",
        "2018-09-04T09:08:07+00:00[UTC]",
        "2018-09-11T09:08:07+00:00[UTC]",
    ],
);
```

Expansion is driven by the pattern's `dtstart`: its time zone is the
zone the whole pattern is computed in, so daylight saving transitions
keep wall clock times where RFC 5545 says they should be. There is no
implicit "now" anywhere; a rule without a start simply can't be
expanded.

Iterators are values with a cursor: advancing one never mutates the
rule it came from, independent iterators over the same rule don't
observe each other, and no iterator is safe to share across threads
without external synchronization.
*/

pub use crate::{
    error::Error,
    frequency::Frequency,
    iter::RRuleIter,
    merge::RecurrenceIter,
    parse::load_location,
    recurrence::Recurrence,
    rule::{InvalidBehavior, RRule},
    weekday::ByWeekday,
};

mod calendar;
mod error;
mod expand;
mod filter;
mod frequency;
mod iter;
mod merge;
mod parse;
mod recurrence;
mod rule;
mod weekday;
