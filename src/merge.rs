use jiff::Zoned;

use crate::iter::RRuleIter;

/// A k-way chronological merge over child iterators.
///
/// Peeking finds the child with the earliest head and commits to it
/// (ties break toward the earliest index, which keeps the merge
/// stable); advancing consumes from the committed child only and clears
/// the commitment. The group is exhausted when every child is.
#[derive(Clone, Debug)]
pub(crate) struct GroupIter {
    iters: Vec<RRuleIter>,
    current_min: Option<usize>,
}

impl GroupIter {
    pub(crate) fn new(iters: Vec<RRuleIter>) -> GroupIter {
        GroupIter { iters, current_min: None }
    }

    pub(crate) fn peek(&mut self) -> Option<&Zoned> {
        if self.current_min.is_none() {
            let mut min: Option<(usize, Zoned)> = None;
            for (i, iter) in self.iters.iter_mut().enumerate() {
                let Some(head) = iter.peek() else { continue };
                match min {
                    Some((_, ref m)) if head >= m => {}
                    _ => min = Some((i, head.clone())),
                }
            }
            self.current_min = min.map(|(i, _)| i);
        }
        let idx = self.current_min?;
        self.iters[idx].peek()
    }

    pub(crate) fn next(&mut self) -> Option<Zoned> {
        if self.current_min.is_none() {
            self.peek()?;
        }
        let idx = self.current_min.take()?;
        self.iters[idx].next()
    }
}

/// The composed iterator for a whole [`crate::Recurrence`]: a merge of
/// the inclusion rules and dates, minus everything produced by the
/// exclusion rules and dates.
///
/// Emissions are strictly increasing: inclusion instants that several
/// rules generate in agreement come out once.
#[derive(Clone, Debug)]
pub struct RecurrenceIter {
    inclusions: GroupIter,
    exclusions: GroupIter,
    last: Option<Zoned>,
}

enum Action {
    AdvanceExclusions,
    DropCandidate,
    Emit,
}

impl RecurrenceIter {
    pub(crate) fn new(
        inclusions: GroupIter,
        exclusions: GroupIter,
    ) -> RecurrenceIter {
        RecurrenceIter { inclusions, exclusions, last: None }
    }

    /// Returns the next instant without consuming it.
    pub fn peek(&mut self) -> Option<&Zoned> {
        self.settle();
        self.inclusions.peek()
    }

    /// Drops excluded and duplicate candidates until the head of the
    /// inclusion merge is emittable (or the merge is exhausted). The
    /// exclusion side only ever advances while it trails the candidate,
    /// so it stays lazy even when its rules are unbounded.
    fn settle(&mut self) {
        loop {
            let Some(candidate) = self.inclusions.peek().cloned() else {
                return;
            };
            if self.last.as_ref() == Some(&candidate) {
                self.inclusions.next();
                continue;
            }
            let action = match self.exclusions.peek() {
                Some(exc) if *exc < candidate => Action::AdvanceExclusions,
                Some(exc) if *exc == candidate => Action::DropCandidate,
                _ => Action::Emit,
            };
            match action {
                Action::AdvanceExclusions => {
                    self.exclusions.next();
                }
                Action::DropCandidate => {
                    log::trace!(
                        "candidate {candidate} is excluded; dropping",
                    );
                    self.inclusions.next();
                }
                Action::Emit => return,
            }
        }
    }
}

impl Iterator for RecurrenceIter {
    type Item = Zoned;

    fn next(&mut self) -> Option<Zoned> {
        self.settle();
        let next = self.inclusions.next();
        if let Some(ref t) = next {
            self.last = Some(t.clone());
        }
        next
    }
}

impl std::iter::FusedIterator for RecurrenceIter {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{frequency::Frequency, rule::RRule, weekday::ByWeekday};
    use jiff::civil::Weekday;

    fn zoned(s: &str) -> Zoned {
        s.parse().unwrap()
    }

    fn start() -> Zoned {
        zoned("20180825T090807[UTC]")
    }

    fn weekly_on(weekday: Weekday) -> RRuleIter {
        RRule {
            count: Some(5),
            dtstart: Some(start()),
            by_weekdays: vec![ByWeekday::Any(weekday)],
            ..RRule::new(Frequency::Weekly)
        }
        .iterator()
        .unwrap()
    }

    #[test]
    fn group_merges_in_order() {
        let mut group = GroupIter::new(vec![
            weekly_on(Weekday::Monday),
            weekly_on(Weekday::Tuesday),
        ]);
        let mut count = 0;
        let mut prev: Option<Zoned> = None;
        loop {
            let peeked = group.peek().cloned();
            let next = group.next();
            assert_eq!(peeked, next);
            let Some(next) = next else { break };
            if let Some(prev) = prev {
                assert!(prev <= next);
            }
            prev = Some(next);
            count += 1;
        }
        assert_eq!(count, 10);
    }

    #[test]
    fn group_of_nothing_is_empty() {
        let mut group = GroupIter::new(vec![]);
        assert!(group.peek().is_none());
        assert!(group.next().is_none());

        let mut group =
            GroupIter::new(vec![RRuleIter::from_dates(vec![])]);
        assert!(group.next().is_none());
    }

    #[test]
    fn equal_heads_commit_to_the_earliest_child() {
        // Two identical children tie on every head; the merge must
        // still drain both and stay ordered.
        let dates = vec![
            zoned("20180825T000000[UTC]"),
            zoned("20180826T000000[UTC]"),
        ];
        let mut group = GroupIter::new(vec![
            RRuleIter::from_dates(dates.clone()),
            RRuleIter::from_dates(dates),
        ]);
        let mut all = vec![];
        while let Some(t) = group.next() {
            all.push(t);
        }
        assert_eq!(all.len(), 4);
        assert_eq!(all[0], all[1]);
        assert_eq!(all[2], all[3]);
    }
}
