// End-to-end expansions through the text grammar, each from the same
// starting point unless a zone matters.

use recurring::Recurrence;

fn expand(text: &str) -> String {
    let recurrence = Recurrence::parse(text, None).unwrap();
    recurrence
        .iterator()
        .unwrap()
        .map(|zdt| zdt.to_string())
        .collect::<Vec<String>>()
        .join("\n")
}

#[test]
fn daily_for_three() {
    insta::assert_snapshot!(
        expand(
            "DTSTART:20180825T090807Z\n\
             RRULE:FREQ=DAILY;COUNT=3",
        ),
        @r"
    2018-08-25T09:08:07+00:00[UTC]
    2018-08-26T09:08:07+00:00[UTC]
    2018-08-27T09:08:07+00:00[UTC]
    ",
    );
}

#[test]
fn weekly_on_tuesdays() {
    insta::assert_snapshot!(
        expand(
            "DTSTART:20180825T090807Z\n\
             RRULE:FREQ=WEEKLY;COUNT=3;BYDAY=TU",
        ),
        @r"
    2018-08-28T09:08:07+00:00[UTC]
    2018-09-04T09:08:07+00:00[UTC]
    2018-09-11T09:08:07+00:00[UTC]
    ",
    );
}

#[test]
fn monthly_first_tuesdays() {
    insta::assert_snapshot!(
        expand(
            "DTSTART:20180825T090807Z\n\
             RRULE:FREQ=MONTHLY;COUNT=3;BYDAY=1TU",
        ),
        @r"
    2018-09-04T09:08:07+00:00[UTC]
    2018-10-02T09:08:07+00:00[UTC]
    2018-11-06T09:08:07+00:00[UTC]
    ",
    );
}

#[test]
fn monthly_set_positions() {
    insta::assert_snapshot!(
        expand(
            "DTSTART:20180825T090807Z\n\
             RRULE:FREQ=MONTHLY;COUNT=4;BYDAY=MO,TU,WE,TH,FR,SA,SU;\
             BYMONTH=8,9;BYSETPOS=1,3,-1",
        ),
        @r"
    2018-08-31T09:08:07+00:00[UTC]
    2018-09-01T09:08:07+00:00[UTC]
    2018-09-03T09:08:07+00:00[UTC]
    2018-09-30T09:08:07+00:00[UTC]
    ",
    );
}

#[test]
fn daily_across_fall_back() {
    // The second instant is the ambiguous 01:00 (still daylight time);
    // the third comes after the transition to standard time.
    insta::assert_snapshot!(
        expand(
            "DTSTART;TZID=America/New_York:20181103T010000\n\
             RRULE:FREQ=DAILY;COUNT=3",
        ),
        @r"
    2018-11-03T01:00:00-04:00[America/New_York]
    2018-11-04T01:00:00-04:00[America/New_York]
    2018-11-05T01:00:00-05:00[America/New_York]
    ",
    );
}

#[test]
fn exrule_drops_the_last_tuesday() {
    // Five daily instants, except that 2018-08-28 is the last Tuesday
    // of August and the exclusion rule claims it.
    insta::assert_snapshot!(
        expand(
            "DTSTART:20180825T090807Z\n\
             RRULE:FREQ=DAILY;COUNT=5\n\
             EXRULE:FREQ=MONTHLY;BYDAY=-1TU",
        ),
        @r"
    2018-08-25T09:08:07+00:00[UTC]
    2018-08-26T09:08:07+00:00[UTC]
    2018-08-27T09:08:07+00:00[UTC]
    2018-08-29T09:08:07+00:00[UTC]
    ",
    );
}

#[test]
fn yearly_ordinal_weekdays() {
    // Every Tuesday, the 35th Wednesday and the 17th-from-last Monday
    // of each year.
    insta::assert_snapshot!(
        expand(
            "DTSTART:20180825T090807Z\n\
             RRULE:FREQ=YEARLY;COUNT=4;BYDAY=TU,35WE,-17MO",
        ),
        @r"
    2018-08-28T09:08:07+00:00[UTC]
    2018-08-29T09:08:07+00:00[UTC]
    2018-09-04T09:08:07+00:00[UTC]
    2018-09-10T09:08:07+00:00[UTC]
    ",
    );
}

#[test]
fn yearly_set_positions_span_the_selected_months() {
    // BYSETPOS indexes the whole year's expanded set, so -1 is the last
    // day of September, not of each month.
    insta::assert_snapshot!(
        expand(
            "DTSTART:20180825T090807Z\n\
             RRULE:FREQ=YEARLY;COUNT=4;BYDAY=MO,TU,WE,TH,FR,SA,SU;\
             BYMONTH=8,9;BYSETPOS=1,3,-1",
        ),
        @r"
    2018-09-30T09:08:07+00:00[UTC]
    2019-08-01T09:08:07+00:00[UTC]
    2019-08-03T09:08:07+00:00[UTC]
    2019-09-30T09:08:07+00:00[UTC]
    ",
    );
}

#[test]
fn half_hourly_through_a_fall_back_transition() {
    // The repeated 01:00-02:00 hour in New York appears twice, once
    // per offset, because the hourly cursor moves in absolute time.
    insta::assert_snapshot!(
        expand(
            "DTSTART;TZID=America/New_York:20181104T003000\n\
             RRULE:FREQ=HOURLY;COUNT=6;BYMINUTE=0,30",
        ),
        @r"
    2018-11-04T00:30:00-04:00[America/New_York]
    2018-11-04T01:00:00-04:00[America/New_York]
    2018-11-04T01:30:00-04:00[America/New_York]
    2018-11-04T01:00:00-05:00[America/New_York]
    2018-11-04T01:30:00-05:00[America/New_York]
    2018-11-04T02:00:00-05:00[America/New_York]
    ",
    );
}

#[test]
fn monthly_first_friday_until_christmas_eve() {
    // From RFC 5545's examples, with the November instant picking up
    // standard time.
    insta::assert_snapshot!(
        expand(
            "DTSTART;TZID=America/New_York:19970905T090000\n\
             RRULE:FREQ=MONTHLY;UNTIL=19971224T000000Z;BYDAY=1FR",
        ),
        @r"
    1997-09-05T09:00:00-04:00[America/New_York]
    1997-10-03T09:00:00-04:00[America/New_York]
    1997-11-07T09:00:00-05:00[America/New_York]
    1997-12-05T09:00:00-05:00[America/New_York]
    ",
    );
}

#[test]
fn hourly_with_minute_and_second_expansion() {
    insta::assert_snapshot!(
        expand(
            "DTSTART:20180825T090807Z\n\
             RRULE:FREQ=HOURLY;COUNT=5;BYMINUTE=15,45;BYSECOND=0",
        ),
        @r"
    2018-08-25T09:15:00+00:00[UTC]
    2018-08-25T09:45:00+00:00[UTC]
    2018-08-25T10:15:00+00:00[UTC]
    2018-08-25T10:45:00+00:00[UTC]
    2018-08-25T11:15:00+00:00[UTC]
    ",
    );
}
