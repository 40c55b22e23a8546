//! Local calendar-day arithmetic for due-date windows

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

/// Instant of local midnight starting `date`
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    local_to_utc(date.and_time(NaiveTime::MIN))
}

/// Last millisecond (23:59:59.999) of local `date`
pub fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    let last = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
    local_to_utc(date.and_time(last))
}

/// Whole local days from the day of `due` to `today`; negative when not yet due
pub fn days_late(due: DateTime<Utc>, today: NaiveDate) -> i64 {
    let due_day = due.with_timezone(&Local).date_naive();
    today.signed_duration_since(due_day).num_days()
}

fn local_to_utc(naive: NaiveDateTime) -> DateTime<Utc> {
    // A time skipped by a DST jump has no local mapping; read it as UTC
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc())
}
