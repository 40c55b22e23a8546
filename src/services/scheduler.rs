//! Daily triggers for the reservation batch jobs
//!
//! Each job fires once a day at a fixed local time. A tick that is missed (process down,
//! clock jump) is not replayed; the loop simply waits for the next occurrence.

use std::future::Future;

use chrono::{DateTime, Duration, Local, NaiveTime, TimeZone};
use tokio::task::JoinHandle;

use super::reservations::ReservationsService;
use crate::error::AppResult;

pub struct Scheduler {
    reservations: ReservationsService,
    reminder_at: NaiveTime,
    late_fee_at: NaiveTime,
}

impl Scheduler {
    pub fn new(reservations: ReservationsService, reminder_at: NaiveTime, late_fee_at: NaiveTime) -> Self {
        Self {
            reservations,
            reminder_at,
            late_fee_at,
        }
    }

    /// Spawn the reminder and late-fee loops
    pub fn start(self) -> Vec<JoinHandle<()>> {
        let reminders = self.reservations.clone();
        let late_fees = self.reservations;

        vec![
            tokio::spawn(run_daily("reminder emails", self.reminder_at, move || {
                let reservations = reminders.clone();
                async move {
                    let _ = run_reminders(&reservations).await;
                }
            })),
            tokio::spawn(run_daily("late return fees", self.late_fee_at, move || {
                let reservations = late_fees.clone();
                async move {
                    run_late_fees(&reservations).await;
                }
            })),
        ]
    }
}

/// Run both reminder jobs concurrently; one failing does not affect the other
pub async fn run_reminders(reservations: &ReservationsService) -> [AppResult<()>; 2] {
    tracing::info!("Executing job for reminder emails...");
    let (upcoming, late) = tokio::join!(
        reservations.notify_upcoming_due_date(),
        reservations.notify_late_returns()
    );

    let results = [upcoming, late];
    for (index, result) in results.iter().enumerate() {
        if let Err(e) = result {
            tracing::error!("Error in job {}: {}", index + 1, e);
        }
    }
    results
}

pub async fn run_late_fees(reservations: &ReservationsService) {
    tracing::info!("Executing fee to charge clients with late returns...");
    if let Err(e) = reservations.apply_late_return_charge().await {
        tracing::error!("Error in late return charge job: {}", e);
    }
}

async fn run_daily<F, Fut>(name: &'static str, at: NaiveTime, job: F)
where
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let mut last_run: Option<DateTime<Local>> = None;
    loop {
        let now = Local::now();
        let next = next_run(&now, last_run.as_ref(), at);
        tracing::info!("Next {} run at {}", name, next);

        let wait = (next - now).to_std().unwrap_or_default();
        tokio::time::sleep(wait).await;
        last_run = Some(next);

        // A panicking run only takes down its own task
        tokio::spawn(job());
    }
}

/// Next tick after both `now` and the last fired tick, so a wall clock stepped
/// backwards never fires the same tick twice
pub fn next_run<Tz: TimeZone>(
    now: &DateTime<Tz>,
    last_run: Option<&DateTime<Tz>>,
    at: NaiveTime,
) -> DateTime<Tz> {
    match last_run {
        Some(last) if last > now => next_run_after(last, at),
        _ => next_run_after(now, at),
    }
}

/// First occurrence of local time `at` strictly after `now`
pub fn next_run_after<Tz: TimeZone>(now: &DateTime<Tz>, at: NaiveTime) -> DateTime<Tz> {
    let today = now.date_naive();
    (0..=2)
        .filter_map(|offset| {
            let date = today + Duration::days(offset);
            now.timezone().from_local_datetime(&date.and_time(at)).earliest()
        })
        .find(|candidate| candidate > now)
        .unwrap_or_else(|| now.clone() + Duration::days(1))
}
