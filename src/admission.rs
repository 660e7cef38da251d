use crate::models::{AdmissionStatus, MoodSession};
use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// At most this many completed check-ins per user per local calendar day.
pub const DAILY_LIMIT: usize = 2;

/// Resolves a client-forwarded IANA timezone name, falling back to UTC
/// when missing or unparseable. The server stays the sole authority for
/// day boundaries; the client only supplies the zone.
pub fn resolve_tz(name: Option<&str>) -> Tz {
    name.and_then(|value| value.parse().ok()).unwrap_or(Tz::UTC)
}

/// UTC instants of the local day containing `now`: [midnight, next midnight).
pub fn local_day_bounds(now: DateTime<Utc>, tz: Tz) -> (DateTime<Utc>, DateTime<Utc>) {
    let day = now.with_timezone(&tz).date_naive();
    (local_midnight_utc(day, tz), local_midnight_utc(day + Duration::days(1), tz))
}

fn local_midnight_utc(day: chrono::NaiveDate, tz: Tz) -> DateTime<Utc> {
    let midnight = day.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&midnight).earliest() {
        Some(instant) => instant.with_timezone(&Utc),
        // Midnight skipped by a DST jump; the UTC reading is close enough.
        None => Utc.from_utc_datetime(&midnight),
    }
}

/// Completed sessions inside the user's current local day.
pub fn daily_count(sessions: &[MoodSession], tz: Tz, now: DateTime<Utc>) -> usize {
    let (start, end) = local_day_bounds(now, tz);
    sessions
        .iter()
        .filter(|session| session.timestamp >= start && session.timestamp < end)
        .count()
}

/// Admission check for one user-day. Callers that go on to record a
/// session must hold the store lock across check and append so two
/// concurrent submissions cannot both slip past the limit.
pub fn check(sessions: &[MoodSession], tz: Tz, now: DateTime<Utc>) -> AdmissionStatus {
    let count = daily_count(sessions, tz, now);
    let can_check_in = count < DAILY_LIMIT;
    let next_check_in = if can_check_in {
        None
    } else {
        Some(local_day_bounds(now, tz).1)
    };
    AdmissionStatus {
        count,
        can_check_in,
        next_check_in,
    }
}
