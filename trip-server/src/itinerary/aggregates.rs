//! Aggregate roll-ups: stint totals and trip-level bounds.
//!
//! Every function here is a full recompute from current state, so running
//! one twice is harmless and a stale snapshot heals on the next pass.

use chrono::{DateTime, Duration, NaiveTime, Utc};

use crate::domain::{Leg, StintId, Stop, TripId};
use crate::store::{Database, Txn};

use super::error::{EngineError, EntityKind};
use super::legs::round_miles;

/// Total stint mileage: the leg distances summed and re-rounded to the
/// one-decimal precision the stored values use.
fn stint_distance(legs: &[Leg]) -> f64 {
    round_miles(legs.iter().map(|l| l.distance_mi).sum())
}

/// Total stint minutes: driving time plus planned dwell at every stop.
fn stint_duration(legs: &[Leg], stops: &[Stop]) -> i64 {
    let travel: i64 = legs.iter().map(|l| l.travel_mins).sum();
    let dwell: i64 = stops.iter().map(|s| s.duration_mins.max(0)).sum();
    travel + dwell
}

fn day_start(t: DateTime<Utc>) -> DateTime<Utc> {
    t.date_naive().and_time(NaiveTime::MIN).and_utc()
}

fn day_end(t: DateTime<Utc>) -> DateTime<Utc> {
    day_start(t) + Duration::days(1) - Duration::seconds(1)
}

/// Recompute a stint's distance, duration and end time from its legs and
/// stops.
///
/// # Errors
///
/// [`EngineError::NotFound`] when the stint does not exist.
pub fn recalculate_stint(tx: &mut Txn<'_>, stint_id: StintId) -> Result<(), EngineError> {
    let mut stint = tx
        .stints()
        .find(stint_id)
        .ok_or_else(|| EngineError::not_found(EntityKind::Stint, stint_id))?;

    let stops = tx.stops().by_stint(stint_id);
    let legs = tx.legs().by_stint(stint_id);

    stint.distance_mi = stint_distance(&legs);
    stint.duration_mins = stint_duration(&legs, &stops);
    stint.end_time = stops.last().and_then(|s| s.departure);

    tx.stints().save(stint);
    Ok(())
}

/// Recompute only the stint's distance, leaving its duration and end time
/// as they are.
pub fn recalculate_stint_distance(tx: &mut Txn<'_>, stint_id: StintId) -> Result<(), EngineError> {
    let mut stint = tx
        .stints()
        .find(stint_id)
        .ok_or_else(|| EngineError::not_found(EntityKind::Stint, stint_id))?;

    let legs = tx.legs().by_stint(stint_id);
    stint.distance_mi = stint_distance(&legs);

    tx.stints().save(stint);
    Ok(())
}

/// Recompute only the stint's duration.
pub fn recalculate_stint_duration(tx: &mut Txn<'_>, stint_id: StintId) -> Result<(), EngineError> {
    let mut stint = tx
        .stints()
        .find(stint_id)
        .ok_or_else(|| EngineError::not_found(EntityKind::Stint, stint_id))?;

    let stops = tx.stops().by_stint(stint_id);
    let legs = tx.legs().by_stint(stint_id);
    stint.duration_mins = stint_duration(&legs, &stops);

    tx.stints().save(stint);
    Ok(())
}

/// Recompute a trip's total distance and its date bounds from its stints.
///
/// The trip spans whole days: its start date is midnight on the day the
/// earliest stint begins, its end date is 23:59:59 on the day the latest
/// stint wraps up. Trips whose stints carry no times have no bounds.
///
/// # Errors
///
/// [`EngineError::NotFound`] when the trip does not exist.
pub fn recalculate_trip(tx: &mut Txn<'_>, trip_id: TripId) -> Result<(), EngineError> {
    let mut trip = tx
        .trips()
        .find(trip_id)
        .ok_or_else(|| EngineError::not_found(EntityKind::Trip, trip_id))?;

    let stints = tx.stints().by_trip(trip_id);

    trip.total_distance_mi = round_miles(stints.iter().map(|s| s.distance_mi).sum());
    trip.start_date = stints
        .iter()
        .filter_map(|s| s.start_time)
        .min()
        .map(day_start);
    trip.end_date = stints.iter().filter_map(|s| s.end_time).max().map(day_end);

    tx.trips().save(trip);
    Ok(())
}

/// The post-commit correction pass: recompute one stint and its trip in a
/// fresh transaction.
///
/// This runs detached from the mutation that queued it. A failure here is
/// logged and swallowed; the aggregates heal on the next recomputation.
pub async fn refresh_aggregates(db: &Database, stint_id: StintId, trip_id: TripId) {
    let result = db
        .transaction(|tx| {
            recalculate_stint(tx, stint_id)?;
            recalculate_trip(tx, trip_id)
        })
        .await;

    if let Err(err) = result {
        tracing::warn!(
            stint = %stint_id,
            trip = %trip_id,
            error = %err,
            "post-commit aggregate refresh failed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LegStart, LocationId, Stint, StopId, Trip, UserId};
    use crate::store::Database;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, day, hour, minute, 0).unwrap()
    }

    fn leg_with(stint: StintId, sequence: u32, distance_mi: f64, travel_mins: i64) -> Leg {
        let mut leg = Leg::new(
            stint,
            sequence,
            LegStart::Location(LocationId::generate()),
            StopId::generate(),
        );
        leg.distance_mi = distance_mi;
        leg.travel_mins = travel_mins;
        leg
    }

    fn stop_with(stint: StintId, sequence: u32, dwell_mins: i64) -> Stop {
        let mut stop = Stop::new(stint, sequence, LocationId::generate());
        stop.duration_mins = dwell_mins;
        stop
    }

    async fn seed_stint(db: &Database) -> StintId {
        let stint = Stint::new(TripId::generate(), 1, None);
        let id = stint.id;
        db.transaction(|tx| {
            tx.stints().save(stint);
            Ok::<_, EngineError>(())
        })
        .await
        .unwrap();
        id
    }

    #[tokio::test]
    async fn stint_distance_is_summed_and_rerounded() {
        let db = Database::new();
        let stint_id = seed_stint(&db).await;

        db.transaction(|tx| {
            tx.legs().save(leg_with(stint_id, 0, 1.1, 10));
            tx.legs().save(leg_with(stint_id, 1, 2.2, 10));
            tx.legs().save(leg_with(stint_id, 2, 3.3, 10));
            recalculate_stint(tx, stint_id)
        })
        .await
        .unwrap();

        // 1.1 + 2.2 + 3.3 accumulates float dust; the stored total is clean
        let stint = db.stint(stint_id).await.unwrap();
        assert_eq!(stint.distance_mi, 6.6);
    }

    #[tokio::test]
    async fn stint_duration_adds_travel_and_dwell() {
        let db = Database::new();
        let stint_id = seed_stint(&db).await;

        db.transaction(|tx| {
            tx.legs().save(leg_with(stint_id, 0, 5.0, 30));
            tx.legs().save(leg_with(stint_id, 1, 5.0, 45));
            tx.stops().save(stop_with(stint_id, 1, 20));
            tx.stops().save(stop_with(stint_id, 2, 0));
            recalculate_stint(tx, stint_id)
        })
        .await
        .unwrap();

        let stint = db.stint(stint_id).await.unwrap();
        assert_eq!(stint.duration_mins, 95);
    }

    #[tokio::test]
    async fn stint_end_time_is_last_stop_departure() {
        let db = Database::new();
        let stint_id = seed_stint(&db).await;

        db.transaction(|tx| {
            let mut first = stop_with(stint_id, 1, 0);
            first.departure = Some(at(12, 10, 0));
            let mut last = stop_with(stint_id, 2, 0);
            last.departure = Some(at(12, 16, 30));
            tx.stops().save(first);
            tx.stops().save(last);
            recalculate_stint(tx, stint_id)
        })
        .await
        .unwrap();

        let stint = db.stint(stint_id).await.unwrap();
        assert_eq!(stint.end_time, Some(at(12, 16, 30)));
    }

    #[tokio::test]
    async fn narrow_recomputes_leave_other_fields_alone() {
        let db = Database::new();
        let stint_id = seed_stint(&db).await;

        // Plant sentinel values, then recompute one field at a time
        db.transaction(|tx| {
            let mut stint = tx.stints().find(stint_id).unwrap();
            stint.distance_mi = 999.9;
            stint.duration_mins = 999;
            tx.stints().save(stint);
            tx.legs().save(leg_with(stint_id, 0, 2.5, 40));
            Ok::<_, EngineError>(())
        })
        .await
        .unwrap();

        db.transaction(|tx| recalculate_stint_distance(tx, stint_id))
            .await
            .unwrap();
        let stint = db.stint(stint_id).await.unwrap();
        assert_eq!(stint.distance_mi, 2.5);
        assert_eq!(stint.duration_mins, 999);

        db.transaction(|tx| recalculate_stint_duration(tx, stint_id))
            .await
            .unwrap();
        let stint = db.stint(stint_id).await.unwrap();
        assert_eq!(stint.duration_mins, 40);
    }

    #[tokio::test]
    async fn trip_rollup_sums_stints_and_bounds_dates() {
        let db = Database::new();
        let trip = Trip::new(UserId::generate(), "Desert loop");
        let trip_id = trip.id;

        db.transaction(|tx| {
            tx.trips().save(trip);

            let mut first = Stint::new(trip_id, 1, None);
            first.distance_mi = 120.4;
            first.start_time = Some(at(12, 9, 0));
            first.end_time = Some(at(12, 18, 30));
            tx.stints().save(first);

            let mut second = Stint::new(trip_id, 2, None);
            second.distance_mi = 80.2;
            second.start_time = Some(at(13, 8, 0));
            // Overnight drive spilling into the next day
            second.end_time = Some(at(14, 1, 15));
            tx.stints().save(second);

            recalculate_trip(tx, trip_id)
        })
        .await
        .unwrap();

        let trip = db.trip(trip_id).await.unwrap();
        assert_eq!(trip.total_distance_mi, 200.6);
        assert_eq!(
            trip.start_date,
            Some(Utc.with_ymd_and_hms(2026, 6, 12, 0, 0, 0).unwrap())
        );
        assert_eq!(
            trip.end_date,
            Some(Utc.with_ymd_and_hms(2026, 6, 14, 23, 59, 59).unwrap())
        );
    }

    #[tokio::test]
    async fn untimed_trip_has_no_date_bounds() {
        let db = Database::new();
        let trip = Trip::new(UserId::generate(), "Someday");
        let trip_id = trip.id;

        db.transaction(|tx| {
            tx.trips().save(trip);
            tx.stints().save(Stint::new(trip_id, 1, None));
            recalculate_trip(tx, trip_id)
        })
        .await
        .unwrap();

        let trip = db.trip(trip_id).await.unwrap();
        assert!(trip.start_date.is_none());
        assert!(trip.end_date.is_none());
        assert_eq!(trip.total_distance_mi, 0.0);
    }

    #[tokio::test]
    async fn recompute_is_idempotent() {
        let db = Database::new();
        let stint_id = seed_stint(&db).await;

        db.transaction(|tx| {
            tx.legs().save(leg_with(stint_id, 0, 3.7, 25));
            tx.stops().save(stop_with(stint_id, 1, 15));
            recalculate_stint(tx, stint_id)?;
            recalculate_stint(tx, stint_id)
        })
        .await
        .unwrap();

        let stint = db.stint(stint_id).await.unwrap();
        assert_eq!(stint.distance_mi, 3.7);
        assert_eq!(stint.duration_mins, 40);
    }

    #[tokio::test]
    async fn missing_stint_is_not_found() {
        let db = Database::new();
        let err = db
            .transaction(|tx| recalculate_stint(tx, StintId::generate()))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::NotFound { .. }));
    }

    #[tokio::test]
    async fn refresh_swallows_failures_and_writes_nothing() {
        let db = Database::new();
        let trip = Trip::new(UserId::generate(), "Untouched");
        let trip_id = trip.id;
        db.transaction(|tx| {
            tx.trips().save(trip);
            Ok::<_, EngineError>(())
        })
        .await
        .unwrap();

        // The stint does not exist, so the refresh transaction fails; the
        // call itself must not propagate or leave partial writes.
        refresh_aggregates(&db, StintId::generate(), trip_id).await;

        let trip = db.trip(trip_id).await.unwrap();
        assert_eq!(trip.total_distance_mi, 0.0);
        assert!(trip.start_date.is_none());
    }
}
