//! Sequence bookkeeping for ordered itinerary children.
//!
//! Stops within a stint and stints within a trip carry 1-based, contiguous
//! sequence numbers. Every structural mutation funnels through here so the
//! numbering stays dense no matter how clients insert, delete or reorder.

use std::collections::HashMap;

use crate::domain::{StintId, Stop, StopId, TripId};
use crate::store::Txn;

use super::error::EngineError;

/// Clamp a requested insert position into the valid range `1..=len + 1`.
///
/// `None` appends, as does anything past the end. Zero is treated as the
/// front.
pub fn resolve_insert_position(len: usize, requested: Option<u32>) -> u32 {
    let append = len as u32 + 1;
    match requested {
        None => append,
        Some(0) => 1,
        Some(n) => n.min(append),
    }
}

/// Shift every stop of a stint whose sequence is at or above `from` by
/// `offset`: `+1` to open a slot before an insert, `-1` to close the gap
/// after a delete.
pub fn shift_stop_sequences(tx: &mut Txn<'_>, stint: StintId, from: u32, offset: i32) {
    for mut stop in tx.stops().by_stint(stint) {
        if stop.sequence >= from {
            stop.sequence = stop.sequence.saturating_add_signed(offset);
            tx.stops().save(stop);
        }
    }
}

/// Shift every stint of a trip whose sequence is at or above `from` by
/// `offset`.
pub fn shift_stint_sequences(tx: &mut Txn<'_>, trip: TripId, from: u32, offset: i32) {
    for mut stint in tx.stints().by_trip(trip) {
        if stint.sequence >= from {
            stint.sequence = stint.sequence.saturating_add_signed(offset);
            tx.stints().save(stint);
        }
    }
}

/// A planned sequence assignment for one stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceChange {
    pub stop: StopId,
    pub sequence: u32,
}

/// Merge a client ordering into the current stop list.
///
/// The order list may be partial: stops it names take their requested
/// positions (earliest first on ties), stops it omits fill the remaining
/// slots in their existing relative order, and the result is renormalized
/// to a dense `1..=N`. Requested positions outside that range are clamped
/// into it.
///
/// Returns only the assignments whose sequence actually changed, so a
/// repeated identical request plans zero writes.
///
/// # Errors
///
/// - [`EngineError::Forbidden`] when the order list names a stop that is
///   not part of `stops`
/// - [`EngineError::Conflict`] when the same stop appears more than once
pub fn plan_reorder(
    stops: &[Stop],
    wanted: &[(StopId, u32)],
) -> Result<Vec<SequenceChange>, EngineError> {
    let mut requested: HashMap<StopId, u32> = HashMap::with_capacity(wanted.len());

    for (id, target) in wanted {
        if !stops.iter().any(|s| s.id == *id) {
            return Err(EngineError::Forbidden(format!(
                "stop {id} is not part of this stint"
            )));
        }
        if requested.insert(*id, (*target).max(1)).is_some() {
            return Err(EngineError::Conflict(format!(
                "stop {id} appears more than once in the order list"
            )));
        }
    }

    // Split into supplied stops ordered by (target, current) and omitted
    // stops in their current order.
    let mut supplied: Vec<(u32, u32, StopId)> = Vec::new();
    let mut omitted: Vec<(u32, StopId)> = Vec::new();

    for stop in stops {
        match requested.get(&stop.id) {
            Some(&target) => supplied.push((target, stop.sequence, stop.id)),
            None => omitted.push((stop.sequence, stop.id)),
        }
    }

    supplied.sort_unstable();
    omitted.sort_unstable();

    // Walk the positions front to back. A supplied stop claims each
    // position once its target is due; otherwise the next omitted stop
    // slides in. Whichever queue still has entries at the end drains in
    // order.
    let total = stops.len() as u32;
    let mut supplied = supplied.into_iter().peekable();
    let mut omitted = omitted.into_iter();
    let mut merged: Vec<StopId> = Vec::with_capacity(stops.len());

    for position in 1..=total {
        if let Some((_, _, id)) = supplied.next_if(|&(target, _, _)| target <= position) {
            merged.push(id);
        } else if let Some((_, id)) = omitted.next() {
            merged.push(id);
        } else if let Some((_, _, id)) = supplied.next() {
            merged.push(id);
        }
    }

    let current: HashMap<StopId, u32> = stops.iter().map(|s| (s.id, s.sequence)).collect();

    Ok(merged
        .into_iter()
        .enumerate()
        .filter_map(|(index, id)| {
            let sequence = index as u32 + 1;
            (current.get(&id) != Some(&sequence)).then_some(SequenceChange { stop: id, sequence })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LocationId;

    fn stop_list(count: u32) -> Vec<Stop> {
        let stint = StintId::generate();
        (1..=count)
            .map(|seq| Stop::new(stint, seq, LocationId::generate()))
            .collect()
    }

    fn apply(stops: &[Stop], changes: &[SequenceChange]) -> Vec<(StopId, u32)> {
        let mut out: Vec<(StopId, u32)> = stops
            .iter()
            .map(|s| {
                let seq = changes
                    .iter()
                    .find(|c| c.stop == s.id)
                    .map_or(s.sequence, |c| c.sequence);
                (s.id, seq)
            })
            .collect();
        out.sort_by_key(|&(_, seq)| seq);
        out
    }

    #[test]
    fn resolve_position_appends_by_default() {
        assert_eq!(resolve_insert_position(0, None), 1);
        assert_eq!(resolve_insert_position(3, None), 4);
    }

    #[test]
    fn resolve_position_clamps_out_of_range() {
        assert_eq!(resolve_insert_position(3, Some(0)), 1);
        assert_eq!(resolve_insert_position(3, Some(99)), 4);
        assert_eq!(resolve_insert_position(3, Some(2)), 2);
    }

    #[test]
    fn partial_order_pushes_omitted_stops_back() {
        // A(1), B(2), C(3); request B -> 1 and C -> 2. A keeps its old slot
        // number nowhere: it lands after the supplied stops, at 3.
        let stops = stop_list(3);
        let (a, b, c) = (stops[0].id, stops[1].id, stops[2].id);

        let changes = plan_reorder(&stops, &[(b, 1), (c, 2)]).unwrap();
        let order = apply(&stops, &changes);

        assert_eq!(order, vec![(b, 1), (c, 2), (a, 3)]);
    }

    #[test]
    fn single_move_to_back() {
        let stops = stop_list(3);
        let (a, b, c) = (stops[0].id, stops[1].id, stops[2].id);

        let changes = plan_reorder(&stops, &[(a, 3)]).unwrap();
        let order = apply(&stops, &changes);

        assert_eq!(order, vec![(b, 1), (c, 2), (a, 3)]);
    }

    #[test]
    fn single_move_to_front() {
        let stops = stop_list(3);
        let (a, b, c) = (stops[0].id, stops[1].id, stops[2].id);

        let changes = plan_reorder(&stops, &[(c, 1)]).unwrap();
        let order = apply(&stops, &changes);

        assert_eq!(order, vec![(c, 1), (a, 2), (b, 3)]);
    }

    #[test]
    fn targets_past_the_end_are_clamped() {
        let stops = stop_list(3);
        let (a, b, c) = (stops[0].id, stops[1].id, stops[2].id);

        let changes = plan_reorder(&stops, &[(a, 99)]).unwrap();
        let order = apply(&stops, &changes);

        assert_eq!(order, vec![(b, 1), (c, 2), (a, 3)]);
    }

    #[test]
    fn unchanged_request_plans_no_writes() {
        let stops = stop_list(3);
        let assignments: Vec<(StopId, u32)> = stops.iter().map(|s| (s.id, s.sequence)).collect();

        let changes = plan_reorder(&stops, &assignments).unwrap();
        assert!(changes.is_empty());
    }

    #[test]
    fn foreign_stop_is_forbidden() {
        let stops = stop_list(2);
        let foreign = StopId::generate();

        let err = plan_reorder(&stops, &[(foreign, 1)]).unwrap_err();
        assert!(matches!(err, EngineError::Forbidden(_)));
    }

    #[test]
    fn duplicate_stop_is_a_conflict() {
        let stops = stop_list(2);
        let a = stops[0].id;

        let err = plan_reorder(&stops, &[(a, 1), (a, 2)]).unwrap_err();
        assert!(matches!(err, EngineError::Conflict(_)));
    }

    #[test]
    fn colliding_targets_keep_current_relative_order() {
        let stops = stop_list(3);
        let (a, b, c) = (stops[0].id, stops[1].id, stops[2].id);

        // A and B both ask for position 2; A wins the tie by current
        // order. C is displaced to the front.
        let changes = plan_reorder(&stops, &[(a, 2), (b, 2)]).unwrap();
        let order = apply(&stops, &changes);

        assert_eq!(order, vec![(c, 1), (a, 2), (b, 3)]);
    }

    #[test]
    fn empty_inputs() {
        assert!(plan_reorder(&[], &[]).unwrap().is_empty());

        let stops = stop_list(2);
        assert!(plan_reorder(&stops, &[]).unwrap().is_empty());
    }
}
