//! Availability slot generation.
//!
//! For a requested date and service duration, produce the full grid of
//! candidate start times between opening and closing, each marked
//! available or not. A slot is available when at least one eligible
//! staff member is working at that time and clears every conflict rule
//! against their existing appointments.
//!
//! Loading is split from evaluation: [`DayContext::load`] reads
//! everything the query needs from SQLite up front, then
//! [`generate_slots`] works on owned data. The split keeps the
//! evaluation future `Send` (the connection never crosses an await) and
//! makes the algorithm testable without a live estimator service.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use futures_util::StreamExt;
use rusqlite::Connection;
use tracing::debug;
use uuid::Uuid;

use crate::conflict::{check_conflicts, Candidate};
use crate::db::repository::{active_staff, appointments_for_day, availability_for_day, load_policy};
use crate::db::DatabaseError;
use crate::distance::DistanceEstimator;
use crate::models::{
    Appointment, BookingPolicy, DriveEstimate, GeoPoint, Staff, StaffAvailability, TimeSlot,
};
use crate::timeutil::{self, TimeError};

// ═══════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════

/// Earliest slot start, minutes since midnight (07:00).
pub const DAY_OPEN_MINUTES: i64 = 7 * 60;

/// Latest slot end, minutes since midnight (19:00).
pub const DAY_CLOSE_MINUTES: i64 = 19 * 60;

/// How many staff members are evaluated concurrently. A day has at
/// most a few dozen staff; the bound keeps the task set small.
const STAFF_EVAL_CONCURRENCY: usize = 4;

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

/// An availability request for one date.
#[derive(Debug, Clone)]
pub struct SlotQuery {
    pub date: NaiveDate,
    /// Total duration of the requested services, in minutes.
    pub duration_minutes: i64,
    /// Restrict results to one staff member, if the client asked for one.
    pub preferred_staff: Option<Uuid>,
    /// Where the appointment would take place. `None` disables the
    /// distance rule and drives buffer checks with no travel time.
    pub destination: Option<GeoPoint>,
}

/// Everything a slot query needs from the database, loaded in one pass.
pub struct DayContext {
    pub date: NaiveDate,
    pub policy: BookingPolicy,
    /// Active staff in deterministic order (name, then id).
    pub staff: Vec<Staff>,
    /// Weekly availability record per staff member for this weekday.
    pub availability: HashMap<Uuid, Option<StaffAvailability>>,
    /// Blocking appointments per staff member on this date.
    pub appointments: HashMap<Uuid, Vec<Appointment>>,
}

impl DayContext {
    pub fn load(conn: &Connection, date: NaiveDate) -> Result<Self, DatabaseError> {
        let policy = load_policy(conn)?;
        let staff = active_staff(conn)?;
        let weekday = i64::from(date.weekday().num_days_from_sunday());

        let mut availability = HashMap::new();
        let mut appointments = HashMap::new();
        for member in &staff {
            availability.insert(member.id, availability_for_day(conn, member.id, weekday)?);
            appointments.insert(member.id, appointments_for_day(conn, date, Some(member.id))?);
        }

        Ok(Self {
            date,
            policy,
            staff,
            availability,
            appointments,
        })
    }
}

/// Why a staff member cannot take a particular slot.
struct SlotBlock {
    reason: String,
    next_available_minutes: Option<i64>,
}

// ═══════════════════════════════════════════════════════════
// Slot generation
// ═══════════════════════════════════════════════════════════

/// Generate the availability grid for one day.
///
/// Slots come back in ascending start order. The result is a pure
/// function of the context, the cached estimates, and `now`; repeating
/// a query against unchanged data yields an identical grid.
pub async fn generate_slots(
    ctx: &DayContext,
    estimator: &DistanceEstimator,
    query: &SlotQuery,
    now: DateTime<Utc>,
) -> Result<Vec<TimeSlot>, TimeError> {
    let tz = timeutil::zone(ctx.policy.time_zone.as_deref())?;
    let weekday = i64::from(query.date.weekday().num_days_from_sunday());

    if ctx.policy.closed_weekday == Some(weekday) {
        debug!(date = %query.date, weekday, "Business closed, no slots");
        return Ok(Vec::new());
    }

    let grid = slot_grid(&ctx.policy, query.duration_minutes);

    // Slots before now + lead time cannot be booked. Computed in the
    // business zone so "today" means the business's today.
    let earliest = now + Duration::hours(ctx.policy.min_lead_time_hours);
    let (earliest_date, earliest_minute) = timeutil::local_date_and_minute(earliest, tz);
    let too_soon = |start: i64| {
        query.date < earliest_date || (query.date == earliest_date && start < earliest_minute)
    };

    // No staff configured at all: every slot is offered so a brand-new
    // business can take bookings before finishing setup.
    if ctx.staff.is_empty() {
        return Ok(grid
            .iter()
            .map(|&start| {
                if too_soon(start) {
                    unavailable_slot(start, "too soon to book")
                } else {
                    TimeSlot {
                        minutes: start,
                        time: timeutil::format_minutes(start),
                        available: true,
                        eligible_staff_ids: Vec::new(),
                        conflict_reason: None,
                    }
                }
            })
            .collect());
    }

    let pool: Vec<&Staff> = match query.preferred_staff {
        Some(wanted) => {
            let found: Vec<&Staff> = ctx.staff.iter().filter(|s| s.id == wanted).collect();
            if found.is_empty() {
                return Ok(grid
                    .iter()
                    .map(|&start| unavailable_slot(start, "requested staff member is not available"))
                    .collect());
            }
            found
        }
        None => ctx.staff.iter().collect(),
    };

    // Warm the drive-estimate cache for every appointment the pool
    // holds, then hand the conflict checker a plain snapshot.
    let estimates = match query.destination {
        Some(destination) => {
            let mut all: Vec<Appointment> = Vec::new();
            let mut seen = std::collections::HashSet::new();
            for member in &pool {
                for appt in ctx.appointments.get(&member.id).into_iter().flatten() {
                    if seen.insert(appt.id) {
                        all.push(appt.clone());
                    }
                }
            }
            estimator.prefetch(destination, &all).await;
            estimator.snapshot()
        }
        None => HashMap::new(),
    };

    // Evaluate each staff member's whole day as one task, bounded, then
    // restore pool order so aggregation is deterministic.
    let mut per_staff: Vec<(usize, Vec<Option<SlotBlock>>)> =
        futures_util::stream::iter(pool.iter().enumerate())
            .map(|(idx, member)| {
                let grid = &grid;
                let estimates = &estimates;
                let ctx_ref = ctx;
                async move {
                    let blocks = evaluate_staff_day(
                        grid,
                        query.duration_minutes,
                        ctx_ref.availability.get(&member.id).and_then(|a| a.as_ref()),
                        ctx_ref.appointments.get(&member.id).map_or(&[][..], |v| v),
                        estimates,
                        &ctx_ref.policy,
                    );
                    (idx, blocks)
                }
            })
            .buffer_unordered(STAFF_EVAL_CONCURRENCY)
            .collect()
            .await;
    per_staff.sort_by_key(|(idx, _)| *idx);

    let slots = grid
        .iter()
        .enumerate()
        .map(|(slot_idx, &start)| {
            if too_soon(start) {
                return unavailable_slot(start, "too soon to book");
            }

            let eligible: Vec<Uuid> = per_staff
                .iter()
                .filter(|(_, blocks)| blocks[slot_idx].is_none())
                .map(|(staff_idx, _)| pool[*staff_idx].id)
                .collect();

            if !eligible.is_empty() {
                return TimeSlot {
                    minutes: start,
                    time: timeutil::format_minutes(start),
                    available: true,
                    eligible_staff_ids: eligible,
                    conflict_reason: None,
                };
            }

            // Surface the reason from the staff member who frees up
            // soonest; pool order breaks ties.
            let reason = per_staff
                .iter()
                .filter_map(|(_, blocks)| blocks[slot_idx].as_ref())
                .min_by_key(|block| block.next_available_minutes.unwrap_or(i64::MAX))
                .map(|block| block.reason.clone())
                .unwrap_or_else(|| "no staff available".to_string());
            unavailable_slot(start, &reason)
        })
        .collect();

    Ok(slots)
}

fn slot_grid(policy: &BookingPolicy, duration_minutes: i64) -> Vec<i64> {
    let step = policy.time_slot_interval_minutes.max(1);
    let mut grid = Vec::new();
    let mut start = DAY_OPEN_MINUTES;
    while start + duration_minutes <= DAY_CLOSE_MINUTES {
        grid.push(start);
        start += step;
    }
    grid
}

fn unavailable_slot(start: i64, reason: &str) -> TimeSlot {
    TimeSlot {
        minutes: start,
        time: timeutil::format_minutes(start),
        available: false,
        eligible_staff_ids: Vec::new(),
        conflict_reason: Some(reason.to_string()),
    }
}

fn evaluate_staff_day(
    grid: &[i64],
    duration_minutes: i64,
    availability: Option<&StaffAvailability>,
    appointments: &[Appointment],
    estimates: &HashMap<Uuid, DriveEstimate>,
    policy: &BookingPolicy,
) -> Vec<Option<SlotBlock>> {
    grid.iter()
        .map(|&start| {
            let working = availability
                .map(|a| a.covers(start, duration_minutes))
                .unwrap_or(false);
            if !working {
                return Some(SlotBlock {
                    reason: "outside working hours".into(),
                    next_available_minutes: None,
                });
            }

            let candidate = Candidate {
                start_minutes: start,
                duration_minutes,
            };
            let check = check_conflicts(&candidate, appointments, estimates, policy);
            check.conflict.then(|| SlotBlock {
                reason: check
                    .reason
                    .unwrap_or_else(|| "conflicts with an existing appointment".into()),
                next_available_minutes: check.next_available_minutes,
            })
        })
        .collect()
}
