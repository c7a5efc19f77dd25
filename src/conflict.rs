//! Spatial-temporal conflict detection.
//!
//! A candidate slot is checked against every blocking appointment of the
//! same staff member on the same day. Rules apply in priority order:
//!
//! 1. Direct time overlap (hard conflict, checked first and alone).
//! 2. Distance beyond the policy maximum, when the appointments are
//!    close together in time.
//! 3. Insufficient travel-plus-buffer gap after a preceding appointment.
//! 4. Insufficient travel-plus-buffer gap before a following appointment.
//!
//! When no drive estimate exists for an appointment, the buffer rules
//! still apply with a drive time of zero. An appointment is never
//! skipped for lack of location data.
//!
//! This module is pure: it takes pre-fetched estimates and makes no I/O,
//! so every rule is testable with plain fixtures.

use std::collections::HashMap;

use uuid::Uuid;

use crate::models::{Appointment, BookingPolicy, DriveEstimate};

/// How close in time two appointments must be for the distance rule to
/// apply. Far-apart appointments on the same day leave time to drive
/// any distance.
const DISTANCE_WINDOW_MINUTES: i64 = 180;

/// A slot being considered for booking.
#[derive(Debug, Clone, Copy)]
pub struct Candidate {
    pub start_minutes: i64,
    pub duration_minutes: i64,
}

impl Candidate {
    pub fn end_minutes(&self) -> i64 {
        self.start_minutes + self.duration_minutes
    }
}

/// Result of checking one candidate against one staff member's day.
#[derive(Debug, Clone)]
pub struct ConflictCheck {
    pub conflict: bool,
    pub reason: Option<String>,
    /// Earliest start that would clear the reported conflict, when one
    /// can be computed. Drives the forward scan over the slot grid.
    pub next_available_minutes: Option<i64>,
}

impl ConflictCheck {
    fn clear() -> Self {
        Self {
            conflict: false,
            reason: None,
            next_available_minutes: None,
        }
    }
}

/// A soft conflict found against one appointment, ranked by how close
/// that appointment sits to the candidate in time.
struct SoftConflict {
    time_distance: i64,
    reason: String,
    next_available_minutes: Option<i64>,
}

/// Check a candidate slot against a set of same-day appointments.
///
/// `estimates` maps appointment id to the drive estimate between that
/// appointment's location and the candidate's destination. Missing
/// entries degrade to buffer-only checks.
pub fn check_conflicts(
    candidate: &Candidate,
    appointments: &[Appointment],
    estimates: &HashMap<Uuid, DriveEstimate>,
    policy: &BookingPolicy,
) -> ConflictCheck {
    let mut soft: Option<SoftConflict> = None;

    for appt in appointments {
        if !appt.status.blocks_schedule() {
            continue;
        }

        // Half-open intervals: a candidate starting exactly when an
        // appointment ends does not overlap it, but still owes travel
        // time (rule 3 below).
        if candidate.start_minutes < appt.end_minutes()
            && appt.start_minutes < candidate.end_minutes()
        {
            let drive = drive_minutes(estimates, appt.id);
            return ConflictCheck {
                conflict: true,
                reason: Some("overlaps an existing appointment".into()),
                // First start a forward scan can accept; the bare end
                // time would fail the buffer-after rule anyway.
                next_available_minutes: Some(appt.end_minutes() + drive + policy.buffer_minutes),
            };
        }

        if let Some(found) = soft_conflict(candidate, appt, estimates, policy) {
            let closer = soft
                .as_ref()
                .map(|cur| found.time_distance < cur.time_distance)
                .unwrap_or(true);
            if closer {
                soft = Some(found);
            }
        }
    }

    match soft {
        Some(s) => ConflictCheck {
            conflict: true,
            reason: Some(s.reason),
            next_available_minutes: s.next_available_minutes,
        },
        None => ConflictCheck::clear(),
    }
}

fn drive_minutes(estimates: &HashMap<Uuid, DriveEstimate>, id: Uuid) -> i64 {
    estimates
        .get(&id)
        .map(|e| e.duration_minutes.ceil() as i64)
        .unwrap_or(0)
}

fn soft_conflict(
    candidate: &Candidate,
    appt: &Appointment,
    estimates: &HashMap<Uuid, DriveEstimate>,
    policy: &BookingPolicy,
) -> Option<SoftConflict> {
    let estimate = estimates.get(&appt.id);
    let drive = drive_minutes(estimates, appt.id);
    let required_gap = drive + policy.buffer_minutes;

    // Gap between the two intervals; the overlap rule already handled
    // gap < 0, so one of these is non-negative.
    let (gap, appt_is_before) = if appt.end_minutes() <= candidate.start_minutes {
        (candidate.start_minutes - appt.end_minutes(), true)
    } else {
        (appt.start_minutes - candidate.end_minutes(), false)
    };

    // Rule 2: distance cap, only when the appointments are temporally
    // close enough that the distance actually bites.
    if let Some(est) = estimate {
        if est.distance_km > policy.max_drive_distance_km && gap < DISTANCE_WINDOW_MINUTES {
            return Some(SoftConflict {
                time_distance: gap,
                reason: format!(
                    "an appointment {:.1} km away is too close in time (limit {:.0} km)",
                    est.distance_km, policy.max_drive_distance_km
                ),
                next_available_minutes: appt_is_before
                    .then(|| appt.end_minutes() + DISTANCE_WINDOW_MINUTES),
            });
        }
    }

    // Rules 3 and 4: travel plus buffer on either side.
    if gap < required_gap {
        let (reason, next) = if appt_is_before {
            (
                "not enough travel time after the previous appointment".to_string(),
                Some(appt.end_minutes() + required_gap),
            )
        } else {
            // Latest start that still leaves room to finish and drive
            // to the following appointment.
            let latest_safe = appt.start_minutes - required_gap - candidate.duration_minutes;
            (
                "not enough travel time before the next appointment".to_string(),
                (latest_safe >= 0).then_some(latest_safe),
            )
        };
        return Some(SoftConflict {
            time_distance: gap,
            reason,
            next_available_minutes: next,
        });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AppointmentStatus, EstimateSource};
    use chrono::NaiveDate;

    fn appt(start: i64, duration: i64) -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            staff_id: Some(Uuid::new_v4()),
            date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            start_minutes: start,
            duration_minutes: duration,
            status: AppointmentStatus::Scheduled,
            latitude: Some(49.28),
            longitude: Some(-123.12),
            address: None,
        }
    }

    fn estimate_for(id: Uuid, minutes: f64, km: f64) -> HashMap<Uuid, DriveEstimate> {
        let mut map = HashMap::new();
        map.insert(
            id,
            DriveEstimate {
                duration_minutes: minutes,
                distance_km: km,
                source: EstimateSource::MappingService,
            },
        );
        map
    }

    fn policy(buffer: i64, max_km: f64) -> BookingPolicy {
        BookingPolicy {
            buffer_minutes: buffer,
            max_drive_distance_km: max_km,
            ..BookingPolicy::default()
        }
    }

    #[test]
    fn overlap_is_a_hard_conflict() {
        let existing = appt(600, 60); // 10:00-11:00
        let estimates = estimate_for(existing.id, 20.0, 5.0);
        let candidate = Candidate {
            start_minutes: 630,
            duration_minutes: 60,
        };
        let check = check_conflicts(&candidate, &[existing], &estimates, &policy(30, 50.0));
        assert!(check.conflict);
        assert_eq!(check.reason.as_deref(), Some("overlaps an existing appointment"));
        // 11:00 end + 20 drive + 30 buffer.
        assert_eq!(check.next_available_minutes, Some(710));
    }

    #[test]
    fn overlap_applies_even_with_no_location_data() {
        let mut existing = appt(600, 60);
        existing.latitude = None;
        existing.longitude = None;
        let candidate = Candidate {
            start_minutes: 600,
            duration_minutes: 30,
        };
        let check = check_conflicts(&candidate, &[existing], &HashMap::new(), &policy(30, 50.0));
        assert!(check.conflict);
    }

    #[test]
    fn buffer_after_arithmetic() {
        // Existing ends 10:00, drive 20, buffer 30: need a 50-minute gap.
        let existing = appt(540, 60);
        let estimates = estimate_for(existing.id, 20.0, 8.0);
        let pol = policy(30, 50.0);

        let rejected = Candidate {
            start_minutes: 645, // 10:45, gap 45
            duration_minutes: 60,
        };
        let check = check_conflicts(&rejected, &[existing.clone()], &estimates, &pol);
        assert!(check.conflict);
        assert_eq!(check.next_available_minutes, Some(650)); // 10:50

        let accepted = Candidate {
            start_minutes: 650,
            duration_minutes: 60,
        };
        let check = check_conflicts(&accepted, &[existing], &estimates, &pol);
        assert!(!check.conflict);
    }

    #[test]
    fn touching_end_is_not_overlap_but_still_buffer_checked() {
        let existing = appt(600, 60); // ends 11:00
        let estimates = estimate_for(existing.id, 10.0, 4.0);
        let candidate = Candidate {
            start_minutes: 660, // starts exactly at 11:00
            duration_minutes: 30,
        };
        let check = check_conflicts(&candidate, &[existing], &estimates, &policy(15, 50.0));
        assert!(check.conflict);
        assert_eq!(
            check.reason.as_deref(),
            Some("not enough travel time after the previous appointment")
        );
        assert_eq!(check.next_available_minutes, Some(685));
    }

    #[test]
    fn buffer_before_uses_latest_safe_start() {
        // Existing starts 14:00, drive 25, buffer 15, candidate 60 min.
        // Latest safe start is 14:00 - 25 - 15 - 60 = 12:20.
        let existing = appt(840, 60);
        let estimates = estimate_for(existing.id, 25.0, 10.0);
        let pol = policy(15, 50.0);

        let rejected = Candidate {
            start_minutes: 750, // 12:30
            duration_minutes: 60,
        };
        let check = check_conflicts(&rejected, &[existing.clone()], &estimates, &pol);
        assert!(check.conflict);
        assert_eq!(check.next_available_minutes, Some(740)); // 12:20

        let accepted = Candidate {
            start_minutes: 740,
            duration_minutes: 60,
        };
        let check = check_conflicts(&accepted, &[existing], &estimates, &pol);
        assert!(!check.conflict);
    }

    #[test]
    fn far_appointment_blocks_nearby_slots_only() {
        let existing = appt(600, 60); // 10:00-11:00, 80 km away
        let estimates = estimate_for(existing.id, 120.0, 80.0);
        let pol = policy(30, 50.0);

        let near = Candidate {
            start_minutes: 780, // 13:00, 2h gap
            duration_minutes: 60,
        };
        let check = check_conflicts(&near, &[existing.clone()], &estimates, &pol);
        assert!(check.conflict);
        assert!(check.reason.unwrap().contains("km away"));

        let far = Candidate {
            start_minutes: 1020, // 17:00, 6h gap
            duration_minutes: 60,
        };
        let check = check_conflicts(&far, &[existing], &estimates, &pol);
        assert!(!check.conflict);
    }

    #[test]
    fn missing_estimate_still_enforces_buffer() {
        let existing = appt(600, 60); // ends 11:00
        let candidate = Candidate {
            start_minutes: 670, // gap 10 < buffer 30
            duration_minutes: 60,
        };
        let check = check_conflicts(&candidate, &[existing], &HashMap::new(), &policy(30, 50.0));
        assert!(check.conflict);
        assert_eq!(check.next_available_minutes, Some(690));
    }

    #[test]
    fn cancelled_appointments_do_not_block() {
        let mut existing = appt(600, 60);
        existing.status = AppointmentStatus::Cancelled;
        let candidate = Candidate {
            start_minutes: 610,
            duration_minutes: 60,
        };
        let check = check_conflicts(&candidate, &[existing], &HashMap::new(), &policy(30, 50.0));
        assert!(!check.conflict);
    }

    #[test]
    fn closest_appointment_in_time_supplies_the_reason() {
        // Two soft conflicts; the later (closer) one should win.
        let morning = appt(480, 60); // ends 9:00, 80 km away
        let midday = appt(700, 60); // 11:40-12:40, nearby
        let mut estimates = estimate_for(morning.id, 120.0, 80.0);
        estimates.insert(
            midday.id,
            DriveEstimate {
                duration_minutes: 20.0,
                distance_km: 8.0,
                source: EstimateSource::MappingService,
            },
        );

        let candidate = Candidate {
            start_minutes: 655, // gap to morning 115, gap to midday 45-ish before it
            duration_minutes: 30,
        };
        let check = check_conflicts(
            &candidate,
            &[morning, midday],
            &estimates,
            &policy(30, 50.0),
        );
        assert!(check.conflict);
        assert_eq!(
            check.reason.as_deref(),
            Some("not enough travel time before the next appointment")
        );
    }

    #[test]
    fn full_day_scenario() {
        // Existing 10:00-11:00; drive 25, buffer 15 gives a 40-minute
        // requirement. 11:10 is rejected, 11:40 is the first clean slot.
        let existing = appt(600, 60);
        let estimates = estimate_for(existing.id, 25.0, 12.0);
        let pol = policy(15, 50.0);

        let early = Candidate {
            start_minutes: 670,
            duration_minutes: 60,
        };
        let check = check_conflicts(&early, &[existing.clone()], &estimates, &pol);
        assert!(check.conflict);
        assert_eq!(check.next_available_minutes, Some(700));

        let first_clean = Candidate {
            start_minutes: 700,
            duration_minutes: 60,
        };
        let check = check_conflicts(&first_clean, &[existing], &estimates, &pol);
        assert!(!check.conflict);
    }
}
