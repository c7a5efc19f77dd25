//! Booking request validation.
//!
//! Each check is independent and the report collects every failure, so
//! a client can show all problems with a submitted form at once instead
//! of one per round trip.

use std::sync::OnceLock;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use regex::Regex;

use crate::models::{BookingPolicy, ContactType};
use crate::timeutil;

/// A booking request as submitted by a client, before any persistence.
#[derive(Debug, Clone)]
pub struct BookingForm {
    pub contact_type: ContactType,
    pub contact_value: String,
    pub address: Option<String>,
    pub service_ids: Vec<String>,
    pub date: Option<NaiveDate>,
    /// Requested start time, e.g. "2:30 PM" or "14:30".
    pub time: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid")
    })
}

/// At least ten actual digits; separator characters are tolerated but
/// never count toward the ten.
fn valid_phone(value: &str) -> bool {
    let trimmed = value.trim();
    let all_allowed = trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')' | '+' | '.'));
    let digits = trimmed.chars().filter(char::is_ascii_digit).count();
    all_allowed && digits >= 10
}

/// Validate a booking form against the business policy.
///
/// Runs every check; `errors` lists each failure in form order.
pub fn validate(form: &BookingForm, policy: &BookingPolicy, now: DateTime<Utc>) -> ValidationReport {
    let mut errors = Vec::new();

    match form.contact_type {
        ContactType::Email => {
            if !email_pattern().is_match(form.contact_value.trim()) {
                errors.push("Please enter a valid email address".to_string());
            }
        }
        ContactType::Phone => {
            if !valid_phone(&form.contact_value) {
                errors.push("Please enter a valid phone number".to_string());
            }
        }
    }

    if form.address.as_deref().map_or(true, |a| a.trim().is_empty()) {
        errors.push("Service address is required".to_string());
    }

    if form.service_ids.is_empty() {
        errors.push("Select at least one service".to_string());
    }

    match (form.date, form.time.as_deref()) {
        (Some(date), Some(time)) => {
            if let Err(e) = check_lead_time(date, time, policy, now) {
                errors.push(e);
            }
        }
        _ => errors.push("Appointment date and time are required".to_string()),
    }

    ValidationReport {
        valid: errors.is_empty(),
        errors,
    }
}

fn check_lead_time(
    date: NaiveDate,
    time: &str,
    policy: &BookingPolicy,
    now: DateTime<Utc>,
) -> Result<(), String> {
    let minutes =
        timeutil::to_minutes(time).map_err(|_| "Invalid appointment time".to_string())?;
    let tz = timeutil::zone(policy.time_zone.as_deref())
        .map_err(|_| "Business time zone is misconfigured".to_string())?;
    let start = timeutil::local_to_utc(date, minutes, tz)
        .map_err(|_| "Invalid appointment time".to_string())?;

    if start < now + Duration::hours(policy.min_lead_time_hours) {
        return Err(format!(
            "Appointments must be booked at least {} hours in advance",
            policy.min_lead_time_hours
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn complete_form() -> BookingForm {
        BookingForm {
            contact_type: ContactType::Email,
            contact_value: "ana@example.com".into(),
            address: Some("200 Granville St, Vancouver".into()),
            service_ids: vec!["deep-clean".into()],
            date: NaiveDate::from_ymd_opt(2026, 3, 10),
            time: Some("2:30 PM".into()),
        }
    }

    #[test]
    fn complete_form_passes() {
        let report = validate(&complete_form(), &BookingPolicy::default(), now());
        assert!(report.valid, "{:?}", report.errors);
    }

    #[test]
    fn every_failure_is_reported_at_once() {
        let mut form = complete_form();
        form.contact_value = "not-an-email".into();
        form.address = None;

        let report = validate(&form, &BookingPolicy::default(), now());
        assert!(!report.valid);
        assert_eq!(report.errors.len(), 2);
        assert!(report.errors[0].contains("email"));
        assert!(report.errors[1].contains("address"));
    }

    #[test]
    fn email_shape_is_checked() {
        for bad in ["", "plain", "a@b", "a b@c.com", "@x.com"] {
            let mut form = complete_form();
            form.contact_value = bad.into();
            assert!(!validate(&form, &BookingPolicy::default(), now()).valid, "{bad:?}");
        }
        let mut form = complete_form();
        form.contact_value = " ana@example.com ".into();
        assert!(validate(&form, &BookingPolicy::default(), now()).valid);
    }

    #[test]
    fn phone_needs_ten_digits() {
        let mut form = complete_form();
        form.contact_type = ContactType::Phone;

        form.contact_value = "(604) 555-0142".into();
        assert!(validate(&form, &BookingPolicy::default(), now()).valid);

        form.contact_value = "555-0142".into();
        assert!(!validate(&form, &BookingPolicy::default(), now()).valid);

        form.contact_value = "604 555 0142 ext 9".into();
        assert!(!validate(&form, &BookingPolicy::default(), now()).valid);

        // Separators pad length but never count toward the ten digits.
        form.contact_value = "555-012-345".into();
        assert!(!validate(&form, &BookingPolicy::default(), now()).valid);
    }

    #[test]
    fn services_are_required() {
        let mut form = complete_form();
        form.service_ids.clear();
        let report = validate(&form, &BookingPolicy::default(), now());
        assert_eq!(report.errors, vec!["Select at least one service"]);
    }

    #[test]
    fn missing_date_or_time_is_one_error() {
        let mut form = complete_form();
        form.time = None;
        let report = validate(&form, &BookingPolicy::default(), now());
        assert_eq!(report.errors, vec!["Appointment date and time are required"]);
    }

    #[test]
    fn lead_time_enforced_in_business_zone() {
        let mut form = complete_form();
        form.date = NaiveDate::from_ymd_opt(2026, 3, 2);
        form.time = Some("9:00 AM".into());

        // Default lead time is 24h: 9 AM tomorrow is only 21h away.
        let report = validate(&form, &BookingPolicy::default(), now());
        assert!(!report.valid);
        assert!(report.errors[0].contains("24 hours in advance"));

        // With a Vancouver zone, 9 AM local is 17:00 UTC: 29h away.
        let policy = BookingPolicy {
            time_zone: Some("America/Vancouver".into()),
            ..BookingPolicy::default()
        };
        assert!(validate(&form, &policy, now()).valid);
    }

    #[test]
    fn malformed_time_is_rejected() {
        let mut form = complete_form();
        form.time = Some("25:99".into());
        let report = validate(&form, &BookingPolicy::default(), now());
        assert_eq!(report.errors, vec!["Invalid appointment time"]);
    }
}
