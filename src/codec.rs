//! Encoding of identity codes shown on a student's screen, and decoding of
//! whatever the camera hands back.
//!
//! Encoding trusts its input (it comes from the authenticated profile).
//! Decoding trusts nothing: every scanned string either yields a typed
//! [`QrPayload`] or a [`DecodeError`], it never panics.

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::err::DecodeError;
use crate::models::{
    AttendanceSession, CourseRegistration, LegacyBadge, QrPayload, StudentIdentity,
};

/// Sentinel in front of the JSON body of legacy codes.
pub const LEGACY_PREFIX: &str = "QR_UBA_COLTECH";
pub const DEFAULT_EXPIRY_MINUTES: i64 = 5;

const MATRICULE_PREFIX: &str = "FE";
const COURSE_CODE_PREFIX: &str = "CEF";
const MILLIS_PER_MINUTE: i64 = 60_000;

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
enum Outgoing<'a> {
    StudentId(&'a StudentIdentity),
    CourseRegistration(&'a CourseRegistration),
}

fn encode(payload: Outgoing) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|err| {
        log::error!("Could not serialize QR payload: {}", err);
        String::new()
    })
}

pub fn encode_student_payload(fields: &StudentIdentity) -> String {
    encode(Outgoing::StudentId(fields))
}

pub fn encode_course_registration_payload(fields: &CourseRegistration) -> String {
    encode(Outgoing::CourseRegistration(fields))
}

pub fn decode(raw: &str) -> Result<QrPayload, DecodeError> {
    let decoded = match raw.strip_prefix(LEGACY_PREFIX) {
        Some(body) => decode_legacy(body).map(QrPayload::Legacy),
        None => decode_tagged(raw),
    };
    if let Err(err) = &decoded {
        log::debug!("Rejected scan ({}): {}", err.kind(), err);
    }
    decoded
}

/// Decodes a lecturer's attendance-session code
/// (`{"courseId", "sessionId", "timestamp"}`).
pub fn decode_session_code(raw: &str) -> Result<AttendanceSession, DecodeError> {
    let record = parse_record(raw)?;
    if !record.is_object() {
        return Err(DecodeError::UnknownType);
    }
    let session: AttendanceSession = typed(record)?;
    if session.timestamp <= 0 {
        return Err(DecodeError::ValidationFailed);
    }
    Ok(session)
}

pub fn is_expired(timestamp: i64, window_minutes: i64) -> bool {
    is_expired_at(timestamp, window_minutes, Utc::now().timestamp_millis())
}

/// Same as [`is_expired`] against an explicit `now` (milliseconds).
pub fn is_expired_at(timestamp: i64, window_minutes: i64, now: i64) -> bool {
    let deadline = timestamp.saturating_add(window_minutes.saturating_mul(MILLIS_PER_MINUTE));
    now > deadline
}

fn parse_record(raw: &str) -> Result<Value, DecodeError> {
    serde_json::from_str(raw).map_err(|_| DecodeError::MalformedEncoding)
}

fn typed<T: DeserializeOwned>(record: Value) -> Result<T, DecodeError> {
    serde_json::from_value(record).map_err(|_| DecodeError::ValidationFailed)
}

fn decode_tagged(raw: &str) -> Result<QrPayload, DecodeError> {
    let record = parse_record(raw)?;
    let kind = match record.get("type").and_then(Value::as_str) {
        Some(kind) => kind.to_owned(),
        None => return Err(DecodeError::UnknownType),
    };

    match kind.as_str() {
        "student-id" => {
            let student: StudentIdentity = typed(record)?;
            check_student(&student)?;
            Ok(QrPayload::StudentId(student))
        }
        "course-registration" => {
            let course: CourseRegistration = typed(record)?;
            check_course(&course)?;
            Ok(QrPayload::CourseRegistration(course))
        }
        _ => Err(DecodeError::UnknownType),
    }
}

fn decode_legacy(body: &str) -> Result<LegacyBadge, DecodeError> {
    let badge: LegacyBadge = typed(parse_record(body)?)?;
    if badge.timestamp <= 0 {
        return Err(DecodeError::ValidationFailed);
    }
    Ok(badge)
}

fn present(value: &str) -> bool {
    !value.trim().is_empty()
}

fn check_student(student: &StudentIdentity) -> Result<(), DecodeError> {
    let valid = student.matricule.starts_with(MATRICULE_PREFIX)
        && present(&student.name)
        && present(&student.academic_year)
        && present(&student.department);
    if valid {
        Ok(())
    } else {
        Err(DecodeError::ValidationFailed)
    }
}

fn check_course(course: &CourseRegistration) -> Result<(), DecodeError> {
    let valid = course.code.starts_with(COURSE_CODE_PREFIX)
        && course.credits > 0
        && present(&course.id)
        && present(&course.title)
        && present(&course.department)
        && present(&course.lecturer);
    if valid {
        Ok(())
    } else {
        Err(DecodeError::ValidationFailed)
    }
}
