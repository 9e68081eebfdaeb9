use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Semester {
    #[serde(rename = "SEMESTER 1")]
    First,
    #[serde(rename = "SEMESTER 2")]
    Second,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Level {
    #[serde(rename = "LEVEL 200")]
    L200,
    #[serde(rename = "LEVEL 300")]
    L300,
    #[serde(rename = "LEVEL 400")]
    L400,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CourseId {
    Number(u64),
    Text(String),
}

/// A course listed on a student's identity code.
///
/// Older codes carried full course records, the server-issued ones only
/// carry course codes. Any other element is kept as scanned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Course {
    Detailed(CourseRecord),
    Code(String),
    Other(serde_json::Value),
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CourseRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CourseId>,
    pub code: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_registered: Option<bool>,
}

/// Fields shown on a student's identity screen. Built from the
/// authenticated profile, never from user input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentIdentity {
    pub matricule: String,
    pub name: String,
    pub semester: Semester,
    pub academic_year: String,
    pub department: String,
    pub level: Level,
    pub courses: Vec<Course>,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRegistration {
    pub id: String,
    pub code: String,
    pub title: String,
    pub credits: u32,
    pub semester: Semester,
    pub department: String,
    pub lecturer: String,
}

/// Body of a `QR_UBA_COLTECH`-prefixed code. Only ever decoded.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct LegacyBadge {
    pub id: String,
    pub name: String,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum QrPayload {
    StudentId(StudentIdentity),
    CourseRegistration(CourseRegistration),
    #[serde(skip_deserializing)]
    Legacy(LegacyBadge),
}

impl QrPayload {
    pub fn kind(&self) -> &'static str {
        match self {
            QrPayload::StudentId(_) => "student-id",
            QrPayload::CourseRegistration(_) => "course-registration",
            QrPayload::Legacy(_) => "legacy",
        }
    }

    /// Issue time in milliseconds, for the variants that carry one.
    pub fn timestamp(&self) -> Option<i64> {
        match self {
            QrPayload::Legacy(badge) => Some(badge.timestamp),
            _ => None,
        }
    }
}

/// Lecturer-issued code for a single attendance session.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSession {
    pub course_id: String,
    pub session_id: String,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingScan {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: String,
    pub data: serde_json::Value,
    pub timestamp: i64,
}
