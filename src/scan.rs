use std::sync::Arc;

use axum::{Extension, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::codec::{self, is_expired};
use crate::config::Config;
use crate::err::Error;
use crate::io::ScanStore;
use crate::models::{
    AttendanceSession, CourseRegistration, PendingScan, QrPayload, StudentIdentity,
};
use crate::{breaks, proceeds, Payload};

pub async fn encode_student(Json(fields): Json<StudentIdentity>) -> Payload<EncodedQr> {
    log::info!("Issuing identity code for {}", fields.matricule);
    proceeds(EncodedQr {
        data: codec::encode_student_payload(&fields),
    })
}

pub async fn encode_course(Json(fields): Json<CourseRegistration>) -> Payload<EncodedQr> {
    log::info!("Issuing registration code for {}", fields.code);
    proceeds(EncodedQr {
        data: codec::encode_course_registration_payload(&fields),
    })
}

pub async fn decode_scan(
    Extension(config): Extension<Arc<Config>>,
    Json(scan): Json<RawScan>,
) -> Payload<DecodedScan> {
    let payload = match codec::decode(&scan.raw) {
        Ok(payload) => payload,
        Err(err) => {
            log::warn!("Scan rejected: {}", err);
            return breaks(err.into());
        }
    };

    let expired = payload
        .timestamp()
        .map(|issued| is_expired(issued, config.expiry_minutes))
        .unwrap_or(false);
    proceeds(DecodedScan { payload, expired })
}

pub async fn decode_session(
    Extension(config): Extension<Arc<Config>>,
    Json(scan): Json<RawScan>,
) -> Payload<AttendanceSession> {
    let session = match codec::decode_session_code(&scan.raw) {
        Ok(session) => session,
        Err(err) => {
            log::warn!("Session code rejected: {}", err);
            return breaks(err.into());
        }
    };

    if is_expired(session.timestamp, config.expiry_minutes) {
        return breaks(Error::Expired {
            message: format!("Session `{}` has expired", session.session_id),
        });
    }
    proceeds(session)
}

pub async fn record_scan(
    Extension(store): Extension<ScanStore>,
    Json(scan): Json<RawScan>,
) -> Payload<PendingScan> {
    let payload = match codec::decode(&scan.raw) {
        Ok(payload) => payload,
        Err(err) => return breaks(err.into()),
    };

    let pending = PendingScan {
        id: Uuid::new_v4(),
        kind: payload.kind().to_string(),
        data: serde_json::to_value(&payload)?,
        timestamp: Utc::now().timestamp_millis(),
    };
    store.save_pending_scan(pending.clone()).await?;
    log::info!("Queued {} scan {}", pending.kind, pending.id);
    proceeds(pending)
}

pub async fn list_scans(Extension(store): Extension<ScanStore>) -> Payload<PendingScans> {
    proceeds(PendingScans {
        scans: store.pending_scans().await,
    })
}

pub async fn sync_scans(Extension(store): Extension<ScanStore>) -> Payload<Synced> {
    let cleared = store.clear_pending_scans().await?;
    let last_sync = store.update_last_sync().await?;
    log::info!("Flushed {} pending scans", cleared.len());
    proceeds(Synced {
        cleared: cleared.len(),
        last_sync,
    })
}

pub async fn last_sync(Extension(store): Extension<ScanStore>) -> Payload<LastSync> {
    proceeds(LastSync {
        last_sync: store.last_sync().await,
    })
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawScan {
    pub raw: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EncodedQr {
    pub data: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DecodedScan {
    pub payload: QrPayload,
    pub expired: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PendingScans {
    pub scans: Vec<PendingScan>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Synced {
    pub cleared: usize,
    pub last_sync: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LastSync {
    pub last_sync: Option<i64>,
}
