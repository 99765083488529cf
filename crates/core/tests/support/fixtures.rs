//! Approval record builders

#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use passiae_domain::{
    ApprovalKind, ApprovalRecord, HiringContext, JobSeekerIdentity, NotificationState, SenderKind,
};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// 2024-03-01 10:00:00 UTC, the default mock clock instant.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()
}

/// A record that passes every precheck at [`now`].
pub fn ready_record(kind: ApprovalKind, id: i64) -> ApprovalRecord {
    ApprovalRecord {
        id,
        kind,
        number: format!("XXXXX{id:07}"),
        start_at: date(2024, 1, 15),
        end_at: date(2026, 1, 14),
        job_seeker: JobSeekerIdentity {
            job_seeker_id: 1000 + id,
            first_name: "Jean Pierre".to_string(),
            last_name: "Dupré".to_string(),
            birthdate: Some(date(1990, 5, 4)),
            nir: Some("190057512345678".to_string()),
            obfuscated_nir: None,
        },
        hiring: Some(HiringContext {
            siae_siret: "12345678900012".to_string(),
            siae_kind: "ACI".to_string(),
            sender_kind: SenderKind::Prescriber,
            prescriber_kind: Some("ML".to_string()),
        }),
        notification: NotificationState::pending(),
    }
}

pub fn with_state(mut record: ApprovalRecord, state: NotificationState) -> ApprovalRecord {
    record.notification = state;
    record
}

pub fn starting(mut record: ApprovalRecord, start_at: NaiveDate) -> ApprovalRecord {
    record.start_at = start_at;
    record
}
