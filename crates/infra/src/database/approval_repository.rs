//! SQLite implementation of the approval and job seeker profile ports.
//!
//! All three approval kinds share the `approvals` table, discriminated by the
//! `kind` column. Reads join the job seeker profile so every record carries
//! the cached provider identity.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use passiae_core::{ApprovalNotificationRepository, JobSeekerProfileRepository};
use passiae_domain::constants::DATE_FORMAT;
use passiae_domain::{
    ApprovalKind, ApprovalRecord, HiringContext, JobSeekerIdentity, NotificationState,
    NotificationStatus, PassIaeError, Result as DomainResult,
};
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use tokio::task;
use tracing::{debug, info};

use super::manager::{map_sql_error, DbManager};

const APPROVAL_SELECT_SQL: &str = "SELECT
        a.kind, a.id, a.number, a.start_at, a.end_at,
        a.job_seeker_id, p.first_name, p.last_name, p.birthdate, p.nir, p.pe_obfuscated_nir,
        a.siae_siret, a.siae_kind, a.sender_kind, a.prescriber_kind,
        a.pe_notification_status, a.pe_notification_time,
        a.pe_notification_endpoint, a.pe_notification_exit_code
    FROM approvals a
    JOIN job_seeker_profiles p ON p.id = a.job_seeker_id";

const PROFILE_INSERT_SQL: &str = "INSERT OR IGNORE INTO job_seeker_profiles
        (id, first_name, last_name, birthdate, nir, pe_obfuscated_nir)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)";

const APPROVAL_INSERT_SQL: &str = "INSERT INTO approvals (
        kind, id, number, start_at, end_at, job_seeker_id,
        siae_siret, siae_kind, sender_kind, prescriber_kind,
        pe_notification_status, pe_notification_time,
        pe_notification_endpoint, pe_notification_exit_code
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)";

const NOTIFICATION_UPDATE_SQL: &str = "UPDATE approvals SET
        pe_notification_status = ?1,
        pe_notification_time = ?2,
        pe_notification_endpoint = ?3,
        pe_notification_exit_code = ?4
    WHERE kind = ?5 AND id = ?6";

/// SQLite-backed approval and profile repository.
pub struct SqliteApprovalRepository {
    db: Arc<DbManager>,
}

impl SqliteApprovalRepository {
    /// Repository over the pool of `db`.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    /// Insert an approval record together with its job seeker profile.
    ///
    /// An existing profile is left as is.
    pub async fn insert_approval(&self, record: &ApprovalRecord) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let record = record.clone();

        task::spawn_blocking(move || -> DomainResult<()> {
            let mut conn = db.get_connection()?;
            let tx = conn.transaction().map_err(map_sql_error)?;
            insert_profile(&tx, &record.job_seeker)?;
            insert_record(&tx, &record)?;
            tx.commit().map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    /// Fetch one record by kind and id.
    pub async fn find(&self, kind: ApprovalKind, id: i64) -> DomainResult<Option<ApprovalRecord>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<Option<ApprovalRecord>> {
            let conn = db.get_connection()?;
            let sql = format!("{APPROVAL_SELECT_SQL} WHERE a.kind = ?1 AND a.id = ?2");
            conn.query_row(&sql, params![kind.as_str(), id], map_approval_row)
                .optional()
                .map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    fn fetch_by_status(
        conn: &Connection,
        kind: ApprovalKind,
        statuses: &[NotificationStatus],
        limit: Option<usize>,
    ) -> DomainResult<Vec<ApprovalRecord>> {
        if statuses.is_empty() || limit == Some(0) {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; statuses.len()].join(", ");
        let sql = format!(
            "{APPROVAL_SELECT_SQL}
            WHERE a.kind = ? AND a.pe_notification_status IN ({placeholders})
            ORDER BY a.start_at DESC, a.id ASC
            LIMIT ?"
        );

        let mut values = Vec::with_capacity(statuses.len() + 2);
        values.push(Value::Text(kind.as_str().to_string()));
        values.extend(statuses.iter().map(|status| Value::Text(status.as_str().to_string())));
        values.push(Value::Integer(limit.map_or(-1, usize_to_i64)));

        let mut stmt = conn.prepare(&sql).map_err(map_sql_error)?;
        let rows = stmt.query_map(params_from_iter(values), map_approval_row).map_err(map_sql_error)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(map_sql_error)
    }
}

#[async_trait]
impl ApprovalNotificationRepository for SqliteApprovalRepository {
    async fn find_by_status(
        &self,
        kind: ApprovalKind,
        statuses: &[NotificationStatus],
        limit: Option<usize>,
    ) -> DomainResult<Vec<ApprovalRecord>> {
        let db = Arc::clone(&self.db);
        let statuses = statuses.to_vec();

        task::spawn_blocking(move || -> DomainResult<Vec<ApprovalRecord>> {
            let conn = db.get_connection()?;
            Self::fetch_by_status(&conn, kind, &statuses, limit)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn save_notification(
        &self,
        kind: ApprovalKind,
        id: i64,
        state: &NotificationState,
    ) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let state = state.clone();

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            let updated = conn
                .execute(
                    NOTIFICATION_UPDATE_SQL,
                    params![
                        state.status().as_str(),
                        state.time().map(|time| time.to_rfc3339()),
                        state.endpoint().map(|endpoint| endpoint.as_str()),
                        state.exit_code(),
                        kind.as_str(),
                        id,
                    ],
                )
                .map_err(map_sql_error)?;
            if updated == 0 {
                return Err(PassIaeError::NotFound(format!("{kind} {id}")));
            }
            debug!(kind = %kind, id, status = %state.status(), "notification saved");
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }
}

#[async_trait]
impl JobSeekerProfileRepository for SqliteApprovalRepository {
    async fn cached_identity(&self, job_seeker_id: i64) -> DomainResult<Option<String>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<Option<String>> {
            let conn = db.get_connection()?;
            let cached: Option<Option<String>> = conn
                .query_row(
                    "SELECT pe_obfuscated_nir FROM job_seeker_profiles WHERE id = ?1",
                    params![job_seeker_id],
                    |row| row.get(0),
                )
                .optional()
                .map_err(map_sql_error)?;
            Ok(cached.flatten().filter(|id| !id.trim().is_empty()))
        })
        .await
        .map_err(map_join_error)?
    }

    async fn store_identity(
        &self,
        job_seeker_id: i64,
        obfuscated_nir: &str,
        at: DateTime<Utc>,
    ) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let obfuscated_nir = obfuscated_nir.to_string();

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            let updated = conn
                .execute(
                    "UPDATE job_seeker_profiles
                     SET pe_obfuscated_nir = ?1, pe_last_certification_attempt_at = ?2
                     WHERE id = ?3",
                    params![obfuscated_nir, at.to_rfc3339(), job_seeker_id],
                )
                .map_err(map_sql_error)?;
            if updated == 0 {
                return Err(PassIaeError::NotFound(format!("job seeker {job_seeker_id}")));
            }
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn update_identity(&self, identity: &JobSeekerIdentity) -> DomainResult<bool> {
        let db = Arc::clone(&self.db);
        let identity = identity.clone();

        task::spawn_blocking(move || -> DomainResult<bool> {
            let mut conn = db.get_connection()?;
            let tx = conn.transaction().map_err(map_sql_error)?;

            let current = tx
                .query_row(
                    "SELECT first_name, last_name, birthdate, nir
                     FROM job_seeker_profiles WHERE id = ?1",
                    params![identity.job_seeker_id],
                    |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, String>(1)?,
                            parse_optional_date(row, 2)?,
                            row.get::<_, Option<String>>(3)?,
                        ))
                    },
                )
                .optional()
                .map_err(map_sql_error)?
                .ok_or_else(|| {
                    PassIaeError::NotFound(format!("job seeker {}", identity.job_seeker_id))
                })?;

            let changed = current
                != (
                    identity.first_name.clone(),
                    identity.last_name.clone(),
                    identity.birthdate,
                    identity.nir.clone(),
                );

            tx.execute(
                "UPDATE job_seeker_profiles
                 SET first_name = ?1, last_name = ?2, birthdate = ?3, nir = ?4
                 WHERE id = ?5",
                params![
                    identity.first_name,
                    identity.last_name,
                    identity.birthdate.map(format_date),
                    identity.nir,
                    identity.job_seeker_id,
                ],
            )
            .map_err(map_sql_error)?;

            if changed {
                tx.execute(
                    "UPDATE job_seeker_profiles
                     SET pe_obfuscated_nir = NULL, pe_last_certification_attempt_at = NULL
                     WHERE id = ?1",
                    params![identity.job_seeker_id],
                )
                .map_err(map_sql_error)?;
                info!(job_seeker = identity.job_seeker_id, "identity changed, provider id cleared");
            }

            tx.commit().map_err(map_sql_error)?;
            Ok(changed)
        })
        .await
        .map_err(map_join_error)?
    }
}

fn insert_profile(conn: &Connection, identity: &JobSeekerIdentity) -> DomainResult<()> {
    conn.execute(
        PROFILE_INSERT_SQL,
        params![
            identity.job_seeker_id,
            identity.first_name,
            identity.last_name,
            identity.birthdate.map(format_date),
            identity.nir,
            identity.obfuscated_nir,
        ],
    )
    .map_err(map_sql_error)?;
    Ok(())
}

fn insert_record(conn: &Connection, record: &ApprovalRecord) -> DomainResult<()> {
    let hiring = record.hiring.as_ref();
    let state = &record.notification;
    conn.execute(
        APPROVAL_INSERT_SQL,
        params![
            record.kind.as_str(),
            record.id,
            record.number,
            format_date(record.start_at),
            format_date(record.end_at),
            record.job_seeker.job_seeker_id,
            hiring.map(|h| h.siae_siret.as_str()),
            hiring.map(|h| h.siae_kind.as_str()),
            hiring.map(|h| h.sender_kind.as_str()),
            hiring.and_then(|h| h.prescriber_kind.as_deref()),
            state.status().as_str(),
            state.time().map(|time| time.to_rfc3339()),
            state.endpoint().map(|endpoint| endpoint.as_str()),
            state.exit_code(),
        ],
    )
    .map_err(map_sql_error)?;
    Ok(())
}

fn map_approval_row(row: &Row<'_>) -> rusqlite::Result<ApprovalRecord> {
    let job_seeker = JobSeekerIdentity {
        job_seeker_id: row.get(5)?,
        first_name: row.get(6)?,
        last_name: row.get(7)?,
        birthdate: parse_optional_date(row, 8)?,
        nir: row.get(9)?,
        obfuscated_nir: row.get(10)?,
    };

    let siae_siret: Option<String> = row.get(11)?;
    let siae_kind: Option<String> = row.get(12)?;
    let sender_kind: Option<String> = row.get(13)?;
    let hiring = match (siae_siret, siae_kind, sender_kind) {
        (Some(siae_siret), Some(siae_kind), Some(sender_kind)) => Some(HiringContext {
            siae_siret,
            siae_kind,
            sender_kind: parse_text(13, &sender_kind)?,
            prescriber_kind: row.get(14)?,
        }),
        _ => None,
    };

    let status: String = row.get(15)?;
    let time: Option<String> = row.get(16)?;
    let endpoint: Option<String> = row.get(17)?;
    let notification = NotificationState::from_parts(
        parse_text(15, &status)?,
        time.as_deref().map(|raw| parse_datetime(16, raw)).transpose()?,
        endpoint.as_deref().map(|raw| parse_text(17, raw)).transpose()?,
        row.get(18)?,
    )
    .map_err(|err| rusqlite::Error::FromSqlConversionFailure(15, Type::Text, Box::new(err)))?;

    let kind: String = row.get(0)?;
    let start_at: String = row.get(3)?;
    let end_at: String = row.get(4)?;
    Ok(ApprovalRecord {
        id: row.get(1)?,
        kind: parse_text(0, &kind)?,
        number: row.get(2)?,
        start_at: parse_date(3, &start_at)?,
        end_at: parse_date(4, &end_at)?,
        job_seeker,
        hiring,
        notification,
    })
}

fn parse_text<T>(idx: usize, raw: &str) -> rusqlite::Result<T>
where
    T: FromStr<Err = String>,
{
    raw.parse().map_err(|err: String| {
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, err.into())
    })
}

fn parse_date(idx: usize, raw: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
}

fn parse_optional_date(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<NaiveDate>> {
    let raw: Option<String> = row.get(idx)?;
    raw.as_deref().map(|raw| parse_date(idx, raw)).transpose()
}

fn parse_datetime(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|time| time.with_timezone(&Utc))
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn map_join_error(err: task::JoinError) -> PassIaeError {
    if err.is_cancelled() {
        PassIaeError::Internal("database task cancelled".into())
    } else {
        PassIaeError::Internal(format!("database task panic: {err}"))
    }
}

fn usize_to_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
