//! In-memory repositories

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use passiae_domain::{
    ApprovalKind, ApprovalRecord, JobSeekerIdentity, NotificationState, NotificationStatus,
    PassIaeError, Result,
};

use crate::notification::ports::{ApprovalNotificationRepository, JobSeekerProfileRepository};

#[derive(Debug, Default)]
struct StoreState {
    records: Vec<ApprovalRecord>,
    identities: HashMap<i64, (String, DateTime<Utc>)>,
    notification_writes: Vec<(ApprovalKind, i64, NotificationState)>,
    identity_writes: usize,
}

/// Approval records and job seeker profiles held in memory
///
/// Behaves like the SQLite adapter: records come back ordered by most recent
/// start date, with the profile identity cache joined in.
#[derive(Debug, Clone, Default)]
pub struct InMemoryApprovalStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryApprovalStore {
    /// Store seeded with `records`.
    pub fn new(records: Vec<ApprovalRecord>) -> Self {
        let store = Self::default();
        for record in records {
            store.insert(record);
        }
        store
    }

    /// Add or replace a record.
    pub fn insert(&self, record: ApprovalRecord) {
        let mut state = self.state.lock().expect("mutex poisoned");
        if let Some(id) = record.job_seeker.obfuscated_nir.clone() {
            state.identities.entry(record.job_seeker.job_seeker_id).or_insert((id, Utc::now()));
        }
        state.records.push(record);
    }

    /// Current copy of a record.
    pub fn record(&self, kind: ApprovalKind, id: i64) -> Option<ApprovalRecord> {
        let state = self.state.lock().expect("mutex poisoned");
        state.records.iter().find(|r| r.kind == kind && r.id == id).map(|r| joined(&state, r))
    }

    /// Every `save_notification` call, in order.
    pub fn notification_writes(&self) -> Vec<(ApprovalKind, i64, NotificationState)> {
        self.state.lock().expect("mutex poisoned").notification_writes.clone()
    }

    /// Number of `store_identity` calls.
    pub fn identity_writes(&self) -> usize {
        self.state.lock().expect("mutex poisoned").identity_writes
    }

    /// Cached identity and certification time of a job seeker.
    pub fn identity(&self, job_seeker_id: i64) -> Option<(String, DateTime<Utc>)> {
        self.state.lock().expect("mutex poisoned").identities.get(&job_seeker_id).cloned()
    }

    /// Fill the identity cache without counting a write.
    pub fn seed_identity(&self, job_seeker_id: i64, obfuscated_nir: &str, at: DateTime<Utc>) {
        self.state
            .lock()
            .expect("mutex poisoned")
            .identities
            .insert(job_seeker_id, (obfuscated_nir.to_string(), at));
    }
}

fn joined(state: &StoreState, record: &ApprovalRecord) -> ApprovalRecord {
    let mut record = record.clone();
    if let Some((id, _)) = state.identities.get(&record.job_seeker.job_seeker_id) {
        record.job_seeker.obfuscated_nir = Some(id.clone());
    }
    record
}

#[async_trait]
impl ApprovalNotificationRepository for InMemoryApprovalStore {
    async fn find_by_status(
        &self,
        kind: ApprovalKind,
        statuses: &[NotificationStatus],
        limit: Option<usize>,
    ) -> Result<Vec<ApprovalRecord>> {
        let state = self.state.lock().expect("mutex poisoned");
        let mut records: Vec<ApprovalRecord> = state
            .records
            .iter()
            .filter(|r| r.kind == kind && statuses.contains(&r.notification.status()))
            .map(|r| joined(&state, r))
            .collect();
        records.sort_by(|a, b| b.start_at.cmp(&a.start_at).then(a.id.cmp(&b.id)));
        if let Some(limit) = limit {
            records.truncate(limit);
        }
        Ok(records)
    }

    async fn save_notification(
        &self,
        kind: ApprovalKind,
        id: i64,
        notification: &NotificationState,
    ) -> Result<()> {
        let mut state = self.state.lock().expect("mutex poisoned");
        let record = state
            .records
            .iter_mut()
            .find(|r| r.kind == kind && r.id == id)
            .ok_or_else(|| PassIaeError::NotFound(format!("{kind} {id}")))?;
        record.notification = notification.clone();
        state.notification_writes.push((kind, id, notification.clone()));
        Ok(())
    }
}

#[async_trait]
impl JobSeekerProfileRepository for InMemoryApprovalStore {
    async fn cached_identity(&self, job_seeker_id: i64) -> Result<Option<String>> {
        let state = self.state.lock().expect("mutex poisoned");
        Ok(state.identities.get(&job_seeker_id).map(|(id, _)| id.clone()))
    }

    async fn store_identity(
        &self,
        job_seeker_id: i64,
        obfuscated_nir: &str,
        at: DateTime<Utc>,
    ) -> Result<()> {
        let mut state = self.state.lock().expect("mutex poisoned");
        state.identities.insert(job_seeker_id, (obfuscated_nir.to_string(), at));
        state.identity_writes += 1;
        Ok(())
    }

    async fn update_identity(&self, identity: &JobSeekerIdentity) -> Result<bool> {
        let mut state = self.state.lock().expect("mutex poisoned");
        let mut changed = false;
        for record in state
            .records
            .iter_mut()
            .filter(|r| r.job_seeker.job_seeker_id == identity.job_seeker_id)
        {
            let current = &mut record.job_seeker;
            if current.first_name != identity.first_name
                || current.last_name != identity.last_name
                || current.birthdate != identity.birthdate
                || current.nir != identity.nir
            {
                changed = true;
            }
            current.first_name = identity.first_name.clone();
            current.last_name = identity.last_name.clone();
            current.birthdate = identity.birthdate;
            current.nir = identity.nir.clone();
        }
        if changed {
            state.identities.remove(&identity.job_seeker_id);
            for record in state
                .records
                .iter_mut()
                .filter(|r| r.job_seeker.job_seeker_id == identity.job_seeker_id)
            {
                record.job_seeker.obfuscated_nir = None;
            }
        }
        Ok(changed)
    }
}
