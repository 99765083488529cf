//! Per-record notification flows against scripted provider answers.

mod support;

use std::sync::Arc;

use passiae_core::testing::{InMemoryApprovalStore, ProviderCall, ScriptedPeApiClient};
use passiae_core::{ApprovalNotifier, JobSeekerProfileRepository};
use passiae_domain::{
    ApprovalKind, NotificationEndpoint, NotificationState, NotificationStatus, PassIaeError,
    PreconditionCode, ProviderOutcome, TransportFailure, TransportFailureKind,
};
use support::fixtures::{date, now, ready_record, starting, with_state};

fn notifier(client: &ScriptedPeApiClient, store: &InMemoryApprovalStore) -> ApprovalNotifier {
    ApprovalNotifier::new(Arc::new(client.clone()), Arc::new(store.clone()), Arc::new(store.clone()))
}

#[tokio::test]
async fn missing_user_data_stays_pending_without_calls() {
    let mut record = ready_record(ApprovalKind::Approval, 1);
    record.job_seeker.nir = None;
    let store = InMemoryApprovalStore::new(vec![record.clone()]);
    let client = ScriptedPeApiClient::new();

    let state = notifier(&client, &store).notify(&record, now()).await.unwrap();

    assert_eq!(state.status(), NotificationStatus::Pending);
    assert_eq!(state.exit_code(), Some("MISSING_USER_DATA"));
    assert_eq!(state.endpoint(), None);
    assert_eq!(state.time(), Some(now()));
    assert!(client.calls().is_empty());
    assert_eq!(store.notification_writes().len(), 1);
}

#[tokio::test]
async fn future_start_stays_pending_without_calls() {
    let record = starting(ready_record(ApprovalKind::Approval, 1), date(2024, 6, 1));
    let store = InMemoryApprovalStore::new(vec![record.clone()]);
    let client = ScriptedPeApiClient::new();

    let state = notifier(&client, &store).notify(&record, now()).await.unwrap();

    assert_eq!(state.precondition(), Some(PreconditionCode::StartsInFuture));
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn settled_records_are_left_untouched() {
    let success = with_state(
        ready_record(ApprovalKind::Approval, 1),
        NotificationState::from_parts(NotificationStatus::Success, Some(now()), None, None)
            .unwrap(),
    );
    let rejected = with_state(
        ready_record(ApprovalKind::Approval, 2),
        NotificationState::from_parts(
            NotificationStatus::Error,
            Some(now()),
            Some(NotificationEndpoint::MiseAJourPass),
            Some("S022".to_string()),
        )
        .unwrap(),
    );
    let store = InMemoryApprovalStore::new(vec![success.clone(), rejected.clone()]);
    let client = ScriptedPeApiClient::new();
    let notifier = notifier(&client, &store);

    assert_eq!(notifier.notify(&success, now()).await.unwrap(), success.notification);
    assert_eq!(notifier.notify(&rejected, now()).await.unwrap(), rejected.notification);
    assert!(client.calls().is_empty());
    assert!(store.notification_writes().is_empty());
}

#[tokio::test]
async fn pending_record_goes_to_success_and_caches_identity() {
    let first = ready_record(ApprovalKind::Approval, 1);
    let mut second = ready_record(ApprovalKind::Approval, 2);
    second.job_seeker.job_seeker_id = first.job_seeker.job_seeker_id;
    let store = InMemoryApprovalStore::new(vec![first.clone(), second.clone()]);
    let client = ScriptedPeApiClient::new();
    client
        .push_search(ProviderOutcome::Success("ID-NATIONAL".to_string()))
        .push_update(ProviderOutcome::Success(()))
        .push_update(ProviderOutcome::Success(()));
    let notifier = notifier(&client, &store);

    let state = notifier.notify(&first, now()).await.unwrap();
    assert_eq!(state.status(), NotificationStatus::Success);
    assert_eq!(state.exit_code(), None);
    assert_eq!(state.endpoint(), None);
    assert_eq!(store.identity_writes(), 1);
    assert_eq!(store.identity(first.job_seeker.job_seeker_id).unwrap().1, now());

    let state = notifier.notify(&second, now()).await.unwrap();
    assert_eq!(state.status(), NotificationStatus::Success);
    assert_eq!(client.search_calls(), 1);
    assert_eq!(client.update_calls(), 2);
    assert_eq!(store.identity_writes(), 1);
    assert_eq!(store.notification_writes().len(), 2);
}

#[tokio::test]
async fn notifying_twice_gives_the_same_final_state() {
    let record = ready_record(ApprovalKind::Approval, 1);
    let store = InMemoryApprovalStore::new(vec![record.clone()]);
    let client = ScriptedPeApiClient::new();
    client
        .push_search(ProviderOutcome::BusinessRejection("S002".to_string()))
        .push_search(ProviderOutcome::BusinessRejection("S002".to_string()));
    let notifier = notifier(&client, &store);

    let first = notifier.notify(&record, now()).await.unwrap();
    let second = notifier.notify(&record, now()).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.status(), NotificationStatus::Error);

    let stored = store.record(ApprovalKind::Approval, 1).unwrap();
    assert_eq!(stored.notification, first);
    let calls_before = client.calls().len();
    assert_eq!(notifier.notify(&stored, now()).await.unwrap(), first);
    assert_eq!(client.calls().len(), calls_before);
}

#[tokio::test]
async fn status_update_carries_hiring_fields() {
    let mut record = ready_record(ApprovalKind::CancelledApproval, 4);
    record.job_seeker.obfuscated_nir = Some("CACHED".to_string());
    let store = InMemoryApprovalStore::new(vec![record.clone()]);
    let client = ScriptedPeApiClient::new();
    client.push_update(ProviderOutcome::Success(()));

    notifier(&client, &store).notify(&record, now()).await.unwrap();

    let calls = client.calls();
    let [ProviderCall::MiseAJour(update)] = calls.as_slice() else {
        panic!("expected a single status update, got {calls:?}");
    };
    assert_eq!(update.id_national, "CACHED");
    assert_eq!(update.number, record.number);
    assert_eq!(update.start_at, record.start_at);
    assert_eq!(update.end_at, record.start_at);
    assert_eq!(update.siret, "12345678900012");
    assert_eq!(update.type_siae, 836);
    assert_eq!(update.origine_candidature, "PRES");
    assert_eq!(update.typologie_prescripteur.as_deref(), Some("ML"));
}

#[tokio::test]
async fn multiple_matches_is_an_identity_error() {
    let record = ready_record(ApprovalKind::Approval, 1);
    let store = InMemoryApprovalStore::new(vec![record.clone()]);
    let client = ScriptedPeApiClient::new();
    client.push_search(ProviderOutcome::BusinessRejection("S002".to_string()));

    let state = notifier(&client, &store).notify(&record, now()).await.unwrap();

    assert_eq!(state.status(), NotificationStatus::Error);
    assert_eq!(state.endpoint(), Some(NotificationEndpoint::RechercheIndividu));
    assert_eq!(state.exit_code(), Some("S002"));
    assert_eq!(client.update_calls(), 0);
    assert_eq!(store.identity_writes(), 0);
}

#[tokio::test]
async fn status_update_rejection_keeps_cached_identity() {
    let record = ready_record(ApprovalKind::Approval, 1);
    let store = InMemoryApprovalStore::new(vec![record.clone()]);
    let client = ScriptedPeApiClient::new();
    client
        .push_search(ProviderOutcome::Success("ID-NATIONAL".to_string()))
        .push_update(ProviderOutcome::BusinessRejection("S022".to_string()));

    let state = notifier(&client, &store).notify(&record, now()).await.unwrap();

    assert_eq!(state.status(), NotificationStatus::Error);
    assert_eq!(state.endpoint(), Some(NotificationEndpoint::MiseAJourPass));
    assert_eq!(state.exit_code(), Some("S022"));
    assert_eq!(store.identity(record.job_seeker.job_seeker_id).unwrap().0, "ID-NATIONAL");
}

#[tokio::test]
async fn transport_failure_on_identity_search_is_retried() {
    let record = ready_record(ApprovalKind::Approval, 1);
    let store = InMemoryApprovalStore::new(vec![record.clone()]);
    let client = ScriptedPeApiClient::new();
    client.push_search(ProviderOutcome::TransportFailure(TransportFailure::timeout(
        "token endpoint timed out",
    )));

    let state = notifier(&client, &store).notify(&record, now()).await.unwrap();

    assert_eq!(state.status(), NotificationStatus::ShouldRetry);
    assert_eq!(state.endpoint(), None);
    assert_eq!(state.exit_code(), None);
    assert_eq!(client.update_calls(), 0);
}

#[tokio::test]
async fn retried_record_can_succeed_later() {
    let record = ready_record(ApprovalKind::LegacyApproval, 1);
    let store = InMemoryApprovalStore::new(vec![record.clone()]);
    let client = ScriptedPeApiClient::new();
    client
        .push_search(ProviderOutcome::Success("ID".to_string()))
        .push_update(ProviderOutcome::TransportFailure(TransportFailure::new(
            TransportFailureKind::RateLimited,
            "429",
        )))
        .push_update(ProviderOutcome::Success(()));
    let notifier = notifier(&client, &store);

    let state = notifier.notify(&record, now()).await.unwrap();
    assert_eq!(state.status(), NotificationStatus::ShouldRetry);

    let record = store.record(ApprovalKind::LegacyApproval, 1).unwrap();
    let state = notifier.notify(&record, now()).await.unwrap();
    assert_eq!(state.status(), NotificationStatus::Success);
    assert_eq!(client.search_calls(), 1);
}

#[tokio::test]
async fn repository_failures_propagate() {
    let record = ready_record(ApprovalKind::Approval, 99);
    let store = InMemoryApprovalStore::default();
    let client = ScriptedPeApiClient::new();
    client
        .push_search(ProviderOutcome::Success("ID".to_string()))
        .push_update(ProviderOutcome::Success(()));

    let err = notifier(&client, &store).notify(&record, now()).await.unwrap_err();
    assert!(matches!(err, PassIaeError::NotFound(_)));
}

#[tokio::test]
async fn identity_change_forces_a_new_search() {
    let first = ready_record(ApprovalKind::Approval, 1);
    let mut second = ready_record(ApprovalKind::CancelledApproval, 2);
    second.job_seeker.job_seeker_id = first.job_seeker.job_seeker_id;
    let store = InMemoryApprovalStore::new(vec![first.clone(), second.clone()]);
    store.seed_identity(first.job_seeker.job_seeker_id, "OLD-ID", now());
    let client = ScriptedPeApiClient::new();
    client
        .push_search(ProviderOutcome::Success("NEW-ID".to_string()))
        .push_update(ProviderOutcome::Success(()));

    let mut renamed = first.job_seeker.clone();
    renamed.obfuscated_nir = None;
    renamed.last_name = "Durand".to_string();
    assert!(store.update_identity(&renamed).await.unwrap());
    assert!(!store.update_identity(&renamed).await.unwrap());

    let record = store.record(ApprovalKind::CancelledApproval, 2).unwrap();
    assert_eq!(record.job_seeker.cached_identity(), None);

    let state = notifier(&client, &store).notify(&record, now()).await.unwrap();
    assert_eq!(state.status(), NotificationStatus::Success);
    assert_eq!(client.search_calls(), 1);
    assert_eq!(store.identity(first.job_seeker.job_seeker_id).unwrap().0, "NEW-ID");
}
