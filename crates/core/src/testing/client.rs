//! Scripted provider client

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use passiae_domain::{ProviderOutcome, Result, TransportFailure};

use crate::notification::ports::{IdentitySearch, PassIaeUpdate, PeApiClient};

/// A call received by [`ScriptedPeApiClient`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    /// An identity search.
    RechercheIndividu(IdentitySearch),
    /// A status update.
    MiseAJour(PassIaeUpdate),
}

#[derive(Debug, Default)]
struct Script {
    searches: VecDeque<ProviderOutcome<String>>,
    updates: VecDeque<ProviderOutcome<()>>,
    calls: Vec<ProviderCall>,
}

/// Provider client answering from queued outcomes
///
/// An exhausted queue answers with a network failure so that a test which
/// under-scripts a scenario sees a retry, not a success.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPeApiClient {
    script: Arc<Mutex<Script>>,
}

impl ScriptedPeApiClient {
    /// Client with empty scripts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the answer of the next identity search.
    pub fn push_search(&self, outcome: ProviderOutcome<String>) -> &Self {
        self.script.lock().expect("mutex poisoned").searches.push_back(outcome);
        self
    }

    /// Queue the answer of the next status update.
    pub fn push_update(&self, outcome: ProviderOutcome<()>) -> &Self {
        self.script.lock().expect("mutex poisoned").updates.push_back(outcome);
        self
    }

    /// Every call received, in order.
    pub fn calls(&self) -> Vec<ProviderCall> {
        self.script.lock().expect("mutex poisoned").calls.clone()
    }

    /// Number of identity searches.
    pub fn search_calls(&self) -> usize {
        self.calls().iter().filter(|c| matches!(c, ProviderCall::RechercheIndividu(_))).count()
    }

    /// Number of status updates.
    pub fn update_calls(&self) -> usize {
        self.calls().iter().filter(|c| matches!(c, ProviderCall::MiseAJour(_))).count()
    }
}

fn exhausted<T>() -> ProviderOutcome<T> {
    ProviderOutcome::TransportFailure(TransportFailure::network("script exhausted"))
}

#[async_trait]
impl PeApiClient for ScriptedPeApiClient {
    async fn recherche_individu_certifie(
        &self,
        search: &IdentitySearch,
    ) -> Result<ProviderOutcome<String>> {
        let mut script = self.script.lock().expect("mutex poisoned");
        script.calls.push(ProviderCall::RechercheIndividu(search.clone()));
        Ok(script.searches.pop_front().unwrap_or_else(exhausted))
    }

    async fn mise_a_jour_pass_iae(&self, update: &PassIaeUpdate) -> Result<ProviderOutcome<()>> {
        let mut script = self.script.lock().expect("mutex poisoned");
        script.calls.push(ProviderCall::MiseAJour(update.clone()));
        Ok(script.updates.pop_front().unwrap_or_else(exhausted))
    }
}
