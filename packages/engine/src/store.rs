//! Per-user belief storage
//!
//! Beliefs are keyed by `(user_id, concept_key)`. Updates go through
//! [`BeliefStore::modify`] so the read-update-write of one pair is never
//! interleaved with another writer.

use std::collections::HashMap;

use parking_lot::RwLock;

use diag_algo::{AbilityScale, BeliefState};

pub type UserBeliefs = HashMap<String, BeliefState>;

pub trait BeliefStore: Send + Sync {
    fn get(&self, user_id: &str, concept_key: &str) -> Option<BeliefState>;

    fn put(&self, user_id: &str, concept_key: &str, state: BeliefState);

    /// Stored state, or a freshly stored uniform prior when none exists
    fn get_or_init(&self, user_id: &str, concept_key: &str) -> BeliefState;

    /// Atomically replace the state of one pair with `f(current)` and return the new state.
    ///
    /// A missing pair starts from the uniform prior.
    fn modify(
        &self,
        user_id: &str,
        concept_key: &str,
        f: &mut dyn FnMut(&BeliefState) -> BeliefState,
    ) -> BeliefState;

    /// Copy of all beliefs of one user; `None` if the user has never been seen
    fn snapshot(&self, user_id: &str) -> Option<UserBeliefs>;
}

#[derive(Debug)]
pub struct InMemoryBeliefStore {
    scale: AbilityScale,
    users: RwLock<HashMap<String, UserBeliefs>>,
}

impl InMemoryBeliefStore {
    pub fn new(scale: AbilityScale) -> Self {
        Self {
            scale,
            users: RwLock::new(HashMap::new()),
        }
    }

    pub fn scale(&self) -> &AbilityScale {
        &self.scale
    }
}

impl Default for InMemoryBeliefStore {
    fn default() -> Self {
        Self::new(AbilityScale::default())
    }
}

impl BeliefStore for InMemoryBeliefStore {
    fn get(&self, user_id: &str, concept_key: &str) -> Option<BeliefState> {
        self.users
            .read()
            .get(user_id)
            .and_then(|beliefs| beliefs.get(concept_key))
            .cloned()
    }

    fn put(&self, user_id: &str, concept_key: &str, state: BeliefState) {
        self.users
            .write()
            .entry(user_id.to_string())
            .or_default()
            .insert(concept_key.to_string(), state);
    }

    fn get_or_init(&self, user_id: &str, concept_key: &str) -> BeliefState {
        if let Some(state) = self.get(user_id, concept_key) {
            return state;
        }
        let mut users = self.users.write();
        users
            .entry(user_id.to_string())
            .or_default()
            .entry(concept_key.to_string())
            .or_insert_with(|| BeliefState::uniform(&self.scale))
            .clone()
    }

    fn modify(
        &self,
        user_id: &str,
        concept_key: &str,
        f: &mut dyn FnMut(&BeliefState) -> BeliefState,
    ) -> BeliefState {
        let mut users = self.users.write();
        let slot = users
            .entry(user_id.to_string())
            .or_default()
            .entry(concept_key.to_string())
            .or_insert_with(|| BeliefState::uniform(&self.scale));
        let next = f(&*slot);
        *slot = next.clone();
        next
    }

    fn snapshot(&self, user_id: &str) -> Option<UserBeliefs> {
        self.users.read().get(user_id).cloned()
    }
}
