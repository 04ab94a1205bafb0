//! In-memory session store.
//!
//! A single coarse mutex guards the map, so every operation (including the
//! lookup-then-touch and sweep-then-evict sequences) is serialized with
//! respect to every other. Operations never block on I/O and never panic;
//! a poisoned lock is recovered because the map stays structurally valid.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use uuid::Uuid;

use crate::clock::Clock;
use crate::error::CoreError;
use crate::network::ServerNetworkInfo;
use crate::session::{NewSession, SessionRecord, SessionSnapshot, SessionUpdate};
use crate::types::{SessionId, Timestamp};

/// Owns every active [`SessionRecord`].
///
/// Designed to be wrapped in `Arc` and shared between request handlers and
/// the reaper task.
pub struct SessionStore {
    sessions: Mutex<HashMap<SessionId, SessionRecord>>,
    server: ServerNetworkInfo,
    clock: Arc<dyn Clock>,
}

impl SessionStore {
    /// Create an empty store stamping records with `server` metadata and
    /// reading time from `clock`.
    pub fn new(server: ServerNetworkInfo, clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            server,
            clock,
        }
    }

    /// Network metadata attached to every record.
    pub fn server_info(&self) -> &ServerNetworkInfo {
        &self.server
    }

    /// Current instant according to the store's clock.
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<SessionId, SessionRecord>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a session.
    ///
    /// Fails with [`CoreError::Validation`] when required identity fields
    /// are missing; nothing is inserted in that case.
    pub fn create(&self, input: NewSession) -> Result<SessionRecord, CoreError> {
        self.create_unless_active(None, input)
    }

    /// Start a session unless `active` names a session that is still live.
    ///
    /// The liveness check and the insert happen under one lock, so two
    /// concurrent calls naming the same live id both fail with
    /// [`CoreError::Conflict`]. A stale or absent `active` id is ignored.
    pub fn create_unless_active(
        &self,
        active: Option<&str>,
        input: NewSession,
    ) -> Result<SessionRecord, CoreError> {
        let now = self.clock.now();

        let mut sessions = self.lock();
        if active.is_some_and(|id| sessions.contains_key(id)) {
            return Err(CoreError::Conflict("Session already active".into()));
        }
        let identity = input.validate()?;

        let id = loop {
            let candidate = Uuid::new_v4().to_string();
            if !sessions.contains_key(&candidate) {
                break candidate;
            }
        };

        let record = SessionRecord {
            id: id.clone(),
            full_name: identity.full_name,
            email: identity.email,
            nickname: identity.nickname,
            client_ip: input.client_ip,
            client_mac: input.client_mac,
            server_ip: self.server.ip.clone(),
            server_mac: self.server.mac.clone(),
            created_at: now,
            last_accessed_at: now,
        };
        sessions.insert(id, record.clone());
        Ok(record)
    }

    /// Look up a session without refreshing it.
    pub fn get(&self, id: &str) -> Result<SessionRecord, CoreError> {
        self.lock().get(id).cloned().ok_or_else(|| not_found(id))
    }

    /// Plain existence check; never refreshes.
    pub fn contains(&self, id: &str) -> bool {
        self.lock().contains_key(id)
    }

    /// Look up a session for a status report and refresh it.
    ///
    /// The returned snapshot carries the durations observed *before* the
    /// refresh, so `idle` reports the time since the previous access.
    pub fn status(&self, id: &str) -> Result<SessionSnapshot, CoreError> {
        let now = self.clock.now();
        let mut sessions = self.lock();
        let record = sessions.get_mut(id).ok_or_else(|| not_found(id))?;
        let snapshot = SessionSnapshot::observe(record.clone(), now);
        refresh(record, now);
        Ok(snapshot)
    }

    /// Refresh `last_accessed_at`, returning the new value.
    pub fn touch(&self, id: &str) -> Result<Timestamp, CoreError> {
        let now = self.clock.now();
        let mut sessions = self.lock();
        let record = sessions.get_mut(id).ok_or_else(|| not_found(id))?;
        refresh(record, now);
        Ok(record.last_accessed_at)
    }

    /// Overwrite the supplied identity fields and refresh the session.
    pub fn update(&self, id: &str, changes: SessionUpdate) -> Result<SessionRecord, CoreError> {
        let now = self.clock.now();
        let mut sessions = self.lock();
        let record = sessions.get_mut(id).ok_or_else(|| not_found(id))?;
        changes.validate()?;
        changes.apply(record);
        refresh(record, now);
        Ok(record.clone())
    }

    /// End a session, returning the removed record.
    pub fn destroy(&self, id: &str) -> Result<SessionRecord, CoreError> {
        self.lock().remove(id).ok_or_else(|| not_found(id))
    }

    /// Snapshot every active session, oldest first.
    pub fn list(&self) -> Vec<SessionSnapshot> {
        let now = self.clock.now();
        let mut snapshots: Vec<SessionSnapshot> = self
            .lock()
            .values()
            .map(|record| SessionSnapshot::observe(record.clone(), now))
            .collect();
        snapshots.sort_by(|a, b| {
            a.record
                .created_at
                .cmp(&b.record.created_at)
                .then_with(|| a.record.id.cmp(&b.record.id))
        });
        snapshots
    }

    /// Evict every session idle for strictly longer than `idle_threshold`
    /// as of `now`. Returns the evicted ids.
    pub fn reap_idle(&self, idle_threshold: chrono::Duration, now: Timestamp) -> Vec<SessionId> {
        let mut sessions = self.lock();
        let stale: Vec<SessionId> = sessions
            .values()
            .filter(|record| now.signed_duration_since(record.last_accessed_at) > idle_threshold)
            .map(|record| record.id.clone())
            .collect();
        for id in &stale {
            sessions.remove(id);
        }
        stale
    }

    /// Number of active sessions.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

fn refresh(record: &mut SessionRecord, now: Timestamp) {
    if now > record.last_accessed_at {
        record.last_accessed_at = now;
    }
}

fn not_found(id: &str) -> CoreError {
    CoreError::SessionNotFound { id: id.to_string() }
}
