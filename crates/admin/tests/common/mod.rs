//! Shared test support: in-memory store implementations.
//!
//! The auth authority is written against the store traits, so tests run
//! the real service over these in-memory implementations, no database
//! required. Failure flags simulate a degraded backend per store method
//! group.

#![allow(dead_code)]
#![allow(clippy::unwrap_used)]

use std::sync::atomic::{AtomicBool, AtomicI32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use campuscrew_admin::db::{AccountStore, RepositoryError, SecurityEventStore, SessionStore};
use campuscrew_admin::models::{
    Account, NewAccount, NewSecurityEvent, NewSession, SecurityEvent, Session,
};
use campuscrew_admin::services::auth::{AuthPolicy, AuthService, LoginInput};
use campuscrew_core::{
    AccountId, AdminRole, Email, SecurityEventId, SecurityEventKind, SessionId,
};

/// An account row with its password hash, as the store keeps it.
pub struct MemAccount {
    pub account: Account,
    pub password_hash: String,
}

/// In-memory implementation of all three stores.
#[derive(Default)]
pub struct MemStore {
    pub accounts: Mutex<Vec<MemAccount>>,
    pub sessions: Mutex<Vec<Session>>,
    pub events: Mutex<Vec<SecurityEvent>>,
    /// Fail every account/session operation (degraded backend).
    pub fail: AtomicBool,
    /// Fail only `touch` (exercises best-effort last_activity).
    pub fail_touch: AtomicBool,
    /// Fail only event appends (exercises best-effort logging).
    pub fail_events: AtomicBool,
    /// Number of `find_by_token` lookups performed.
    pub token_lookups: AtomicUsize,
    next_id: AtomicI32,
}

impl MemStore {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn next_id(&self) -> i32 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn check_fail(&self) -> Result<(), RepositoryError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }

    /// The stored account for an email, panicking if absent.
    pub fn account(&self, email: &str) -> Account {
        let accounts = self.accounts.lock().unwrap();
        accounts
            .iter()
            .find(|a| a.account.email.as_str() == email)
            .map(|a| a.account.clone())
            .unwrap()
    }

    pub fn set_failed_attempts(&self, email: &str, attempts: i32) {
        let mut accounts = self.accounts.lock().unwrap();
        let entry = accounts
            .iter_mut()
            .find(|a| a.account.email.as_str() == email)
            .unwrap();
        entry.account.failed_attempts = attempts;
    }

    pub fn set_locked_until(&self, email: &str, locked_until: Option<DateTime<Utc>>) {
        let mut accounts = self.accounts.lock().unwrap();
        let entry = accounts
            .iter_mut()
            .find(|a| a.account.email.as_str() == email)
            .unwrap();
        entry.account.locked_until = locked_until;
    }

    pub fn set_active(&self, email: &str, active: bool) {
        let mut accounts = self.accounts.lock().unwrap();
        let entry = accounts
            .iter_mut()
            .find(|a| a.account.email.as_str() == email)
            .unwrap();
        entry.account.active = active;
    }

    pub fn set_session_expiry(&self, token: &str, expires_at: DateTime<Utc>) {
        let mut sessions = self.sessions.lock().unwrap();
        let session = sessions.iter_mut().find(|s| s.token == token).unwrap();
        session.expires_at = expires_at;
    }

    pub fn session_count(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }

    pub fn events_of_kind(&self, kind: SecurityEventKind) -> Vec<SecurityEvent> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.kind == kind)
            .cloned()
            .collect()
    }

    pub fn event_count(&self) -> usize {
        self.events.lock().unwrap().len()
    }
}

#[async_trait]
impl AccountStore for MemStore {
    async fn find_by_email(&self, email: &Email) -> Result<Option<Account>, RepositoryError> {
        self.check_fail()?;
        let accounts = self.accounts.lock().unwrap();
        Ok(accounts
            .iter()
            .find(|a| &a.account.email == email)
            .map(|a| a.account.clone()))
    }

    async fn find_active_with_password(
        &self,
        email: &Email,
    ) -> Result<Option<(Account, String)>, RepositoryError> {
        self.check_fail()?;
        let accounts = self.accounts.lock().unwrap();
        Ok(accounts
            .iter()
            .find(|a| &a.account.email == email && a.account.active)
            .map(|a| (a.account.clone(), a.password_hash.clone())))
    }

    async fn find_with_password_by_id(
        &self,
        id: AccountId,
    ) -> Result<Option<(Account, String)>, RepositoryError> {
        self.check_fail()?;
        let accounts = self.accounts.lock().unwrap();
        Ok(accounts
            .iter()
            .find(|a| a.account.id == id)
            .map(|a| (a.account.clone(), a.password_hash.clone())))
    }

    async fn count(&self) -> Result<i64, RepositoryError> {
        self.check_fail()?;
        Ok(self.accounts.lock().unwrap().len() as i64)
    }

    async fn insert(&self, new: NewAccount) -> Result<Account, RepositoryError> {
        self.check_fail()?;
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.iter().any(|a| a.account.email == new.email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }
        let now = Utc::now();
        let account = Account {
            id: AccountId::new(self.next_id()),
            email: new.email,
            name: new.name,
            surname: new.surname,
            role: new.role,
            active: true,
            failed_attempts: 0,
            locked_until: None,
            last_login: None,
            created_at: now,
            updated_at: now,
        };
        accounts.push(MemAccount {
            account: account.clone(),
            password_hash: new.password_hash,
        });
        Ok(account)
    }

    async fn record_failure(
        &self,
        id: AccountId,
        failed_attempts: i32,
        locked_until: Option<DateTime<Utc>>,
    ) -> Result<(), RepositoryError> {
        self.check_fail()?;
        let mut accounts = self.accounts.lock().unwrap();
        if let Some(entry) = accounts.iter_mut().find(|a| a.account.id == id) {
            entry.account.failed_attempts = failed_attempts;
            entry.account.locked_until = locked_until;
            entry.account.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn record_login(&self, id: AccountId, at: DateTime<Utc>) -> Result<(), RepositoryError> {
        self.check_fail()?;
        let mut accounts = self.accounts.lock().unwrap();
        if let Some(entry) = accounts.iter_mut().find(|a| a.account.id == id) {
            entry.account.failed_attempts = 0;
            entry.account.locked_until = None;
            entry.account.last_login = Some(at);
            entry.account.updated_at = at;
        }
        Ok(())
    }

    async fn update_password(
        &self,
        id: AccountId,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        self.check_fail()?;
        let mut accounts = self.accounts.lock().unwrap();
        if let Some(entry) = accounts.iter_mut().find(|a| a.account.id == id) {
            entry.password_hash = password_hash.to_owned();
            entry.account.updated_at = Utc::now();
        }
        Ok(())
    }
}

#[async_trait]
impl SessionStore for MemStore {
    async fn insert(&self, new: NewSession) -> Result<Session, RepositoryError> {
        self.check_fail()?;
        let mut sessions = self.sessions.lock().unwrap();
        if sessions.iter().any(|s| s.token == new.token) {
            return Err(RepositoryError::Conflict(
                "session token already exists".to_owned(),
            ));
        }
        let now = Utc::now();
        let session = Session {
            id: SessionId::new(self.next_id()),
            account_id: new.account_id,
            token: new.token,
            device: new.device,
            expires_at: new.expires_at,
            last_activity: now,
            created_at: now,
        };
        sessions.push(session.clone());
        Ok(session)
    }

    async fn find_by_token(
        &self,
        token: &str,
    ) -> Result<Option<(Session, Account)>, RepositoryError> {
        self.token_lookups.fetch_add(1, Ordering::SeqCst);
        self.check_fail()?;
        let sessions = self.sessions.lock().unwrap();
        let Some(session) = sessions.iter().find(|s| s.token == token).cloned() else {
            return Ok(None);
        };
        drop(sessions);
        let accounts = self.accounts.lock().unwrap();
        let account = accounts
            .iter()
            .find(|a| a.account.id == session.account_id)
            .map(|a| a.account.clone());
        Ok(account.map(|account| (session, account)))
    }

    async fn touch(&self, id: SessionId, at: DateTime<Utc>) -> Result<(), RepositoryError> {
        if self.fail_touch.load(Ordering::SeqCst) {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }
        self.check_fail()?;
        let mut sessions = self.sessions.lock().unwrap();
        if let Some(session) = sessions.iter_mut().find(|s| s.id == id) {
            session.last_activity = at;
        }
        Ok(())
    }

    async fn delete_by_token(&self, token: &str) -> Result<u64, RepositoryError> {
        self.check_fail()?;
        let mut sessions = self.sessions.lock().unwrap();
        let before = sessions.len();
        sessions.retain(|s| s.token != token);
        Ok((before - sessions.len()) as u64)
    }

    async fn delete_for_account(&self, account_id: AccountId) -> Result<u64, RepositoryError> {
        self.check_fail()?;
        let mut sessions = self.sessions.lock().unwrap();
        let before = sessions.len();
        sessions.retain(|s| s.account_id != account_id);
        Ok((before - sessions.len()) as u64)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, RepositoryError> {
        self.check_fail()?;
        let mut sessions = self.sessions.lock().unwrap();
        let before = sessions.len();
        sessions.retain(|s| s.expires_at > now);
        Ok((before - sessions.len()) as u64)
    }
}

#[async_trait]
impl SecurityEventStore for MemStore {
    async fn append(&self, event: NewSecurityEvent) -> Result<SecurityEvent, RepositoryError> {
        if self.fail_events.load(Ordering::SeqCst) {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }
        let mut events = self.events.lock().unwrap();
        let event = SecurityEvent {
            id: SecurityEventId::new(self.next_id()),
            kind: event.kind,
            email: event.email,
            detail: event.detail,
            origin: event.origin,
            created_at: Utc::now(),
        };
        events.push(event.clone());
        Ok(event)
    }
}

/// Build the real auth service over an in-memory store.
pub fn service(store: &Arc<MemStore>) -> AuthService {
    service_with_policy(store, AuthPolicy::default())
}

pub fn service_with_policy(store: &Arc<MemStore>, policy: AuthPolicy) -> AuthService {
    AuthService::new(
        store.clone() as Arc<dyn AccountStore>,
        store.clone() as Arc<dyn SessionStore>,
        store.clone() as Arc<dyn SecurityEventStore>,
        policy,
    )
}

/// Seed an active admin account with a hashed password.
pub async fn seed_account(store: &Arc<MemStore>, email: &str, password: &str) -> Account {
    let hash = campuscrew_admin::services::auth::hash_password(password).unwrap();
    AccountStore::insert(
        store.as_ref(),
        NewAccount {
            email: Email::parse(email).unwrap(),
            password_hash: hash,
            name: "Test Admin".to_owned(),
            surname: None,
            role: AdminRole::Admin,
        },
    )
    .await
    .unwrap()
}

/// A login input with the given credentials and no request metadata.
pub fn login_input(email: &str, password: &str) -> LoginInput {
    LoginInput {
        email: email.to_owned(),
        password: password.to_owned(),
        origin: Some("203.0.113.7".to_owned()),
        user_agent: Some("curl/8.4.0".to_owned()),
    }
}
