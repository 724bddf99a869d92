//! Integration tests for the admin session authority.
//!
//! The real service runs over in-memory stores; timing-sensitive cases
//! manipulate the stored timestamps directly instead of sleeping.

#![allow(clippy::unwrap_used)]

mod common;

use chrono::{Duration, Utc};

use campuscrew_admin::services::auth::AuthError;
use campuscrew_core::SecurityEventKind;

use common::{MemStore, login_input, seed_account, service};

const EMAIL: &str = "admin@campuscrew.dev";
const PASSWORD: &str = "correct-horse-battery";

#[tokio::test]
async fn login_happy_path() {
    let store = MemStore::shared();
    let svc = service(&store);
    seed_account(&store, EMAIL, PASSWORD).await;

    let output = svc.authenticate(login_input(EMAIL, PASSWORD)).await.unwrap();

    assert_eq!(output.account.email.as_str(), EMAIL);
    assert_eq!(output.account.failed_attempts, 0);
    assert!(output.account.last_login.is_some());
    assert!(!output.session.token.is_empty());
    assert_eq!(output.session.device.as_deref(), Some("curl/unknown"));

    // Session expiry is 24 hours out (with slack for test runtime).
    let ttl = output.session.expires_at - Utc::now();
    assert!(ttl > Duration::hours(23) && ttl <= Duration::hours(24));

    // Routine success emits no security event.
    assert_eq!(store.event_count(), 0);
}

#[tokio::test]
async fn normalizes_email_on_login() {
    let store = MemStore::shared();
    let svc = service(&store);
    seed_account(&store, EMAIL, PASSWORD).await;

    let result = svc
        .authenticate(login_input("  Admin@CampusCrew.DEV ", PASSWORD))
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn wrong_password_increments_counter_and_logs_attempt() {
    let store = MemStore::shared();
    let svc = service(&store);
    seed_account(&store, EMAIL, PASSWORD).await;

    let err = svc
        .authenticate(login_input(EMAIL, "wrong-password"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));

    let account = store.account(EMAIL);
    assert_eq!(account.failed_attempts, 1);
    assert!(account.locked_until.is_none());

    let events = store.events_of_kind(SecurityEventKind::LoginFailed);
    assert_eq!(events.len(), 1);
    assert!(events[0].detail.contains("attempt 1/5"));
    assert_eq!(events[0].origin.as_deref(), Some("203.0.113.7"));
}

#[tokio::test]
async fn fifth_failure_locks_the_account() {
    let store = MemStore::shared();
    let svc = service(&store);
    seed_account(&store, EMAIL, PASSWORD).await;
    store.set_failed_attempts(EMAIL, 4);

    let before = Utc::now();
    let err = svc
        .authenticate(login_input(EMAIL, "wrong-password"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));

    let account = store.account(EMAIL);
    assert_eq!(account.failed_attempts, 5);
    let locked_until = account.locked_until.unwrap();
    assert!(locked_until > before + Duration::minutes(29));
    assert!(locked_until <= Utc::now() + Duration::minutes(30));

    // Exactly one event, and it is the block, not a plain failure.
    assert_eq!(store.event_count(), 1);
    let blocked = store.events_of_kind(SecurityEventKind::AccountBlocked);
    assert_eq!(blocked.len(), 1);
    assert!(blocked[0].detail.contains("5 failed attempts"));
}

#[tokio::test]
async fn locked_account_rejects_correct_password() {
    let store = MemStore::shared();
    let svc = service(&store);
    seed_account(&store, EMAIL, PASSWORD).await;

    for _ in 0..5 {
        let _ = svc.authenticate(login_input(EMAIL, "wrong-password")).await;
    }

    let err = svc.authenticate(login_input(EMAIL, PASSWORD)).await.unwrap_err();
    assert!(matches!(err, AuthError::AccountLocked));

    let blocked = store.events_of_kind(SecurityEventKind::AccountBlocked);
    assert_eq!(blocked.len(), 2);
    assert!(blocked[1].detail.contains("blocked account"));
}

#[tokio::test]
async fn lockout_ends_when_locked_until_elapses() {
    let store = MemStore::shared();
    let svc = service(&store);
    seed_account(&store, EMAIL, PASSWORD).await;
    store.set_failed_attempts(EMAIL, 5);
    store.set_locked_until(EMAIL, Some(Utc::now() - Duration::seconds(1)));

    let output = svc.authenticate(login_input(EMAIL, PASSWORD)).await.unwrap();
    assert_eq!(output.account.failed_attempts, 0);

    let account = store.account(EMAIL);
    assert_eq!(account.failed_attempts, 0);
    assert!(account.locked_until.is_none());
    assert!(account.last_login.is_some());
}

#[tokio::test]
async fn success_resets_counter_below_threshold() {
    let store = MemStore::shared();
    let svc = service(&store);
    seed_account(&store, EMAIL, PASSWORD).await;

    for _ in 0..3 {
        let _ = svc.authenticate(login_input(EMAIL, "wrong-password")).await;
    }
    assert_eq!(store.account(EMAIL).failed_attempts, 3);

    svc.authenticate(login_input(EMAIL, PASSWORD)).await.unwrap();

    let account = store.account(EMAIL);
    assert_eq!(account.failed_attempts, 0);
    assert!(account.locked_until.is_none());
}

#[tokio::test]
async fn deactivated_account_is_blocked() {
    let store = MemStore::shared();
    let svc = service(&store);
    seed_account(&store, EMAIL, PASSWORD).await;
    store.set_active(EMAIL, false);

    let err = svc.authenticate(login_input(EMAIL, PASSWORD)).await.unwrap_err();
    assert!(matches!(err, AuthError::AccountLocked));
    assert_eq!(
        store.events_of_kind(SecurityEventKind::AccountBlocked).len(),
        1
    );
}

#[tokio::test]
async fn unknown_email_and_wrong_password_are_indistinguishable() {
    let store = MemStore::shared();
    let svc = service(&store);
    seed_account(&store, EMAIL, PASSWORD).await;

    let unknown = svc
        .authenticate(login_input("nobody@campuscrew.dev", "whatever-pw"))
        .await
        .unwrap_err();
    let wrong = svc
        .authenticate(login_input(EMAIL, "wrong-password"))
        .await
        .unwrap_err();

    // Same variant, same caller-visible message.
    assert!(matches!(unknown, AuthError::InvalidCredentials));
    assert!(matches!(wrong, AuthError::InvalidCredentials));
    assert_eq!(unknown.to_string(), wrong.to_string());

    // The internal log does record the distinction.
    let failed = store.events_of_kind(SecurityEventKind::LoginFailed);
    assert_eq!(failed.len(), 2);
    assert!(failed[0].detail.contains("email not found"));
    assert!(failed[1].detail.contains("password incorrect"));
}

#[tokio::test]
async fn every_failure_emits_exactly_one_event() {
    let store = MemStore::shared();
    let svc = service(&store);
    seed_account(&store, EMAIL, PASSWORD).await;

    // 5 wrong passwords (the 5th locks), then one attempt against the
    // locked account, then one unknown email.
    for _ in 0..5 {
        let _ = svc.authenticate(login_input(EMAIL, "wrong-password")).await;
    }
    let _ = svc.authenticate(login_input(EMAIL, PASSWORD)).await;
    let _ = svc
        .authenticate(login_input("ghost@campuscrew.dev", "whatever-pw"))
        .await;

    assert_eq!(store.event_count(), 7);
}

#[tokio::test]
async fn store_failure_fails_closed() {
    let store = MemStore::shared();
    let svc = service(&store);
    seed_account(&store, EMAIL, PASSWORD).await;
    store.fail.store(true, std::sync::atomic::Ordering::SeqCst);

    let err = svc.authenticate(login_input(EMAIL, PASSWORD)).await.unwrap_err();
    assert!(
        matches!(err, AuthError::Repository(_)),
        "expected Repository, got: {err:?}"
    );
}

#[tokio::test]
async fn event_log_failure_never_affects_the_outcome() {
    let store = MemStore::shared();
    let svc = service(&store);
    seed_account(&store, EMAIL, PASSWORD).await;
    store
        .fail_events
        .store(true, std::sync::atomic::Ordering::SeqCst);

    let err = svc
        .authenticate(login_input(EMAIL, "wrong-password"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));
    // The counter mutation still committed.
    assert_eq!(store.account(EMAIL).failed_attempts, 1);

    // And a success still succeeds.
    assert!(svc.authenticate(login_input(EMAIL, PASSWORD)).await.is_ok());
}

// =========================================================================
// Session verification
// =========================================================================

#[tokio::test]
async fn verify_accepts_a_live_session_and_touches_it() {
    let store = MemStore::shared();
    let svc = service(&store);
    seed_account(&store, EMAIL, PASSWORD).await;
    let output = svc.authenticate(login_input(EMAIL, PASSWORD)).await.unwrap();

    let before = output.session.last_activity;
    let account = svc
        .verify_session(&output.session.token)
        .await
        .unwrap()
        .expect("session should be valid");
    assert_eq!(account.email.as_str(), EMAIL);

    let touched = store.sessions.lock().unwrap()[0].last_activity;
    assert!(touched >= before);
}

#[tokio::test]
async fn verify_rejects_unknown_token() {
    let store = MemStore::shared();
    let svc = service(&store);

    assert!(svc.verify_session("no-such-token").await.unwrap().is_none());
}

#[tokio::test]
async fn verify_skips_lookup_for_empty_token() {
    let store = MemStore::shared();
    let svc = service(&store);

    assert!(svc.verify_session("").await.unwrap().is_none());
    assert_eq!(
        store
            .token_lookups
            .load(std::sync::atomic::Ordering::SeqCst),
        0
    );
}

#[tokio::test]
async fn verify_rejects_expired_session() {
    let store = MemStore::shared();
    let svc = service(&store);
    seed_account(&store, EMAIL, PASSWORD).await;
    let output = svc.authenticate(login_input(EMAIL, PASSWORD)).await.unwrap();

    store.set_session_expiry(&output.session.token, Utc::now() - Duration::seconds(1));

    assert!(
        svc.verify_session(&output.session.token)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn verify_rejects_session_of_deactivated_account() {
    let store = MemStore::shared();
    let svc = service(&store);
    seed_account(&store, EMAIL, PASSWORD).await;
    let output = svc.authenticate(login_input(EMAIL, PASSWORD)).await.unwrap();

    store.set_active(EMAIL, false);

    assert!(
        svc.verify_session(&output.session.token)
            .await
            .unwrap()
            .is_none()
    );
    assert_eq!(
        store
            .events_of_kind(SecurityEventKind::SuspiciousActivity)
            .len(),
        1
    );
}

#[tokio::test]
async fn verify_survives_a_failed_touch() {
    let store = MemStore::shared();
    let svc = service(&store);
    seed_account(&store, EMAIL, PASSWORD).await;
    let output = svc.authenticate(login_input(EMAIL, PASSWORD)).await.unwrap();

    store
        .fail_touch
        .store(true, std::sync::atomic::Ordering::SeqCst);

    let account = svc.verify_session(&output.session.token).await.unwrap();
    assert!(account.is_some());
}

// =========================================================================
// Logout
// =========================================================================

#[tokio::test]
async fn logout_deletes_the_session_and_is_idempotent() {
    let store = MemStore::shared();
    let svc = service(&store);
    seed_account(&store, EMAIL, PASSWORD).await;
    let output = svc.authenticate(login_input(EMAIL, PASSWORD)).await.unwrap();
    assert_eq!(store.session_count(), 1);

    svc.logout(&output.session.token).await.unwrap();
    assert_eq!(store.session_count(), 0);
    assert!(
        svc.verify_session(&output.session.token)
            .await
            .unwrap()
            .is_none()
    );

    // Second call, and a never-valid token: both no-ops.
    svc.logout(&output.session.token).await.unwrap();
    svc.logout("never-was-a-token").await.unwrap();
    assert_eq!(store.event_count(), 0);
}

// =========================================================================
// Bootstrap
// =========================================================================

#[tokio::test]
async fn bootstrap_succeeds_exactly_once() {
    let store = MemStore::shared();
    let svc = service(&store);

    let account = svc
        .create_initial_admin(EMAIL, PASSWORD, "Root", Some("Admin"))
        .await
        .unwrap();
    assert_eq!(account.role, campuscrew_core::AdminRole::SuperAdmin);
    assert!(account.active);
    assert_eq!(account.failed_attempts, 0);

    let err = svc
        .create_initial_admin("second@campuscrew.dev", PASSWORD, "Second", None)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::AlreadyInitialized));
}

#[tokio::test]
async fn bootstrap_enforces_password_policy() {
    let store = MemStore::shared();
    let svc = service(&store);

    let err = svc
        .create_initial_admin(EMAIL, "short", "Root", None)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::WeakPassword(_)));

    let err = svc
        .create_initial_admin("not-an-email", PASSWORD, "Root", None)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidEmail(_)));

    // Nothing was created either time.
    assert_eq!(store.accounts.lock().unwrap().len(), 0);
}

#[tokio::test]
async fn bootstrapped_admin_can_log_in() {
    let store = MemStore::shared();
    let svc = service(&store);
    svc.create_initial_admin(EMAIL, PASSWORD, "Root", None)
        .await
        .unwrap();

    assert!(svc.authenticate(login_input(EMAIL, PASSWORD)).await.is_ok());
}

// =========================================================================
// Password change
// =========================================================================

#[tokio::test]
async fn change_password_revokes_sessions_and_logs_event() {
    let store = MemStore::shared();
    let svc = service(&store);
    let account = seed_account(&store, EMAIL, PASSWORD).await;

    // Two live sessions.
    svc.authenticate(login_input(EMAIL, PASSWORD)).await.unwrap();
    svc.authenticate(login_input(EMAIL, PASSWORD)).await.unwrap();
    assert_eq!(store.session_count(), 2);

    svc.change_password(account.id, PASSWORD, "a-new-long-password", None)
        .await
        .unwrap();

    assert_eq!(store.session_count(), 0);
    assert_eq!(
        store
            .events_of_kind(SecurityEventKind::PasswordChanged)
            .len(),
        1
    );

    // Old password is dead, the new one works.
    assert!(svc.authenticate(login_input(EMAIL, PASSWORD)).await.is_err());
    assert!(
        svc.authenticate(login_input(EMAIL, "a-new-long-password"))
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn change_password_requires_the_current_password() {
    let store = MemStore::shared();
    let svc = service(&store);
    let account = seed_account(&store, EMAIL, PASSWORD).await;

    let err = svc
        .change_password(account.id, "not-the-password", "a-new-long-password", None)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));

    let err = svc
        .change_password(account.id, PASSWORD, "short", None)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::WeakPassword(_)));
}
