//! Session and mock authentication store.
//!
//! One session per client context, moving between `loading`, `anonymous`,
//! and `authenticated`. There is no real backend: credentials are checked
//! against fixed demo literals, latency is simulated with a timer, and every
//! outcome (success or failure) surfaces as a boolean plus a user-facing
//! notification - never an error across the store boundary.
//!
//! Login, registration, and profile updates are serialized by a single-flight
//! guard: a second call issued while one is in flight waits rather than
//! racing it.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use tidepool_core::{Email, EmailError, UserId};

use crate::models::{Address, ProfileUpdate, UserProfile};
use crate::notify::{Notification, Notifier};
use crate::persist::PersistenceBridge;

/// Email of the fixed privileged demo identity.
const ADMIN_EMAIL: &str = "admin@example.com";
/// Password for the fixed privileged demo identity.
const ADMIN_PASSWORD: &str = "adminpass";
/// Password accepted for any other well-formed email.
const DEMO_PASSWORD: &str = "password";
/// Minimum password length for registration.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Errors inside the authentication flow.
///
/// These never cross the store boundary; they are mapped to failure
/// notifications and a `false` return.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email failed validation.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Email/password pair not accepted.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Registration password too short.
    #[error("password must be at least {MIN_PASSWORD_LENGTH} characters")]
    WeakPassword,

    /// Registration field missing.
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

/// Where the session currently is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// An auth operation (or the initial restore) is in flight.
    Loading,
    /// No user is signed in.
    Anonymous,
    /// A user is signed in.
    Authenticated,
}

/// Registration form data.
#[derive(Debug, Clone)]
pub struct RegisterData {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

struct SessionInner {
    user: Option<UserProfile>,
    loading: bool,
}

/// The session store.
pub struct SessionStore {
    inner: RwLock<SessionInner>,
    /// Single-flight guard: one login/register/update in flight at a time.
    flight: tokio::sync::Mutex<()>,
    bridge: Arc<PersistenceBridge>,
    notifier: Arc<dyn Notifier>,
    latency: Duration,
}

impl SessionStore {
    /// Create the session store, rehydrating any persisted session.
    ///
    /// A valid persisted profile lands the session in `Authenticated`;
    /// anything else (absent, malformed, unknown version) lands in
    /// `Anonymous`.
    #[must_use]
    pub fn restore(
        bridge: Arc<PersistenceBridge>,
        notifier: Arc<dyn Notifier>,
        latency: Duration,
    ) -> Self {
        let user = bridge.load_user();
        if let Some(user) = &user {
            tracing::debug!(user_id = %user.id, "rehydrated session");
        }
        Self {
            inner: RwLock::new(SessionInner {
                user,
                loading: false,
            }),
            flight: tokio::sync::Mutex::new(()),
            bridge,
            notifier,
            latency,
        }
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        let inner = self.read_inner();
        if inner.loading {
            SessionPhase::Loading
        } else if inner.user.is_some() {
            SessionPhase::Authenticated
        } else {
            SessionPhase::Anonymous
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.read_inner().user.is_some()
    }

    /// The signed-in user, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<UserProfile> {
        self.read_inner().user.clone()
    }

    /// Sign in with an email/password pair.
    ///
    /// Returns `true` on success. Failures resolve to `false` plus a
    /// destructive notification; the session returns to its pre-call state.
    pub async fn login(&self, email: &str, password: &str) -> bool {
        let _flight = self.flight.lock().await;
        self.set_loading(true);
        tokio::time::sleep(self.latency).await;

        match check_credentials(email, password) {
            Ok(user) => {
                let title = if user.is_admin {
                    "Admin login successful"
                } else {
                    "Login successful"
                };
                let description = format!("Welcome back, {}!", user.first_name);
                self.commit_user(user);
                self.notifier.notify(Notification::new(title, description));
                true
            }
            Err(e) => {
                tracing::debug!(error = %e, "login rejected");
                self.set_loading(false);
                self.notifier.notify(Notification::destructive(
                    "Login failed",
                    "Invalid email or password. Try using 'password' or admin@example.com/adminpass",
                ));
                false
            }
        }
    }

    /// Register a new account.
    ///
    /// Well-formed input always succeeds and signs the new user in. The
    /// synthesized id is collision-resistant under rapid repeated
    /// registration.
    pub async fn register(&self, data: RegisterData) -> bool {
        let _flight = self.flight.lock().await;
        self.set_loading(true);
        tokio::time::sleep(self.latency).await;

        match build_registration(data) {
            Ok(user) => {
                let description = format!("Welcome, {}!", user.first_name);
                self.commit_user(user);
                self.notifier
                    .notify(Notification::new("Registration successful", description));
                true
            }
            Err(e) => {
                tracing::debug!(error = %e, "registration rejected");
                self.set_loading(false);
                self.notifier.notify(Notification::destructive(
                    "Registration failed",
                    "Please provide a valid email and a password of at least 8 characters.",
                ));
                false
            }
        }
    }

    /// Merge a partial update into the signed-in profile.
    ///
    /// Returns `false` without side effects when no user is signed in.
    /// Email is not mutable through this path.
    pub async fn update_profile(&self, update: ProfileUpdate) -> bool {
        if !self.is_authenticated() {
            return false;
        }

        let _flight = self.flight.lock().await;
        self.set_loading(true);
        tokio::time::sleep(self.latency).await;

        // Re-read under the guard: a concurrent logout may have landed while
        // this call waited its turn.
        let Some(mut user) = self.current_user() else {
            self.set_loading(false);
            return false;
        };

        update.apply_to(&mut user);
        self.commit_user(user);
        self.notifier.notify(Notification::new(
            "Profile updated",
            "Your profile has been successfully updated.",
        ));
        true
    }

    /// Sign out immediately (no loading transition) and delete the persisted
    /// session.
    pub fn logout(&self) {
        self.bridge.delete_user();
        {
            let mut inner = self.write_inner();
            inner.user = None;
            inner.loading = false;
        }
        self.notifier.notify(Notification::new(
            "Logged out",
            "You have been successfully logged out.",
        ));
    }

    /// Persist the profile, then install it and clear `loading`.
    ///
    /// The mirror write happens before control returns to the caller, so
    /// persisted state always reflects the most recent success.
    fn commit_user(&self, user: UserProfile) {
        self.bridge.save_user(&user);
        let mut inner = self.write_inner();
        inner.user = Some(user);
        inner.loading = false;
    }

    fn set_loading(&self, loading: bool) {
        self.write_inner().loading = loading;
    }

    fn read_inner(&self) -> std::sync::RwLockReadGuard<'_, SessionInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_inner(&self) -> std::sync::RwLockWriteGuard<'_, SessionInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

// =============================================================================
// Mock credential policy
// =============================================================================

/// Resolve an email/password pair against the demo credential policy.
fn check_credentials(email: &str, password: &str) -> Result<UserProfile, AuthError> {
    let email = Email::parse(email)?;

    if email.as_str() == ADMIN_EMAIL && password == ADMIN_PASSWORD {
        return Ok(admin_profile());
    }
    if password == DEMO_PASSWORD {
        return Ok(demo_profile(email));
    }
    Err(AuthError::InvalidCredentials)
}

/// Validate registration input and synthesize the new identity.
fn build_registration(data: RegisterData) -> Result<UserProfile, AuthError> {
    let email = Email::parse(&data.email)?;
    if data.password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword);
    }
    if data.first_name.trim().is_empty() {
        return Err(AuthError::MissingField("first_name"));
    }

    Ok(UserProfile {
        id: UserId::new(format!("user-{}", Uuid::new_v4())),
        email,
        avatar_url: Some(avatar_url(&data.first_name)),
        first_name: data.first_name,
        last_name: data.last_name,
        phone_number: None,
        address: None,
        created_at: Utc::now(),
        is_admin: false,
    })
}

/// The fixed privileged demo identity.
fn admin_profile() -> UserProfile {
    UserProfile {
        id: UserId::new("admin-1"),
        email: Email::parse(ADMIN_EMAIL).unwrap_or_else(|_| unreachable!("constant is valid")),
        first_name: "Admin".to_string(),
        last_name: "User".to_string(),
        avatar_url: Some(avatar_url("Admin")),
        phone_number: Some("555-987-6543".to_string()),
        address: Some(Address {
            street: "456 Admin St".to_string(),
            city: "Adminville".to_string(),
            state: "CA".to_string(),
            zip_code: "54321".to_string(),
            country: "United States".to_string(),
        }),
        created_at: Utc::now(),
        is_admin: true,
    }
}

/// The demo profile template, stamped with the email that signed in.
pub(crate) fn demo_profile(email: Email) -> UserProfile {
    UserProfile {
        id: UserId::new("user-1"),
        email,
        first_name: "John".to_string(),
        last_name: "Doe".to_string(),
        avatar_url: Some(avatar_url("John")),
        phone_number: Some("555-123-4567".to_string()),
        address: Some(Address {
            street: "123 Main St".to_string(),
            city: "Anytown".to_string(),
            state: "CA".to_string(),
            zip_code: "12345".to_string(),
            country: "United States".to_string(),
        }),
        created_at: Utc::now(),
        is_admin: false,
    }
}

fn avatar_url(seed: &str) -> String {
    format!("https://api.dicebear.com/6.x/avataaars/svg?seed={seed}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::notify::{BufferNotifier, NotificationVariant};
    use crate::storage::MemoryStorage;

    fn store_with_notifier() -> (SessionStore, Arc<BufferNotifier>, Arc<PersistenceBridge>) {
        let bridge = Arc::new(PersistenceBridge::new(Arc::new(MemoryStorage::new())));
        let notifier = Arc::new(BufferNotifier::new());
        let store = SessionStore::restore(
            Arc::clone(&bridge),
            Arc::clone(&notifier) as Arc<dyn Notifier>,
            Duration::ZERO,
        );
        (store, notifier, bridge)
    }

    #[tokio::test]
    async fn test_admin_login() {
        let (store, notifier, _) = store_with_notifier();

        assert!(store.login("admin@example.com", "adminpass").await);
        let user = store.current_user().unwrap();
        assert!(user.is_admin);
        assert_eq!(user.id.as_str(), "admin-1");
        assert_eq!(store.phase(), SessionPhase::Authenticated);
        assert_eq!(notifier.drain()[0].title, "Admin login successful");
    }

    #[tokio::test]
    async fn test_generic_login_keeps_given_email() {
        let (store, notifier, _) = store_with_notifier();

        assert!(store.login("shopper@example.com", "password").await);
        let user = store.current_user().unwrap();
        assert!(!user.is_admin);
        assert_eq!(user.email.as_str(), "shopper@example.com");
        assert_eq!(user.first_name, "John");
        assert_eq!(notifier.drain()[0].title, "Login successful");
    }

    #[tokio::test]
    async fn test_wrong_password_fails() {
        let (store, notifier, _) = store_with_notifier();

        assert!(!store.login("shopper@example.com", "letmein99").await);
        assert_eq!(store.phase(), SessionPhase::Anonymous);

        let drained = notifier.drain();
        assert_eq!(drained[0].title, "Login failed");
        assert_eq!(drained[0].variant, NotificationVariant::Destructive);
    }

    #[tokio::test]
    async fn test_admin_password_only_works_for_admin_email() {
        let (store, _, _) = store_with_notifier();
        assert!(!store.login("shopper@example.com", "adminpass").await);
    }

    #[tokio::test]
    async fn test_malformed_email_fails() {
        let (store, _, _) = store_with_notifier();
        assert!(!store.login("not-an-email", "password").await);
    }

    #[tokio::test]
    async fn test_login_persists_session() {
        let (store, _, bridge) = store_with_notifier();
        assert!(store.login("shopper@example.com", "password").await);

        // A fresh store over the same bridge rehydrates as authenticated.
        let restored = SessionStore::restore(
            bridge,
            Arc::new(BufferNotifier::new()),
            Duration::ZERO,
        );
        assert_eq!(restored.phase(), SessionPhase::Authenticated);
        assert_eq!(
            restored.current_user().unwrap().email.as_str(),
            "shopper@example.com"
        );
    }

    #[tokio::test]
    async fn test_register_success_and_unique_ids() {
        let (store, notifier, _) = store_with_notifier();

        let data = RegisterData {
            email: "new@example.com".to_string(),
            password: "hunter2hunter2".to_string(),
            first_name: "New".to_string(),
            last_name: "Person".to_string(),
        };
        assert!(store.register(data.clone()).await);
        let first_id = store.current_user().unwrap().id;
        assert_eq!(notifier.drain()[0].title, "Registration successful");

        // Rapid repeated registration must not collide.
        assert!(store.register(data).await);
        let second_id = store.current_user().unwrap().id;
        assert_ne!(first_id, second_id);
    }

    #[tokio::test]
    async fn test_register_rejects_malformed_input() {
        let (store, notifier, _) = store_with_notifier();

        let base = RegisterData {
            email: "new@example.com".to_string(),
            password: "longenough".to_string(),
            first_name: "New".to_string(),
            last_name: "Person".to_string(),
        };

        let bad_email = RegisterData {
            email: "nope".to_string(),
            ..base.clone()
        };
        let short_password = RegisterData {
            password: "short".to_string(),
            ..base.clone()
        };
        let no_name = RegisterData {
            first_name: "  ".to_string(),
            ..base
        };

        for data in [bad_email, short_password, no_name] {
            assert!(!store.register(data).await);
            assert_eq!(store.phase(), SessionPhase::Anonymous);
            let drained = notifier.drain();
            assert_eq!(drained[0].title, "Registration failed");
            assert_eq!(drained[0].variant, NotificationVariant::Destructive);
        }
    }

    #[tokio::test]
    async fn test_update_profile_merges_and_keeps_email() {
        let (store, notifier, _) = store_with_notifier();
        assert!(store.login("shopper@example.com", "password").await);
        notifier.drain();

        let updated = store
            .update_profile(ProfileUpdate {
                first_name: Some("Jane".to_string()),
                ..ProfileUpdate::default()
            })
            .await;
        assert!(updated);

        let user = store.current_user().unwrap();
        assert_eq!(user.first_name, "Jane");
        assert_eq!(user.last_name, "Doe");
        assert_eq!(user.email.as_str(), "shopper@example.com");
        assert_eq!(notifier.drain()[0].title, "Profile updated");
    }

    #[tokio::test]
    async fn test_update_profile_requires_authentication() {
        let (store, notifier, _) = store_with_notifier();
        let updated = store.update_profile(ProfileUpdate::default()).await;
        assert!(!updated);
        // Silent failure: no notification, no loading flicker.
        assert!(notifier.drain().is_empty());
        assert_eq!(store.phase(), SessionPhase::Anonymous);
    }

    #[tokio::test]
    async fn test_logout_deletes_persisted_session() {
        let (store, notifier, bridge) = store_with_notifier();
        assert!(store.login("shopper@example.com", "password").await);
        notifier.drain();

        store.logout();
        assert_eq!(store.phase(), SessionPhase::Anonymous);
        assert!(store.current_user().is_none());
        assert_eq!(notifier.drain()[0].title, "Logged out");
        assert!(bridge.load_user().is_none());
    }

    #[tokio::test]
    async fn test_overlapping_logins_are_serialized() {
        let (store, _, _) = store_with_notifier();
        let store = Arc::new(store);

        let a = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.login("first@example.com", "password").await })
        };
        let b = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.login("second@example.com", "password").await })
        };

        assert!(a.await.unwrap());
        assert!(b.await.unwrap());

        // Both calls resolved exactly once; the session holds whichever
        // completed last, and it is a fully consistent profile.
        let user = store.current_user().unwrap();
        assert!(
            user.email.as_str() == "first@example.com"
                || user.email.as_str() == "second@example.com"
        );
        assert_eq!(store.phase(), SessionPhase::Authenticated);
    }
}
