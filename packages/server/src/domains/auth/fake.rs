// FakeAuthApi - in-memory auth provider for tests
//
// Mirrors the observable contract of the hosted provider closely enough for
// flow and guard tests: password accounts, confirmation state, token pairs
// and recorded reset/resend emails.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use super::provider::{AuthApi, AuthOutcome, Identity, ProviderError, ProviderSession};

#[derive(Debug, Clone)]
struct FakeAccount {
    id: Uuid,
    password: String,
    confirmed: bool,
}

#[derive(Default)]
pub struct FakeAuthApi {
    accounts: Mutex<HashMap<String, FakeAccount>>,
    sessions: Mutex<HashMap<String, Uuid>>,
    refresh_tokens: Mutex<HashMap<String, Uuid>>,
    reset_emails: Mutex<Vec<String>>,
    resend_emails: Mutex<Vec<String>>,
    /// When set, the next provider call fails with this error.
    forced_error: Mutex<Option<ProviderError>>,
    /// Mint a session straight from sign_up (no confirmation step).
    autoconfirm: AtomicBool,
    token_counter: AtomicU64,
}

impl FakeAuthApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn autoconfirming() -> Self {
        let fake = Self::default();
        fake.set_autoconfirm(true);
        fake
    }

    pub fn set_autoconfirm(&self, autoconfirm: bool) {
        self.autoconfirm.store(autoconfirm, Ordering::Relaxed);
    }

    /// Register an account directly, bypassing sign-up.
    pub fn add_user(&self, email: &str, password: &str, confirmed: bool) -> Uuid {
        let id = Uuid::new_v4();
        self.accounts.lock().unwrap().insert(
            email.to_string(),
            FakeAccount {
                id,
                password: password.to_string(),
                confirmed,
            },
        );
        id
    }

    /// Fail the next provider call with the given vendor error.
    pub fn force_error(&self, status: u16, code: &str, message: &str) {
        *self.forced_error.lock().unwrap() = Some(ProviderError::new(status, Some(code), message));
    }

    /// Mint a valid session for an already-registered user.
    pub fn issue_session(&self, user_id: Uuid) -> ProviderSession {
        let n = self.token_counter.fetch_add(1, Ordering::Relaxed);
        let access_token = format!("fake-access-{n}");
        let refresh_token = format!("fake-refresh-{n}");
        self.sessions
            .lock()
            .unwrap()
            .insert(access_token.clone(), user_id);
        self.refresh_tokens
            .lock()
            .unwrap()
            .insert(refresh_token.clone(), user_id);
        ProviderSession {
            access_token,
            refresh_token,
            expires_in: 3600,
            user: self.identity(user_id),
        }
    }

    /// Invalidate an access token while keeping its refresh token valid,
    /// simulating access-token expiry.
    pub fn expire_access_token(&self, access_token: &str) {
        self.sessions.lock().unwrap().remove(access_token);
    }

    pub fn reset_emails(&self) -> Vec<String> {
        self.reset_emails.lock().unwrap().clone()
    }

    pub fn resend_emails(&self) -> Vec<String> {
        self.resend_emails.lock().unwrap().clone()
    }

    fn identity(&self, user_id: Uuid) -> Identity {
        let email = self
            .accounts
            .lock()
            .unwrap()
            .iter()
            .find(|(_, account)| account.id == user_id)
            .map(|(email, _)| email.clone());
        Identity { id: user_id, email }
    }

    fn take_forced_error(&self) -> Option<ProviderError> {
        self.forced_error.lock().unwrap().take()
    }
}

#[async_trait]
impl AuthApi for FakeAuthApi {
    async fn get_user(&self, access_token: &str) -> Result<Identity, ProviderError> {
        if let Some(err) = self.take_forced_error() {
            return Err(err);
        }
        let user_id = self.sessions.lock().unwrap().get(access_token).copied();
        match user_id {
            Some(id) => Ok(self.identity(id)),
            None => Err(ProviderError::new(401, Some("bad_jwt"), "invalid JWT")),
        }
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<ProviderSession, ProviderError> {
        if let Some(err) = self.take_forced_error() {
            return Err(err);
        }
        let user_id = self
            .refresh_tokens
            .lock()
            .unwrap()
            .get(refresh_token)
            .copied();
        match user_id {
            Some(id) => Ok(self.issue_session(id)),
            None => Err(ProviderError::new(
                400,
                Some("refresh_token_not_found"),
                "Invalid Refresh Token",
            )),
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthOutcome, ProviderError> {
        if let Some(err) = self.take_forced_error() {
            return Err(err);
        }
        let account = self.accounts.lock().unwrap().get(email).cloned();
        let account = match account {
            Some(account) if account.password == password => account,
            _ => {
                return Err(ProviderError::new(
                    400,
                    Some("invalid_credentials"),
                    "Invalid login credentials",
                ))
            }
        };

        if !account.confirmed {
            // Unconfirmed account: the provider acknowledges the user but
            // withholds the session.
            return Ok(AuthOutcome {
                user: self.identity(account.id),
                session: None,
            });
        }

        Ok(AuthOutcome {
            user: self.identity(account.id),
            session: Some(self.issue_session(account.id)),
        })
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        _name: Option<&str>,
        _email_redirect_to: Option<&str>,
    ) -> Result<AuthOutcome, ProviderError> {
        if let Some(err) = self.take_forced_error() {
            return Err(err);
        }
        if self.accounts.lock().unwrap().contains_key(email) {
            return Err(ProviderError::new(
                422,
                Some("user_already_exists"),
                "User already registered",
            ));
        }

        let autoconfirm = self.autoconfirm.load(Ordering::Relaxed);
        let id = self.add_user(email, password, autoconfirm);
        let session = autoconfirm.then(|| self.issue_session(id));
        Ok(AuthOutcome {
            user: self.identity(id),
            session,
        })
    }

    async fn send_reset_email(
        &self,
        email: &str,
        _redirect_to: Option<&str>,
    ) -> Result<(), ProviderError> {
        if let Some(err) = self.take_forced_error() {
            return Err(err);
        }
        self.reset_emails.lock().unwrap().push(email.to_string());
        Ok(())
    }

    async fn update_password(
        &self,
        access_token: &str,
        new_password: &str,
    ) -> Result<Identity, ProviderError> {
        if let Some(err) = self.take_forced_error() {
            return Err(err);
        }
        let user_id = self
            .sessions
            .lock()
            .unwrap()
            .get(access_token)
            .copied()
            .ok_or_else(|| ProviderError::new(401, Some("bad_jwt"), "invalid JWT"))?;

        let mut accounts = self.accounts.lock().unwrap();
        if let Some(account) = accounts.values_mut().find(|a| a.id == user_id) {
            account.password = new_password.to_string();
        }
        drop(accounts);

        Ok(self.identity(user_id))
    }

    async fn resend_confirmation(&self, email: &str) -> Result<(), ProviderError> {
        if let Some(err) = self.take_forced_error() {
            return Err(err);
        }
        self.resend_emails.lock().unwrap().push(email.to_string());
        Ok(())
    }
}
