use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    backend::{AuthBackend, BackendError},
    errors::ServiceError,
    models::User,
    session::Session,
};

const SIGN_IN_FAILED: &str = "Error while signing in";
const SIGN_UP_FAILED: &str = "Error while creating the account";

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignInForm {
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    #[validate(length(min = 6, message = "The password must contain at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignUpForm {
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    #[validate(length(min = 6, message = "The password must contain at least 6 characters"))]
    pub password: String,
    pub confirm_password: String,
}

impl SignUpForm {
    fn check(&self) -> Result<(), ServiceError> {
        self.validate()?;
        if self.password != self.confirm_password {
            return Err(ServiceError::field(
                "confirm_password",
                "Passwords do not match",
            ));
        }
        Ok(())
    }
}

/// Bearer token plus the user it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedIn {
    pub token: String,
    pub user: User,
}

/// Service for signing users in and out
#[derive(Clone)]
pub struct AuthService {
    backend: Arc<dyn AuthBackend>,
    sessions: Arc<DashMap<String, Arc<Session>>>,
}

impl AuthService {
    pub fn new(backend: Arc<dyn AuthBackend>) -> Self {
        Self {
            backend,
            sessions: Arc::new(DashMap::new()),
        }
    }

    fn open_session(&self, user: User) -> SignedIn {
        let token = Uuid::new_v4().simple().to_string();
        self.sessions
            .insert(token.clone(), Arc::new(Session::signed_in(user.clone())));
        SignedIn { token, user }
    }

    #[instrument(skip(self, form), fields(email = %form.email))]
    pub async fn sign_in(&self, form: SignInForm) -> Result<SignedIn, ServiceError> {
        form.validate()?;
        let user = self
            .backend
            .sign_in(form.email.trim(), &form.password)
            .await
            .map_err(|e| match e {
                BackendError::UserNotFound => ServiceError::UserNotFound,
                BackendError::WrongPassword => ServiceError::WrongPassword,
                other => {
                    warn!(error = %other, "sign-in failed");
                    ServiceError::AuthFailed(SIGN_IN_FAILED.to_string())
                }
            })?;
        info!(uid = %user.uid, "signed in");
        Ok(self.open_session(user))
    }

    #[instrument(skip(self, form), fields(email = %form.email))]
    pub async fn sign_up(&self, form: SignUpForm) -> Result<SignedIn, ServiceError> {
        form.check()?;
        let user = self
            .backend
            .sign_up(form.email.trim(), &form.password)
            .await
            .map_err(|e| match e {
                BackendError::EmailInUse => ServiceError::EmailInUse,
                other => {
                    warn!(error = %other, "sign-up failed");
                    ServiceError::AuthFailed(SIGN_UP_FAILED.to_string())
                }
            })?;
        info!(uid = %user.uid, "account created");
        Ok(self.open_session(user))
    }

    /// Ends the session behind `token`. Unknown tokens are a no-op.
    #[instrument(skip(self, token))]
    pub async fn sign_out(&self, token: &str) -> Result<(), ServiceError> {
        let Some((_, session)) = self.sessions.remove(token) else {
            return Ok(());
        };
        if let Some(user) = session.sign_out() {
            self.backend.sign_out(&user).await?;
            info!(uid = %user.uid, "signed out");
        }
        Ok(())
    }

    pub fn session(&self, token: &str) -> Option<Arc<Session>> {
        self.sessions.get(token).map(|s| s.value().clone())
    }

    /// User behind a bearer token.
    pub fn authenticate(&self, token: &str) -> Result<User, ServiceError> {
        self.session(token)
            .ok_or_else(|| ServiceError::Unauthorized("Unknown or expired session".to_string()))?
            .require_user()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use assert_matches::assert_matches;

    fn service() -> AuthService {
        AuthService::new(MemoryBackend::shared())
    }

    fn sign_up_form(email: &str) -> SignUpForm {
        SignUpForm {
            email: email.into(),
            password: "hunter22".into(),
            confirm_password: "hunter22".into(),
        }
    }

    #[tokio::test]
    async fn sign_up_then_sign_in() {
        let auth = service();
        let created = auth.sign_up(sign_up_form("ana@example.com")).await.unwrap();
        assert_eq!(auth.authenticate(&created.token).unwrap(), created.user);

        let signed_in = auth
            .sign_in(SignInForm {
                email: "ana@example.com".into(),
                password: "hunter22".into(),
            })
            .await
            .unwrap();
        assert_eq!(signed_in.user, created.user);
        assert_ne!(signed_in.token, created.token);
    }

    #[tokio::test]
    async fn sign_in_errors_are_specific() {
        let auth = service();
        auth.sign_up(sign_up_form("ana@example.com")).await.unwrap();

        let wrong = auth
            .sign_in(SignInForm {
                email: "ana@example.com".into(),
                password: "letmein".into(),
            })
            .await;
        assert_matches!(wrong, Err(ServiceError::WrongPassword));

        let unknown = auth
            .sign_in(SignInForm {
                email: "bo@example.com".into(),
                password: "letmein".into(),
            })
            .await;
        assert_matches!(unknown, Err(ServiceError::UserNotFound));

        assert_matches!(
            auth.sign_up(sign_up_form("ana@example.com")).await,
            Err(ServiceError::EmailInUse)
        );
    }

    #[tokio::test]
    async fn sign_up_checks_the_form() {
        let auth = service();
        let mut form = sign_up_form("not-an-email");
        form.confirm_password = "different".into();
        let Err(ServiceError::Validation(fields)) = auth.sign_up(form).await else {
            panic!("expected validation error");
        };
        assert_eq!(fields[0].field, "email");

        let mut form = sign_up_form("ana@example.com");
        form.confirm_password = "different".into();
        assert_matches!(auth.sign_up(form).await, Err(ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn sign_out_ends_the_session() {
        let auth = service();
        let created = auth.sign_up(sign_up_form("ana@example.com")).await.unwrap();
        let session = auth.session(&created.token).unwrap();
        let mut watcher = session.subscribe();

        auth.sign_out(&created.token).await.unwrap();
        assert_matches!(
            auth.authenticate(&created.token),
            Err(ServiceError::Unauthorized(_))
        );
        watcher.changed().await.unwrap();
        assert!(watcher.borrow().is_none());

        auth.sign_out("unknown").await.unwrap();
    }
}
