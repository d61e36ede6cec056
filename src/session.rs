//! Per-login session context.
//!
//! Holds the signed-in user in a watch channel. Anything that needs to react
//! to sign-in or sign-out subscribes; dropping the receiver unsubscribes.

use tokio::sync::watch;

use crate::errors::ServiceError;
use crate::models::User;

#[derive(Debug)]
pub struct Session {
    user: watch::Sender<Option<User>>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Session {
    pub fn new(user: Option<User>) -> Self {
        let (user, _) = watch::channel(user);
        Self { user }
    }

    pub fn signed_in(user: User) -> Self {
        Self::new(Some(user))
    }

    pub fn current_user(&self) -> Option<User> {
        self.user.borrow().clone()
    }

    pub fn require_user(&self) -> Result<User, ServiceError> {
        self.current_user()
            .ok_or_else(|| ServiceError::Unauthorized("No signed-in user".to_string()))
    }

    pub fn set_user(&self, user: Option<User>) {
        self.user.send_replace(user);
    }

    pub fn sign_out(&self) -> Option<User> {
        self.user.send_replace(None)
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.user.subscribe()
    }
}
