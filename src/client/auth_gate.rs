//! Client view of the authentication state machine.
//!
//! `Anonymous` becomes `Authenticated` after a successful signup or login and
//! falls back to `Anonymous` on logout or when any call reports 401, at which
//! point the UI is sent to the login view.

use crate::types::errors::ClientError;
use crate::types::session::{AuthState, Route};
use crate::types::user::UserProfile;

#[derive(Debug, Clone)]
pub struct AuthGate {
    state: AuthState,
}

impl Default for AuthGate {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthGate {
    pub fn new() -> Self {
        Self {
            state: AuthState::Anonymous,
        }
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated()
    }

    /// Signup or login succeeded.
    pub fn on_authenticated(&mut self, profile: &UserProfile) -> Route {
        self.state = AuthState::Authenticated {
            user_id: profile.id.clone(),
            email: profile.email.clone(),
        };
        Route::Scene
    }

    /// The user logged out.
    pub fn on_logout(&mut self) -> Route {
        self.state = AuthState::Anonymous;
        Route::Login
    }

    /// Inspects a failed call. A 401 ends the session and redirects to login.
    pub fn observe(&mut self, error: &ClientError) -> Option<Route> {
        match error {
            ClientError::Unauthorized => Some(self.on_logout()),
            _ => None,
        }
    }

    /// Passes a call result through, applying [`AuthGate::observe`] to errors.
    pub fn guard<T>(&mut self, result: Result<T, ClientError>) -> Result<T, ClientError> {
        if let Err(e) = &result {
            if let Some(route) = self.observe(e) {
                tracing::debug!(?route, "session ended");
            }
        }
        result
    }

    /// Route the UI should show for protected views in the current state.
    pub fn route_for_protected_view(&self) -> Route {
        if self.is_authenticated() {
            Route::Scene
        } else {
            Route::Login
        }
    }
}
