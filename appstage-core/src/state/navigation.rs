//! Screen navigation and auth gating.
//!
//! The interpreter tracks one current screen id plus at most one pending
//! redirect. Resolution never mutates the current id mid-pass: when a gated
//! or unknown screen is requested, the pass yields "no screen" and the
//! corrective transition is parked in the pending slot, to be committed by
//! the host right after the render pass completes.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::state::SessionState;
use crate::types::{AppDocument, Screen};

/// Reserved id of the built-in login screen.
pub const AUTH_LOGIN_SCREEN: &str = "auth:login";
/// Reserved id of the built-in signup screen.
pub const AUTH_SIGNUP_SCREEN: &str = "auth:signup";

/// The two built-in auth screens, reserved under the `auth:` id namespace.
/// These ids are never looked up in the document's screen list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScreen {
    Login,
    Signup,
}

impl AuthScreen {
    /// Parse a reserved `auth:` screen id.
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            AUTH_LOGIN_SCREEN => Some(Self::Login),
            AUTH_SIGNUP_SCREEN => Some(Self::Signup),
            _ => None,
        }
    }

    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            Self::Login => AUTH_LOGIN_SCREEN,
            Self::Signup => AUTH_SIGNUP_SCREEN,
        }
    }
}

/// What one resolution pass decided to show.
#[derive(Debug, Clone, PartialEq)]
pub enum ActiveScreen {
    /// One of the two built-in auth screens.
    Auth(AuthScreen),
    /// A screen declared in the document.
    Screen(Screen),
    /// Nothing to show this pass; a pending redirect may have been
    /// scheduled.
    None,
}

/// Owning container for the navigation state machine.
#[derive(Clone)]
pub struct NavigationState {
    current: Arc<RwLock<Option<String>>>,
    pending_redirect: Arc<RwLock<Option<String>>>,
}

impl NavigationState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: Arc::new(RwLock::new(None)),
            pending_redirect: Arc::new(RwLock::new(None)),
        }
    }

    /// The current screen id, `None` before the first transition.
    pub async fn current(&self) -> Option<String> {
        self.current.read().await.clone()
    }

    /// Unconditionally transition to `target`. An explicit transition
    /// supersedes any redirect still parked from an earlier pass.
    pub async fn navigate(&self, target: impl Into<String>) {
        *self.current.write().await = Some(target.into());
        *self.pending_redirect.write().await = None;
    }

    /// Reset to a freshly-loaded document's starting point.
    pub async fn reset(&self, initial: Option<String>) {
        *self.current.write().await = initial;
        *self.pending_redirect.write().await = None;
    }

    /// Park a corrective transition to run after the current render pass.
    pub async fn schedule_redirect(&self, target: impl Into<String>) {
        *self.pending_redirect.write().await = Some(target.into());
    }

    /// The parked redirect, if any, without committing it.
    pub async fn pending_redirect(&self) -> Option<String> {
        self.pending_redirect.read().await.clone()
    }

    /// Commit the parked redirect. Returns `true` when a transition
    /// happened.
    pub async fn apply_pending_redirect(&self) -> bool {
        let Some(target) = self.pending_redirect.write().await.take() else {
            return false;
        };
        *self.current.write().await = Some(target);
        true
    }

    /// Resolve what the current pass should show.
    ///
    /// - An `auth:` id resolves to the built-in auth flow.
    /// - A declared screen with `requiresAuth` and no session yields `None`
    ///   and schedules a redirect to the document's configured auth
    ///   redirect screen (the built-in login screen when unconfigured).
    /// - An id the document does not declare yields `None` and schedules a
    ///   self-correcting redirect to the document's initial screen. The
    ///   same applies before the first transition.
    pub async fn resolve_active_screen(
        &self,
        document: &AppDocument,
        session: &SessionState,
    ) -> ActiveScreen {
        let Some(current) = self.current().await else {
            if let Some(initial) = document.initial_screen_id() {
                self.schedule_redirect(initial).await;
            }
            return ActiveScreen::None;
        };

        if let Some(auth_screen) = AuthScreen::from_id(&current) {
            return ActiveScreen::Auth(auth_screen);
        }

        match document.screen(&current) {
            Some(screen) if screen.requires_auth && !session.is_authenticated().await => {
                let redirect = document
                    .auth
                    .as_ref()
                    .and_then(|auth| auth.auth_redirect_screen.clone())
                    .unwrap_or_else(|| AUTH_LOGIN_SCREEN.to_string());
                log::debug!("screen '{current}' requires auth, redirecting to '{redirect}'");
                self.schedule_redirect(redirect).await;
                ActiveScreen::None
            }
            Some(screen) => ActiveScreen::Screen(screen.clone()),
            None => {
                if let Some(initial) = document.initial_screen_id() {
                    if initial != current {
                        log::warn!("unknown screen '{current}', falling back to '{initial}'");
                        self.schedule_redirect(initial).await;
                    }
                }
                ActiveScreen::None
            }
        }
    }
}

impl Default for NavigationState {
    fn default() -> Self {
        Self::new()
    }
}
