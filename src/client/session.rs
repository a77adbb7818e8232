//! Session reconciliation.
//!
//! [`SessionReconciler`] decides whether the user is signed in and publishes
//! the answer on a `watch` channel. [`SessionWatcher`] keeps that answer fresh:
//! it follows identity provider events and, until a profile is attached,
//! re-checks the session on a bounded exponential backoff.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::client::error::ClientError;
use crate::client::platform::{AuthEvent, IdentityProvider, Session};
use crate::features::users::dtos::UserProfileResponseDto;

/// What to do when the session is valid but the profile cannot be loaded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProfileFailurePolicy {
    /// Treat the user as signed in without a profile
    #[default]
    FailOpen,
    FailClosed,
}

#[derive(Debug, Clone, Default)]
pub enum AuthState {
    #[default]
    Loading,
    Unauthenticated,
    /// Valid session, no application profile provisioned yet
    Provisional { session: Session },
    Authenticated {
        session: Session,
        /// `None` when the profile fetch failed under [`ProfileFailurePolicy::FailOpen`]
        profile: Option<UserProfileResponseDto>,
    },
}

impl AuthState {
    pub fn grants_access(&self, policy: ProfileFailurePolicy) -> bool {
        match self {
            AuthState::Loading | AuthState::Unauthenticated => false,
            AuthState::Provisional { .. } => policy == ProfileFailurePolicy::FailOpen,
            AuthState::Authenticated { .. } => true,
        }
    }

    /// Only an attached profile ends polling; `Provisional` keeps checking
    pub fn is_settled(&self) -> bool {
        matches!(self, AuthState::Authenticated { .. })
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            AuthState::Provisional { session } | AuthState::Authenticated { session, .. } => {
                Some(session)
            }
            _ => None,
        }
    }
}

pub struct SessionReconciler<I: ?Sized> {
    identity: Arc<I>,
    policy: ProfileFailurePolicy,
    state: watch::Sender<AuthState>,
}

impl<I> SessionReconciler<I>
where
    I: IdentityProvider + ?Sized,
{
    pub fn new(identity: Arc<I>, policy: ProfileFailurePolicy) -> Self {
        let (state, _) = watch::channel(AuthState::Loading);
        Self {
            identity,
            policy,
            state,
        }
    }

    pub fn policy(&self) -> ProfileFailurePolicy {
        self.policy
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().grants_access(self.policy)
    }

    /// Restore or query the session, then load its profile
    pub async fn reconcile(&self) -> AuthState {
        let next = match self.resolve_session().await {
            Ok(Some(session)) => self.attach_profile(session).await,
            Ok(None) => AuthState::Unauthenticated,
            Err(e) => {
                tracing::warn!("Session check failed: {} {}", e.code(), e);
                AuthState::Unauthenticated
            }
        };

        self.publish(next)
    }

    async fn resolve_session(&self) -> Result<Option<Session>, ClientError> {
        match self.identity.restore_session().await {
            Ok(Some(session)) => return Ok(Some(session)),
            Ok(None) => {}
            Err(e) => tracing::warn!("Session restore failed, checking live session: {}", e),
        }

        self.identity.current_session().await
    }

    async fn attach_profile(&self, session: Session) -> AuthState {
        match self.identity.current_profile(&session).await {
            Ok(Some(profile)) => AuthState::Authenticated {
                session,
                profile: Some(profile),
            },
            Ok(None) => {
                tracing::debug!(user_id = %session.user_id, "Session has no profile yet");
                AuthState::Provisional { session }
            }
            Err(e) => match self.policy {
                ProfileFailurePolicy::FailOpen => {
                    tracing::warn!(
                        user_id = %session.user_id,
                        "Profile fetch failed, continuing without profile: {}",
                        e
                    );
                    AuthState::Authenticated {
                        session,
                        profile: None,
                    }
                }
                ProfileFailurePolicy::FailClosed => {
                    tracing::warn!(user_id = %session.user_id, "Profile fetch failed: {}", e);
                    AuthState::Unauthenticated
                }
            },
        }
    }

    /// Apply an identity provider event
    pub async fn handle_event(&self, event: AuthEvent) -> AuthState {
        let next = match event {
            AuthEvent::SignedIn(session) | AuthEvent::TokenRefreshed(session) => {
                self.attach_profile(session).await
            }
            AuthEvent::SignedOut => AuthState::Unauthenticated,
        };

        self.publish(next)
    }

    fn publish(&self, state: AuthState) -> AuthState {
        self.state.send_replace(state.clone());
        state
    }
}

/// Exponential backoff for re-checking a missing session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub initial: Duration,
    pub factor: u32,
    pub max_delay: Duration,
    /// Polling stops once the summed delays would exceed this
    pub window: Duration,
}

impl BackoffPolicy {
    pub const DEFAULT_INITIAL_SECS: u64 = 1;
    pub const DEFAULT_FACTOR: u32 = 2;
    pub const DEFAULT_MAX_DELAY_SECS: u64 = 30;
    pub const DEFAULT_WINDOW_SECS: u64 = 300;

    pub fn schedule(&self) -> BackoffSchedule {
        BackoffSchedule {
            policy: *self,
            next: self.initial,
            elapsed: Duration::ZERO,
        }
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            initial: Duration::from_secs(Self::DEFAULT_INITIAL_SECS),
            factor: Self::DEFAULT_FACTOR,
            max_delay: Duration::from_secs(Self::DEFAULT_MAX_DELAY_SECS),
            window: Duration::from_secs(Self::DEFAULT_WINDOW_SECS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BackoffSchedule {
    policy: BackoffPolicy,
    next: Duration,
    elapsed: Duration,
}

impl Iterator for BackoffSchedule {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        let delay = self.next.min(self.policy.max_delay);
        if delay.is_zero() {
            return None;
        }

        let elapsed = self.elapsed.checked_add(delay)?;
        if elapsed > self.policy.window {
            return None;
        }

        self.elapsed = elapsed;
        self.next = delay
            .saturating_mul(self.policy.factor)
            .min(self.policy.max_delay);
        Some(delay)
    }
}

/// Background task that keeps a [`SessionReconciler`] current
///
/// Dropping the watcher cancels it; [`shutdown`](Self::shutdown) also waits
/// for the task to finish.
pub struct SessionWatcher {
    cancel: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl SessionWatcher {
    pub fn spawn<I>(reconciler: Arc<SessionReconciler<I>>, backoff: BackoffPolicy) -> Self
    where
        I: IdentityProvider + ?Sized + 'static,
    {
        let (cancel_tx, cancel_rx) = oneshot::channel();
        let events = reconciler.identity.subscribe();
        let handle = tokio::spawn(watch_session(reconciler, backoff, events, cancel_rx));

        Self {
            cancel: Some(cancel_tx),
            handle: Some(handle),
        }
    }

    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
    }

    pub async fn shutdown(mut self) {
        self.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                tracing::error!("Session watcher failed: {}", e);
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }
}

impl Drop for SessionWatcher {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn next_poll(state: &AuthState, schedule: &mut BackoffSchedule) -> Option<Instant> {
    if state.is_settled() {
        return None;
    }

    match schedule.next() {
        Some(delay) => Some(Instant::now() + delay),
        None => {
            tracing::info!("Session polling window exhausted");
            None
        }
    }
}

async fn watch_session<I>(
    reconciler: Arc<SessionReconciler<I>>,
    backoff: BackoffPolicy,
    mut events: broadcast::Receiver<AuthEvent>,
    mut cancel: oneshot::Receiver<()>,
) where
    I: IdentityProvider + ?Sized,
{
    let mut schedule = backoff.schedule();
    let state = reconciler.reconcile().await;
    let mut poll_at = next_poll(&state, &mut schedule);
    let mut events_open = true;

    loop {
        tokio::select! {
            biased;

            _ = &mut cancel => {
                tracing::debug!("Session watcher cancelled");
                break;
            }

            event = events.recv(), if events_open => match event {
                Ok(event) => {
                    let signed_in_or_out = !matches!(event, AuthEvent::TokenRefreshed(_));
                    let state = reconciler.handle_event(event).await;
                    if state.is_settled() {
                        poll_at = None;
                    } else if signed_in_or_out || poll_at.is_none() {
                        schedule = backoff.schedule();
                        poll_at = next_poll(&state, &mut schedule);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Session watcher missed {} auth events", skipped);
                    let state = reconciler.reconcile().await;
                    poll_at = if state.is_settled() { None } else { poll_at };
                }
                Err(RecvError::Closed) => {
                    tracing::debug!("Identity provider closed its event stream");
                    events_open = false;
                }
            },

            _ = tokio::time::sleep_until(poll_at.unwrap_or_else(Instant::now)), if poll_at.is_some() => {
                let state = reconciler.reconcile().await;
                poll_at = next_poll(&state, &mut schedule);
            }
        }
    }
}
