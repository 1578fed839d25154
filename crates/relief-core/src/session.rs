//! Actors, roles, and the per-request session state.
//!
//! Identity is delegated to an external provider behind [`SessionProvider`].
//! A request resolves its session once and passes the [`Session`] explicitly
//! to whatever needs the actor; nothing reads an ambient global.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Actor ───────────────────────────────────────────────────────────────────

/// An authenticated user's capability class.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Role {
  /// Non-governmental relief organisation; fulfils supply requests.
  Ngo,
  /// Search and rescue; resolves missing persons and SOS alerts.
  Sar,
}

impl Role {
  /// Unknown role names resolve to `None`, which carries no permissions.
  pub fn parse(s: &str) -> Option<Self> { s.trim().parse().ok() }
}

/// The user on whose behalf a request runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
  pub id:           String,
  pub display_name: String,
  pub role:         Option<Role>,
}

/// What the client presented to identify itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
  pub username: String,
  pub password: String,
}

// ─── Provider ────────────────────────────────────────────────────────────────

/// Abstraction over the external identity service.
pub trait SessionProvider: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Authoritative lookup. `Ok(None)` means the credentials do not identify
  /// anyone.
  fn current_actor<'a>(
    &'a self,
    credentials: &'a Credentials,
  ) -> impl Future<Output = Result<Option<Actor>, Self::Error>> + Send + 'a;

  /// Immediate, possibly stale guess. Never sufficient to authorise a
  /// transition.
  fn current_actor_best_effort(&self, credentials: &Credentials) -> Option<Actor>;
}

// ─── Session state ───────────────────────────────────────────────────────────

/// `Unknown → Resolving → Resolved(actor) | Anonymous`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
  #[default]
  Unknown,
  /// The authoritative lookup is in flight; `provisional` is a display-only
  /// guess.
  Resolving { provisional: Option<Actor> },
  Resolved { actor: Actor },
  Anonymous,
}

/// The session for a single request cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Session {
  #[serde(flatten)]
  state: SessionState,
}

impl Session {
  pub fn new() -> Self { Self::default() }

  /// A session that is already known to be anonymous.
  pub fn anonymous() -> Self { Self { state: SessionState::Anonymous } }

  pub fn resolved(actor: Actor) -> Self {
    Self { state: SessionState::Resolved { actor } }
  }

  pub fn state(&self) -> &SessionState { &self.state }

  /// Enter `Resolving`, keeping a provisional actor for display.
  pub fn begin(&mut self, provisional: Option<Actor>) {
    self.state = SessionState::Resolving { provisional };
  }

  /// Settle with the authoritative answer.
  pub fn settle(&mut self, actor: Option<Actor>) {
    self.state = match actor {
      Some(actor) => SessionState::Resolved { actor },
      None => SessionState::Anonymous,
    };
  }

  /// Run both phases against `provider`. Without credentials the session is
  /// anonymous. Provider failures leave the session `Resolving` and surface as
  /// [`Error::AuthUnavailable`].
  pub async fn resolve<P: SessionProvider>(
    &mut self,
    provider: &P,
    credentials: Option<&Credentials>,
  ) -> Result<&SessionState> {
    let Some(credentials) = credentials else {
      self.settle(None);
      return Ok(&self.state);
    };

    self.begin(provider.current_actor_best_effort(credentials));
    let actor = provider
      .current_actor(credentials)
      .await
      .map_err(|e| Error::AuthUnavailable(e.to_string()))?;
    self.settle(actor);
    Ok(&self.state)
  }

  /// The actor to show in the UI, which may be a provisional guess.
  pub fn display_actor(&self) -> Option<&Actor> {
    match &self.state {
      SessionState::Resolving { provisional } => provisional.as_ref(),
      SessionState::Resolved { actor } => Some(actor),
      SessionState::Unknown | SessionState::Anonymous => None,
    }
  }

  /// The authoritative actor. Permission-sensitive actions must go through
  /// here.
  pub fn require_actor(&self) -> Result<&Actor> {
    match &self.state {
      SessionState::Resolved { actor } => Ok(actor),
      SessionState::Anonymous => Err(Error::Unauthenticated),
      SessionState::Unknown | SessionState::Resolving { .. } => Err(Error::SessionPending),
    }
  }
}
