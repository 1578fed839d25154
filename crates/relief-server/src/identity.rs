//! Identity provider backed by the accounts listed in the server config.

use std::collections::HashMap;

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use relief_core::session::{Actor, Credentials, Role, SessionProvider};
use thiserror::Error;

use crate::settings::AccountConfig;

#[derive(Debug, Error)]
pub enum IdentityError {
  #[error("account {username:?} has a malformed password hash: {reason}")]
  MalformedHash { username: String, reason: String },

  #[error("password verification task failed: {0}")]
  Join(#[from] tokio::task::JoinError),
}

struct Account {
  actor:         Actor,
  password_hash: String,
}

/// Resolves Basic-auth credentials against configured accounts.
pub struct ConfigIdentity {
  accounts: HashMap<String, Account>,
}

impl ConfigIdentity {
  /// Build the directory, rejecting accounts whose hash cannot be parsed.
  pub fn from_accounts(configs: &[AccountConfig]) -> Result<Self, IdentityError> {
    let mut accounts = HashMap::with_capacity(configs.len());
    for cfg in configs {
      PasswordHash::new(&cfg.password_hash).map_err(|e| IdentityError::MalformedHash {
        username: cfg.username.clone(),
        reason:   e.to_string(),
      })?;

      let role = Role::parse(&cfg.role);
      if role.is_none() && !cfg.role.trim().is_empty() {
        tracing::warn!(username = %cfg.username, role = %cfg.role, "unknown role; account has no capabilities");
      }

      accounts.insert(cfg.username.clone(), Account {
        actor:         Actor {
          id: cfg.username.clone(),
          display_name: cfg.display_name.clone(),
          role,
        },
        password_hash: cfg.password_hash.clone(),
      });
    }
    Ok(Self { accounts })
  }

  pub fn len(&self) -> usize { self.accounts.len() }

  pub fn is_empty(&self) -> bool { self.accounts.is_empty() }
}

fn verify(username: &str, hash: &str, password: &str) -> Result<bool, IdentityError> {
  let parsed = PasswordHash::new(hash).map_err(|e| IdentityError::MalformedHash {
    username: username.to_owned(),
    reason:   e.to_string(),
  })?;
  Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
}

impl SessionProvider for ConfigIdentity {
  type Error = IdentityError;

  async fn current_actor(&self, credentials: &Credentials) -> Result<Option<Actor>, IdentityError> {
    let Some(account) = self.accounts.get(&credentials.username) else {
      return Ok(None);
    };

    // Argon2 verification is CPU-bound.
    let username = credentials.username.clone();
    let hash = account.password_hash.clone();
    let password = credentials.password.clone();
    let verified =
      tokio::task::spawn_blocking(move || verify(&username, &hash, &password)).await??;

    if !verified {
      tracing::debug!(username = %credentials.username, "password rejected");
    }
    Ok(verified.then(|| account.actor.clone()))
  }

  /// The profile for the username, without checking the password.
  fn current_actor_best_effort(&self, credentials: &Credentials) -> Option<Actor> {
    self.accounts.get(&credentials.username).map(|a| a.actor.clone())
  }
}

#[cfg(test)]
mod tests {
  use argon2::{PasswordHasher, password_hash::SaltString};
  use rand_core::OsRng;

  use super::*;

  fn hash(password: &str) -> String {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .unwrap()
      .to_string()
  }

  fn account(username: &str, role: &str, password: &str) -> AccountConfig {
    AccountConfig {
      username:      username.into(),
      display_name:  format!("{username} (test)"),
      role:          role.into(),
      password_hash: hash(password),
    }
  }

  fn creds(username: &str, password: &str) -> Credentials {
    Credentials { username: username.into(), password: password.into() }
  }

  fn directory() -> ConfigIdentity {
    ConfigIdentity::from_accounts(&[
      account("relief-org", "NGO", "secret"),
      account("rescuer", "sar", "secret"),
      account("volunteer", "driver", "secret"),
    ])
    .unwrap()
  }

  #[tokio::test]
  async fn correct_password_resolves_actor() {
    let actor = directory().current_actor(&creds("rescuer", "secret")).await.unwrap().unwrap();
    assert_eq!(actor.id, "rescuer");
    assert_eq!(actor.role, Some(Role::Sar));
  }

  #[tokio::test]
  async fn role_is_case_insensitive() {
    let actor = directory().current_actor(&creds("relief-org", "secret")).await.unwrap().unwrap();
    assert_eq!(actor.role, Some(Role::Ngo));
  }

  #[tokio::test]
  async fn unknown_role_signs_in_without_capabilities() {
    let actor = directory().current_actor(&creds("volunteer", "secret")).await.unwrap().unwrap();
    assert_eq!(actor.role, None);
  }

  #[tokio::test]
  async fn wrong_password_or_user_is_none() {
    let dir = directory();
    assert!(dir.current_actor(&creds("rescuer", "wrong")).await.unwrap().is_none());
    assert!(dir.current_actor(&creds("nobody", "secret")).await.unwrap().is_none());
  }

  #[test]
  fn best_effort_skips_password_check() {
    let dir = directory();
    let guess = dir.current_actor_best_effort(&creds("rescuer", "wrong")).unwrap();
    assert_eq!(guess.role, Some(Role::Sar));
    assert!(dir.current_actor_best_effort(&creds("nobody", "")).is_none());
  }

  #[test]
  fn malformed_hash_is_rejected_up_front() {
    let mut bad = account("rescuer", "sar", "secret");
    bad.password_hash = "plaintext".into();
    let err = ConfigIdentity::from_accounts(&[bad]).err().unwrap();
    assert!(matches!(err, IdentityError::MalformedHash { .. }));
  }
}
