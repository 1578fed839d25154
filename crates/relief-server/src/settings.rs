//! Runtime configuration, deserialised from `config.toml` and `RELIEF_*`
//! environment variables.

use std::path::PathBuf;

use serde::Deserialize;

#[derive(Deserialize, Clone, Debug)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
  /// Responders who may sign in. Everyone else is anonymous.
  #[serde(default)]
  pub accounts:   Vec<AccountConfig>,
}

/// One identity-provider profile.
#[derive(Deserialize, Clone, Debug)]
pub struct AccountConfig {
  pub username:      String,
  pub display_name:  String,
  /// `"ngo"` or `"sar"`. Anything else signs in without a role.
  #[serde(default)]
  pub role:          String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}
