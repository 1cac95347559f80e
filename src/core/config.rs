use std::collections::{BTreeSet, HashSet};

use regex::Regex;
use serde::Deserialize;

use crate::core::error::ConfigError;

/// HS256 keys shorter than the digest size are rejected.
pub(crate) const MIN_SECRET_LENGTH: usize = 32;

pub(crate) const DEFAULT_USERS: &str = "admin:admin123:ADMIN,user:user123:USER";

#[derive(Debug, Deserialize, Clone)]
pub(crate) struct Args {
    pub(crate) log_level: String,
    pub(crate) port: u16,
    pub(crate) secret: Option<String>,
    pub(crate) token_lifetime_hours: i64,
    pub(crate) users: String,
    pub(crate) bcrypt_cost: u32,
    pub(crate) rate_limit: u64,
}

impl Args {
    pub(crate) fn load() -> Result<Self, ConfigError> {
        let config = config::Config::builder()
            .set_default("log_level", "info")?
            .set_default("port", 8080)?
            .set_default("token_lifetime_hours", 24)?
            .set_default("users", DEFAULT_USERS)?
            .set_default("bcrypt_cost", 12)?
            .set_default("rate_limit", 100)?
            .add_source(config::File::with_name("teafarm").required(false))
            .add_source(config::Environment::with_prefix("TEAFARM"))
            .build()?;

        Ok(config.try_deserialize::<Args>()?)
    }

    /// Returns the signing secret, failing when it is absent or too short.
    pub(crate) fn signing_secret(&self) -> Result<&str, ConfigError> {
        let secret = self.secret.as_deref().ok_or(ConfigError::MissingSecret)?;

        if secret.len() < MIN_SECRET_LENGTH {
            return Err(ConfigError::InvalidSecret(MIN_SECRET_LENGTH));
        }

        Ok(secret)
    }

    /// Rejects lifetimes that are not positive or that push `exp` past what a timestamp can hold.
    pub(crate) fn token_lifetime(&self) -> Result<chrono::Duration, ConfigError> {
        let invalid = ConfigError::InvalidLifetime(self.token_lifetime_hours);

        if self.token_lifetime_hours <= 0 {
            return Err(invalid);
        }

        let lifetime = chrono::Duration::try_hours(self.token_lifetime_hours).ok_or(invalid)?;

        match chrono::Utc::now().checked_add_signed(lifetime) {
            Some(_) => Ok(lifetime),
            None => Err(ConfigError::InvalidLifetime(self.token_lifetime_hours)),
        }
    }

    pub(crate) fn rate_limit(&self) -> Result<u64, ConfigError> {
        match self.rate_limit {
            0 => Err(ConfigError::InvalidRateLimit),
            rate_limit => Ok(rate_limit),
        }
    }
}

/// A user provisioned at startup, before its password is hashed.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct UserEntry {
    pub(crate) username: String,
    pub(crate) password: String,
    pub(crate) roles: BTreeSet<String>,
}

/// Parses `name:password:ROLE[|ROLE]` entries separated by commas.
pub(crate) fn parse_users(users: &str) -> Result<Vec<UserEntry>, ConfigError> {
    let username_pattern = Regex::new(r"^[a-zA-Z0-9_-]{3,20}$")?;
    let mut seen = HashSet::new();

    users
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let mut split = entry.splitn(3, ':');
            let invalid = || {
                ConfigError::InvalidUserEntry(entry.split(':').next().unwrap_or_default().to_owned())
            };

            let (Some(username), Some(password), Some(roles)) =
                (split.next(), split.next(), split.next())
            else {
                return Err(invalid());
            };

            if !username_pattern.is_match(username) || password.is_empty() {
                return Err(invalid());
            }

            let roles: BTreeSet<String> = roles
                .split('|')
                .map(str::trim)
                .filter(|role| !role.is_empty())
                .map(str::to_uppercase)
                .collect();

            if roles.is_empty() {
                return Err(invalid());
            }

            if !seen.insert(username.to_owned()) {
                return Err(ConfigError::DuplicateUser(username.to_owned()));
            }

            Ok(UserEntry {
                username: username.to_owned(),
                password: password.to_owned(),
                roles,
            })
        })
        .collect()
}
