use std::collections::HashMap;

use crate::core::config::UserEntry;
use crate::core::error::ConfigError;
use crate::types::user::StoredUser;

/// Read-only set of users provisioned at startup.
#[derive(Debug)]
pub(crate) struct UserStore {
    users: HashMap<String, StoredUser>,
    dummy_hash: String,
}

impl UserStore {
    /// Hashes every entry's password at `cost` and drops the plaintext.
    pub(crate) fn provision(entries: Vec<UserEntry>, cost: u32) -> Result<Self, ConfigError> {
        let users = entries
            .into_iter()
            .map(|entry| {
                let password_hash = bcrypt::hash(&entry.password, cost)?;

                Ok::<_, ConfigError>((
                    entry.username.clone(),
                    StoredUser {
                        username: entry.username,
                        password_hash,
                        roles: entry.roles,
                    },
                ))
            })
            .collect::<Result<HashMap<_, _>, _>>()?;

        // Verified against when the username is unknown, so both paths pay for one bcrypt run.
        let dummy_hash = bcrypt::hash(uuid::Uuid::new_v4().to_string(), cost)?;

        tracing::info!("provisioned {} users", users.len());

        Ok(Self { users, dummy_hash })
    }

    pub(crate) fn get(&self, username: &str) -> Option<&StoredUser> {
        self.users.get(username)
    }

    pub(crate) fn dummy_hash(&self) -> &str {
        &self.dummy_hash
    }

    pub(crate) fn len(&self) -> usize {
        self.users.len()
    }
}
