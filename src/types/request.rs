use serde::Deserialize;

use crate::core::error::Error;

#[derive(Deserialize)]
pub(crate) struct LoginData {
    #[serde(default)]
    pub(crate) username: String,
    #[serde(default)]
    pub(crate) password: String,
}

impl LoginData {
    pub(crate) fn validate(&self) -> Result<(), Error> {
        if self.username.trim().is_empty() {
            return Err(Error::MissingField("Username"));
        }

        if self.password.trim().is_empty() {
            return Err(Error::MissingField("Password"));
        }

        Ok(())
    }
}

impl std::fmt::Debug for LoginData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginData")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}
