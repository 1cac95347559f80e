use serde::Serialize;

use crate::types::user::Principal;

#[derive(Debug, Serialize)]
pub(crate) struct User {
    pub(crate) username: String,
    pub(crate) role: String,
}

impl From<&Principal> for User {
    fn from(principal: &Principal) -> Self {
        Self {
            username: principal.username.clone(),
            role: principal.role().to_owned(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct Login {
    pub(crate) token: String,
    pub(crate) user: User,
}

impl Login {
    pub(crate) fn new(principal: &Principal, token: String) -> Self {
        Self {
            token,
            user: User::from(principal),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct Status {
    pub(crate) message: &'static str,
    pub(crate) status: &'static str,
    pub(crate) timestamp: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct Health {
    pub(crate) status: &'static str,
}
