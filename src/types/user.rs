use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::core::error::Error;

pub(crate) type Username = String;

/// Fallback reported when a principal carries no role.
pub(crate) const DEFAULT_ROLE: &str = "USER";

#[derive(Clone)]
pub(crate) struct StoredUser {
    pub(crate) username: Username,
    pub(crate) password_hash: String,
    pub(crate) roles: BTreeSet<String>,
}

impl std::fmt::Debug for StoredUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredUser")
            .field("username", &self.username)
            .field("roles", &self.roles)
            .finish()
    }
}

/// The identity attached to an authenticated request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Principal {
    pub(crate) username: Username,
    pub(crate) roles: BTreeSet<String>,
}

impl Principal {
    pub(crate) fn role(&self) -> &str {
        self.roles
            .iter()
            .next()
            .map(String::as_str)
            .unwrap_or(DEFAULT_ROLE)
    }
}

impl From<&StoredUser> for Principal {
    fn from(user: &StoredUser) -> Self {
        Self {
            username: user.username.clone(),
            roles: user.roles.clone(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug)]
pub(crate) struct Claims {
    pub(crate) sub: String,
    pub(crate) iat: i64,
    pub(crate) exp: i64,
    pub(crate) jti: String,
}

/// Why a request ended up without a principal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Rejection {
    Missing,
    Malformed,
    Invalid,
    Expired,
}

impl From<Rejection> for Error {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::Missing => Error::NoCredentials,
            Rejection::Malformed | Rejection::Invalid => Error::InvalidToken,
            Rejection::Expired => Error::ExpiredToken,
        }
    }
}

/// Outcome of the request gate, stored in request extensions for every request.
#[derive(Clone, Debug)]
pub(crate) enum Caller {
    Authenticated(Principal),
    Anonymous(Rejection),
}

impl Caller {
    pub(crate) fn principal(&self) -> Option<&Principal> {
        match self {
            Caller::Authenticated(principal) => Some(principal),
            Caller::Anonymous(_) => None,
        }
    }
}
