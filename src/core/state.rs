use std::sync::Arc;

use crate::controllers::user::UserController;
use crate::core::config::{self, Args};
use crate::core::error::ConfigError;
use crate::core::store::UserStore;

#[derive(Clone, Debug)]
pub(crate) struct AppState {
    pub(crate) user_controller: UserController,
}

impl AppState {
    pub(crate) fn new(args: &Args) -> Result<Self, ConfigError> {
        let secret = args.signing_secret()?;
        let lifetime = args.token_lifetime()?;

        let users = config::parse_users(&args.users)?;
        let store = UserStore::provision(users, args.bcrypt_cost)?;

        Ok(AppState {
            user_controller: UserController::new(Arc::new(store), secret, lifetime),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::DEFAULT_USERS;

    fn args(secret: Option<&str>, users: &str) -> Args {
        Args {
            log_level: "info".into(),
            port: 8080,
            secret: secret.map(Into::into),
            token_lifetime_hours: 24,
            users: users.into(),
            bcrypt_cost: 4,
            rate_limit: 100,
        }
    }

    #[test]
    fn missing_secret_is_fatal() {
        assert!(matches!(
            AppState::new(&args(None, DEFAULT_USERS)),
            Err(ConfigError::MissingSecret)
        ));
    }

    #[test]
    fn invalid_users_are_fatal() {
        assert!(matches!(
            AppState::new(&args(
                Some("0123456789abcdef0123456789abcdef"),
                "admin:admin123"
            )),
            Err(ConfigError::InvalidUserEntry(_))
        ));
    }

    #[test]
    fn builds_from_valid_args() {
        let state =
            AppState::new(&args(Some("0123456789abcdef0123456789abcdef"), DEFAULT_USERS))
                .unwrap();

        assert!(
            state
                .user_controller
                .verify_credentials("user", "user123")
                .is_ok()
        );
    }
}
