use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::core::error::Error;
use crate::core::store::UserStore;
use crate::types::user::{Claims, Principal};

/// Verifies credentials, issues tokens and validates them against the user store.
#[derive(Clone)]
pub(crate) struct UserController {
    store: Arc<UserStore>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl std::fmt::Debug for UserController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserController")
            .field("users", &self.store.len())
            .field("lifetime", &self.lifetime)
            .finish()
    }
}

impl UserController {
    pub(crate) fn new(store: Arc<UserStore>, jwt_secret: &str, lifetime: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            store,
            encoding_key: EncodingKey::from_secret(jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
            validation,
            lifetime,
        }
    }

    pub(crate) fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Principal, Error> {
        let Some(user) = self.store.get(username) else {
            bcrypt::verify(password, self.store.dummy_hash())?;
            return Err(Error::BadCredentials);
        };

        if let false = bcrypt::verify(password, &user.password_hash)? {
            return Err(Error::BadCredentials);
        };

        Ok(Principal::from(user))
    }

    pub(crate) fn issue_token(&self, subject: &str) -> Result<String, Error> {
        self.issue_token_at(subject, Utc::now())
    }

    pub(crate) fn issue_token_at(
        &self,
        subject: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<String, Error> {
        let expires_at = issued_at
            .checked_add_signed(self.lifetime)
            .ok_or(Error::ExpiryOverflow)?;

        let claims = Claims {
            sub: subject.to_owned(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
        };

        Ok(jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.encoding_key,
        )?)
    }

    /// Checks signature then expiry, and resolves the subject to its current roles.
    pub(crate) fn validate_token(&self, token: &str) -> Result<Principal, Error> {
        let claims = self.decode_jwt(token)?;

        let user = self.store.get(&claims.sub).ok_or(Error::InvalidToken)?;

        Ok(Principal::from(user))
    }

    fn decode_jwt(&self, token: &str) -> Result<Claims, Error> {
        let claims =
            match jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation) {
                Ok(token_data) => token_data.claims,
                Err(e) => match e.kind() {
                    ErrorKind::ExpiredSignature => return Err(Error::ExpiredToken),
                    _ => {
                        tracing::debug!("rejected token: {}", e);
                        return Err(Error::InvalidToken);
                    }
                },
            };

        // jsonwebtoken admits exp == now; the token is already dead at that instant.
        if Utc::now().timestamp() >= claims.exp {
            return Err(Error::ExpiredToken);
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::parse_users;

    const TEST_SECRET: &str = "test-secret-key-for-jwt-testing-minimum-32-chars";
    const BASE64URL: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

    fn controller() -> UserController {
        let store = UserStore::provision(
            parse_users("admin:admin123:ADMIN,user:user123:USER").unwrap(),
            4,
        )
        .unwrap();

        UserController::new(Arc::new(store), TEST_SECRET, Duration::hours(24))
    }

    #[test]
    fn verifies_correct_password() {
        let principal = controller().verify_credentials("admin", "admin123").unwrap();

        assert_eq!(principal.username, "admin");
        assert_eq!(principal.role(), "ADMIN");
    }

    #[test]
    fn rejects_wrong_password_and_unknown_user() {
        let controller = controller();

        assert!(matches!(
            controller.verify_credentials("admin", "wrong"),
            Err(Error::BadCredentials)
        ));
        assert!(matches!(
            controller.verify_credentials("admin", "user123"),
            Err(Error::BadCredentials)
        ));
        assert!(matches!(
            controller.verify_credentials("ghost", "admin123"),
            Err(Error::BadCredentials)
        ));
    }

    #[test]
    fn issued_token_decodes_to_subject() {
        let controller = controller();
        let token = controller.issue_token("user").unwrap();

        assert_eq!(token.split('.').count(), 3);

        let principal = controller.validate_token(&token).unwrap();
        assert_eq!(principal.username, "user");
        assert_eq!(principal.role(), "USER");
    }

    #[test]
    fn claims_carry_lifetime() {
        let controller = controller();
        let issued_at = Utc::now();
        let token = controller.issue_token_at("admin", issued_at).unwrap();

        let claims = controller.decode_jwt(&token).unwrap();
        assert_eq!(claims.sub, "admin");
        assert_eq!(claims.iat, issued_at.timestamp());
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
    }

    #[test]
    fn tokens_are_never_identical() {
        let controller = controller();
        let issued_at = Utc::now();

        let first = controller.issue_token_at("admin", issued_at).unwrap();
        let second = controller.issue_token_at("admin", issued_at).unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn expiry_overflow_is_an_error() {
        assert!(matches!(
            controller().issue_token_at("admin", DateTime::<Utc>::MAX_UTC),
            Err(Error::ExpiryOverflow)
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let controller = controller();
        let token = controller
            .issue_token_at("admin", Utc::now() - Duration::hours(25))
            .unwrap();

        assert!(matches!(
            controller.validate_token(&token),
            Err(Error::ExpiredToken)
        ));
    }

    #[test]
    fn token_expiring_now_is_rejected() {
        let controller = controller();
        let token = controller
            .issue_token_at("admin", Utc::now() - Duration::hours(24))
            .unwrap();

        assert!(matches!(
            controller.validate_token(&token),
            Err(Error::ExpiredToken)
        ));
    }

    #[test]
    fn flipped_signature_bit_is_rejected() {
        let controller = controller();
        let token = controller.issue_token("admin").unwrap();

        let (head, signature) = token.rsplit_once('.').unwrap();
        let mut bytes = signature.as_bytes().to_vec();
        let sextet = BASE64URL.iter().position(|&c| c == bytes[0]).unwrap();
        bytes[0] = BASE64URL[sextet ^ 1];
        let tampered = format!("{}.{}", head, String::from_utf8(bytes).unwrap());

        assert!(matches!(
            controller.validate_token(&tampered),
            Err(Error::InvalidToken)
        ));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let controller = controller();
        let other = UserController::new(
            controller.store.clone(),
            "another-secret-key-for-jwt-testing-32-chars",
            Duration::hours(24),
        );
        let token = other.issue_token("admin").unwrap();

        assert!(matches!(
            controller.validate_token(&token),
            Err(Error::InvalidToken)
        ));
    }

    #[test]
    fn forged_expired_token_is_invalid_not_expired() {
        let controller = controller();
        let other = UserController::new(
            controller.store.clone(),
            "another-secret-key-for-jwt-testing-32-chars",
            Duration::hours(1),
        );
        let token = other
            .issue_token_at("admin", Utc::now() - Duration::hours(2))
            .unwrap();

        assert!(matches!(
            controller.validate_token(&token),
            Err(Error::InvalidToken)
        ));
    }

    #[test]
    fn garbage_and_unknown_subjects_are_rejected() {
        let controller = controller();

        assert!(matches!(
            controller.validate_token("invalid.token.here"),
            Err(Error::InvalidToken)
        ));
        assert!(matches!(
            controller.validate_token(""),
            Err(Error::InvalidToken)
        ));

        let token = controller.issue_token("ghost").unwrap();
        assert!(matches!(
            controller.validate_token(&token),
            Err(Error::InvalidToken)
        ));
    }
}
