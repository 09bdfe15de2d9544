//! Authentication service: password login and bearer token validation.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;

use crate::domain::entities::User;
use crate::domain::identity::CurrentUser;
use crate::domain::repositories::{TokenRepository, UserRepository};
use crate::error::AppError;
use crate::utils::password::{verify_dummy_password, verify_password};
use serde_json::json;

type HmacSha256 = Hmac<Sha256>;

/// A freshly issued bearer token. The raw value is shown once and never stored.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

/// Service for password login and bearer token authentication.
///
/// Tokens are hashed with HMAC-SHA256 (keyed by `signing_secret`) before storage
/// and comparison. An attacker with read-only access to the database cannot verify
/// or forge tokens without the server-side secret.
pub struct AuthService<T: TokenRepository, U: UserRepository> {
    token_repository: Arc<T>,
    user_repository: Arc<U>,
    signing_secret: String,
    token_ttl: Duration,
}

impl<T: TokenRepository, U: UserRepository> AuthService<T, U> {
    /// Creates a new authentication service.
    ///
    /// # Arguments
    ///
    /// - `signing_secret` - HMAC key; must match the value used when tokens were created
    /// - `token_ttl_hours` - lifetime of tokens issued by [`Self::login`]
    pub fn new(
        token_repository: Arc<T>,
        user_repository: Arc<U>,
        signing_secret: String,
        token_ttl_hours: i64,
    ) -> Self {
        Self {
            token_repository,
            user_repository,
            signing_secret,
            token_ttl: Duration::hours(token_ttl_hours),
        }
    }

    /// Hashes a raw token with HMAC-SHA256 using the server signing secret.
    ///
    /// Returns a 64-character lowercase hex-encoded MAC.
    pub fn hash_token(&self, token: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.signing_secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(token.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// 256 random bits, URL-safe base64 without padding.
    fn generate_token() -> String {
        let bytes: [u8; 32] = rand::random();
        URL_SAFE_NO_PAD.encode(bytes)
    }

    fn invalid_credentials() -> AppError {
        AppError::unauthorized("Invalid credentials", json!({}))
    }

    /// Verifies a username/password pair and issues a new bearer token.
    ///
    /// Unknown users, wrong passwords and deactivated accounts all produce
    /// the same error so the response does not reveal which one applied.
    /// Unknown users are still checked against a dummy hash to keep the
    /// response time the same.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if the credentials are rejected.
    ///
    /// Returns [`AppError::Internal`] on database or hashing errors.
    pub async fn login(&self, username: &str, password: &str) -> Result<IssuedToken, AppError> {
        let Some(user) = self.user_repository.find_by_username(username).await? else {
            verify_dummy_password(password);
            return Err(Self::invalid_credentials());
        };

        if !verify_password(password, &user.password_hash)? {
            return Err(Self::invalid_credentials());
        }

        if !user.is_active {
            tracing::info!(user_id = user.id, "Login attempt for deactivated account");
            return Err(Self::invalid_credentials());
        }

        let token = Self::generate_token();
        let expires_at = Utc::now() + self.token_ttl;

        self.token_repository
            .create_token(user.id, "login", &self.hash_token(&token), expires_at)
            .await?;

        tracing::info!(user_id = user.id, username = %user.username, "User logged in");

        Ok(IssuedToken {
            token,
            expires_at,
            user,
        })
    }

    /// Resolves a raw token to the user it belongs to.
    ///
    /// On success, updates the `last_used_at` timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if the token is unknown, revoked,
    /// expired, or its owner is deactivated.
    pub async fn authenticate(&self, token: &str) -> Result<CurrentUser, AppError> {
        let token_hash = self.hash_token(token);

        let user = self
            .token_repository
            .find_identity(&token_hash)
            .await?
            .ok_or_else(|| {
                AppError::unauthorized(
                    "Unauthorized",
                    json!({"reason": "Invalid, expired or revoked token"}),
                )
            })?;

        if let Err(e) = self.token_repository.update_last_used(&token_hash).await {
            tracing::warn!("Failed to update token last_used_at: {}", e);
        }

        Ok(user)
    }

    /// Revokes the presented token.
    pub async fn logout(&self, token: &str) -> Result<(), AppError> {
        let revoked = self.token_repository.revoke(&self.hash_token(token)).await?;
        if !revoked {
            tracing::debug!("Logout for a token that was already revoked");
        }
        Ok(())
    }

    /// Revokes every live token of `user_id`. Returns how many were revoked.
    pub async fn revoke_all_for_user(&self, user_id: i64) -> Result<u64, AppError> {
        self.token_repository.revoke_all_for_user(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Role;
    use crate::domain::repositories::{ApiToken, MockTokenRepository, MockUserRepository};
    use crate::utils::password::hash_password;

    fn test_secret() -> String {
        "test-signing-secret".to_string()
    }

    fn compute_expected_hash(token: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(test_secret().as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(token.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    fn service(
        tokens: MockTokenRepository,
        users: MockUserRepository,
    ) -> AuthService<MockTokenRepository, MockUserRepository> {
        AuthService::new(Arc::new(tokens), Arc::new(users), test_secret(), 24)
    }

    fn user_with_password(password: &str, is_active: bool) -> User {
        User {
            id: 5,
            username: "alice".to_string(),
            display_name: "Alice".to_string(),
            password_hash: hash_password(password).unwrap(),
            role: Role::Member,
            is_active,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_login_issues_token() {
        let user = user_with_password("correct horse", true);
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_username()
            .withf(|name| name == "alice")
            .returning(move |_| Ok(Some(user.clone())));

        let mut tokens = MockTokenRepository::new();
        tokens
            .expect_create_token()
            .withf(|user_id, _, hash, _| *user_id == 5 && hash.len() == 64)
            .times(1)
            .returning(|user_id, name, hash, expires_at| {
                Ok(ApiToken {
                    id: 1,
                    user_id,
                    name: name.to_string(),
                    token_hash: hash.to_string(),
                    created_at: Utc::now(),
                    expires_at,
                    revoked_at: None,
                })
            });

        let issued = service(tokens, users)
            .login("alice", "correct horse")
            .await
            .unwrap();

        assert_eq!(issued.user.id, 5);
        assert_eq!(issued.token.len(), 43);
        assert!(issued.expires_at > Utc::now() + Duration::hours(23));
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let user = user_with_password("correct horse", true);
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_username()
            .returning(move |_| Ok(Some(user.clone())));

        let mut tokens = MockTokenRepository::new();
        tokens.expect_create_token().times(0);

        let result = service(tokens, users).login("alice", "battery staple").await;

        assert!(matches!(result, Err(AppError::Unauthorized { .. })));
    }

    #[tokio::test]
    async fn test_login_inactive_user() {
        let user = user_with_password("correct horse", false);
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_username()
            .returning(move |_| Ok(Some(user.clone())));

        let result = service(MockTokenRepository::new(), users)
            .login("alice", "correct horse")
            .await;

        assert!(matches!(result, Err(AppError::Unauthorized { .. })));
    }

    #[tokio::test]
    async fn test_login_unknown_user() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_username().returning(|_| Ok(None));

        let result = service(MockTokenRepository::new(), users)
            .login("nobody", "whatever")
            .await;

        assert!(matches!(result, Err(AppError::Unauthorized { .. })));
    }

    #[tokio::test]
    async fn test_unknown_user_costs_a_password_check() {
        let user = user_with_password("correct horse", true);
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_username()
            .returning(move |name| Ok((name == "alice").then(|| user.clone())));
        let service = service(MockTokenRepository::new(), users);

        // Warm the dummy hash so both timings cover one verification only
        let _ = service.login("nobody", "battery staple").await;

        let started = std::time::Instant::now();
        let _ = service.login("alice", "battery staple").await;
        let wrong_password = started.elapsed();

        let started = std::time::Instant::now();
        let result = service.login("nobody", "battery staple").await;
        let unknown_user = started.elapsed();

        assert!(matches!(result, Err(AppError::Unauthorized { .. })));
        assert!(
            unknown_user * 4 >= wrong_password,
            "unknown user {:?} vs wrong password {:?}",
            unknown_user,
            wrong_password
        );
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let mut tokens = MockTokenRepository::new();

        let token = "valid-token";
        let expected_hash = compute_expected_hash(token);

        tokens
            .expect_find_identity()
            .withf(move |hash| hash == expected_hash)
            .times(1)
            .returning(|_| {
                Ok(Some(CurrentUser {
                    user_id: 5,
                    username: "alice".to_string(),
                    role: Role::Member,
                }))
            });

        tokens
            .expect_update_last_used()
            .times(1)
            .returning(|_| Ok(()));

        let user = service(tokens, MockUserRepository::new())
            .authenticate(token)
            .await
            .unwrap();

        assert_eq!(user.user_id, 5);
    }

    #[tokio::test]
    async fn test_authenticate_invalid_token() {
        let mut tokens = MockTokenRepository::new();

        tokens.expect_find_identity().times(1).returning(|_| Ok(None));

        let result = service(tokens, MockUserRepository::new())
            .authenticate("invalid-token")
            .await;

        assert!(matches!(result, Err(AppError::Unauthorized { .. })));
    }

    #[tokio::test]
    async fn test_logout_revokes_presented_token() {
        let expected_hash = compute_expected_hash("tok");
        let mut tokens = MockTokenRepository::new();
        tokens
            .expect_revoke()
            .withf(move |hash| hash == expected_hash)
            .times(1)
            .returning(|_| Ok(true));

        assert!(
            service(tokens, MockUserRepository::new())
                .logout("tok")
                .await
                .is_ok()
        );
    }

    #[test]
    fn test_hash_token_consistency() {
        let service = service(MockTokenRepository::new(), MockUserRepository::new());

        let hash1 = service.hash_token("test-token");
        let hash2 = service.hash_token("test-token");

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
        assert_ne!(hash1, service.hash_token("other-token"));
    }

    #[test]
    fn test_hash_token_secret_matters() {
        let svc1 = AuthService::new(
            Arc::new(MockTokenRepository::new()),
            Arc::new(MockUserRepository::new()),
            "secret-a".to_string(),
            24,
        );
        let svc2 = AuthService::new(
            Arc::new(MockTokenRepository::new()),
            Arc::new(MockUserRepository::new()),
            "secret-b".to_string(),
            24,
        );

        assert_ne!(svc1.hash_token("token"), svc2.hash_token("token"));
    }

    #[test]
    fn test_generated_tokens_are_unique() {
        type Service = AuthService<MockTokenRepository, MockUserRepository>;
        assert_ne!(Service::generate_token(), Service::generate_token());
    }
}
