//! Local (username + password) credential verification.

use crate::auth::{errors::AuthError, models::AuthUser, password::PasswordHasher};
use crate::database::UserStore;

/// Resolve a username/password pair to an identity.
///
/// Unknown usernames and wrong passwords both fail with
/// [`AuthError::InvalidCredentials`] after one Argon2 verification each;
/// only the debug log tells them apart.
/// Store failures surface as [`AuthError::StorageUnavailable`].
pub async fn verify_credentials(
    store: &dyn UserStore,
    hasher: &PasswordHasher,
    username: &str,
    password: &str,
) -> Result<AuthUser, AuthError> {
    let user = match store.find_by_username(username).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            hasher.verify_dummy(password);
            tracing::debug!("Login rejected for {}: unknown username", username);
            return Err(AuthError::InvalidCredentials);
        }
        Err(e) => {
            tracing::error!("Credential lookup failed for {}: {}", username, e);
            return Err(e.into());
        }
    };

    if !hasher.verify(password, &user.password_hash) {
        tracing::debug!("Login rejected for {}: password mismatch", username);
        return Err(AuthError::InvalidCredentials);
    }

    Ok(AuthUser::from(user))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::auth::password::test_hasher;
    use crate::database::{InMemoryStore, Movie, NewUser, StoreError, User, UserUpdate};
    use async_trait::async_trait;
    use uuid::Uuid;

    /// Store whose every call fails as if the backend were down.
    pub(crate) struct UnreachableStore;

    #[async_trait]
    impl UserStore for UnreachableStore {
        async fn find_by_username(&self, _: &str) -> Result<Option<User>, StoreError> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
        async fn find_by_id(&self, _: Uuid) -> Result<Option<User>, StoreError> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
        async fn list_users(&self) -> Result<Vec<User>, StoreError> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
        async fn create_user(&self, _: NewUser) -> Result<User, StoreError> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
        async fn update_user(&self, _: &str, _: UserUpdate) -> Result<Option<User>, StoreError> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
        async fn add_favorite(&self, _: &str, _: Uuid) -> Result<Option<User>, StoreError> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
        async fn remove_favorite(&self, _: &str, _: Uuid) -> Result<Option<User>, StoreError> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
        async fn delete_user(&self, _: &str) -> Result<bool, StoreError> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
    }

    #[async_trait]
    impl crate::database::MovieStore for UnreachableStore {
        async fn list_movies(&self) -> Result<Vec<Movie>, StoreError> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
        async fn find_by_title(&self, _: &str) -> Result<Option<Movie>, StoreError> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
        async fn find_by_genre(&self, _: &str) -> Result<Option<Movie>, StoreError> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
        async fn find_by_director(&self, _: &str) -> Result<Option<Movie>, StoreError> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
    }

    async fn store_with_alice(hasher: &PasswordHasher) -> InMemoryStore {
        let store = InMemoryStore::new();
        store
            .create_user(NewUser {
                username: "alice12".to_string(),
                password_hash: hasher.hash("secret1").unwrap(),
                email: "alice@example.com".to_string(),
                birthday: None,
            })
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_valid_credentials_resolve_identity() {
        let hasher = test_hasher();
        let store = store_with_alice(&hasher).await;

        let user = verify_credentials(&store, &hasher, "alice12", "secret1").await.unwrap();
        assert_eq!(user.username, "alice12");
        assert_eq!(user.email, "alice@example.com");
    }

    #[tokio::test]
    async fn test_unknown_user_and_wrong_password_are_indistinguishable() {
        let hasher = test_hasher();
        let store = store_with_alice(&hasher).await;

        let wrong_password = verify_credentials(&store, &hasher, "alice12", "wrong").await.unwrap_err();
        let unknown_user = verify_credentials(&store, &hasher, "mallory", "secret1").await.unwrap_err();
        assert_eq!(wrong_password, AuthError::InvalidCredentials);
        assert_eq!(unknown_user, wrong_password);
        assert_eq!(unknown_user.public_message(), wrong_password.public_message());
    }

    #[tokio::test]
    async fn test_unknown_user_costs_one_verification() {
        let hasher = test_hasher();
        let store = store_with_alice(&hasher).await;

        let before = hasher.verification_count();
        verify_credentials(&store, &hasher, "alice12", "wrong").await.unwrap_err();
        let wrong_password = hasher.verification_count() - before;

        let before = hasher.verification_count();
        verify_credentials(&store, &hasher, "mallory", "wrong").await.unwrap_err();
        let unknown_user = hasher.verification_count() - before;

        assert_eq!(wrong_password, 1);
        assert_eq!(unknown_user, 1);
    }

    #[tokio::test]
    async fn test_store_failure_is_not_invalid_credentials() {
        let hasher = test_hasher();
        let err = verify_credentials(&UnreachableStore, &hasher, "alice12", "secret1").await.unwrap_err();
        assert!(matches!(err, AuthError::StorageUnavailable(_)));
    }
}
