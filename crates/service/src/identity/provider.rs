use async_trait::async_trait;

use super::domain::AuthUser;
use super::errors::IdentityError;

/// Validates a caller's bearer token and returns the user it belongs to.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn authenticate(&self, access_token: &str) -> Result<AuthUser, IdentityError>;
}

/// Simple in-memory provider for tests: a fixed token → user table.
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockIdentityProvider {
        users: Mutex<HashMap<String, AuthUser>>,
    }

    impl MockIdentityProvider {
        pub fn with_user(self, token: &str, user: AuthUser) -> Self {
            self.users.lock().unwrap().insert(token.to_string(), user);
            self
        }
    }

    #[async_trait]
    impl IdentityProvider for MockIdentityProvider {
        async fn authenticate(&self, access_token: &str) -> Result<AuthUser, IdentityError> {
            let users = self.users.lock().unwrap();
            users.get(access_token).cloned().ok_or(IdentityError::Unauthorized)
        }
    }
}
