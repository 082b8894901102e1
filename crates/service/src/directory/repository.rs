use async_trait::async_trait;
use uuid::Uuid;

use super::domain::{Profile, TenantScope};
use super::errors::DirectoryError;

/// Read access to profiles and per-school external ids.
#[async_trait]
pub trait TenantDirectory: Send + Sync {
    async fn find_profile(&self, user_id: Uuid) -> Result<Option<Profile>, DirectoryError>;
    async fn find_tenant_scope(&self, school_id: Uuid) -> Result<Option<TenantScope>, DirectoryError>;
}

/// Simple in-memory directory for tests
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockTenantDirectory {
        profiles: Mutex<HashMap<Uuid, Profile>>,
        scopes: Mutex<HashMap<Uuid, TenantScope>>,
    }

    impl MockTenantDirectory {
        pub fn with_profile(self, profile: Profile) -> Self {
            self.profiles.lock().unwrap().insert(profile.user_id, profile);
            self
        }

        pub fn with_scope(self, scope: TenantScope) -> Self {
            self.scopes.lock().unwrap().insert(scope.school_id, scope);
            self
        }
    }

    #[async_trait]
    impl TenantDirectory for MockTenantDirectory {
        async fn find_profile(&self, user_id: Uuid) -> Result<Option<Profile>, DirectoryError> {
            Ok(self.profiles.lock().unwrap().get(&user_id).cloned())
        }

        async fn find_tenant_scope(&self, school_id: Uuid) -> Result<Option<TenantScope>, DirectoryError> {
            Ok(self.scopes.lock().unwrap().get(&school_id).cloned())
        }
    }
}
