use crate::directory::{DirectoryError, TenantDirectory};

use super::domain::CallerContext;
use super::errors::IdentityError;
use super::provider::IdentityProvider;

/// Authenticate the token and merge the user with their portal profile.
/// The result lives for one request only.
pub async fn resolve_caller<E>(
    identity: &dyn IdentityProvider,
    directory: &dyn TenantDirectory,
    access_token: &str,
) -> Result<CallerContext, E>
where
    E: From<IdentityError> + From<DirectoryError>,
{
    let user = identity.authenticate(access_token).await?;
    let profile = directory.find_profile(user.id).await?;
    Ok(CallerContext::from_parts(&user, profile.as_ref()))
}
