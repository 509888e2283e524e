use uuid::Uuid;

use crate::auth::Role;
use crate::error::ApiError;

use super::auth::AuthUser;

/// Ownership guard: the caller must be the resource's owning identity.
/// Pure decision function; the owner id must already have been resolved from
/// the persisted resource, never from client input.
pub fn assert_ownership(caller: Option<&AuthUser>, owner_id: Uuid) -> Result<(), ApiError> {
    let caller = caller.ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    if caller.user_id != owner_id {
        return Err(ApiError::forbidden(
            "You are not allowed to access this resource",
        ));
    }

    Ok(())
}

/// Route-level role restriction. Returns the caller so handlers can thread
/// the identity into the service layer.
pub fn require_role<'a>(
    caller: Option<&'a AuthUser>,
    roles: &[Role],
) -> Result<&'a AuthUser, ApiError> {
    let caller = caller.ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    if !roles.contains(&caller.role) {
        return Err(ApiError::forbidden(
            "You do not have permission to perform this action",
        ));
    }

    Ok(caller)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            role,
        }
    }

    #[test]
    fn ownership_requires_matching_identity() {
        let caller = user(Role::User);

        assert!(assert_ownership(Some(&caller), caller.user_id).is_ok());

        let err = assert_ownership(Some(&caller), Uuid::new_v4()).unwrap_err();
        assert_eq!(err.status_code(), 403);
    }

    #[test]
    fn ownership_requires_authentication() {
        let err = assert_ownership(None, Uuid::new_v4()).unwrap_err();
        assert_eq!(err.status_code(), 401);
    }

    #[test]
    fn role_check_distinguishes_missing_identity_from_wrong_role() {
        let err = require_role(None, &[Role::Admin]).unwrap_err();
        assert_eq!(err.status_code(), 401);

        let caller = user(Role::User);
        let err = require_role(Some(&caller), &[Role::Admin]).unwrap_err();
        assert_eq!(err.status_code(), 403);

        assert!(require_role(Some(&caller), &[Role::Admin, Role::User]).is_ok());
    }
}
