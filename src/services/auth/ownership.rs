//! Per-request ownership check used by mutating handlers.
//!
//! Not a stored capability: handlers call `ensure_owner` on every request,
//! after authentication and the role guard have passed.

use crate::error::AppError;
use crate::services::ids::UserId;

/// A resource that records the user who created it.
pub trait Owned {
    const RESOURCE: &'static str;

    fn owner_id(&self) -> UserId;
}

/// Missing resource -> 404; someone else's resource -> 403; otherwise the resource.
///
/// The lookup result is checked before the comparison, so "does not exist" and
/// "exists but not yours" stay distinguishable.
pub fn ensure_owner<T: Owned>(resource: Option<T>, actor: UserId) -> Result<T, AppError> {
    let resource = resource.ok_or_else(|| AppError::not_found(T::RESOURCE))?;

    if resource.owner_id() != actor {
        tracing::warn!(
            resource = T::RESOURCE,
            owner_id = %resource.owner_id(),
            actor_id = %actor,
            "ownership check failed"
        );
        return Err(AppError::OwnershipDenied {
            resource: T::RESOURCE,
        });
    }

    Ok(resource)
}
