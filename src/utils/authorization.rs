//! Tenant-scoped authorization.
//!
//! A single pure decision function guards every mutation and single-entity
//! read, so the role/tenant rules live in one place instead of being
//! restated per operation. Callers always pass the *entity's own* school id
//! as the target, never a caller-supplied one, which closes the door on
//! tenant-id spoofing in read paths.

use anyhow::anyhow;
use rollbook_core::AppError;
use uuid::Uuid;

use crate::modules::users::model::Role;

/// The authenticated actor issuing a command.
///
/// Derived once per request from verified token claims and immutable for the
/// request's duration. A superadmin carries no school id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub role: Role,
    pub school_id: Option<Uuid>,
    pub user_id: Uuid,
}

impl Principal {
    pub fn superadmin(user_id: Uuid) -> Self {
        Self {
            role: Role::Superadmin,
            school_id: None,
            user_id,
        }
    }

    pub fn admin(user_id: Uuid, school_id: Option<Uuid>) -> Self {
        Self {
            role: Role::Admin,
            school_id,
            user_id,
        }
    }
}

/// Decides whether `principal` may act on an entity owned by
/// `target_school_id`.
///
/// The role must be one of `allowed_roles`. A superadmin then passes
/// unconditionally; any other role is denied when its school and the
/// target's school are both known and differ. With no target (tenant-
/// agnostic operations such as listings) only the role check applies.
pub fn authorize(
    principal: &Principal,
    allowed_roles: &[Role],
    target_school_id: Option<Uuid>,
) -> Result<(), AppError> {
    if !allowed_roles.contains(&principal.role) {
        return Err(AppError::forbidden(anyhow!("Access denied")));
    }

    if principal.role != Role::Superadmin
        && let (Some(own), Some(target)) = (principal.school_id, target_school_id)
        && own != target
    {
        return Err(AppError::forbidden(anyhow!("Access denied")));
    }

    Ok(())
}
