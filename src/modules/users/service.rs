use std::sync::Arc;

use anyhow::anyhow;
use rollbook_core::{ApiResponse, AppError};
use rollbook_store::{EntityStore, Filter, Patch};
use serde_json::json;
use tracing::{info, instrument};

use crate::modules::schools::model::School;
use crate::utils::authorization::{Principal, authorize};
use crate::utils::password::{hash_password, verify_password};
use crate::utils::respond::complete;
use crate::validation;

use super::model::{
    CHANGE_PASSWORD_RULES, CREATE_USER_RULES, ChangePasswordDto, CreateUserDto, PublicUser, Role,
    User,
};

/// Administrative user management. Token issuance lives outside this core;
/// a [`Principal`] arrives already derived from verified claims.
pub struct UserService {
    users: Arc<dyn EntityStore<User>>,
    schools: Arc<dyn EntityStore<School>>,
    bcrypt_cost: u32,
}

impl UserService {
    pub fn new(
        users: Arc<dyn EntityStore<User>>,
        schools: Arc<dyn EntityStore<School>>,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            users,
            schools,
            bcrypt_cost,
        }
    }

    #[instrument(skip(self, dto), fields(user.email = %dto.email))]
    pub async fn create(&self, principal: &Principal, dto: CreateUserDto) -> ApiResponse {
        let result = self.try_create(principal, &dto).await;
        // The payload carries a plaintext password; log only the email.
        complete(result, "An error occurred while creating user", &dto.email)
    }

    async fn try_create(
        &self,
        principal: &Principal,
        dto: &CreateUserDto,
    ) -> Result<ApiResponse, AppError> {
        authorize(principal, &[Role::Superadmin], None)?;
        validation::check(&CREATE_USER_RULES, dto)?;

        let duplicate = self
            .users
            .exists_active(Filter::new().eq("email", &dto.email))
            .await
            .map_err(AppError::database)?;
        if duplicate {
            return Err(AppError::conflict(anyhow!("User already exists")));
        }

        if let Some(school_id) = dto.school_id {
            self.schools
                .find_active_by_id(school_id)
                .await
                .map_err(AppError::database)?
                .ok_or_else(|| AppError::not_found(anyhow!("School not found")))?;
        }

        let role: Role = dto.role.parse().map_err(AppError::validation)?;
        let hashed_password = hash_password(&dto.password, self.bcrypt_cost)?;

        let user = self
            .users
            .insert(User::new(
                dto.name.clone(),
                dto.email.clone(),
                hashed_password,
                role,
                dto.school_id,
            ))
            .await
            .map_err(AppError::database)?;

        info!(user.id = %user.id, user.role = %user.role, "User created successfully");

        Ok(ApiResponse::created(
            "user",
            &PublicUser::from(&user),
            "User created successfully",
        ))
    }

    /// Changes the calling principal's own password.
    #[instrument(skip(self, dto))]
    pub async fn change_password(&self, principal: &Principal, dto: ChangePasswordDto) -> ApiResponse {
        let result = self.try_change_password(principal, &dto).await;
        // Never log password payloads, not even on unexpected failures.
        complete(
            result,
            "An error occurred while changing password",
            &principal.user_id,
        )
    }

    async fn try_change_password(
        &self,
        principal: &Principal,
        dto: &ChangePasswordDto,
    ) -> Result<ApiResponse, AppError> {
        validation::check(&CHANGE_PASSWORD_RULES, dto)?;

        let user = self
            .users
            .find_active_by_id(principal.user_id)
            .await
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found(anyhow!("User not found")))?;

        if !verify_password(&dto.old_password, &user.password)? {
            return Err(AppError::validation(anyhow!("Invalid old password")));
        }

        if dto.new_password == dto.old_password {
            return Err(AppError::validation(anyhow!(
                "New password cannot be the same as old password"
            )));
        }

        let hashed_password = hash_password(&dto.new_password, self.bcrypt_cost)?;
        let updated = self
            .users
            .update_active_by_id(user.id, Patch::new().set("password", hashed_password))
            .await
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found(anyhow!("User not found")))?;

        info!(user.id = %updated.id, "Password changed successfully");

        Ok(ApiResponse::success(
            json!({ "user_id": updated.id }),
            "Password changed successfully",
        ))
    }

    /// Lists users within the principal's scope: every user for a
    /// superadmin, the principal's school for an admin.
    #[instrument(skip(self))]
    pub async fn get(&self, principal: &Principal) -> ApiResponse {
        let result = self.try_get(principal).await;
        complete(result, "An error occurred while getting users", principal)
    }

    async fn try_get(&self, principal: &Principal) -> Result<ApiResponse, AppError> {
        let filter = match principal.role {
            Role::Superadmin => Filter::new(),
            Role::Admin => {
                let school_id = principal.school_id.ok_or_else(|| {
                    AppError::forbidden(anyhow!("School ID is required for admin"))
                })?;
                Filter::new().eq("school_id", school_id)
            }
        };

        let users = self
            .users
            .find_active(filter)
            .await
            .map_err(AppError::database)?;
        let users: Vec<PublicUser> = users.iter().map(PublicUser::from).collect();

        Ok(ApiResponse::list(
            "user",
            &users,
            "Users fetched successfully",
        ))
    }
}
