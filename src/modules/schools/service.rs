use std::sync::Arc;

use anyhow::anyhow;
use rollbook_core::{ApiResponse, AppError};
use rollbook_store::{EntityStore, Filter, Patch};
use serde_json::json;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::modules::classrooms::model::Classroom;
use crate::modules::students::model::Student;
use crate::modules::users::model::{PublicUser, Role, User};
use crate::utils::authorization::{Principal, authorize};
use crate::utils::respond::complete;
use crate::validation;

use super::model::{
    CREATE_SCHOOL_RULES, CreateSchoolDto, School, SchoolOverview, UPDATE_SCHOOL_FIELDS,
    UPDATE_SCHOOL_RULES, UpdateSchoolDto,
};

/// School management. Creation, update, deletion, and admin assignment are
/// superadmin-only; reads are open to an admin for their own school.
pub struct SchoolService {
    schools: Arc<dyn EntityStore<School>>,
    classrooms: Arc<dyn EntityStore<Classroom>>,
    students: Arc<dyn EntityStore<Student>>,
    users: Arc<dyn EntityStore<User>>,
}

impl SchoolService {
    pub fn new(
        schools: Arc<dyn EntityStore<School>>,
        classrooms: Arc<dyn EntityStore<Classroom>>,
        students: Arc<dyn EntityStore<Student>>,
        users: Arc<dyn EntityStore<User>>,
    ) -> Self {
        Self {
            schools,
            classrooms,
            students,
            users,
        }
    }

    #[instrument(skip(self, dto), fields(school.name = %dto.name))]
    pub async fn create(&self, principal: &Principal, dto: CreateSchoolDto) -> ApiResponse {
        let result = self.try_create(principal, &dto).await;
        complete(result, "An error occurred while creating school", &dto)
    }

    async fn try_create(
        &self,
        principal: &Principal,
        dto: &CreateSchoolDto,
    ) -> Result<ApiResponse, AppError> {
        authorize(principal, &[Role::Superadmin], None)?;
        validation::check(&CREATE_SCHOOL_RULES, dto)?;

        let duplicate = self
            .schools
            .exists_active(Filter::new().eq("name", &dto.name))
            .await
            .map_err(AppError::database)?;
        if duplicate {
            return Err(AppError::conflict(anyhow!("School already exists")));
        }

        let school = self
            .schools
            .insert(School::new(dto.clone()))
            .await
            .map_err(AppError::database)?;

        info!(school.id = %school.id, school.name = %school.name, "School created successfully");

        Ok(ApiResponse::created(
            "school",
            &school,
            "School created successfully",
        ))
    }

    #[instrument(skip(self))]
    pub async fn get(&self, principal: &Principal) -> ApiResponse {
        let result = self.try_get(principal).await;
        complete(result, "An error occurred while getting schools", principal)
    }

    async fn try_get(&self, principal: &Principal) -> Result<ApiResponse, AppError> {
        authorize(principal, &[Role::Superadmin], None)?;

        let schools = self
            .schools
            .find_active(Filter::new())
            .await
            .map_err(AppError::database)?;

        let mut overviews = Vec::with_capacity(schools.len());
        for school in schools {
            let total_admins = self
                .users
                .count_active(Filter::new().eq("school_id", school.id).eq("role", "admin"))
                .await
                .map_err(AppError::database)?;
            let total_classrooms = self
                .classrooms
                .count_active(Filter::new().eq("school_id", school.id))
                .await
                .map_err(AppError::database)?;
            let total_students = self
                .students
                .count_active(Filter::new().eq("school_id", school.id))
                .await
                .map_err(AppError::database)?;

            overviews.push(SchoolOverview::new(
                school,
                total_admins,
                total_classrooms,
                total_students,
            ));
        }

        debug!(returned = overviews.len(), "Schools fetched successfully");

        Ok(ApiResponse::list(
            "school",
            &overviews,
            "Schools fetched successfully",
        ))
    }

    #[instrument(skip(self), fields(school.id = %id))]
    pub async fn get_by_id(&self, principal: &Principal, id: Uuid) -> ApiResponse {
        let result = self.try_get_by_id(principal, id).await;
        complete(result, "An error occurred while getting school by id", &id)
    }

    async fn try_get_by_id(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> Result<ApiResponse, AppError> {
        let school = self
            .schools
            .find_active_by_id(id)
            .await
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found(anyhow!("School not found")))?;

        authorize(principal, &[Role::Superadmin, Role::Admin], Some(school.id))?;

        Ok(ApiResponse::single(
            "school",
            &school,
            "School fetched successfully",
        ))
    }

    #[instrument(skip(self, dto), fields(school.id = %id))]
    pub async fn update(&self, principal: &Principal, id: Uuid, dto: UpdateSchoolDto) -> ApiResponse {
        let result = self.try_update(principal, id, &dto).await;
        complete(result, "An error occurred while updating school", &dto)
    }

    async fn try_update(
        &self,
        principal: &Principal,
        id: Uuid,
        dto: &UpdateSchoolDto,
    ) -> Result<ApiResponse, AppError> {
        authorize(principal, &[Role::Superadmin], None)?;
        validation::check(&UPDATE_SCHOOL_RULES, dto)?;

        if let Some(name) = &dto.name {
            let duplicate = self
                .schools
                .exists_active(Filter::new().eq("name", name).ne("id", id))
                .await
                .map_err(AppError::database)?;
            if duplicate {
                return Err(AppError::conflict(anyhow!("School already exists")));
            }
        }

        let patch = Patch::from_partial(dto, UPDATE_SCHOOL_FIELDS).map_err(AppError::database)?;
        let school = self
            .schools
            .update_active_by_id(id, patch)
            .await
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found(anyhow!("School not found")))?;

        info!(school.id = %school.id, "School updated successfully");

        Ok(ApiResponse::single(
            "school",
            &school,
            "School updated successfully",
        ))
    }

    #[instrument(skip(self), fields(school.id = %id))]
    pub async fn delete(&self, principal: &Principal, id: Uuid) -> ApiResponse {
        let result = self.try_delete(principal, id).await;
        complete(result, "An error occurred while deleting school", &id)
    }

    async fn try_delete(&self, principal: &Principal, id: Uuid) -> Result<ApiResponse, AppError> {
        authorize(principal, &[Role::Superadmin], None)?;

        let deleted = self
            .schools
            .soft_delete_by_id(id)
            .await
            .map_err(AppError::database)?;
        if deleted.is_none() {
            return Err(AppError::not_found(anyhow!("School not found")));
        }

        info!(school.id = %id, "School deleted successfully");

        Ok(ApiResponse::deleted(&id, "School deleted successfully"))
    }

    /// Attaches an existing `admin` user to a school, making that school
    /// the user's tenant scope.
    #[instrument(skip(self), fields(user.id = %user_id, school.id = %school_id))]
    pub async fn assign_admin(
        &self,
        principal: &Principal,
        user_id: Uuid,
        school_id: Uuid,
    ) -> ApiResponse {
        let result = self.try_assign_admin(principal, user_id, school_id).await;
        complete(
            result,
            "An error occurred while assigning admin",
            &(user_id, school_id),
        )
    }

    async fn try_assign_admin(
        &self,
        principal: &Principal,
        user_id: Uuid,
        school_id: Uuid,
    ) -> Result<ApiResponse, AppError> {
        authorize(principal, &[Role::Superadmin], None)?;

        let user = self
            .users
            .find_active_by_id(user_id)
            .await
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found(anyhow!("User not found")))?;

        if user.role != Role::Admin {
            return Err(AppError::validation(anyhow!(
                "User can not be assigned to a school as admin, Kindly check the user role"
            )));
        }

        let school = self
            .schools
            .find_active_by_id(school_id)
            .await
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found(anyhow!("School not found")))?;

        let updated_user = self
            .users
            .update_active_by_id(user_id, Patch::new().set("school_id", school.id))
            .await
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found(anyhow!("User not found")))?;

        info!(user.id = %user_id, school.id = %school_id, "Admin assigned to school successfully");

        Ok(ApiResponse::success(
            json!({
                "user": PublicUser::from(&updated_user),
                "school": { "id": school.id, "name": school.name },
            }),
            "Admin assigned to school successfully",
        ))
    }
}
