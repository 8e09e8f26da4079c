use std::sync::Arc;

use anyhow::anyhow;
use rollbook_core::{ApiResponse, AppError};
use rollbook_store::{EntityStore, Filter, Patch};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::modules::schools::model::School;
use crate::modules::students::model::Student;
use crate::modules::users::model::Role;
use crate::utils::authorization::{Principal, authorize};
use crate::utils::respond::complete;
use crate::validation;

use super::model::{
    CREATE_CLASSROOM_RULES, Classroom, CreateClassroomDto, ResourceItem, UPDATE_CLASSROOM_FIELDS,
    UPDATE_CLASSROOM_RULES, UPDATE_RESOURCE_RULES, UpdateClassroomDto, UpdateResourceDto,
};

/// Classroom management, including the nested resource inventory.
///
/// Every mutation follows the same template: fetch the active document,
/// authorize against its owning school, apply only the supplied fields,
/// persist through the conditional update path.
pub struct ClassroomService {
    classrooms: Arc<dyn EntityStore<Classroom>>,
    schools: Arc<dyn EntityStore<School>>,
    students: Arc<dyn EntityStore<Student>>,
}

impl ClassroomService {
    pub fn new(
        classrooms: Arc<dyn EntityStore<Classroom>>,
        schools: Arc<dyn EntityStore<School>>,
        students: Arc<dyn EntityStore<Student>>,
    ) -> Self {
        Self {
            classrooms,
            schools,
            students,
        }
    }

    #[instrument(skip(self, dto), fields(classroom.name = %dto.name, school.id = %dto.school_id))]
    pub async fn create(&self, principal: &Principal, dto: CreateClassroomDto) -> ApiResponse {
        let result = self.try_create(principal, &dto).await;
        complete(result, "An error occurred while creating classroom", &dto)
    }

    async fn try_create(
        &self,
        principal: &Principal,
        dto: &CreateClassroomDto,
    ) -> Result<ApiResponse, AppError> {
        validation::check(&CREATE_CLASSROOM_RULES, dto)?;

        let school = self
            .schools
            .find_active_by_id(dto.school_id)
            .await
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found(anyhow!("School not found")))?;

        authorize(principal, &[Role::Superadmin, Role::Admin], Some(school.id))?;

        let duplicate = self
            .classrooms
            .exists_active(
                Filter::new()
                    .eq("name", &dto.name)
                    .eq("school_id", school.id),
            )
            .await
            .map_err(AppError::database)?;
        if duplicate {
            return Err(AppError::conflict(anyhow!("Classroom already exists")));
        }

        let resources: Vec<ResourceItem> = dto
            .resources
            .clone()
            .unwrap_or_default()
            .into_iter()
            .map(ResourceItem::from)
            .collect();

        let classroom = self
            .classrooms
            .insert(Classroom::new(
                dto.name.clone(),
                school.id,
                dto.capacity,
                resources,
            ))
            .await
            .map_err(AppError::database)?;

        info!(
            classroom.id = %classroom.id,
            school.id = %school.id,
            "Classroom created successfully"
        );

        Ok(ApiResponse::created(
            "classroom",
            &classroom,
            "Classroom created successfully",
        ))
    }

    /// Lists active classrooms: all of them for a superadmin, only the
    /// principal's school for an admin.
    #[instrument(skip(self))]
    pub async fn get(&self, principal: &Principal) -> ApiResponse {
        let result = self.try_get(principal).await;
        complete(
            result,
            "An error occurred while getting classrooms",
            principal,
        )
    }

    async fn try_get(&self, principal: &Principal) -> Result<ApiResponse, AppError> {
        authorize(principal, &[Role::Superadmin, Role::Admin], None)?;

        let filter = match principal.role {
            Role::Superadmin => Filter::new(),
            Role::Admin => Filter::new().eq("school_id", principal.school_id),
        };

        let classrooms = self
            .classrooms
            .find_active(filter)
            .await
            .map_err(AppError::database)?;

        debug!(returned = classrooms.len(), "Classrooms fetched successfully");

        Ok(ApiResponse::list(
            "classroom",
            &classrooms,
            "Classrooms fetched successfully",
        ))
    }

    #[instrument(skip(self), fields(classroom.id = %id))]
    pub async fn get_by_id(&self, principal: &Principal, id: Uuid) -> ApiResponse {
        let result = self.try_get_by_id(principal, id).await;
        complete(
            result,
            "An error occurred while getting classroom by id",
            &id,
        )
    }

    async fn try_get_by_id(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> Result<ApiResponse, AppError> {
        let classroom = self.fetch_classroom(id).await?;
        authorize(
            principal,
            &[Role::Superadmin, Role::Admin],
            classroom.school_id,
        )?;

        Ok(ApiResponse::single(
            "classroom",
            &classroom,
            "Classroom fetched successfully",
        ))
    }

    #[instrument(skip(self, dto), fields(classroom.id = %id))]
    pub async fn update(
        &self,
        principal: &Principal,
        id: Uuid,
        dto: UpdateClassroomDto,
    ) -> ApiResponse {
        let result = self.try_update(principal, id, &dto).await;
        complete(result, "An error occurred while updating classroom", &dto)
    }

    async fn try_update(
        &self,
        principal: &Principal,
        id: Uuid,
        dto: &UpdateClassroomDto,
    ) -> Result<ApiResponse, AppError> {
        validation::check(&UPDATE_CLASSROOM_RULES, dto)?;

        let classroom = self.fetch_classroom(id).await?;
        authorize(
            principal,
            &[Role::Superadmin, Role::Admin],
            classroom.school_id,
        )?;

        if let Some(name) = &dto.name
            && *name != classroom.name
        {
            let duplicate = self
                .classrooms
                .exists_active(
                    Filter::new()
                        .eq("name", name)
                        .eq("school_id", classroom.school_id)
                        .ne("id", id),
                )
                .await
                .map_err(AppError::database)?;
            if duplicate {
                return Err(AppError::conflict(anyhow!(
                    "Classroom already exists. Please use a different name."
                )));
            }
        }

        let mut patch =
            Patch::from_partial(dto, UPDATE_CLASSROOM_FIELDS).map_err(AppError::database)?;
        if let Some(resources) = dto.resources.clone() {
            let items: Vec<ResourceItem> = resources.into_iter().map(ResourceItem::from).collect();
            patch = patch.set("resources", &items);
        }

        let updated = self
            .classrooms
            .update_active_by_id(id, patch)
            .await
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found(anyhow!("Classroom not found")))?;

        info!(classroom.id = %id, "Classroom updated successfully");

        Ok(ApiResponse::single(
            "classroom",
            &updated,
            "Classroom updated successfully",
        ))
    }

    #[instrument(skip(self), fields(classroom.id = %id))]
    pub async fn delete(&self, principal: &Principal, id: Uuid) -> ApiResponse {
        let result = self.try_delete(principal, id).await;
        complete(result, "An error occurred while deleting classroom", &id)
    }

    async fn try_delete(&self, principal: &Principal, id: Uuid) -> Result<ApiResponse, AppError> {
        let classroom = self.fetch_classroom(id).await?;
        authorize(
            principal,
            &[Role::Superadmin, Role::Admin],
            classroom.school_id,
        )?;

        let deleted = self
            .classrooms
            .soft_delete_by_id(id)
            .await
            .map_err(AppError::database)?;
        if deleted.is_none() {
            return Err(AppError::not_found(anyhow!("Classroom not found")));
        }

        info!(classroom.id = %id, "Classroom deleted successfully");

        Ok(ApiResponse::deleted(&id, "Classroom deleted successfully"))
    }

    /// Partial update of one nested inventory item, persisted through the
    /// same conditional-update path as every other mutation.
    #[instrument(skip(self, dto), fields(classroom.id = %classroom_id, resource.id = %resource_id))]
    pub async fn update_resource(
        &self,
        principal: &Principal,
        classroom_id: Uuid,
        resource_id: Uuid,
        dto: UpdateResourceDto,
    ) -> ApiResponse {
        let result = self
            .try_update_resource(principal, classroom_id, resource_id, &dto)
            .await;
        complete(result, "An error occurred while updating resources", &dto)
    }

    async fn try_update_resource(
        &self,
        principal: &Principal,
        classroom_id: Uuid,
        resource_id: Uuid,
        dto: &UpdateResourceDto,
    ) -> Result<ApiResponse, AppError> {
        validation::check(&UPDATE_RESOURCE_RULES, dto)?;

        let classroom = self.fetch_classroom(classroom_id).await?;
        authorize(
            principal,
            &[Role::Superadmin, Role::Admin],
            classroom.school_id,
        )?;

        let mut resources = classroom.resources.clone();
        let resource = resources
            .iter_mut()
            .find(|item| item.id == resource_id)
            .ok_or_else(|| AppError::not_found(anyhow!("Resource not found")))?;

        if let Some(resource_type) = &dto.resource_type {
            resource.resource_type = resource_type.clone();
        }
        if let Some(name) = &dto.name {
            resource.name = name.clone();
        }
        if let Some(quantity) = dto.quantity {
            resource.quantity = quantity;
        }
        let updated_resource = resource.clone();

        self.classrooms
            .update_active_by_id(classroom_id, Patch::new().set("resources", &resources))
            .await
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found(anyhow!("Classroom not found")))?;

        info!(
            classroom.id = %classroom_id,
            resource.id = %resource_id,
            "Classroom resource updated successfully"
        );

        Ok(ApiResponse::single(
            "resource",
            &updated_resource,
            "Classroom resource updated successfully",
        ))
    }

    /// Lists the active students enrolled in a classroom.
    #[instrument(skip(self), fields(classroom.id = %id))]
    pub async fn students(&self, principal: &Principal, id: Uuid) -> ApiResponse {
        let result = self.try_students(principal, id).await;
        complete(result, "An error occurred while getting students", &id)
    }

    async fn try_students(&self, principal: &Principal, id: Uuid) -> Result<ApiResponse, AppError> {
        let classroom = self.fetch_classroom(id).await?;
        authorize(
            principal,
            &[Role::Superadmin, Role::Admin],
            classroom.school_id,
        )?;

        let students = self
            .students
            .find_active(Filter::new().eq("classroom_id", id))
            .await
            .map_err(AppError::database)?;

        Ok(ApiResponse::list(
            "student",
            &students,
            "Students fetched successfully",
        ))
    }

    async fn fetch_classroom(&self, id: Uuid) -> Result<Classroom, AppError> {
        self.classrooms
            .find_active_by_id(id)
            .await
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found(anyhow!("Classroom not found")))
    }
}
