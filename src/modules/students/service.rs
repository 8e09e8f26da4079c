use std::sync::Arc;

use anyhow::anyhow;
use chrono::NaiveDate;
use rollbook_core::{ApiResponse, AppError};
use rollbook_store::{EntityStore, Filter, Patch};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::modules::classrooms::model::Classroom;
use crate::modules::users::model::Role;
use crate::utils::authorization::{Principal, authorize};
use crate::utils::capacity::validate_capacity;
use crate::utils::respond::complete;
use crate::validation;

use super::model::{
    ENROLL_STUDENT_RULES, EnrollStudentDto, Student, UPDATE_STUDENT_FIELDS, UPDATE_STUDENT_RULES,
    UpdateStudentDto,
};

/// Student enrollment, lookup, update, and transfer.
///
/// Enrollment and both move paths re-validate the capacity and tenant
/// invariants before committing. All checks run against the target
/// classroom resolved here, never against caller-supplied tenant ids.
pub struct StudentService {
    students: Arc<dyn EntityStore<Student>>,
    classrooms: Arc<dyn EntityStore<Classroom>>,
}

impl StudentService {
    pub fn new(
        students: Arc<dyn EntityStore<Student>>,
        classrooms: Arc<dyn EntityStore<Classroom>>,
    ) -> Self {
        Self {
            students,
            classrooms,
        }
    }

    /// Enrolls a new student into a classroom.
    ///
    /// Steps run in order and short-circuit on the first failure; nothing
    /// is written until every check has passed.
    #[instrument(skip(self, dto), fields(classroom.id = %classroom_id))]
    pub async fn enroll(
        &self,
        principal: &Principal,
        classroom_id: Uuid,
        dto: EnrollStudentDto,
    ) -> ApiResponse {
        let result = self.try_enroll(principal, classroom_id, &dto).await;
        complete(result, "An error occurred while creating student", &dto)
    }

    async fn try_enroll(
        &self,
        principal: &Principal,
        classroom_id: Uuid,
        dto: &EnrollStudentDto,
    ) -> Result<ApiResponse, AppError> {
        validation::check(&ENROLL_STUDENT_RULES, dto)?;

        let classroom = self
            .classrooms
            .find_active_by_id(classroom_id)
            .await
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found(anyhow!("Classroom not found")))?;

        authorize(
            principal,
            &[Role::Superadmin, Role::Admin],
            classroom.school_id,
        )?;

        let school_id = classroom.school_id.ok_or_else(|| {
            AppError::validation(anyhow!("Classroom must be associated with a school"))
        })?;

        if let Some(message) =
            validate_capacity(self.students.as_ref(), classroom_id, classroom.capacity, None)
                .await?
        {
            return Err(AppError::conflict(anyhow!(message)));
        }

        let duplicate = self
            .students
            .exists_active(
                Filter::new()
                    .eq("email", &dto.email)
                    .eq("school_id", school_id),
            )
            .await
            .map_err(AppError::database)?;
        if duplicate {
            return Err(AppError::conflict(anyhow!(
                "Student already exists in this school"
            )));
        }

        let date_of_birth = parse_date_of_birth(&dto.date_of_birth)?;
        let student = self
            .students
            .insert(Student::new(
                dto.clone(),
                date_of_birth,
                classroom_id,
                school_id,
            ))
            .await
            .map_err(AppError::database)?;

        info!(
            student.id = %student.id,
            classroom.id = %classroom_id,
            school.id = %school_id,
            "Student enrolled successfully"
        );

        Ok(ApiResponse::created(
            "student",
            &student,
            "Student enrolled successfully",
        ))
    }

    #[instrument(skip(self), fields(student.id = %id))]
    pub async fn get_by_id(&self, principal: &Principal, id: Uuid) -> ApiResponse {
        let result = self.try_get_by_id(principal, id).await;
        complete(result, "An error occurred while getting student", &id)
    }

    async fn try_get_by_id(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> Result<ApiResponse, AppError> {
        let student = self.fetch_student(id).await?;
        let effective_school = self.effective_school_of(&student).await?;
        authorize(
            principal,
            &[Role::Superadmin, Role::Admin],
            effective_school,
        )?;

        Ok(ApiResponse::single(
            "student",
            &student,
            "Student fetched successfully",
        ))
    }

    /// Lists the active students of a classroom.
    #[instrument(skip(self), fields(classroom.id = %classroom_id))]
    pub async fn get_by_classroom(&self, principal: &Principal, classroom_id: Uuid) -> ApiResponse {
        let result = self.try_get_by_classroom(principal, classroom_id).await;
        complete(
            result,
            "An error occurred while getting students by classroom id",
            &classroom_id,
        )
    }

    async fn try_get_by_classroom(
        &self,
        principal: &Principal,
        classroom_id: Uuid,
    ) -> Result<ApiResponse, AppError> {
        let classroom = self
            .classrooms
            .find_active_by_id(classroom_id)
            .await
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found(anyhow!("Classroom not found")))?;

        authorize(
            principal,
            &[Role::Superadmin, Role::Admin],
            classroom.school_id,
        )?;

        let students = self
            .students
            .find_active(Filter::new().eq("classroom_id", classroom_id))
            .await
            .map_err(AppError::database)?;

        Ok(ApiResponse::list(
            "student",
            &students,
            "Students fetched successfully",
        ))
    }

    /// Partial update, optionally moving the student to another classroom.
    ///
    /// When the payload names a different classroom the target is resolved
    /// and authorized, its capacity checked with the student excluded from
    /// the count, and the denormalized `school_id` synced in the same write.
    #[instrument(skip(self, dto), fields(student.id = %id))]
    pub async fn update(&self, principal: &Principal, id: Uuid, dto: UpdateStudentDto) -> ApiResponse {
        let result = self.try_update(principal, id, &dto).await;
        complete(result, "An error occurred while updating student", &dto)
    }

    async fn try_update(
        &self,
        principal: &Principal,
        id: Uuid,
        dto: &UpdateStudentDto,
    ) -> Result<ApiResponse, AppError> {
        validation::check(&UPDATE_STUDENT_RULES, dto)?;

        let student = self.fetch_student(id).await?;

        let target_classroom_id = dto.classroom_id.unwrap_or(student.classroom_id);
        let is_changing_classroom = dto
            .classroom_id
            .is_some_and(|target| target != student.classroom_id);

        let classroom = self
            .classrooms
            .find_active_by_id(target_classroom_id)
            .await
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found(anyhow!("Classroom not found")))?;

        authorize(
            principal,
            &[Role::Superadmin, Role::Admin],
            classroom.school_id,
        )?;

        if is_changing_classroom
            && let Some(message) = validate_capacity(
                self.students.as_ref(),
                target_classroom_id,
                classroom.capacity,
                Some(id),
            )
            .await?
        {
            return Err(AppError::conflict(anyhow!(message)));
        }

        let mut patch =
            Patch::from_partial(dto, UPDATE_STUDENT_FIELDS).map_err(AppError::database)?;
        if is_changing_classroom
            && let Some(school_id) = classroom.school_id
        {
            patch = patch.set("school_id", school_id);
        }

        let updated = self
            .students
            .update_active_by_id(id, patch)
            .await
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found(anyhow!("Student not found")))?;

        Ok(ApiResponse::single(
            "student",
            &updated,
            "Student updated successfully",
        ))
    }

    /// Moves a student to another classroom, possibly across schools.
    ///
    /// The checks form a fixed pipeline: resolve student, current and
    /// target classrooms; authorize against both schools; enforce the
    /// same-school policy for non-superadmins; reject no-op moves; check
    /// target capacity with the student excluded; then commit classroom and
    /// school in one conditional write. Any failure before the commit
    /// leaves every entity unchanged.
    #[instrument(skip(self), fields(student.id = %student_id, classroom.target = %target_classroom_id))]
    pub async fn transfer(
        &self,
        principal: &Principal,
        student_id: Uuid,
        target_classroom_id: Uuid,
    ) -> ApiResponse {
        let result = self
            .try_transfer(principal, student_id, target_classroom_id)
            .await;
        complete(
            result,
            "An error occurred while transferring student",
            &(student_id, target_classroom_id),
        )
    }

    async fn try_transfer(
        &self,
        principal: &Principal,
        student_id: Uuid,
        target_classroom_id: Uuid,
    ) -> Result<ApiResponse, AppError> {
        let student = self.fetch_student(student_id).await?;

        let current_classroom = self
            .classrooms
            .find_active_by_id(student.classroom_id)
            .await
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found(anyhow!("Current classroom not found")))?;

        let target_classroom = self
            .classrooms
            .find_active_by_id(target_classroom_id)
            .await
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found(anyhow!("Target classroom not found")))?;

        let current_school = student.school_id.or(current_classroom.school_id);

        authorize(principal, &[Role::Superadmin, Role::Admin], current_school)?;
        authorize(
            principal,
            &[Role::Superadmin, Role::Admin],
            target_classroom.school_id,
        )?;

        // Cross-school moves are a superadmin-only privilege.
        if principal.role != Role::Superadmin && current_school != target_classroom.school_id {
            return Err(AppError::validation(anyhow!(
                "Cannot transfer student to different school"
            )));
        }

        if student.classroom_id == target_classroom_id {
            return Err(AppError::conflict(anyhow!(
                "Student is already in the target classroom"
            )));
        }

        if let Some(message) = validate_capacity(
            self.students.as_ref(),
            target_classroom_id,
            target_classroom.capacity,
            Some(student_id),
        )
        .await?
        {
            return Err(AppError::conflict(anyhow!(message)));
        }

        let patch = Patch::new()
            .set("classroom_id", target_classroom_id)
            .set("school_id", target_classroom.school_id);

        let updated = self
            .students
            .update_active_by_id(student_id, patch)
            .await
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found(anyhow!("Student not found")))?;

        info!(
            student.id = %student_id,
            classroom.from = %student.classroom_id,
            classroom.to = %target_classroom_id,
            "Student transferred successfully"
        );

        Ok(ApiResponse::single(
            "student",
            &updated,
            "Student transferred successfully",
        ))
    }

    #[instrument(skip(self), fields(student.id = %id))]
    pub async fn delete(&self, principal: &Principal, id: Uuid) -> ApiResponse {
        let result = self.try_delete(principal, id).await;
        complete(result, "An error occurred while deleting student", &id)
    }

    async fn try_delete(&self, principal: &Principal, id: Uuid) -> Result<ApiResponse, AppError> {
        let student = self.fetch_student(id).await?;
        let effective_school = self.effective_school_of(&student).await?;
        authorize(
            principal,
            &[Role::Superadmin, Role::Admin],
            effective_school,
        )?;

        let deleted = self
            .students
            .soft_delete_by_id(id)
            .await
            .map_err(AppError::database)?;
        if deleted.is_none() {
            return Err(AppError::not_found(anyhow!("Student not found")));
        }

        info!(student.id = %id, "Student deleted successfully");

        Ok(ApiResponse::deleted(&id, "Student deleted successfully"))
    }

    async fn fetch_student(&self, id: Uuid) -> Result<Student, AppError> {
        self.students
            .find_active_by_id(id)
            .await
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found(anyhow!("Student not found")))
    }

    /// The school a student effectively belongs to: the denormalized copy
    /// when present, the current classroom's school otherwise. The classroom
    /// is resolved without the active filter so students of a soft-deleted
    /// classroom stay reachable for reads and deletion.
    async fn effective_school_of(&self, student: &Student) -> Result<Option<Uuid>, AppError> {
        let classroom = self
            .classrooms
            .find_by_id_any(student.classroom_id)
            .await
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found(anyhow!("Classroom not found")))?;

        Ok(student.school_id.or(classroom.school_id))
    }
}

fn parse_date_of_birth(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::validation(anyhow!("date_of_birth must be a valid date (YYYY-MM-DD)")))
}
