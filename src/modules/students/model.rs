//! Student data models, DTOs, and validation tables.

use chrono::{DateTime, NaiveDate, Utc};
use rollbook_store::Document;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validation::{RuleSet, fields};

/// A student enrolled in exactly one classroom.
///
/// `school_id` is a denormalized copy of the classroom's owning school,
/// kept in sync on every transfer. Legacy records may lack it; the
/// *effective* school then falls back to the current classroom's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: Uuid,
    pub school_id: Option<Uuid>,
    pub classroom_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub gender: String,
    pub date_of_birth: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Student {
    pub fn new(
        dto: EnrollStudentDto,
        date_of_birth: NaiveDate,
        classroom_id: Uuid,
        school_id: Uuid,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            school_id: Some(school_id),
            classroom_id,
            name: dto.name,
            email: dto.email,
            phone: dto.phone,
            gender: dto.gender,
            date_of_birth,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }
}

impl Document for Student {
    const COLLECTION: &'static str = "students";

    fn id(&self) -> Uuid {
        self.id
    }

    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollStudentDto {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub gender: String,
    pub date_of_birth: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateStudentDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classroom_id: Option<Uuid>,
}

/// Fields a student partial update may touch. `school_id` is set by the
/// service when the classroom changes, never from the payload.
pub const UPDATE_STUDENT_FIELDS: &[&str] = &[
    "name",
    "email",
    "phone",
    "gender",
    "date_of_birth",
    "classroom_id",
];

pub const ENROLL_STUDENT_RULES: RuleSet = RuleSet {
    name: "student.enroll",
    rules: &[
        fields::name("name").required(),
        fields::email("email").required(),
        fields::phone("phone").required(),
        fields::gender("gender").required(),
        fields::date("date_of_birth").required(),
    ],
};

pub const UPDATE_STUDENT_RULES: RuleSet = RuleSet {
    name: "student.update",
    rules: &[
        fields::name("name"),
        fields::email("email"),
        fields::phone("phone"),
        fields::gender("gender"),
        fields::date("date_of_birth"),
        fields::id("classroom_id").predicate_error("classroom_id must be a valid Id"),
    ],
};
