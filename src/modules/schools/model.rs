//! School data models, DTOs, and validation tables.

use chrono::{DateTime, Utc};
use rollbook_store::Document;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validation::{RuleSet, fields};

/// A school: the owning tenant for classrooms, students, and admin users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct School {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub email: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl School {
    pub fn new(dto: CreateSchoolDto) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: dto.name,
            address: dto.address,
            email: dto.email,
            phone: dto.phone,
            website: dto.website,
            logo: dto.logo,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }
}

impl Document for School {
    const COLLECTION: &'static str = "schools";

    fn id(&self) -> Uuid {
        self.id
    }

    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }
}

/// A school together with counts of what it owns, for the listing view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchoolOverview {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub email: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    pub total_admins: u64,
    pub total_classrooms: u64,
    pub total_students: u64,
}

impl SchoolOverview {
    pub fn new(school: School, total_admins: u64, total_classrooms: u64, total_students: u64) -> Self {
        Self {
            id: school.id,
            name: school.name,
            address: school.address,
            email: school.email,
            phone: school.phone,
            website: school.website,
            logo: school.logo,
            total_admins,
            total_classrooms,
            total_students,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSchoolDto {
    pub name: String,
    pub address: String,
    pub email: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSchoolDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

/// Fields a partial update may touch.
pub const UPDATE_SCHOOL_FIELDS: &[&str] = &["name", "address", "email", "phone", "website", "logo"];

pub const CREATE_SCHOOL_RULES: RuleSet = RuleSet {
    name: "school.create",
    rules: &[
        fields::name("name").required(),
        fields::address("address").required(),
        fields::email("email").required(),
        fields::phone("phone").required(),
        fields::website("website"),
        fields::logo("logo"),
    ],
};

pub const UPDATE_SCHOOL_RULES: RuleSet = RuleSet {
    name: "school.update",
    rules: &[
        fields::name("name"),
        fields::address("address"),
        fields::email("email"),
        fields::phone("phone"),
        fields::website("website"),
        fields::logo("logo"),
    ],
};
