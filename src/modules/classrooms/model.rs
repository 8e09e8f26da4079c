//! Classroom data models, DTOs, and validation tables.

use chrono::{DateTime, Utc};
use rollbook_store::Document;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validation::{FieldRule, FieldType, RuleSet, fields};

/// A classroom owned by a school, bounding how many students it can hold.
///
/// `school_id` is optional at the storage level; a classroom without an
/// owning school exists but cannot accept students.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classroom {
    pub id: Uuid,
    pub school_id: Option<Uuid>,
    pub name: String,
    pub capacity: u32,
    pub resources: Vec<ResourceItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Classroom {
    pub fn new(name: String, school_id: Uuid, capacity: u32, resources: Vec<ResourceItem>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            school_id: Some(school_id),
            name,
            capacity,
            resources,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }
}

impl Document for Classroom {
    const COLLECTION: &'static str = "classrooms";

    fn id(&self) -> Uuid {
        self.id
    }

    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }
}

/// An inventory item nested in a classroom document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceItem {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub name: String,
    pub quantity: u32,
}

impl From<NewResourceItem> for ResourceItem {
    fn from(item: NewResourceItem) -> Self {
        Self {
            id: Uuid::new_v4(),
            resource_type: item.resource_type,
            name: item.name,
            quantity: item.quantity,
        }
    }
}

/// Resource item as supplied by callers, before an id is assigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewResourceItem {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub name: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateClassroomDto {
    pub name: String,
    pub school_id: Uuid,
    pub capacity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<Vec<NewResourceItem>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateClassroomDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<Vec<NewResourceItem>>,
}

/// Partial update of a single nested resource item.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateResourceDto {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
}

/// Fields a classroom partial update may touch directly. Resources are
/// rebuilt by the service so each new item gets an id.
pub const UPDATE_CLASSROOM_FIELDS: &[&str] = &["name", "capacity"];

const RESOURCE_ITEM_RULES: &[FieldRule] = &[
    FieldRule::new("type").required().kind(FieldType::String),
    FieldRule::new("name").required().kind(FieldType::String),
    fields::quantity("quantity").required(),
];

const RESOURCE_ITEM_UPDATE_RULES: &[FieldRule] = &[
    FieldRule::new("type").kind(FieldType::String),
    FieldRule::new("name").kind(FieldType::String),
    fields::quantity("quantity"),
];

pub const CREATE_CLASSROOM_RULES: RuleSet = RuleSet {
    name: "classroom.create",
    rules: &[
        fields::name("name").required(),
        fields::id("school_id")
            .required()
            .predicate_error("school_id must be a valid Id"),
        fields::capacity("capacity").required(),
        FieldRule::new("resources")
            .kind(FieldType::Array)
            .items(RESOURCE_ITEM_RULES),
    ],
};

pub const UPDATE_CLASSROOM_RULES: RuleSet = RuleSet {
    name: "classroom.update",
    rules: &[
        fields::name("name"),
        fields::capacity("capacity"),
        FieldRule::new("resources")
            .kind(FieldType::Array)
            .items(RESOURCE_ITEM_UPDATE_RULES),
    ],
};

pub const UPDATE_RESOURCE_RULES: RuleSet = RuleSet {
    name: "classroom.update_resource",
    rules: &[
        FieldRule::new("type").kind(FieldType::String),
        FieldRule::new("name").kind(FieldType::String),
        fields::quantity("quantity"),
    ],
};
