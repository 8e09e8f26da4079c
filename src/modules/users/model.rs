//! User data models, DTOs, and validation tables.
//!
//! Users are the administrative actors of the system: a `superadmin` manages
//! every school, an `admin` is scoped to exactly one. Students are a
//! separate entity and never log in.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rollbook_store::Document;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validation::{RuleSet, fields};

/// Role carried by principals and stored on user records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Superadmin,
    Admin,
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "superadmin" => Ok(Self::Superadmin),
            "admin" => Ok(Self::Admin),
            other => Err(anyhow::anyhow!("Invalid role: {other}")),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Superadmin => write!(f, "superadmin"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

/// A user record. `password` holds the bcrypt hash and is only serialized
/// into the store; responses go through [`PublicUser`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub school_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(
        name: String,
        email: String,
        hashed_password: String,
        role: Role,
        school_id: Option<Uuid>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            password: hashed_password,
            role,
            school_id,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }
}

impl Document for User {
    const COLLECTION: &'static str = "users";

    fn id(&self) -> Uuid {
        self.id
    }

    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }
}

/// User as exposed to callers; never carries the password hash.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub school_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            school_id: user.school_id,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserDto {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub school_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePasswordDto {
    pub old_password: String,
    pub new_password: String,
}

pub const CREATE_USER_RULES: RuleSet = RuleSet {
    name: "user.create",
    rules: &[
        fields::name("name").required(),
        fields::email("email").required(),
        fields::password("password").required(),
        fields::role("role").required(),
        fields::id("school_id").predicate_error("school_id must be a valid Id"),
    ],
};

pub const CHANGE_PASSWORD_RULES: RuleSet = RuleSet {
    name: "user.change_password",
    rules: &[
        fields::password("old_password").required(),
        fields::password("new_password").required(),
    ],
};
