#![allow(dead_code)]

use fake::Fake;
use fake::faker::address::en::StreetName;
use fake::faker::name::en::Name;
use rollbook_core::ApiResponse;
use uuid::Uuid;

use rollbook::config::AppConfig;
use rollbook::modules::classrooms::model::{CreateClassroomDto, NewResourceItem};
use rollbook::modules::schools::model::CreateSchoolDto;
use rollbook::modules::students::model::EnrollStudentDto;
use rollbook::modules::users::model::CreateUserDto;
use rollbook::state::AppState;
use rollbook::utils::authorization::Principal;

/// Fresh application state backed by empty in-memory stores. The minimum
/// bcrypt cost keeps password-hashing tests fast.
pub fn test_state() -> AppState {
    AppState::new(AppConfig {
        bcrypt_cost: 4,
        log_level: "debug".to_string(),
    })
}

pub fn superadmin() -> Principal {
    Principal::superadmin(Uuid::new_v4())
}

pub fn admin_of(school_id: Uuid) -> Principal {
    Principal::admin(Uuid::new_v4(), Some(school_id))
}

pub fn generate_unique_email() -> String {
    format!("test-{}@test.com", Uuid::new_v4())
}

pub fn generate_unique_name(prefix: &str) -> String {
    format!("{} {}", prefix, Uuid::new_v4())
}

pub fn school_dto() -> CreateSchoolDto {
    CreateSchoolDto {
        name: generate_unique_name("School"),
        address: StreetName().fake(),
        email: generate_unique_email(),
        phone: "0123456789".to_string(),
        website: None,
        logo: None,
    }
}

pub fn classroom_dto(school_id: Uuid, capacity: u32) -> CreateClassroomDto {
    CreateClassroomDto {
        name: generate_unique_name("Classroom"),
        school_id,
        capacity,
        resources: Some(vec![NewResourceItem {
            resource_type: "book".to_string(),
            name: "Mathematics Textbook".to_string(),
            quantity: 25,
        }]),
    }
}

pub fn enroll_dto() -> EnrollStudentDto {
    EnrollStudentDto {
        name: Name().fake(),
        email: generate_unique_email(),
        phone: "0123456789".to_string(),
        gender: "female".to_string(),
        date_of_birth: "2010-01-15".to_string(),
    }
}

pub fn user_dto(role: &str, school_id: Option<Uuid>) -> CreateUserDto {
    CreateUserDto {
        name: Name().fake(),
        email: generate_unique_email(),
        password: "super-secret-password".to_string(),
        role: role.to_string(),
        school_id,
    }
}

/// Extracts the id of the entity keyed under `entity` in a success envelope.
pub fn id_of(resp: &ApiResponse, entity: &str) -> Uuid {
    assert!(resp.ok, "expected success response, got: {}", resp.message);
    let data = resp.data.as_ref().expect("success response carries data");
    let id = data[entity]["id"].as_str().expect("entity has an id");
    Uuid::parse_str(id).expect("entity id is a uuid")
}

pub async fn seed_school(state: &AppState) -> Uuid {
    let resp = state.schools.create(&superadmin(), school_dto()).await;
    id_of(&resp, "school")
}

pub async fn seed_classroom(state: &AppState, school_id: Uuid, capacity: u32) -> Uuid {
    let resp = state
        .classrooms
        .create(&superadmin(), classroom_dto(school_id, capacity))
        .await;
    id_of(&resp, "classroom")
}

pub async fn seed_student(state: &AppState, classroom_id: Uuid) -> Uuid {
    let resp = state
        .students
        .enroll(&superadmin(), classroom_id, enroll_dto())
        .await;
    id_of(&resp, "student")
}
