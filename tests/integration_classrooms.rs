mod common;

use common::{
    admin_of, classroom_dto, id_of, seed_classroom, seed_school, seed_student, superadmin,
    test_state,
};
use rollbook::modules::classrooms::model::{UpdateClassroomDto, UpdateResourceDto};
use uuid::Uuid;

#[tokio::test]
async fn admin_creates_classroom_in_own_school() {
    let state = test_state();
    let school_id = seed_school(&state).await;

    let resp = state
        .classrooms
        .create(&admin_of(school_id), classroom_dto(school_id, 30))
        .await;

    assert!(resp.ok);
    assert_eq!(resp.code, 201);
    let classroom = &resp.data.as_ref().unwrap()["classroom"];
    assert_eq!(classroom["school_id"], school_id.to_string());
    assert_eq!(classroom["capacity"], 30);
    assert!(classroom["resources"][0]["id"].is_string());
}

#[tokio::test]
async fn admin_cannot_create_classroom_in_other_school() {
    let state = test_state();
    let school_id = seed_school(&state).await;
    let other_school_id = seed_school(&state).await;

    let resp = state
        .classrooms
        .create(&admin_of(other_school_id), classroom_dto(school_id, 30))
        .await;

    assert_eq!(resp.code, 403);
    assert_eq!(resp.message, "Access denied");
}

#[tokio::test]
async fn create_classroom_requires_existing_school() {
    let state = test_state();

    let resp = state
        .classrooms
        .create(&superadmin(), classroom_dto(Uuid::new_v4(), 30))
        .await;

    assert_eq!(resp.code, 404);
    assert_eq!(resp.message, "School not found");
}

#[tokio::test]
async fn create_classroom_rejects_zero_capacity() {
    let state = test_state();
    let school_id = seed_school(&state).await;

    let resp = state
        .classrooms
        .create(&superadmin(), classroom_dto(school_id, 0))
        .await;

    assert_eq!(resp.code, 400);
    assert_eq!(resp.message, "capacity must be at least 1");
}

#[tokio::test]
async fn classroom_names_are_unique_per_school_only() {
    let state = test_state();
    let school_id = seed_school(&state).await;
    let other_school_id = seed_school(&state).await;
    let dto = classroom_dto(school_id, 30);

    assert!(state.classrooms.create(&superadmin(), dto.clone()).await.ok);

    let duplicate = state.classrooms.create(&superadmin(), dto.clone()).await;
    assert_eq!(duplicate.code, 409);
    assert_eq!(duplicate.message, "Classroom already exists");

    // The same name is free in another school.
    let mut elsewhere = dto;
    elsewhere.school_id = other_school_id;
    let resp = state.classrooms.create(&superadmin(), elsewhere).await;
    assert_eq!(resp.code, 201);
}

#[tokio::test]
async fn classroom_listing_is_scoped_by_role() {
    let state = test_state();
    let school_id = seed_school(&state).await;
    let other_school_id = seed_school(&state).await;
    seed_classroom(&state, school_id, 10).await;
    seed_classroom(&state, other_school_id, 10).await;

    let all = state.classrooms.get(&superadmin()).await;
    assert_eq!(
        all.data.as_ref().unwrap()["classrooms"].as_array().unwrap().len(),
        2
    );

    let own = state.classrooms.get(&admin_of(school_id)).await;
    let classrooms = own.data.as_ref().unwrap()["classrooms"].as_array().unwrap().clone();
    assert_eq!(classrooms.len(), 1);
    assert_eq!(classrooms[0]["school_id"], school_id.to_string());
}

#[tokio::test]
async fn get_classroom_by_id_is_tenant_scoped() {
    let state = test_state();
    let school_id = seed_school(&state).await;
    let other_school_id = seed_school(&state).await;
    let classroom_id = seed_classroom(&state, school_id, 10).await;

    let own = state
        .classrooms
        .get_by_id(&admin_of(school_id), classroom_id)
        .await;
    assert!(own.ok);

    let foreign = state
        .classrooms
        .get_by_id(&admin_of(other_school_id), classroom_id)
        .await;
    assert_eq!(foreign.code, 403);
}

#[tokio::test]
async fn update_classroom_touches_only_supplied_fields() {
    let state = test_state();
    let school_id = seed_school(&state).await;
    let dto = classroom_dto(school_id, 30);
    let name = dto.name.clone();
    let created = state.classrooms.create(&superadmin(), dto).await;
    let classroom_id = id_of(&created, "classroom");

    let resp = state
        .classrooms
        .update(
            &superadmin(),
            classroom_id,
            UpdateClassroomDto {
                capacity: Some(45),
                ..Default::default()
            },
        )
        .await;

    assert!(resp.ok);
    let classroom = &resp.data.as_ref().unwrap()["classroom"];
    assert_eq!(classroom["capacity"], 45);
    assert_eq!(classroom["name"], name);
}

#[tokio::test]
async fn rename_classroom_to_existing_name_conflicts() {
    let state = test_state();
    let school_id = seed_school(&state).await;
    let first = classroom_dto(school_id, 30);
    let taken_name = first.name.clone();
    state.classrooms.create(&superadmin(), first).await;
    let classroom_id = seed_classroom(&state, school_id, 30).await;

    let resp = state
        .classrooms
        .update(
            &superadmin(),
            classroom_id,
            UpdateClassroomDto {
                name: Some(taken_name),
                ..Default::default()
            },
        )
        .await;

    assert_eq!(resp.code, 409);
    assert_eq!(
        resp.message,
        "Classroom already exists. Please use a different name."
    );
}

#[tokio::test]
async fn update_resource_applies_only_supplied_fields() {
    let state = test_state();
    let school_id = seed_school(&state).await;
    let created = state
        .classrooms
        .create(&superadmin(), classroom_dto(school_id, 30))
        .await;
    let classroom_id = id_of(&created, "classroom");
    let resource_id = created.data.as_ref().unwrap()["classroom"]["resources"][0]["id"]
        .as_str()
        .map(|s| Uuid::parse_str(s).unwrap())
        .unwrap();

    let resp = state
        .classrooms
        .update_resource(
            &admin_of(school_id),
            classroom_id,
            resource_id,
            UpdateResourceDto {
                quantity: Some(7),
                ..Default::default()
            },
        )
        .await;

    assert!(resp.ok);
    assert_eq!(resp.message, "Classroom resource updated successfully");
    let resource = &resp.data.as_ref().unwrap()["resource"];
    assert_eq!(resource["quantity"], 7);
    assert_eq!(resource["type"], "book");
    assert_eq!(resource["name"], "Mathematics Textbook");

    // The change is persisted on the classroom document.
    let fetched = state.classrooms.get_by_id(&superadmin(), classroom_id).await;
    assert_eq!(
        fetched.data.as_ref().unwrap()["classroom"]["resources"][0]["quantity"],
        7
    );
}

#[tokio::test]
async fn update_resource_with_unknown_id_is_not_found() {
    let state = test_state();
    let school_id = seed_school(&state).await;
    let classroom_id = seed_classroom(&state, school_id, 30).await;

    let resp = state
        .classrooms
        .update_resource(
            &superadmin(),
            classroom_id,
            Uuid::new_v4(),
            UpdateResourceDto::default(),
        )
        .await;

    assert_eq!(resp.code, 404);
    assert_eq!(resp.message, "Resource not found");
}

#[tokio::test]
async fn classroom_students_lists_active_enrollment() {
    let state = test_state();
    let school_id = seed_school(&state).await;
    let classroom_id = seed_classroom(&state, school_id, 10).await;
    let student_id = seed_student(&state, classroom_id).await;
    seed_student(&state, classroom_id).await;
    state.students.delete(&superadmin(), student_id).await;

    let resp = state.classrooms.students(&admin_of(school_id), classroom_id).await;

    assert!(resp.ok);
    let students = resp.data.as_ref().unwrap()["students"].as_array().unwrap().clone();
    assert_eq!(students.len(), 1);
}

#[tokio::test]
async fn delete_classroom_is_soft() {
    let state = test_state();
    let school_id = seed_school(&state).await;
    let classroom_id = seed_classroom(&state, school_id, 10).await;

    let resp = state.classrooms.delete(&admin_of(school_id), classroom_id).await;
    assert!(resp.ok);

    let gone = state.classrooms.get_by_id(&superadmin(), classroom_id).await;
    assert_eq!(gone.code, 404);
    assert_eq!(gone.message, "Classroom not found");

    let stored = state
        .classroom_store
        .find_by_id_any(classroom_id)
        .await
        .unwrap()
        .expect("soft-deleted classroom remains stored");
    assert!(stored.deleted_at.is_some());
}
