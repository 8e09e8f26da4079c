mod common;

use common::{admin_of, id_of, seed_school, superadmin, test_state, user_dto};
use rollbook::modules::users::model::ChangePasswordDto;
use rollbook::utils::authorization::Principal;
use uuid::Uuid;

#[tokio::test]
async fn create_user_requires_superadmin() {
    let state = test_state();
    let school_id = seed_school(&state).await;

    let resp = state
        .users
        .create(&admin_of(school_id), user_dto("admin", None))
        .await;

    assert_eq!(resp.code, 403);
    assert_eq!(resp.message, "Access denied");
}

#[tokio::test]
async fn created_user_never_exposes_the_password() {
    let state = test_state();
    let school_id = seed_school(&state).await;

    let resp = state
        .users
        .create(&superadmin(), user_dto("admin", Some(school_id)))
        .await;

    assert!(resp.ok);
    assert_eq!(resp.code, 201);
    let user = &resp.data.as_ref().unwrap()["user"];
    assert_eq!(user["role"], "admin");
    assert_eq!(user["school_id"], school_id.to_string());
    assert!(user.get("password").is_none());
}

#[tokio::test]
async fn user_emails_are_globally_unique() {
    let state = test_state();
    let dto = user_dto("admin", None);

    assert!(state.users.create(&superadmin(), dto.clone()).await.ok);

    let resp = state.users.create(&superadmin(), dto).await;
    assert_eq!(resp.code, 409);
    assert_eq!(resp.message, "User already exists");
}

#[tokio::test]
async fn create_user_requires_existing_school() {
    let state = test_state();

    let resp = state
        .users
        .create(&superadmin(), user_dto("admin", Some(Uuid::new_v4())))
        .await;

    assert_eq!(resp.code, 404);
    assert_eq!(resp.message, "School not found");
}

#[tokio::test]
async fn create_user_rejects_unknown_roles() {
    let state = test_state();

    let resp = state.users.create(&superadmin(), user_dto("janitor", None)).await;

    assert_eq!(resp.code, 400);
    assert_eq!(resp.message, "role must be one of: admin, superadmin");
}

#[tokio::test]
async fn create_user_rejects_short_passwords() {
    let state = test_state();
    let mut dto = user_dto("admin", None);
    dto.password = "short".to_string();

    let resp = state.users.create(&superadmin(), dto).await;

    assert_eq!(resp.code, 400);
    assert_eq!(resp.message, "password must be at least 8 characters");
}

#[tokio::test]
async fn change_password_verifies_the_old_one() {
    let state = test_state();
    let dto = user_dto("admin", None);
    let password = dto.password.clone();
    let created = state.users.create(&superadmin(), dto).await;
    let principal = Principal::admin(id_of(&created, "user"), None);

    let wrong = state
        .users
        .change_password(
            &principal,
            ChangePasswordDto {
                old_password: "wrong-password".to_string(),
                new_password: "brand-new-password".to_string(),
            },
        )
        .await;
    assert_eq!(wrong.code, 400);
    assert_eq!(wrong.message, "Invalid old password");

    let unchanged = state
        .users
        .change_password(
            &principal,
            ChangePasswordDto {
                old_password: password.clone(),
                new_password: password.clone(),
            },
        )
        .await;
    assert_eq!(unchanged.code, 400);
    assert_eq!(
        unchanged.message,
        "New password cannot be the same as old password"
    );

    let changed = state
        .users
        .change_password(
            &principal,
            ChangePasswordDto {
                old_password: password,
                new_password: "brand-new-password".to_string(),
            },
        )
        .await;
    assert!(changed.ok);
    assert_eq!(changed.message, "Password changed successfully");

    // The new password is now the accepted one.
    let roundtrip = state
        .users
        .change_password(
            &principal,
            ChangePasswordDto {
                old_password: "brand-new-password".to_string(),
                new_password: "yet-another-password".to_string(),
            },
        )
        .await;
    assert!(roundtrip.ok);
}

#[tokio::test]
async fn listing_is_scoped_by_role() {
    let state = test_state();
    let school_id = seed_school(&state).await;
    let other_school_id = seed_school(&state).await;
    state
        .users
        .create(&superadmin(), user_dto("admin", Some(school_id)))
        .await;
    state
        .users
        .create(&superadmin(), user_dto("admin", Some(other_school_id)))
        .await;

    let all = state.users.get(&superadmin()).await;
    assert_eq!(all.data.as_ref().unwrap()["users"].as_array().unwrap().len(), 2);

    let own = state.users.get(&admin_of(school_id)).await;
    let users = own.data.as_ref().unwrap()["users"].as_array().unwrap().clone();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["school_id"], school_id.to_string());

    let unscoped = state.users.get(&Principal::admin(Uuid::new_v4(), None)).await;
    assert_eq!(unscoped.code, 403);
    assert_eq!(unscoped.message, "School ID is required for admin");
}
