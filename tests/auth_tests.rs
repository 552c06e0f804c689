use actix_web::{http::StatusCode, test};
use pretty_assertions::assert_eq;
use serde_json::json;
use serial_test::serial;

mod common;

#[actix_web::test]
#[serial]
async fn register_creates_employee_with_default_profile() {
    let ctx = common::TestContext::new().await.unwrap();
    let app = test::init_service(common::build_app(&ctx)).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(json!({
            "email": "newhire@example.com",
            "password": "Sup3rSecret!",
            "name": "New Hire",
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let data = common::response_data(&test::read_body(resp).await);
    assert!(data["token"].as_str().unwrap().len() > 20);
    assert_eq!(data["user"]["email"], "newhire@example.com");
    assert_eq!(data["user"]["role"], "Employee");

    // Registration also seeds the HR profile
    let user_id = data["user"]["id"].as_str().unwrap();
    let profile = ctx
        .profile_repository
        .get_by_user_id(user_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(profile.vacation_balance, ctx.config.default_vacation_days);
}

#[actix_web::test]
#[serial]
async fn registration_cannot_choose_a_role() {
    let ctx = common::TestContext::new().await.unwrap();
    let app = test::init_service(common::build_app(&ctx)).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(json!({
            "email": "sneaky@example.com",
            "password": "Sup3rSecret!",
            "name": "Sneaky",
            "role": "Admin",
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let data = common::response_data(&test::read_body(resp).await);
    assert_eq!(data["user"]["role"], "Employee");

    // The minted token carries no admin rank either
    let token = data["token"].as_str().unwrap().to_string();
    let req = test::TestRequest::get()
        .uri("/api/v1/admin/users")
        .insert_header(common::auth_header(&token))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::FORBIDDEN
    );
}

#[actix_web::test]
#[serial]
async fn duplicate_email_is_rejected() {
    let ctx = common::TestContext::new().await.unwrap();
    let app = test::init_service(common::build_app(&ctx)).await;

    let body = json!({
        "email": "taken@example.com",
        "password": "Sup3rSecret!",
        "name": "First",
    });

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(body.clone())
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::CREATED
    );

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(body)
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );
}

#[actix_web::test]
#[serial]
async fn invalid_email_and_short_password_are_rejected() {
    let ctx = common::TestContext::new().await.unwrap();
    let app = test::init_service(common::build_app(&ctx)).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(json!({
            "email": "not-an-email",
            "password": "Sup3rSecret!",
            "name": "Nobody",
        }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(json!({
            "email": "short@example.com",
            "password": "short",
            "name": "Nobody",
        }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );
}

#[actix_web::test]
#[serial]
async fn login_returns_token_for_valid_credentials() {
    let ctx = common::TestContext::new().await.unwrap();
    let app = test::init_service(common::build_app(&ctx)).await;
    let (user, _) = ctx.employee().await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({ "email": user.email, "password": "Test123!" }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let data = common::response_data(&test::read_body(resp).await);
    assert_eq!(data["user"]["id"], user.id.as_str());
    assert!(data["token"].as_str().unwrap().len() > 20);
}

#[actix_web::test]
#[serial]
async fn login_with_wrong_password_is_unauthorized() {
    let ctx = common::TestContext::new().await.unwrap();
    let app = test::init_service(common::build_app(&ctx)).await;
    let (user, _) = ctx.employee().await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({ "email": user.email, "password": "WrongPassword1" }))
        .to_request();

    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );
}

#[actix_web::test]
#[serial]
async fn me_returns_the_authenticated_user() {
    let ctx = common::TestContext::new().await.unwrap();
    let app = test::init_service(common::build_app(&ctx)).await;
    let (user, token) = ctx.manager().await;

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/me")
        .insert_header(common::auth_header(&token))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let data = common::response_data(&test::read_body(resp).await);
    assert_eq!(data["id"], user.id.as_str());
    assert_eq!(data["role"], "Manager");
    // Password material never leaves the server
    assert!(data.get("passwordHash").is_none());
}

#[actix_web::test]
#[serial]
async fn tampered_token_is_unauthorized() {
    let ctx = common::TestContext::new().await.unwrap();
    let app = test::init_service(common::build_app(&ctx)).await;
    let (_, token) = ctx.employee().await;

    let mut tampered = token.clone();
    tampered.push('x');

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/me")
        .insert_header(common::auth_header(&tampered))
        .to_request();

    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );
}

#[actix_web::test]
#[serial]
async fn profile_partial_update_keeps_absent_fields() {
    let ctx = common::TestContext::new().await.unwrap();
    let app = test::init_service(common::build_app(&ctx)).await;
    let (_, token) = ctx.employee().await;

    let req = test::TestRequest::get()
        .uri("/api/v1/profile")
        .insert_header(common::auth_header(&token))
        .to_request();
    let data = common::response_data(&test::read_body(test::call_service(&app, req).await).await);
    assert_eq!(data["province"], "Ontario");
    assert_eq!(data["vacationBalance"], 10.0);
    assert_eq!(data["emailNotifications"], true);

    let req = test::TestRequest::put()
        .uri("/api/v1/profile")
        .insert_header(common::auth_header(&token))
        .set_json(json!({ "theme": "Dark", "emailNotifications": false }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let data = common::response_data(&test::read_body(resp).await);
    assert_eq!(data["theme"], "Dark");
    assert_eq!(data["emailNotifications"], false);
    // Untouched fields survive the partial update
    assert_eq!(data["province"], "Ontario");
    assert_eq!(data["vacationBalance"], 10.0);
}
