use actix_web::{http::StatusCode, test};
use chrono::{NaiveDate, NaiveTime};
use maplehr::database::models::{
    TimesheetEntryInput, VacationRequestInput, VacationType,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use serial_test::serial;

mod common;

#[actix_web::test]
#[serial]
async fn non_admins_cannot_use_admin_routes() {
    let ctx = common::TestContext::new().await.unwrap();
    let app = test::init_service(common::build_app(&ctx)).await;
    let (_, employee_token) = ctx.employee().await;
    let (_, manager_token) = ctx.manager().await;

    for token in [&employee_token, &manager_token] {
        let req = test::TestRequest::get()
            .uri("/api/v1/admin/users")
            .insert_header(common::auth_header(token))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::FORBIDDEN
        );
    }
}

#[actix_web::test]
#[serial]
async fn admin_lists_all_users() {
    let ctx = common::TestContext::new().await.unwrap();
    let app = test::init_service(common::build_app(&ctx)).await;
    ctx.employee().await;
    ctx.manager().await;
    let (_, admin_token) = ctx.admin().await;

    let req = test::TestRequest::get()
        .uri("/api/v1/admin/users")
        .insert_header(common::auth_header(&admin_token))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let data = common::response_data(&test::read_body(resp).await);
    assert_eq!(data.as_array().unwrap().len(), 3);
}

#[actix_web::test]
#[serial]
async fn role_update_takes_effect_on_next_token() {
    let ctx = common::TestContext::new().await.unwrap();
    let app = test::init_service(common::build_app(&ctx)).await;
    let (employee, _) = ctx.employee().await;
    let (_, admin_token) = ctx.admin().await;

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/admin/users/{}/role", employee.id))
        .insert_header(common::auth_header(&admin_token))
        .set_json(json!({ "role": "Manager" }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let data = common::response_data(&test::read_body(resp).await);
    assert_eq!(data["role"], "Manager");

    // A token minted after the change carries the new rank
    let promoted = ctx
        .user_repository
        .find_by_id(&employee.id)
        .await
        .unwrap()
        .unwrap();
    let new_token = ctx.token_for(&promoted);

    let req = test::TestRequest::get()
        .uri("/api/v1/admin/users")
        .insert_header(common::auth_header(&new_token))
        .to_request();
    // Manager rank still cannot reach admin routes
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::FORBIDDEN
    );
}

#[actix_web::test]
#[serial]
async fn role_update_for_unknown_user_is_not_found() {
    let ctx = common::TestContext::new().await.unwrap();
    let app = test::init_service(common::build_app(&ctx)).await;
    let (_, admin_token) = ctx.admin().await;

    let req = test::TestRequest::put()
        .uri("/api/v1/admin/users/no-such-user/role")
        .insert_header(common::auth_header(&admin_token))
        .set_json(json!({ "role": "Manager" }))
        .to_request();

    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[actix_web::test]
#[serial]
async fn deleting_a_user_cascades_to_their_records() {
    let ctx = common::TestContext::new().await.unwrap();
    let app = test::init_service(common::build_app(&ctx)).await;
    let (employee, _) = ctx.employee().await;
    let (_, admin_token) = ctx.admin().await;

    let monday = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
    let timesheet = ctx
        .timesheet_repository
        .create(
            &employee.id,
            monday,
            &[TimesheetEntryInput {
                work_date: monday,
                start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
                break_minutes: 0,
                notes: None,
            }],
        )
        .await
        .unwrap();
    let vacation = ctx
        .vacation_repository
        .create(
            &employee.id,
            &VacationRequestInput {
                request_type: VacationType::Vacation,
                start_date: NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2025, 6, 12).unwrap(),
                reason: "Time off".to_string(),
            },
            10.0,
        )
        .await
        .unwrap();

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/admin/users/{}", employee.id))
        .insert_header(common::auth_header(&admin_token))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    assert!(ctx
        .user_repository
        .find_by_id(&employee.id)
        .await
        .unwrap()
        .is_none());
    assert!(ctx
        .profile_repository
        .get_by_user_id(&employee.id)
        .await
        .unwrap()
        .is_none());
    assert!(ctx
        .timesheet_repository
        .get_by_id(&timesheet.timesheet.id)
        .await
        .unwrap()
        .is_none());
    assert!(ctx
        .vacation_repository
        .get_by_id(&vacation.id)
        .await
        .unwrap()
        .is_none());
}

#[actix_web::test]
#[serial]
async fn admins_cannot_delete_their_own_account() {
    let ctx = common::TestContext::new().await.unwrap();
    let app = test::init_service(common::build_app(&ctx)).await;
    let (admin, admin_token) = ctx.admin().await;

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/admin/users/{}", admin.id))
        .insert_header(common::auth_header(&admin_token))
        .to_request();

    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );
}

#[actix_web::test]
#[serial]
async fn balance_override_replaces_the_stored_figures() {
    let ctx = common::TestContext::new().await.unwrap();
    let app = test::init_service(common::build_app(&ctx)).await;
    let (employee, _) = ctx.employee().await;
    let (_, admin_token) = ctx.admin().await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/admin/users/{}/balance", employee.id))
        .insert_header(common::auth_header(&admin_token))
        .set_json(json!({ "vacationBalance": 17.5, "accruedDays": 20.0 }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let data = common::response_data(&test::read_body(resp).await);
    assert_eq!(data["vacationBalance"], 17.5);
    assert_eq!(data["accruedDays"], 20.0);
    // Unspecified figures stay as they were
    assert_eq!(data["usedDays"], 0.0);
}

#[actix_web::test]
#[serial]
async fn negative_balance_override_is_rejected() {
    let ctx = common::TestContext::new().await.unwrap();
    let app = test::init_service(common::build_app(&ctx)).await;
    let (employee, _) = ctx.employee().await;
    let (_, admin_token) = ctx.admin().await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/admin/users/{}/balance", employee.id))
        .insert_header(common::auth_header(&admin_token))
        .set_json(json!({ "vacationBalance": -3.0 }))
        .to_request();

    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );
}
