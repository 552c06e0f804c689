use actix_cors::Cors;
use actix_web::{get, middleware::Logger, web, App, HttpResponse, HttpServer, Responder};
use anyhow::Result;

use maplehr::database::{
    init_database,
    repositories::{
        ProfileRepository, StatsRepository, TimesheetRepository, UserRepository,
        VacationRepository,
    },
};
use maplehr::handlers::{admin, auth, profile, stats, timesheets, vacations};
use maplehr::services::Notifier;
use maplehr::{AppState, AuthService, Config};

#[get("/")]
async fn hello() -> impl Responder {
    HttpResponse::Ok().body("MapleHR API v1.0")
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now()
    }))
}

#[actix_web::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = Config::from_env()?;
    log::info!(
        "Configuration loaded (environment: {})",
        config.environment
    );

    let pool = init_database(&config.database_url).await?;
    log::info!("Database initialized");

    let user_repository = UserRepository::new(pool.clone());
    let profile_repository = ProfileRepository::new(pool.clone());
    let timesheet_repository = TimesheetRepository::new(pool.clone());
    let vacation_repository = VacationRepository::new(pool.clone());
    let stats_repository = StatsRepository::new(pool.clone());

    let auth_service = AuthService::new(
        config.clone(),
        user_repository.clone(),
        profile_repository.clone(),
    );
    let notifier = Notifier::new(user_repository.clone(), profile_repository.clone());

    let app_state = web::Data::new(AppState { auth_service });
    let user_repo_data = web::Data::new(user_repository);
    let profile_repo_data = web::Data::new(profile_repository);
    let timesheet_repo_data = web::Data::new(timesheet_repository);
    let vacation_repo_data = web::Data::new(vacation_repository);
    let stats_repo_data = web::Data::new(stats_repository);
    let notifier_data = web::Data::new(notifier);
    let config_data = web::Data::new(config.clone());

    let server_address = config.server_address();
    log::info!("Server starting on http://{}", server_address);

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .app_data(user_repo_data.clone())
            .app_data(profile_repo_data.clone())
            .app_data(timesheet_repo_data.clone())
            .app_data(vacation_repo_data.clone())
            .app_data(stats_repo_data.clone())
            .app_data(notifier_data.clone())
            .app_data(config_data.clone())
            .wrap(
                Cors::default()
                    .allowed_origin("http://localhost:3000")
                    .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                    .allowed_headers(vec!["Authorization", "Content-Type", "Accept"])
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(hello)
            .service(health)
            .service(
                web::scope("/api/v1")
                    .service(
                        web::scope("/auth")
                            .route("/register", web::post().to(auth::register))
                            .route("/login", web::post().to(auth::login))
                            .route("/me", web::get().to(auth::me)),
                    )
                    .service(
                        web::scope("/profile")
                            .route("", web::get().to(profile::get_profile))
                            .route("", web::put().to(profile::update_profile)),
                    )
                    .service(
                        web::scope("/timesheets")
                            .route("", web::post().to(timesheets::create_timesheet))
                            .route("", web::get().to(timesheets::get_timesheets))
                            .route("/{id}", web::get().to(timesheets::get_timesheet))
                            .route("/{id}", web::put().to(timesheets::edit_timesheet))
                            .route("/{id}", web::delete().to(timesheets::delete_timesheet))
                            .route("/{id}/submit", web::post().to(timesheets::submit_timesheet))
                            .route(
                                "/{id}/approve",
                                web::post().to(timesheets::approve_timesheet),
                            )
                            .route("/{id}/reject", web::post().to(timesheets::reject_timesheet)),
                    )
                    .service(
                        web::scope("/vacations")
                            .route("", web::post().to(vacations::create_vacation_request))
                            .route("", web::get().to(vacations::get_vacation_requests))
                            .route("/{id}", web::get().to(vacations::get_vacation_request))
                            .route("/{id}", web::put().to(vacations::update_vacation_request))
                            .route(
                                "/{id}",
                                web::delete().to(vacations::delete_vacation_request),
                            )
                            .route(
                                "/{id}/approve",
                                web::post().to(vacations::approve_vacation_request),
                            )
                            .route(
                                "/{id}/reject",
                                web::post().to(vacations::reject_vacation_request),
                            ),
                    )
                    .service(
                        web::scope("/stats")
                            .route("/dashboard", web::get().to(stats::get_dashboard_stats)),
                    )
                    .service(
                        web::scope("/admin")
                            .route("/users", web::get().to(admin::get_users))
                            .route("/users/{id}/role", web::put().to(admin::update_user_role))
                            .route("/users/{id}", web::delete().to(admin::delete_user))
                            .route(
                                "/users/{id}/balance",
                                web::post().to(admin::override_balance),
                            ),
                    ),
            )
    })
    .bind(&server_address)?
    .run()
    .await
    .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
