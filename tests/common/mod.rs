#![allow(dead_code)]

use actix_web::{web, App};
use anyhow::Result;
use chrono::Utc;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::Fake;
use jsonwebtoken::{encode, EncodingKey, Header};
use sqlx::SqlitePool;
use tempfile::NamedTempFile;

use maplehr::config::Config;
use maplehr::database::init_database;
use maplehr::database::models::{Profile, Province, User, UserRole};
use maplehr::database::repositories::{
    ProfileRepository, StatsRepository, TimesheetRepository, UserRepository, VacationRepository,
};
use maplehr::handlers::{admin, auth, profile, stats, timesheets, vacations};
use maplehr::services::auth::Claims;
use maplehr::services::Notifier;
use maplehr::{AppState, AuthService};

/// Isolated test environment: a fresh temp SQLite database with the full
/// migration set applied, plus every repository and service wired up.
pub struct TestContext {
    pub pool: SqlitePool,
    pub config: Config,
    pub auth_service: AuthService,
    pub user_repository: UserRepository,
    pub profile_repository: ProfileRepository,
    pub timesheet_repository: TimesheetRepository,
    pub vacation_repository: VacationRepository,
    pub stats_repository: StatsRepository,
    _temp_file: NamedTempFile,
}

impl TestContext {
    pub async fn new() -> Result<Self> {
        let temp_file = NamedTempFile::new()?;
        let database_url = format!("sqlite:{}", temp_file.path().display());
        let pool = init_database(&database_url).await?;

        let config = Config::test_config();
        let user_repository = UserRepository::new(pool.clone());
        let profile_repository = ProfileRepository::new(pool.clone());
        let auth_service = AuthService::new(
            config.clone(),
            user_repository.clone(),
            profile_repository.clone(),
        );

        Ok(TestContext {
            timesheet_repository: TimesheetRepository::new(pool.clone()),
            vacation_repository: VacationRepository::new(pool.clone()),
            stats_repository: StatsRepository::new(pool.clone()),
            pool,
            config,
            auth_service,
            user_repository,
            profile_repository,
            _temp_file: temp_file,
        })
    }

    /// Inserts a user with a profile holding `vacation_balance` days and
    /// returns the user with a valid bearer token.
    pub async fn create_user(&self, role: UserRole, vacation_balance: f64) -> (User, String) {
        let email: String = SafeEmail().fake();
        let name: String = Name().fake();
        // Low-cost hash: these accounts authenticate via minted tokens
        let password_hash = bcrypt::hash("Test123!", 4).unwrap();

        let user = User::new(email, password_hash, name, role);
        self.user_repository.create_user(&user).await.unwrap();

        let profile = Profile::new(user.id.clone(), Province::Ontario, vacation_balance);
        self.profile_repository.create(&profile).await.unwrap();

        let token = self.token_for(&user);
        (user, token)
    }

    pub async fn employee(&self) -> (User, String) {
        self.create_user(UserRole::Employee, 10.0).await
    }

    pub async fn manager(&self) -> (User, String) {
        self.create_user(UserRole::Manager, 10.0).await
    }

    pub async fn admin(&self) -> (User, String) {
        self.create_user(UserRole::Admin, 10.0).await
    }

    pub fn token_for(&self, user: &User) -> String {
        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            role: user.role,
            exp: (Utc::now() + chrono::Duration::hours(24)).timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_ref()),
        )
        .unwrap()
    }
}

/// Full application with the production route table, wired to the test
/// context's database.
pub fn build_app(
    ctx: &TestContext,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    > + use<>,
> {
    let app_state = web::Data::new(AppState {
        auth_service: ctx.auth_service.clone(),
    });
    let notifier = Notifier::new(
        ctx.user_repository.clone(),
        ctx.profile_repository.clone(),
    );

    App::new()
        .app_data(app_state)
        .app_data(web::Data::new(ctx.user_repository.clone()))
        .app_data(web::Data::new(ctx.profile_repository.clone()))
        .app_data(web::Data::new(ctx.timesheet_repository.clone()))
        .app_data(web::Data::new(ctx.vacation_repository.clone()))
        .app_data(web::Data::new(ctx.stats_repository.clone()))
        .app_data(web::Data::new(notifier))
        .app_data(web::Data::new(ctx.config.clone()))
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
}

/// Authorization header pair for a bearer token.
pub fn auth_header(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

/// Unwraps the `data` field of a successful ApiResponse body.
pub fn response_data(body: &[u8]) -> serde_json::Value {
    let response: serde_json::Value =
        serde_json::from_slice(body).expect("response should be valid JSON");
    assert_eq!(response["success"], true, "expected success: {}", response);
    response["data"].clone()
}
