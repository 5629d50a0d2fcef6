#![allow(dead_code)]

use std::sync::Arc;

use apis::setup_routes;
use axum::Router;
use models::{follows::Follow, notifications::Notification, post_likes::PostLike};
use repositories::{base_repository::PgRepository, user_repository::UserRepository};
use services::{notification_service::NotificationService, user_service::UserService};
use sqlx::postgres::PgPool;
use tower_http::cors::CorsLayer;

pub mod apis;
pub mod models;
pub mod repositories;
pub mod services;
pub mod settings;
pub mod utils;

pub struct AppState {
    pub user_service: UserService,
}

pub async fn setup_database(database_url: &str) -> Result<Arc<PgPool>, Box<dyn std::error::Error>> {
    let pool = PgPool::connect(database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(Arc::new(pool))
}

pub async fn setup_router(
    settings: &settings::Settings,
) -> Result<Router, Box<dyn std::error::Error>> {
    let db = setup_database(&settings.database_url).await?;
    let user_service = setup_services(db);
    let router = setup_routes();

    Ok(router
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(AppState { user_service })))
}

pub fn setup_services(db: Arc<PgPool>) -> UserService {
    let user_repository = Arc::new(UserRepository::new(db.clone()));
    let follow_repository = Arc::new(PgRepository::<Follow>::new(db.clone()));
    let post_like_repository = Arc::new(PgRepository::<PostLike>::new(db.clone()));
    let notification_repository = Arc::new(PgRepository::<Notification>::new(db));
    let notification_service = Arc::new(NotificationService::new(notification_repository));

    UserService::new(
        user_repository,
        follow_repository,
        post_like_repository,
        notification_service,
    )
}

pub fn init_tracing(settings: &settings::Settings) {
    let env = settings.environment.clone().unwrap_or("DEV".to_string());
    let level = match env.as_str() {
        "PROD" => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_thread_names(true)
        .with_ansi(env != "PROD")
        .init();
}
