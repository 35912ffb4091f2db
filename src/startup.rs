use actix_web::dev::Server;
use actix_web::error::JsonPayloadError;
use actix_web::{middleware::Logger, web, App, HttpRequest, HttpResponse, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::{CredentialService, PasswordHasher, TokenIssuer};
use crate::configuration::{JwtSettings, PasswordSettings};
use crate::error::{AppError, ValidationError};
use crate::logger::LoggerMiddleware;
use crate::middleware::JwtMiddleware;
use crate::routes::{
    delete_user, get_user, health_check, list_admins, list_users, sign_in, sign_up,
    sign_up_admin, update_user,
};
use crate::store::UserStore;

/// Body binding failures (missing fields, wrong types, bad dates) use the
/// same error body as every other 400.
fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::Validation(ValidationError::MalformedPayload(err.to_string())).into()
}

async fn not_found() -> Result<HttpResponse, AppError> {
    Err(AppError::NotFound("resource not found".to_string()))
}

pub fn run(
    listener: TcpListener,
    store: Arc<dyn UserStore>,
    jwt_config: JwtSettings,
    password_config: PasswordSettings,
) -> Result<Server, std::io::Error> {
    let tokens = TokenIssuer::new(&jwt_config)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;
    let hasher = PasswordHasher::from_settings(&password_config);

    let service = web::Data::new(CredentialService::new(
        store.clone(),
        hasher.clone(),
        tokens.clone(),
    ));
    let store_data: web::Data<dyn UserStore> = web::Data::from(store);
    let hasher_data = web::Data::new(hasher);
    let json_config = web::JsonConfig::default().error_handler(json_error_handler);

    let server = HttpServer::new(move || {
        let guard = || JwtMiddleware::new(tokens.clone());

        App::new()
            // Global middleware
            .wrap(Logger::default())
            .wrap(LoggerMiddleware)

            // Shared state
            .app_data(json_config.clone())
            .app_data(service.clone())
            .app_data(store_data.clone())
            .app_data(hasher_data.clone())

            // Public routes
            .route("/health_check", web::get().to(health_check))
            .route("/signup", web::post().to(sign_up))
            .route("/signup/admin", web::post().to(sign_up_admin))
            .route("/signin", web::post().to(sign_in))

            // User management (bearer token required)
            .service(
                web::resource("/users")
                    .route(web::get().to(list_users))
                    .wrap(guard()),
            )
            .service(
                web::resource("/admins")
                    .route(web::get().to(list_admins))
                    .wrap(guard()),
            )
            .service(
                web::resource("/user/{id}")
                    .route(web::get().to(get_user))
                    .route(web::patch().to(update_user))
                    .route(web::delete().to(delete_user))
                    .wrap(guard()),
            )
            .default_service(web::route().to(not_found))
    })
    .listen(listener)?
    .run();

    Ok(server)
}
