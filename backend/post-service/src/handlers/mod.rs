/// HTTP handlers and route table
pub mod health;
pub mod posts;
pub mod users;

use actix_middleware::JwtAuthMiddleware;
use actix_web::{guard, web};

use crate::error::AppError;
use crate::AppState;

/// Register every route. Everything under `/api/posts` and `GET /api/auth`
/// requires a token; registration and login are public.
pub fn configure(state: web::Data<AppState>) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        let auth = JwtAuthMiddleware::new(state.guard.clone());

        cfg.app_data(state)
            .app_data(path_config())
            .app_data(json_config())
            .route("/health", web::get().to(health::health))
            .route("/ready", web::get().to(health::ready))
            .route("/api/users", web::post().to(users::register))
            // GET needs a token, POST (login) must not
            .service(
                web::scope("/api/auth")
                    .guard(guard::Get())
                    .wrap(auth.clone())
                    .route("", web::get().to(users::current_user)),
            )
            .route("/api/auth", web::post().to(users::login))
            .service(
                web::scope("/api/posts")
                    .wrap(auth)
                    .service(
                        web::resource("")
                            .route(web::post().to(posts::create_post))
                            .route(web::get().to(posts::list_posts)),
                    )
                    .route("/like/{id}", web::put().to(posts::like_post))
                    .route("/unlike/{id}", web::put().to(posts::unlike_post))
                    .route("/comment/{id}", web::post().to(posts::add_comment))
                    .route(
                        "/comment/{id}/{comment_id}",
                        web::delete().to(posts::delete_comment),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(posts::get_post))
                            .route(web::delete().to(posts::delete_post)),
                    ),
            );
    }
}

/// Non-UUID path ids are rejected before any lookup
fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|_err, _req| AppError::Validation("Invalid ID".to_string()).into())
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::Validation(err.to_string()).into())
}
