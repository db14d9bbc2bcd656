//! Auth handlers: signup and login.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{AuthTokenResponse, LoginRequest, SignupRequest, UserDto};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, GatewayError};

/// `POST /auth/signup` — Register a new account.
///
/// # Errors
///
/// Returns [`GatewayError`] on validation failure or a duplicate email.
#[utoipa::path(
    post,
    path = "/api/v1/auth/signup",
    tag = "Auth",
    summary = "Register a new account",
    description = "Creates a user with the `user` role and returns a bearer \
                   token alongside the stored profile.",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = AuthTokenResponse),
        (status = 400, description = "Invalid email or password", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let result = state
        .users
        .signup(&req.email, &req.password, &req.full_name)
        .await?;

    let response = AuthTokenResponse {
        token: result.token,
        user: UserDto::from(result.user),
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// `POST /auth/login` — Exchange credentials for a bearer token.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidCredentials`] for a wrong email or
/// password.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Auth",
    summary = "Log in",
    description = "Verifies the password and returns a fresh bearer token.",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthTokenResponse),
        (status = 400, description = "Wrong email or password", body = ErrorResponse),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let result = state.users.login(&req.email, &req.password).await?;

    let response = AuthTokenResponse {
        token: result.token,
        user: UserDto::from(result.user),
    };
    Ok((StatusCode::OK, Json(response)))
}

/// Auth routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
}
