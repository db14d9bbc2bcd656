//! Profile handlers: me, profile update, password change, admin listing.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, put};
use axum::{Json, Router};

use crate::api::dto::{
    ChangePasswordRequest, PaginationMeta, PaginationParams, UpdateProfileRequest, UserDto,
    UserListResponse,
};
use crate::app_state::AppState;
use crate::auth::CurrentUser;
use crate::error::{ErrorResponse, GatewayError};

/// `GET /users/me` — The caller's own profile.
///
/// # Errors
///
/// Returns [`GatewayError::UserNotFound`] if the account was deleted
/// after the token was issued.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    tag = "Users",
    summary = "Get own profile",
    responses(
        (status = 200, description = "The caller's profile", body = UserDto),
        (status = 401, description = "Missing or invalid credentials", body = ErrorResponse),
    )
)]
pub async fn me(
    State(state): State<AppState>,
    caller: CurrentUser,
) -> Result<impl IntoResponse, GatewayError> {
    let user = state.users.me(caller.user_id).await?;
    Ok(Json(UserDto::from(user)))
}

/// `PUT /users/me` — Update display name and avatar.
///
/// # Errors
///
/// Returns [`GatewayError::UserNotFound`] if the account no longer
/// exists.
#[utoipa::path(
    put,
    path = "/api/v1/users/me",
    tag = "Users",
    summary = "Update own profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserDto),
        (status = 401, description = "Missing or invalid credentials", body = ErrorResponse),
    )
)]
pub async fn update_me(
    State(state): State<AppState>,
    caller: CurrentUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let user = state
        .users
        .update_profile(caller.user_id, &req.full_name, &req.avatar)
        .await?;
    Ok(Json(UserDto::from(user)))
}

/// `PUT /users/me/password` — Change the caller's password.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidCredentials`] when the old password is
/// wrong.
#[utoipa::path(
    put,
    path = "/api/v1/users/me/password",
    tag = "Users",
    summary = "Change own password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Wrong old password or invalid new one", body = ErrorResponse),
        (status = 401, description = "Missing or invalid credentials", body = ErrorResponse),
    )
)]
pub async fn change_password(
    State(state): State<AppState>,
    caller: CurrentUser,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    state
        .users
        .change_password(caller.user_id, &req.old_password, &req.new_password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /users` — Paginated user listing (admin only).
///
/// # Errors
///
/// Returns [`GatewayError::Forbidden`] for non-admin callers.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "Users",
    summary = "List users",
    params(
        ("page" = u32, Query, description = "Page number, 1-indexed"),
        ("per_page" = u32, Query, description = "Items per page, max 100"),
    ),
    responses(
        (status = 200, description = "One page of users", body = UserListResponse),
        (status = 401, description = "Missing or invalid credentials", body = ErrorResponse),
        (status = 403, description = "Caller is not an admin", body = ErrorResponse),
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    caller: CurrentUser,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, GatewayError> {
    if !caller.is_admin() {
        return Err(GatewayError::Forbidden);
    }

    let params = params.clamped();
    let (users, total) = state
        .users
        .list_users(i64::from(params.per_page), params.offset())
        .await?;

    let total = u32::try_from(total).unwrap_or(u32::MAX);
    let response = UserListResponse {
        data: users.into_iter().map(UserDto::from).collect(),
        pagination: PaginationMeta::new(&params, total),
    };
    Ok(Json(response))
}

/// User routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/me", get(me).put(update_me))
        .route("/users/me/password", put(change_password))
}
