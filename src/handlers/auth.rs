use axum::{
    extract::{Json, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use tracing::info;

use super::{AppState, BearerToken, CurrentUser};
use crate::{
    errors::ServiceError,
    models::User,
    notifications::Notification,
    services::{SignInForm, SignUpForm, SignedIn},
    ApiResponse, ApiResult,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/sign-in", post(sign_in))
        .route("/sign-up", post(sign_up))
        .route("/sign-out", post(sign_out))
        .route("/me", get(current_user))
}

/// Sign-in handler
pub async fn sign_in(
    State(state): State<AppState>,
    Json(form): Json<SignInForm>,
) -> ApiResult<SignedIn> {
    let signed_in = state.auth.sign_in(form).await?;
    Ok(Json(ApiResponse::success(signed_in)))
}

/// Account creation handler
pub async fn sign_up(
    State(state): State<AppState>,
    Json(form): Json<SignUpForm>,
) -> Result<(StatusCode, Json<ApiResponse<SignedIn>>), ServiceError> {
    let signed_in = state.auth.sign_up(form).await?;
    info!(uid = %signed_in.user.uid, "new account");
    Ok((StatusCode::CREATED, Json(ApiResponse::success(signed_in))))
}

pub async fn sign_out(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> ApiResult<()> {
    state.auth.sign_out(&token).await?;
    Ok(Json(ApiResponse::notify(
        (),
        Notification::success("Signed out", "You have been signed out."),
    )))
}

pub async fn current_user(CurrentUser(user): CurrentUser) -> ApiResult<User> {
    Ok(Json(ApiResponse::success(user)))
}
