//! JSON handlers for account registration, verification, login and recovery.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use tower_sessions::Session;

use minishop_app::ports::{
    CustomerRepository, Mailer, OrderRepository, ProductRepository, UserRepository,
};
use minishop_domain::user::{Registration, User};

use super::ApiResponse;
use crate::error::ApiError;
use crate::session::{self, CurrentUser, RequireAuth};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub email: String,
    pub code: String,
}

/// `login` is either the username or the email address.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub login: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RecoverRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    pub email: String,
    pub code: String,
    pub password: String,
}

/// `POST /api/auth/register`: creates an unverified account and mails its code.
pub async fn register<CR, PR, OR, UR, M>(
    State(state): State<AppState<CR, PR, OR, UR, M>>,
    Json(req): Json<Registration>,
) -> Result<ApiResponse<User>, ApiError>
where
    CR: CustomerRepository + Send + Sync + 'static,
    PR: ProductRepository + Send + Sync + 'static,
    OR: OrderRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let user = state.auth_service.register(req).await?;
    Ok(ApiResponse::Created(Json(user)))
}

/// `POST /api/auth/verify`
pub async fn verify<CR, PR, OR, UR, M>(
    State(state): State<AppState<CR, PR, OR, UR, M>>,
    Json(req): Json<VerifyRequest>,
) -> Result<ApiResponse<User>, ApiError>
where
    CR: CustomerRepository + Send + Sync + 'static,
    PR: ProductRepository + Send + Sync + 'static,
    OR: OrderRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let user = state.auth_service.verify_email(&req.email, &req.code).await?;
    Ok(ApiResponse::Ok(Json(user)))
}

/// `POST /api/auth/login`: attaches the account to the session cookie.
pub async fn login<CR, PR, OR, UR, M>(
    State(state): State<AppState<CR, PR, OR, UR, M>>,
    session: Session,
    Json(req): Json<LoginRequest>,
) -> Result<ApiResponse<CurrentUser>, ApiError>
where
    CR: CustomerRepository + Send + Sync + 'static,
    PR: ProductRepository + Send + Sync + 'static,
    OR: OrderRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let user = state.auth_service.login(&req.login, &req.password).await?;
    session::log_in(&session, &user).await?;
    Ok(ApiResponse::Ok(Json(CurrentUser::from(&user))))
}

/// `POST /api/auth/logout`
pub async fn logout(session: Session) -> Result<ApiResponse<()>, ApiError> {
    session::log_out(&session).await?;
    Ok(ApiResponse::NoContent)
}

/// `POST /api/auth/recover`
///
/// Always answers `202` so the endpoint does not reveal which emails exist.
pub async fn recover<CR, PR, OR, UR, M>(
    State(state): State<AppState<CR, PR, OR, UR, M>>,
    Json(req): Json<RecoverRequest>,
) -> Result<ApiResponse<()>, ApiError>
where
    CR: CustomerRepository + Send + Sync + 'static,
    PR: ProductRepository + Send + Sync + 'static,
    OR: OrderRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    state.auth_service.start_recovery(&req.email).await?;
    Ok(ApiResponse::Accepted)
}

/// `POST /api/auth/reset`
pub async fn reset<CR, PR, OR, UR, M>(
    State(state): State<AppState<CR, PR, OR, UR, M>>,
    Json(req): Json<ResetRequest>,
) -> Result<ApiResponse<()>, ApiError>
where
    CR: CustomerRepository + Send + Sync + 'static,
    PR: ProductRepository + Send + Sync + 'static,
    OR: OrderRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    state
        .auth_service
        .reset_password(&req.email, &req.code, &req.password)
        .await?;
    Ok(ApiResponse::NoContent)
}

/// `GET /api/auth/me`
pub async fn me(RequireAuth(user): RequireAuth) -> ApiResponse<CurrentUser> {
    ApiResponse::Ok(Json(user))
}
