//! Customer authentication endpoints.
//!
//! - `POST /api/auth/customer/register`: create an account (unprotected)
//! - `POST /api/auth/customer/login`: exchange credentials for a bearer token (unprotected)
//! - `POST /api/auth/customer/logout`: revoke the current token (protected)

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};

use crate::api::endpoints::json_body;
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, CustomerContext};
use crate::crypto;
use crate::db;
use crate::forms::signup::looks_like_email;
use crate::models::{
    generate_med_id, LoginRequest, LoginResponse, MessageResponse, NewCustomer, RegisterRequest,
    RegisterResponse,
};

/// `POST /api/auth/customer/register`
pub async fn register(
    State(ctx): State<ApiContext>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let request = json_body(payload)?;

    let name = request.name.trim().to_string();
    let email = request.email.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::BadRequest("Name is required".into()));
    }
    if !looks_like_email(&email) {
        return Err(ApiError::BadRequest("A valid email is required".into()));
    }
    if request.password.is_empty() {
        return Err(ApiError::BadRequest("Password is required".into()));
    }

    if db::email_exists(&ctx.open_db()?, &email)? {
        return Err(ApiError::Conflict("Email already registered".into()));
    }

    let iterations = ctx.password_iterations;
    let password = request.password;
    let password_hash =
        tokio::task::spawn_blocking(move || crypto::hash_password(&password, iterations)).await??;

    let customer = db::insert_customer(
        &ctx.open_db()?,
        &NewCustomer {
            name,
            age: request.age,
            gender: request.gender,
            email,
            med_id: generate_med_id(),
            password_hash,
        },
    )?;

    tracing::info!(med_id = %customer.med_id, "Customer registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            msg: "Customer registered successfully".into(),
            med_id: customer.med_id,
        }),
    ))
}

/// `POST /api/auth/customer/login`
pub async fn login(
    State(ctx): State<ApiContext>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let request = json_body(payload)?;
    let email = request.email.trim().to_string();
    if email.is_empty() || request.password.is_empty() {
        return Err(ApiError::BadRequest("Email and password are required".into()));
    }

    let credentials = db::find_credentials_by_email(&ctx.open_db()?, &email)?;
    let Some(credentials) = credentials else {
        tracing::warn!("Login attempt for unknown email");
        return Err(ApiError::InvalidCredentials);
    };

    let stored = credentials.password_hash.clone();
    let password = request.password;
    let valid =
        tokio::task::spawn_blocking(move || crypto::verify_password(&password, &stored)).await??;
    if !valid {
        tracing::warn!(med_id = %credentials.med_id, "Login rejected: bad password");
        return Err(ApiError::InvalidCredentials);
    }

    let token = ctx
        .lock_sessions()?
        .issue(credentials.id, &credentials.med_id);
    tracing::info!(med_id = %credentials.med_id, "Customer logged in");

    Ok(Json(LoginResponse {
        token,
        med_id: credentials.med_id,
    }))
}

/// `POST /api/auth/customer/logout`
pub async fn logout(
    State(ctx): State<ApiContext>,
    Extension(customer): Extension<CustomerContext>,
) -> Result<Json<MessageResponse>, ApiError> {
    ctx.lock_sessions()?.revoke(&customer.token_hash);
    tracing::info!(med_id = %customer.med_id, "Customer logged out");
    Ok(Json(MessageResponse::new("Logged out")))
}
