//! Customer profile endpoints.
//!
//! - `GET /api/customer/profile`: full customer record (no password)
//! - `PATCH /api/customer/profile`: partial medical-profile update

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::{Extension, Json};

use crate::api::endpoints::json_body;
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, CustomerContext};
use crate::db;
use crate::models::{Customer, MessageResponse, ProfileUpdate};

/// `GET /api/customer/profile`
pub async fn get(
    State(ctx): State<ApiContext>,
    Extension(customer): Extension<CustomerContext>,
) -> Result<Json<Customer>, ApiError> {
    let conn = ctx.open_db()?;
    let record = db::get_customer(&conn, &customer.customer_id)?
        .ok_or_else(|| ApiError::NotFound("Customer not found".into()))?;
    Ok(Json(record))
}

/// `PATCH /api/customer/profile`
pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(customer): Extension<CustomerContext>,
    payload: Result<Json<ProfileUpdate>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let update = json_body(payload)?;
    update.validate().map_err(ApiError::BadRequest)?;

    let conn = ctx.open_db()?;
    db::update_medical_profile(&conn, &customer.customer_id, update)?;
    tracing::info!(med_id = %customer.med_id, "Medical profile updated");

    Ok(Json(MessageResponse::new("Profile updated successfully")))
}
