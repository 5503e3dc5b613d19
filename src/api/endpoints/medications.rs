//! Medication sublist endpoints.
//!
//! - `POST /api/customer/medications`: append a medication
//! - `DELETE /api/customer/medications/:index`: remove by position

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::Serialize;

use crate::api::endpoints::{json_body, path_index};
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, CustomerContext};
use crate::db;
use crate::models::Medication;

#[derive(Debug, Serialize)]
pub struct MedicationsResponse {
    pub msg: String,
    pub medications: Vec<Medication>,
}

/// `POST /api/customer/medications`
pub async fn add(
    State(ctx): State<ApiContext>,
    Extension(customer): Extension<CustomerContext>,
    payload: Result<Json<Medication>, JsonRejection>,
) -> Result<Json<MedicationsResponse>, ApiError> {
    let mut medication = json_body(payload)?;
    medication.medicine_name = medication.medicine_name.trim().to_string();
    medication.validate().map_err(ApiError::BadRequest)?;

    let conn = ctx.open_db()?;
    let medications = db::append_medication(&conn, &customer.customer_id, &medication)?;

    Ok(Json(MedicationsResponse {
        msg: "Medication added".into(),
        medications,
    }))
}

/// `DELETE /api/customer/medications/:index`
pub async fn remove(
    State(ctx): State<ApiContext>,
    Extension(customer): Extension<CustomerContext>,
    index: Result<Path<usize>, PathRejection>,
) -> Result<Json<MedicationsResponse>, ApiError> {
    let index = path_index(index)?;
    let conn = ctx.open_db()?;
    let medications = db::remove_medication(&conn, &customer.customer_id, index)?;

    Ok(Json(MedicationsResponse {
        msg: "Medication removed".into(),
        medications,
    }))
}
