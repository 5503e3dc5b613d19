//! Report sublist endpoints.
//!
//! - `POST /api/customer/reports`: attach a report reference
//! - `DELETE /api/customer/reports/:index`: remove by position

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::Serialize;

use crate::api::endpoints::{json_body, path_index};
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, CustomerContext};
use crate::db;
use crate::models::{NewReport, Report};

#[derive(Debug, Serialize)]
pub struct ReportsResponse {
    pub msg: String,
    pub reports: Vec<Report>,
}

/// `POST /api/customer/reports`
pub async fn add(
    State(ctx): State<ApiContext>,
    Extension(customer): Extension<CustomerContext>,
    payload: Result<Json<NewReport>, JsonRejection>,
) -> Result<Json<ReportsResponse>, ApiError> {
    let report = json_body(payload)?;
    report.validate().map_err(ApiError::BadRequest)?;

    let conn = ctx.open_db()?;
    let reports = db::append_report(&conn, &customer.customer_id, report)?;

    Ok(Json(ReportsResponse {
        msg: "Report added".into(),
        reports,
    }))
}

/// `DELETE /api/customer/reports/:index`
pub async fn remove(
    State(ctx): State<ApiContext>,
    Extension(customer): Extension<CustomerContext>,
    index: Result<Path<usize>, PathRejection>,
) -> Result<Json<ReportsResponse>, ApiError> {
    let index = path_index(index)?;
    let conn = ctx.open_db()?;
    let reports = db::remove_report(&conn, &customer.customer_id, index)?;

    Ok(Json(ReportsResponse {
        msg: "Report removed".into(),
        reports,
    }))
}
