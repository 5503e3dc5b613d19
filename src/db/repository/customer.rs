use std::str::FromStr;

use chrono::Utc;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use uuid::Uuid;

use super::{
    customer_not_found, decode_list, encode_list, list_medications, list_reports,
    parse_timestamp,
};
use crate::db::DatabaseError;
use crate::models::enums::Gender;
use crate::models::*;

/// Login material for one customer.
#[derive(Debug, Clone)]
pub struct CustomerCredentials {
    pub id: Uuid,
    pub med_id: String,
    pub password_hash: String,
}

/// Insert a freshly registered customer (identity fields only).
///
/// Duplicate `email` or `med_id` surfaces as `ConstraintViolation` naming
/// the offending field.
pub fn insert_customer(conn: &Connection, new: &NewCustomer) -> Result<Customer, DatabaseError> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    conn.execute(
        "INSERT INTO customers (id, name, age, gender, email, password_hash, med_id,
         created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
        params![
            id.to_string(),
            new.name,
            new.age,
            new.gender.as_str(),
            new.email,
            new.password_hash,
            new.med_id,
            now.to_rfc3339(),
        ],
    )
    .map_err(unique_violation)?;

    Ok(Customer {
        id,
        name: new.name.clone(),
        age: new.age,
        gender: new.gender,
        email: new.email.clone(),
        med_id: new.med_id.clone(),
        medical: MedicalProfile::default(),
        medications: Vec::new(),
        reports: Vec::new(),
        created_at: now,
        updated_at: now,
    })
}

/// Load a customer with its medications and reports.
pub fn get_customer(conn: &Connection, id: &Uuid) -> Result<Option<Customer>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, name, age, gender, email, med_id, blood_group, height, weight,
             chronic_diseases, allergies, created_at, updated_at
             FROM customers WHERE id = ?1",
            params![id.to_string()],
            customer_row_from_rusqlite,
        )
        .optional()?;

    let Some(row) = row else {
        return Ok(None);
    };

    let mut customer = customer_from_row(row)?;
    customer.medications = list_medications(conn, &customer.id)?;
    customer.reports = list_reports(conn, &customer.id)?;
    Ok(Some(customer))
}

/// Look up login material by email (case-insensitive).
pub fn find_credentials_by_email(
    conn: &Connection,
    email: &str,
) -> Result<Option<CustomerCredentials>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, med_id, password_hash FROM customers WHERE email = ?1",
            params![email],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        )
        .optional()?;

    row.map(|(id, med_id, password_hash)| {
        Ok(CustomerCredentials {
            id: parse_id(&id)?,
            med_id,
            password_hash,
        })
    })
    .transpose()
}

pub fn email_exists(conn: &Connection, email: &str) -> Result<bool, DatabaseError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM customers WHERE email = ?1",
        params![email],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Apply a partial medical-profile update and return the refreshed customer.
pub fn update_medical_profile(
    conn: &Connection,
    id: &Uuid,
    update: ProfileUpdate,
) -> Result<Customer, DatabaseError> {
    let tx = conn.unchecked_transaction()?;

    let mut customer = get_customer(&tx, id)?.ok_or_else(|| customer_not_found(id))?;
    update.apply_to(&mut customer.medical);
    let now = Utc::now();

    tx.execute(
        "UPDATE customers SET blood_group = ?2, height = ?3, weight = ?4,
         chronic_diseases = ?5, allergies = ?6, updated_at = ?7
         WHERE id = ?1",
        params![
            id.to_string(),
            customer.medical.blood_group,
            customer.medical.height,
            customer.medical.weight,
            encode_list("chronic_diseases", &customer.medical.chronic_diseases)?,
            encode_list("allergies", &customer.medical.allergies)?,
            now.to_rfc3339(),
        ],
    )?;
    tx.commit()?;

    customer.updated_at = now;
    Ok(customer)
}

fn unique_violation(err: rusqlite::Error) -> DatabaseError {
    if let rusqlite::Error::SqliteFailure(code, Some(message)) = &err {
        if code.code == ErrorCode::ConstraintViolation {
            if message.contains("customers.email") {
                return DatabaseError::ConstraintViolation("email".into());
            }
            if message.contains("customers.med_id") {
                return DatabaseError::ConstraintViolation("med_id".into());
            }
        }
    }
    DatabaseError::Sqlite(err)
}

fn parse_id(raw: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(raw).map_err(|e| DatabaseError::Corrupted {
        column: "id",
        reason: e.to_string(),
    })
}

// Internal row type for Customer mapping
struct CustomerRow {
    id: String,
    name: String,
    age: u32,
    gender: String,
    email: String,
    med_id: String,
    blood_group: Option<String>,
    height: Option<f64>,
    weight: Option<f64>,
    chronic_diseases: String,
    allergies: String,
    created_at: String,
    updated_at: String,
}

fn customer_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<CustomerRow, rusqlite::Error> {
    Ok(CustomerRow {
        id: row.get(0)?,
        name: row.get(1)?,
        age: row.get(2)?,
        gender: row.get(3)?,
        email: row.get(4)?,
        med_id: row.get(5)?,
        blood_group: row.get(6)?,
        height: row.get(7)?,
        weight: row.get(8)?,
        chronic_diseases: row.get(9)?,
        allergies: row.get(10)?,
        created_at: row.get(11)?,
        updated_at: row.get(12)?,
    })
}

fn customer_from_row(row: CustomerRow) -> Result<Customer, DatabaseError> {
    Ok(Customer {
        id: parse_id(&row.id)?,
        name: row.name,
        age: row.age,
        gender: Gender::from_str(&row.gender)?,
        email: row.email,
        med_id: row.med_id,
        medical: MedicalProfile {
            blood_group: row.blood_group,
            height: row.height,
            weight: row.weight,
            chronic_diseases: decode_list("chronic_diseases", &row.chronic_diseases)?,
            allergies: decode_list("allergies", &row.allergies)?,
        },
        medications: Vec::new(),
        reports: Vec::new(),
        created_at: parse_timestamp("created_at", &row.created_at)?,
        updated_at: parse_timestamp("updated_at", &row.updated_at)?,
    })
}
