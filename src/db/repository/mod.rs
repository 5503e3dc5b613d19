//! Repository layer: customer-scoped database operations.
//!
//! The customer row holds identity and medical profile; medications and
//! reports live in owned child tables ordered by insertion.

mod customer;
mod medication;
mod report;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection};
use uuid::Uuid;

use super::DatabaseError;

pub use customer::*;
pub use medication::*;
pub use report::*;

/// Bump `updated_at` on a customer. Fails with `NotFound` if absent.
pub(crate) fn touch_customer(
    conn: &Connection,
    customer_id: &Uuid,
) -> Result<DateTime<Utc>, DatabaseError> {
    let now = Utc::now();
    let changed = conn.execute(
        "UPDATE customers SET updated_at = ?2 WHERE id = ?1",
        params![customer_id.to_string(), now.to_rfc3339()],
    )?;
    if changed == 0 {
        return Err(customer_not_found(customer_id));
    }
    Ok(now)
}

pub(crate) fn customer_not_found(customer_id: &Uuid) -> DatabaseError {
    DatabaseError::NotFound {
        entity_type: "customer".into(),
        id: customer_id.to_string(),
    }
}

pub(crate) fn entry_not_found(entity: &str, index: usize) -> DatabaseError {
    DatabaseError::NotFound {
        entity_type: entity.into(),
        id: index.to_string(),
    }
}

/// SQL `OFFSET` for a sublist position. Positions beyond `i64::MAX` do not
/// exist; a wrapped negative offset would select the first row.
pub(crate) fn position_offset(entity: &str, index: usize) -> Result<i64, DatabaseError> {
    i64::try_from(index).map_err(|_| entry_not_found(entity, index))
}

pub(crate) fn parse_timestamp(
    column: &'static str,
    raw: &str,
) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::Corrupted {
            column,
            reason: e.to_string(),
        })
}

pub(crate) fn parse_date(
    column: &'static str,
    raw: Option<String>,
) -> Result<Option<NaiveDate>, DatabaseError> {
    raw.map(|d| {
        NaiveDate::parse_from_str(&d, "%Y-%m-%d").map_err(|e| DatabaseError::Corrupted {
            column,
            reason: e.to_string(),
        })
    })
    .transpose()
}

pub(crate) fn encode_list(column: &'static str, items: &[String]) -> Result<String, DatabaseError> {
    serde_json::to_string(items).map_err(|e| DatabaseError::Corrupted {
        column,
        reason: e.to_string(),
    })
}

pub(crate) fn decode_list(column: &'static str, raw: &str) -> Result<Vec<String>, DatabaseError> {
    serde_json::from_str(raw).map_err(|e| DatabaseError::Corrupted {
        column,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::scratch_database;
    use crate::models::enums::Gender;
    use crate::models::*;

    fn test_db() -> Connection {
        scratch_database().unwrap()
    }

    fn make_customer(conn: &Connection, email: &str) -> Customer {
        insert_customer(
            conn,
            &NewCustomer {
                name: "Test Patient".into(),
                age: 40,
                gender: Gender::Male,
                email: email.into(),
                med_id: generate_med_id(),
                password_hash: "hash".into(),
            },
        )
        .unwrap()
    }

    #[test]
    fn touch_missing_customer_is_not_found() {
        let conn = test_db();
        let err = touch_customer(&conn, &Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[test]
    fn touch_moves_updated_at_forward() {
        let conn = test_db();
        let customer = make_customer(&conn, "touch@example.com");
        let touched = touch_customer(&conn, &customer.id).unwrap();
        assert!(touched >= customer.updated_at);
        let reloaded = get_customer(&conn, &customer.id).unwrap().unwrap();
        assert_eq!(reloaded.updated_at, touched);
        assert_eq!(reloaded.created_at, customer.created_at);
    }

    #[test]
    fn deleting_customer_cascades_to_children() {
        let conn = test_db();
        let customer = make_customer(&conn, "cascade@example.com");
        append_medication(&conn, &customer.id, &Medication::new("Aspirin")).unwrap();
        append_report(
            &conn,
            &customer.id,
            NewReport {
                report_type: None,
                file_url: "https://files.example/x".into(),
            },
        )
        .unwrap();

        conn.execute(
            "DELETE FROM customers WHERE id = ?1",
            params![customer.id.to_string()],
        )
        .unwrap();

        let meds: i64 = conn
            .query_row("SELECT COUNT(*) FROM customer_medications", [], |r| r.get(0))
            .unwrap();
        let reports: i64 = conn
            .query_row("SELECT COUNT(*) FROM customer_reports", [], |r| r.get(0))
            .unwrap();
        assert_eq!((meds, reports), (0, 0));
    }

    #[test]
    fn corrupted_timestamp_is_reported() {
        let err = parse_timestamp("created_at", "yesterday").unwrap_err();
        assert!(err.to_string().contains("created_at"));
        assert_eq!(parse_date("start_date", None).unwrap(), None);
    }
}
