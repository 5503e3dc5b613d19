use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{entry_not_found, parse_timestamp, position_offset, touch_customer};
use crate::db::DatabaseError;
use crate::models::*;

/// Reports of one customer, oldest first.
pub fn list_reports(conn: &Connection, customer_id: &Uuid) -> Result<Vec<Report>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT report_type, file_url, uploaded_at
         FROM customer_reports WHERE customer_id = ?1 ORDER BY id",
    )?;

    let rows = stmt.query_map(params![customer_id.to_string()], |row| {
        Ok((
            row.get::<_, Option<String>>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
        ))
    })?;

    let mut reports = Vec::new();
    for row in rows {
        let (report_type, file_url, uploaded_at) = row?;
        reports.push(Report {
            report_type,
            file_url,
            uploaded_at: parse_timestamp("uploaded_at", &uploaded_at)?,
        });
    }
    Ok(reports)
}

/// Append a report stamped with the current time.
pub fn append_report(
    conn: &Connection,
    customer_id: &Uuid,
    report: NewReport,
) -> Result<Vec<Report>, DatabaseError> {
    let tx = conn.unchecked_transaction()?;
    touch_customer(&tx, customer_id)?;

    let report = report.into_report(Utc::now());
    tx.execute(
        "INSERT INTO customer_reports (customer_id, report_type, file_url, uploaded_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            customer_id.to_string(),
            report.report_type,
            report.file_url,
            report.uploaded_at.to_rfc3339(),
        ],
    )?;

    let reports = list_reports(&tx, customer_id)?;
    tx.commit()?;
    Ok(reports)
}

/// Remove the report at `index` (0-based, upload order).
pub fn remove_report(
    conn: &Connection,
    customer_id: &Uuid,
    index: usize,
) -> Result<Vec<Report>, DatabaseError> {
    let offset = position_offset("report", index)?;
    let tx = conn.unchecked_transaction()?;
    touch_customer(&tx, customer_id)?;

    let row_id: i64 = tx
        .query_row(
            "SELECT id FROM customer_reports WHERE customer_id = ?1
             ORDER BY id LIMIT 1 OFFSET ?2",
            params![customer_id.to_string(), offset],
            |row| row.get(0),
        )
        .optional()?
        .ok_or_else(|| entry_not_found("report", index))?;

    tx.execute("DELETE FROM customer_reports WHERE id = ?1", params![row_id])?;

    let reports = list_reports(&tx, customer_id)?;
    tx.commit()?;
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::insert_customer;
    use crate::db::sqlite::scratch_database;
    use crate::models::enums::Gender;

    fn setup() -> (Connection, Uuid) {
        let conn = scratch_database().unwrap();
        let customer = insert_customer(
            &conn,
            &NewCustomer {
                name: "Kiran".into(),
                age: 29,
                gender: Gender::Other,
                email: "kiran@example.com".into(),
                med_id: generate_med_id(),
                password_hash: "hash".into(),
            },
        )
        .unwrap();
        (conn, customer.id)
    }

    fn new_report(kind: &str, url: &str) -> NewReport {
        NewReport {
            report_type: Some(kind.into()),
            file_url: url.into(),
        }
    }

    #[test]
    fn append_stamps_upload_time() {
        let (conn, id) = setup();
        let before = Utc::now();
        let reports = append_report(&conn, &id, new_report("MRI", "https://f/1")).unwrap();
        assert_eq!(reports.len(), 1);
        assert!(reports[0].uploaded_at >= before);
        assert_eq!(reports[0].report_type.as_deref(), Some("MRI"));
    }

    #[test]
    fn remove_keeps_remaining_order() {
        let (conn, id) = setup();
        append_report(&conn, &id, new_report("Blood Test", "https://f/1")).unwrap();
        append_report(&conn, &id, new_report("MRI", "https://f/2")).unwrap();
        append_report(&conn, &id, new_report("Prescription", "https://f/3")).unwrap();

        let reports = remove_report(&conn, &id, 0).unwrap();
        let urls: Vec<&str> = reports.iter().map(|r| r.file_url.as_str()).collect();
        assert_eq!(urls, vec!["https://f/2", "https://f/3"]);
    }

    #[test]
    fn remove_from_empty_list_is_not_found() {
        let (conn, id) = setup();
        let err = remove_report(&conn, &id, 0).unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[test]
    fn huge_index_does_not_wrap_to_first() {
        let (conn, id) = setup();
        append_report(&conn, &id, new_report("Blood Test", "https://f/1")).unwrap();

        let err = remove_report(&conn, &id, usize::MAX).unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { ref entity_type, .. } if entity_type == "report"));
        assert_eq!(list_reports(&conn, &id).unwrap().len(), 1);
    }
}
