use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{decode_list, encode_list, entry_not_found, parse_date, position_offset, touch_customer};
use crate::db::DatabaseError;
use crate::models::*;

/// Medications of one customer, in the order they were added.
pub fn list_medications(
    conn: &Connection,
    customer_id: &Uuid,
) -> Result<Vec<Medication>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT medicine_name, dosage, frequency, timings, start_date, end_date, reminder_enabled
         FROM customer_medications WHERE customer_id = ?1 ORDER BY id",
    )?;

    let rows = stmt.query_map(params![customer_id.to_string()], |row| {
        Ok(medication_row_from_rusqlite(row))
    })?;

    let mut meds = Vec::new();
    for row in rows {
        meds.push(medication_from_row(row??)?);
    }
    Ok(meds)
}

/// Append a medication and return the customer's full list.
pub fn append_medication(
    conn: &Connection,
    customer_id: &Uuid,
    med: &Medication,
) -> Result<Vec<Medication>, DatabaseError> {
    let tx = conn.unchecked_transaction()?;
    touch_customer(&tx, customer_id)?;

    tx.execute(
        "INSERT INTO customer_medications (customer_id, medicine_name, dosage, frequency,
         timings, start_date, end_date, reminder_enabled)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            customer_id.to_string(),
            med.medicine_name,
            med.dosage,
            med.frequency,
            encode_list("timings", &med.timings)?,
            med.start_date.map(|d| d.to_string()),
            med.end_date.map(|d| d.to_string()),
            med.reminder_enabled as i32,
        ],
    )?;

    let meds = list_medications(&tx, customer_id)?;
    tx.commit()?;
    Ok(meds)
}

/// Remove the medication at `index` (0-based, insertion order).
pub fn remove_medication(
    conn: &Connection,
    customer_id: &Uuid,
    index: usize,
) -> Result<Vec<Medication>, DatabaseError> {
    let offset = position_offset("medication", index)?;
    let tx = conn.unchecked_transaction()?;
    touch_customer(&tx, customer_id)?;

    let row_id: Option<i64> = tx
        .query_row(
            "SELECT id FROM customer_medications WHERE customer_id = ?1
             ORDER BY id LIMIT 1 OFFSET ?2",
            params![customer_id.to_string(), offset],
            |row| row.get(0),
        )
        .optional()?;

    let row_id = row_id.ok_or_else(|| entry_not_found("medication", index))?;

    tx.execute(
        "DELETE FROM customer_medications WHERE id = ?1",
        params![row_id],
    )?;

    let meds = list_medications(&tx, customer_id)?;
    tx.commit()?;
    Ok(meds)
}

// Internal row type for Medication mapping
struct MedicationRow {
    medicine_name: String,
    dosage: Option<String>,
    frequency: Option<String>,
    timings: String,
    start_date: Option<String>,
    end_date: Option<String>,
    reminder_enabled: i32,
}

fn medication_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<MedicationRow, rusqlite::Error> {
    Ok(MedicationRow {
        medicine_name: row.get(0)?,
        dosage: row.get(1)?,
        frequency: row.get(2)?,
        timings: row.get(3)?,
        start_date: row.get(4)?,
        end_date: row.get(5)?,
        reminder_enabled: row.get(6)?,
    })
}

fn medication_from_row(row: MedicationRow) -> Result<Medication, DatabaseError> {
    Ok(Medication {
        medicine_name: row.medicine_name,
        dosage: row.dosage,
        frequency: row.frequency,
        timings: decode_list("timings", &row.timings)?,
        start_date: parse_date("start_date", row.start_date)?,
        end_date: parse_date("end_date", row.end_date)?,
        reminder_enabled: row.reminder_enabled != 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::{get_customer, insert_customer};
    use crate::db::sqlite::scratch_database;
    use crate::models::enums::Gender;
    use chrono::NaiveDate;

    fn setup() -> (Connection, Customer) {
        let conn = scratch_database().unwrap();
        let customer = insert_customer(
            &conn,
            &NewCustomer {
                name: "Meera".into(),
                age: 61,
                gender: Gender::Female,
                email: "meera@example.com".into(),
                med_id: generate_med_id(),
                password_hash: "hash".into(),
            },
        )
        .unwrap();
        (conn, customer)
    }

    fn med(name: &str) -> Medication {
        Medication {
            medicine_name: name.into(),
            dosage: Some("10mg".into()),
            frequency: Some("Twice a day".into()),
            timings: vec!["Morning".into(), "Night".into()],
            start_date: NaiveDate::from_ymd_opt(2025, 2, 1),
            end_date: None,
            reminder_enabled: true,
        }
    }

    #[test]
    fn append_preserves_order_and_fields() {
        let (conn, customer) = setup();
        append_medication(&conn, &customer.id, &med("Amlodipine")).unwrap();
        let meds = append_medication(&conn, &customer.id, &med("Metformin")).unwrap();

        assert_eq!(meds.len(), 2);
        assert_eq!(meds[0].medicine_name, "Amlodipine");
        assert_eq!(meds[1], med("Metformin"));
    }

    #[test]
    fn append_bumps_customer_updated_at() {
        let (conn, customer) = setup();
        append_medication(&conn, &customer.id, &med("Amlodipine")).unwrap();
        let reloaded = get_customer(&conn, &customer.id).unwrap().unwrap();
        assert!(reloaded.updated_at >= customer.updated_at);
        assert_eq!(reloaded.medications.len(), 1);
    }

    #[test]
    fn remove_by_position() {
        let (conn, customer) = setup();
        for name in ["A", "B", "C"] {
            append_medication(&conn, &customer.id, &med(name)).unwrap();
        }
        let meds = remove_medication(&conn, &customer.id, 1).unwrap();
        let names: Vec<&str> = meds.iter().map(|m| m.medicine_name.as_str()).collect();
        assert_eq!(names, vec!["A", "C"]);

        let meds = remove_medication(&conn, &customer.id, 1).unwrap();
        assert_eq!(meds.len(), 1);
        assert_eq!(meds[0].medicine_name, "A");
    }

    #[test]
    fn remove_out_of_range_is_not_found() {
        let (conn, customer) = setup();
        append_medication(&conn, &customer.id, &med("Only")).unwrap();
        let err = remove_medication(&conn, &customer.id, 1).unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { ref entity_type, .. } if entity_type == "medication"));
        assert_eq!(list_medications(&conn, &customer.id).unwrap().len(), 1);
    }

    #[test]
    fn huge_index_does_not_wrap_to_first() {
        let (conn, customer) = setup();
        append_medication(&conn, &customer.id, &med("First")).unwrap();
        append_medication(&conn, &customer.id, &med("Second")).unwrap();

        let err = remove_medication(&conn, &customer.id, usize::MAX).unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { ref entity_type, .. } if entity_type == "medication"));
        let names: Vec<String> = list_medications(&conn, &customer.id)
            .unwrap()
            .into_iter()
            .map(|m| m.medicine_name)
            .collect();
        assert_eq!(names, vec!["First", "Second"]);
    }

    #[test]
    fn append_for_unknown_customer_fails() {
        let (conn, _) = setup();
        let err = append_medication(&conn, &Uuid::new_v4(), &med("X")).unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }
}
