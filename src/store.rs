use crate::student::{StoredStudent, StudentRecord, DEFAULT_STATUS};
use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use thiserror::Error;
use uuid::Uuid;

/// A rejection reported by the row store. The message is the store's own
/// text; `row` is the zero-based batch index when the failure is tied to one.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct StoreError {
    pub message: String,
    pub row: Option<usize>,
}

impl StoreError {
    fn at_row(row: usize, e: rusqlite::Error) -> Self {
        Self {
            message: e.to_string(),
            row: Some(row),
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        Self {
            message: e.to_string(),
            row: None,
        }
    }
}

/// Persistence seam for the import pipeline.
pub trait RowStore {
    /// Inserts every row or none of them.
    fn bulk_insert(&mut self, rows: &[StudentRecord]) -> Result<usize, StoreError>;
}

pub struct SqliteStudentStore<'c> {
    conn: &'c Connection,
}

const SELECT_COLUMNS: &str = "id, status, created_at, updated_at, owner_id,
    first_name, last_name, date_of_birth, gender, email, phone, address, city, state,
    zip_code, student_id, grade_level, class_section, admission_date, roll_number,
    parent_name, parent_email, parent_phone";

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn read_student(r: &Row<'_>) -> rusqlite::Result<StoredStudent> {
    Ok(StoredStudent {
        id: r.get(0)?,
        status: r.get(1)?,
        created_at: r.get(2)?,
        updated_at: r.get(3)?,
        record: StudentRecord {
            owner_id: r.get(4)?,
            first_name: r.get(5)?,
            last_name: r.get(6)?,
            date_of_birth: r.get(7)?,
            gender: r.get(8)?,
            email: r.get(9)?,
            phone: r.get(10)?,
            address: r.get(11)?,
            city: r.get(12)?,
            state: r.get(13)?,
            zip_code: r.get(14)?,
            student_id: r.get(15)?,
            grade_level: r.get(16)?,
            class_section: r.get(17)?,
            admission_date: r.get(18)?,
            roll_number: r.get(19)?,
            parent_name: r.get(20)?,
            parent_email: r.get(21)?,
            parent_phone: r.get(22)?,
        },
    })
}

fn insert_row(conn: &Connection, id: &str, s: &StudentRecord, now: &str) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO students(
           id, owner_id, first_name, last_name, date_of_birth, gender, email, phone,
           address, city, state, zip_code, student_id, grade_level, class_section,
           admission_date, roll_number, parent_name, parent_email, parent_phone,
           status, created_at, updated_at
         ) VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        params![
            id,
            s.owner_id,
            s.first_name,
            s.last_name,
            s.date_of_birth,
            s.gender,
            s.email,
            s.phone,
            s.address,
            s.city,
            s.state,
            s.zip_code,
            s.student_id,
            s.grade_level,
            s.class_section,
            s.admission_date,
            s.roll_number,
            s.parent_name,
            s.parent_email,
            s.parent_phone,
            DEFAULT_STATUS,
            now,
            now,
        ],
    )?;
    Ok(())
}

impl<'c> SqliteStudentStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn insert(&self, record: &StudentRecord) -> Result<StoredStudent, StoreError> {
        let id = Uuid::new_v4().to_string();
        insert_row(self.conn, &id, record, &now_rfc3339())?;
        self.get(&id)?.ok_or_else(|| StoreError {
            message: "inserted row not found".to_string(),
            row: None,
        })
    }

    /// Newest first, matching the roster page.
    pub fn list(&self) -> Result<Vec<StoredStudent>, StoreError> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM students ORDER BY created_at DESC, rowid DESC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], read_student)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn get(&self, id: &str) -> Result<Option<StoredStudent>, StoreError> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM students WHERE id = ?");
        Ok(self.conn.query_row(&sql, [id], read_student).optional()?)
    }

    /// Replaces the editable fields. Ownership, status and creation time are kept.
    pub fn update(&self, id: &str, s: &StudentRecord) -> Result<Option<StoredStudent>, StoreError> {
        let changed = self.conn.execute(
            "UPDATE students SET
               first_name = ?, last_name = ?, date_of_birth = ?, gender = ?, email = ?,
               phone = ?, address = ?, city = ?, state = ?, zip_code = ?, student_id = ?,
               grade_level = ?, class_section = ?, admission_date = ?, roll_number = ?,
               parent_name = ?, parent_email = ?, parent_phone = ?, updated_at = ?
             WHERE id = ?",
            params![
                s.first_name,
                s.last_name,
                s.date_of_birth,
                s.gender,
                s.email,
                s.phone,
                s.address,
                s.city,
                s.state,
                s.zip_code,
                s.student_id,
                s.grade_level,
                s.class_section,
                s.admission_date,
                s.roll_number,
                s.parent_name,
                s.parent_email,
                s.parent_phone,
                now_rfc3339(),
                id,
            ],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        self.get(id)
    }

    pub fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let changed = self.conn.execute("DELETE FROM students WHERE id = ?", [id])?;
        Ok(changed > 0)
    }
}

impl RowStore for SqliteStudentStore<'_> {
    fn bulk_insert(&mut self, rows: &[StudentRecord]) -> Result<usize, StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        let now = now_rfc3339();
        for (i, row) in rows.iter().enumerate() {
            let id = Uuid::new_v4().to_string();
            if let Err(e) = insert_row(&tx, &id, row, &now) {
                let _ = tx.rollback();
                return Err(StoreError::at_row(i, e));
            }
        }
        tx.commit()?;
        Ok(rows.len())
    }
}
