//! Grades store over a borrowed connection.

use std::sync::MutexGuard;

use rusqlite::types::Value;
use rusqlite::{params, Connection, OptionalExtension, ToSql};

use crate::record::{Fields, Grade, GradeRecord, NewGrade, GRADE, ID, SID};
use crate::DbError;

pub(crate) const TABLE: &str = "grades";

/// Grades store with a borrowed connection.
pub struct Grades<'db> {
    conn: MutexGuard<'db, Connection>,
}

impl<'db> Grades<'db> {
    pub(crate) fn new(conn: MutexGuard<'db, Connection>) -> Self {
        Self { conn }
    }

    /// Every stored grade, newest (highest id) first.
    pub fn list_all(&self) -> Result<Vec<Grade>, DbError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, sid, grade FROM grades ORDER BY id DESC")?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();

        let mut rows = stmt.query([])?;
        let mut grades = Vec::new();
        while let Some(row) = rows.next()? {
            grades.push(Self::row_to_grade(row, &columns)?);
        }

        tracing::debug!(count = grades.len(), "listed grades");
        Ok(grades)
    }

    /// Get a grade by id.
    pub fn get(&self, id: i64) -> Result<Option<Grade>, DbError> {
        let fields = self
            .conn
            .query_row(
                "SELECT id, sid, grade FROM grades WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Fields::from([
                        (ID.to_string(), row.get::<_, Value>(0)?),
                        (SID.to_string(), row.get::<_, Value>(1)?),
                        (GRADE.to_string(), row.get::<_, Value>(2)?),
                    ]))
                },
            )
            .optional()?;

        fields.as_ref().map(Grade::from_fields).transpose()
    }

    /// Insert a new grade and return the id the database assigned.
    pub fn insert(&self, new: &NewGrade) -> Result<i64, DbError> {
        let fields = GradeRecord::Unsaved(new.clone()).to_fields();
        let columns: Vec<&str> = fields.keys().map(String::as_str).collect();
        let placeholders: Vec<String> = columns.iter().map(|c| format!(":{}", c)).collect();

        let sql = format!(
            "INSERT INTO {TABLE} ({}) VALUES ({})",
            columns.join(", "),
            placeholders.join(", ")
        );
        self.execute_named(&sql, &fields)?;

        let id = self.conn.last_insert_rowid();
        tracing::debug!(id, "inserted grade");
        Ok(id)
    }

    /// Overwrite the row with `grade.id`. Returns the number of rows
    /// affected; 0 means no row had that id.
    pub fn update(&self, grade: &Grade) -> Result<usize, DbError> {
        let fields = grade.to_fields();
        let assignments: Vec<String> = fields
            .keys()
            .filter(|k| k.as_str() != ID)
            .map(|k| format!("{k} = :{k}"))
            .collect();

        let sql = format!(
            "UPDATE {TABLE} SET {} WHERE {ID} = :{ID}",
            assignments.join(", ")
        );
        let rows_affected = self.execute_named(&sql, &fields)?;

        tracing::debug!(id = grade.id, rows_affected, "updated grade");
        Ok(rows_affected)
    }

    /// Delete a grade by id. Returns the number of rows affected.
    pub fn delete_by_id(&self, id: i64) -> Result<usize, DbError> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM grades WHERE id = ?1", params![id])?;

        tracing::debug!(id, rows_affected, "deleted grade");
        Ok(rows_affected)
    }

    /// Number of stored grades.
    pub fn count(&self) -> Result<usize, DbError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM grades", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn execute_named(&self, sql: &str, fields: &Fields) -> Result<usize, DbError> {
        let names: Vec<String> = fields.keys().map(|k| format!(":{}", k)).collect();
        let params: Vec<(&str, &dyn ToSql)> = names
            .iter()
            .zip(fields.values())
            .map(|(name, value)| (name.as_str(), value as &dyn ToSql))
            .collect();

        Ok(self.conn.execute(sql, params.as_slice())?)
    }

    fn row_to_grade(row: &rusqlite::Row, columns: &[String]) -> Result<Grade, DbError> {
        let mut fields = Fields::new();
        for (idx, name) in columns.iter().enumerate() {
            fields.insert(name.clone(), row.get::<_, Value>(idx)?);
        }
        Grade::from_fields(&fields)
    }
}
