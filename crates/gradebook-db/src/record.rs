//! Grade records and their key-value storage form.

use std::collections::BTreeMap;

use rusqlite::types::Value;
use serde::{Deserialize, Serialize};

use crate::DbError;

/// Key-value form of a record as it is written to and read from storage.
pub type Fields = BTreeMap<String, Value>;

pub(crate) const ID: &str = "id";
pub(crate) const SID: &str = "sid";
pub(crate) const GRADE: &str = "grade";

/// A grade that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGrade {
    pub subject_id: String,
    pub grade: String,
}

impl NewGrade {
    pub fn new(subject_id: impl Into<String>, grade: impl Into<String>) -> Self {
        Self {
            subject_id: subject_id.into(),
            grade: grade.into(),
        }
    }

    /// Attach the identity the store assigned on insert.
    pub fn saved_as(self, id: i64) -> Grade {
        Grade {
            id,
            subject_id: self.subject_id,
            grade: self.grade,
        }
    }
}

/// A persisted grade. The id is assigned by the store and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grade {
    pub id: i64,
    pub subject_id: String,
    pub grade: String,
}

impl Grade {
    /// Copy of this record with a different grade, for edits.
    pub fn with_grade(&self, grade: impl Into<String>) -> Self {
        Self {
            grade: grade.into(),
            ..self.clone()
        }
    }

    /// Copy of this record with a different subject id, for edits.
    pub fn with_subject_id(&self, subject_id: impl Into<String>) -> Self {
        Self {
            subject_id: subject_id.into(),
            ..self.clone()
        }
    }

    pub fn to_fields(&self) -> Fields {
        GradeRecord::Saved(self.clone()).to_fields()
    }

    /// Decode a stored row. All three keys must be present with the
    /// expected types.
    pub fn from_fields(fields: &Fields) -> Result<Self, DbError> {
        let id = match fields.get(ID) {
            Some(value) => integer_field(ID, value)?,
            None => return Err(DbError::missing(ID)),
        };
        let (subject_id, grade) = text_fields(fields)?;

        Ok(Self {
            id,
            subject_id,
            grade,
        })
    }
}

/// A grade record that may or may not have been persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GradeRecord {
    Unsaved(NewGrade),
    Saved(Grade),
}

impl GradeRecord {
    pub fn id(&self) -> Option<i64> {
        match self {
            GradeRecord::Unsaved(_) => None,
            GradeRecord::Saved(grade) => Some(grade.id),
        }
    }

    pub fn subject_id(&self) -> &str {
        match self {
            GradeRecord::Unsaved(new) => &new.subject_id,
            GradeRecord::Saved(grade) => &grade.subject_id,
        }
    }

    pub fn grade(&self) -> &str {
        match self {
            GradeRecord::Unsaved(new) => &new.grade,
            GradeRecord::Saved(grade) => &grade.grade,
        }
    }

    /// Serialize for storage. The `id` key is omitted for unsaved records
    /// so the database assigns one.
    pub fn to_fields(&self) -> Fields {
        let mut fields = Fields::new();
        if let Some(id) = self.id() {
            fields.insert(ID.to_string(), Value::Integer(id));
        }
        fields.insert(SID.to_string(), Value::Text(self.subject_id().to_string()));
        fields.insert(GRADE.to_string(), Value::Text(self.grade().to_string()));
        fields
    }

    /// Decode a mapping where `id` is optional. A present `id` must still be
    /// an integer.
    pub fn from_fields(fields: &Fields) -> Result<Self, DbError> {
        match fields.get(ID) {
            Some(_) => Grade::from_fields(fields).map(GradeRecord::Saved),
            None => {
                let (subject_id, grade) = text_fields(fields)?;
                Ok(GradeRecord::Unsaved(NewGrade { subject_id, grade }))
            }
        }
    }
}

impl From<NewGrade> for GradeRecord {
    fn from(new: NewGrade) -> Self {
        GradeRecord::Unsaved(new)
    }
}

impl From<Grade> for GradeRecord {
    fn from(grade: Grade) -> Self {
        GradeRecord::Saved(grade)
    }
}

fn text_fields(fields: &Fields) -> Result<(String, String), DbError> {
    let subject_id = match fields.get(SID) {
        Some(value) => text_field(SID, value)?,
        None => return Err(DbError::missing(SID)),
    };
    let grade = match fields.get(GRADE) {
        Some(value) => text_field(GRADE, value)?,
        None => return Err(DbError::missing(GRADE)),
    };
    Ok((subject_id, grade))
}

fn integer_field(field: &'static str, value: &Value) -> Result<i64, DbError> {
    match value {
        Value::Integer(n) => Ok(*n),
        other => Err(DbError::wrong_type(field, "integer", other)),
    }
}

fn text_field(field: &'static str, value: &Value) -> Result<String, DbError> {
    match value {
        Value::Text(s) => Ok(s.clone()),
        other => Err(DbError::wrong_type(field, "text", other)),
    }
}
