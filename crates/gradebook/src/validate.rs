//! Input checks for grade entries.
//!
//! The store accepts any text; these rules belong to the front end. The
//! functions double as clap value parsers and dialoguer validators.

/// Required length of a subject id.
pub const SUBJECT_ID_LEN: usize = 9;

/// A subject id is exactly nine ASCII digits.
pub fn parse_subject_id(input: &str) -> Result<String, String> {
    let sid = input.trim();
    if sid.len() != SUBJECT_ID_LEN || !sid.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!(
            "Subject ID must be exactly {} digits, got {:?}",
            SUBJECT_ID_LEN, input
        ));
    }
    Ok(sid.to_string())
}

/// A grade is any non-blank text.
pub fn parse_grade(input: &str) -> Result<String, String> {
    let grade = input.trim();
    if grade.is_empty() {
        return Err("Grade must not be empty".to_string());
    }
    Ok(grade.to_string())
}
