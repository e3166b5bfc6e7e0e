//! Storage key layout for customer files.
//!
//! ```text
//! {customer_id}/{filename}              general uploads and catalogue CSVs
//! {customer_id}/prompt.txt              recommendation prompt override
//! {customer_id}/chat_files/{filename}   chat attachments
//! ```

use crate::provider::{Result, StorageError};

pub const CHAT_FILES_DIR: &str = "chat_files";
pub const PROMPT_FILE_NAME: &str = "prompt.txt";

/// A customer id or file name must be exactly one non-empty path segment.
pub fn validate_segment(segment: &str) -> Result<&str> {
    let reason = if segment.trim().is_empty() {
        Some("must not be empty")
    } else if segment.contains('/') || segment.contains('\\') {
        Some("must not contain path separators")
    } else if segment == "." || segment == ".." {
        Some("must not be a relative path component")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(StorageError::InvalidKey {
            segment: segment.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(segment),
    }
}

pub fn customer_prefix(customer_id: &str) -> Result<String> {
    Ok(format!("{}/", validate_segment(customer_id)?))
}

pub fn chat_files_prefix(customer_id: &str) -> Result<String> {
    Ok(format!("{}/{}/", validate_segment(customer_id)?, CHAT_FILES_DIR))
}

pub fn chat_file_key(customer_id: &str, file_name: &str) -> Result<String> {
    Ok(format!(
        "{}{}",
        chat_files_prefix(customer_id)?,
        validate_segment(file_name)?
    ))
}

pub fn upload_key(customer_id: &str, file_name: &str) -> Result<String> {
    Ok(format!(
        "{}{}",
        customer_prefix(customer_id)?,
        validate_segment(file_name)?
    ))
}

pub fn prompt_key(customer_id: &str) -> Result<String> {
    upload_key(customer_id, PROMPT_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_chat_and_upload_keys() {
        assert_eq!(
            chat_file_key("acme", "report.csv").unwrap(),
            "acme/chat_files/report.csv"
        );
        assert_eq!(upload_key("acme", "report.csv").unwrap(), "acme/report.csv");
        assert_eq!(prompt_key("acme").unwrap(), "acme/prompt.txt");
    }

    #[test]
    fn prefixes_end_with_separator() {
        assert_eq!(customer_prefix("acme").unwrap(), "acme/");
        assert_eq!(chat_files_prefix("acme").unwrap(), "acme/chat_files/");
    }

    #[test]
    fn rejects_traversal_and_separators() {
        for bad in ["", "  ", ".", "..", "a/b", "..\\etc", "../acme"] {
            assert!(
                matches!(validate_segment(bad), Err(StorageError::InvalidKey { .. })),
                "{bad:?} should be rejected"
            );
        }
        assert!(upload_key("acme", "../other/prompt.txt").is_err());
        assert!(chat_file_key("..", "report.csv").is_err());
    }

    #[test]
    fn dotted_file_names_are_fine() {
        assert_eq!(validate_segment(".env.sample").unwrap(), ".env.sample");
    }
}
