//! Error types for the phage-translocation library.

use thiserror::Error;

/// Main error type for the library.
///
/// Every variant is fatal to a batch run: the pipeline stops before any
/// figure table is written.
#[derive(Error, Debug)]
pub enum TranslocationError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing column '{column}' in {table} table")]
    Schema { table: String, column: String },

    #[error("{count} identifier(s) in the {source_table} table are absent from the {target_table} table: {preview}")]
    KeyMismatch {
        source_table: String,
        target_table: String,
        count: usize,
        preview: String,
    },

    #[error("Duplicate identifier '{key}' in {table} table")]
    DuplicateKey { table: String, key: String },

    #[error("Invalid value '{value}' for {column} of '{key}' in {table} table")]
    InvalidValue {
        table: String,
        key: String,
        column: String,
        value: String,
    },

    #[error("Sample identifier '{0}' does not follow the <individual>_<F|B> convention")]
    InvalidSampleId(String),

    #[error("Sample '{sample_id}' has zero total abundance after filtering, cannot normalize")]
    EmptySample { sample_id: String },

    #[error("Empty data: {0}")]
    EmptyData(String),

    #[error("Numerical error: {0}")]
    Numerical(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Pipeline error: {0}")]
    Pipeline(String),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TranslocationError {
    /// Build a key mismatch error, listing at most a handful of the missing keys.
    pub fn key_mismatch(source_table: &str, target_table: &str, missing: &[String]) -> Self {
        const PREVIEW: usize = 5;
        let mut preview = missing
            .iter()
            .take(PREVIEW)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        if missing.len() > PREVIEW {
            preview.push_str(&format!(", ... ({} more)", missing.len() - PREVIEW));
        }
        Self::KeyMismatch {
            source_table: source_table.to_string(),
            target_table: target_table.to_string(),
            count: missing.len(),
            preview,
        }
    }

    /// Build a schema error for a missing column.
    pub fn missing_column(table: &str, column: &str) -> Self {
        Self::Schema {
            table: table.to_string(),
            column: column.to_string(),
        }
    }
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, TranslocationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_mismatch_preview_truncates() {
        let missing: Vec<String> = (0..8).map(|i| format!("vOTU_{}", i)).collect();
        let err = TranslocationError::key_mismatch("abundance", "taxonomy", &missing);
        let msg = err.to_string();
        assert!(msg.starts_with("8 identifier(s)"));
        assert!(msg.contains("vOTU_4"));
        assert!(!msg.contains("vOTU_5,"));
        assert!(msg.contains("(3 more)"));
    }

    #[test]
    fn test_schema_message_names_column() {
        let err = TranslocationError::missing_column("metadata", "Disease");
        assert_eq!(err.to_string(), "Missing column 'Disease' in metadata table");
    }
}
