use std::path::PathBuf;

/// Fatal error taxonomy for the scoring pipeline.
///
/// Every variant here aborts the run before a report is produced.
/// Non-fatal conditions (a malformed SARIF result, an unparseable linker
/// symbol) never surface as `Error`; they are recorded as warnings in the
/// report's analysis block or silently omitted, depending on the source.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A size literal did not match the accepted grammar.
    #[error(
        "cannot parse size value '{value}': expected '2KB', '256K', '1MB', \
         '0x4000', or plain integer bytes"
    )]
    InvalidSize { value: String },

    /// A time literal did not match the accepted grammar.
    #[error(
        "cannot parse time value '{value}': expected '50us', '100ms', '1s', \
         or plain integer microseconds"
    )]
    InvalidTime { value: String },

    /// The run configuration or a constraint document failed validation.
    #[error("configuration error: {0}")]
    Config(String),

    /// A required input file does not exist.
    #[error("file not found: {}", path.display())]
    MissingFile { path: PathBuf },

    /// A SARIF document is structurally unusable (unreadable, not JSON,
    /// or not a JSON object at the top level).
    #[error("invalid SARIF document {}: {reason}", path.display())]
    InvalidSarif { path: PathBuf, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_error_names_value_and_grammar() {
        let err = Error::InvalidSize {
            value: "12XB".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("'12XB'"));
        assert!(msg.contains("2KB"));
    }

    #[test]
    fn missing_file_error_names_path() {
        let err = Error::MissingFile {
            path: PathBuf::from("board.ld"),
        };
        assert!(err.to_string().contains("board.ld"));
    }
}
