/*!
 * Error types for the subnotes application.
 *
 * Each pipeline layer has its own error enum built with `thiserror`.
 * Per-line annotation failures are values (see `AnnotationError`), not
 * early returns, so a single bad line never aborts a season.
 */

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The request did not finish in time
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// The API answered without any text
    #[error("API returned an empty completion")]
    EmptyResponse,
}

/// Errors that can occur while reading subtitle files
#[derive(Error, Debug)]
pub enum SubtitleError {
    /// The file could not be read from disk
    #[error("Failed to read subtitle file {path}: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The content held no usable caption entries
    #[error("No valid subtitle entries found in {0}")]
    NoEntries(String),

    /// Percentage outside of (0, 100]
    #[error("Invalid percentage {0}: expected a value in (0, 100]")]
    InvalidPercentage(f64),
}

/// Structured cause of a failed annotation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnnotationError {
    /// The note extraction request failed
    #[error("{0}")]
    Extraction(ProviderError),

    /// The classification request failed
    #[error("{0}")]
    Classification(ProviderError),

    /// The model answered with a label outside of the vocabulary
    #[error("Unknown category returned by the model: {0}")]
    UnknownCategory(String),
}

/// Errors raised while writing or reading reports
#[derive(Error, Debug)]
pub enum ReportError {
    /// Spreadsheet creation failed
    #[error("Failed to write spreadsheet {path}: {message}")]
    Write { path: String, message: String },

    /// Spreadsheet could not be opened or parsed
    #[error("Failed to read spreadsheet {path}: {message}")]
    Read { path: String, message: String },

    /// Expected column missing from the header row
    #[error("Column '{column}' not found in {path}")]
    MissingColumn { path: String, column: String },

    /// Chart drawing failed
    #[error("Failed to render chart {path}: {message}")]
    Chart { path: String, message: String },

    /// Worksheet name that Excel would refuse
    #[error("Invalid worksheet name '{name}': {message}")]
    InvalidSheetName { name: String, message: String },
}
