//! Error types for the exchange rate service.

/// Domain-level errors (business rule violations).
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("No exchange rate matched the requested date and currency")]
    NoResult,

    #[error("Currency {0} not present in this collection")]
    CurrencyNotFound(String),

    #[error("Invalid date integer: {0}")]
    InvalidDate(u32),

    #[error("Rate for {currency} must be positive and finite, got {rate}")]
    InvalidRate { currency: String, rate: f64 },

    #[error("Malformed page token")]
    BadPageToken,

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Repository-level errors (store access failures).
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("No rows matched the query")]
    NoResult,

    #[error("Batch write gave up after {attempts} attempts with {remaining} items unprocessed")]
    WriteExhausted { attempts: u32, remaining: usize },
}

/// Application-level errors (for HTTP responses).
///
/// Maps cleanly to HTTP status codes and the response envelope's
/// `{status, code, message}` fields.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status the error is reported with.
    pub fn http_status(&self) -> u16 {
        match self {
            AppError::BadRequest(_) => 400,
            AppError::NotFound(_) => 404,
            AppError::Internal(_) => 500,
        }
    }

    /// Stable application error code carried in the response envelope.
    pub fn code(&self) -> u16 {
        match self {
            AppError::BadRequest(_) => 100,
            AppError::NotFound(_) => 202,
            AppError::Internal(_) => 500,
        }
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NoResult => AppError::NotFound("No exchange rate found".into()),
            DomainError::CurrencyNotFound(currency) => {
                AppError::NotFound(format!("Currency not found: {}", currency))
            }
            DomainError::BadPageToken => AppError::BadRequest("Malformed page token".into()),
            DomainError::Validation(msg) => AppError::BadRequest(msg),
            DomainError::InvalidDate(date) => {
                AppError::BadRequest(format!("Invalid date: {}", date))
            }
            // A stored rate that fails the positivity invariant is a data
            // integrity problem, not a caller mistake.
            e @ DomainError::InvalidRate { .. } => AppError::Internal(e.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Domain(e) => e.into(),
            RepoError::NoResult => AppError::NotFound("No exchange rate found".into()),
            RepoError::Storage(e) => AppError::Internal(e),
            e @ RepoError::WriteExhausted { .. } => AppError::Internal(e.to_string()),
        }
    }
}
