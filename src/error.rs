use thiserror::Error;

/// Errors raised while ingesting or transforming an uploaded dataset
///
/// Schema problems (`MissingColumn`, `MissingItem`) are user-facing: the web
/// layer shows their message on the upload page instead of failing the request.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// Reading or writing the uploaded file failed
    #[error("failed to read uploaded file: {0}")]
    Io(#[from] std::io::Error),

    /// The CSV reader rejected the file
    #[error("could not parse CSV file: {0}")]
    Csv(#[from] csv::Error),

    /// The Excel reader rejected the file
    #[error("could not parse Excel workbook: {0}")]
    Excel(#[from] calamine::Error),

    /// The file extension is not one we know how to load
    #[error("unsupported file type '{0}': expected .csv, .xls or .xlsx")]
    UnsupportedExtension(String),

    /// Catch-all for malformed file contents
    #[error("could not parse spreadsheet: {0}")]
    Parse(String),

    /// A column the transaction schema requires is absent
    #[error("invalid dataset schema: missing required column '{0}'")]
    MissingColumn(String),

    /// A pivoted item column the pipeline expects to drop is absent
    #[error("invalid dataset schema: expected item column '{0}' is not present")]
    MissingItem(String),

    /// No usable transactions survived cleaning
    #[error("dataset contains no usable transactions")]
    EmptyDataset,

    /// A stored session table failed to (de)serialize
    #[error("session data error: {0}")]
    Session(#[from] serde_json::Error),
}

impl DatasetError {
    /// Whether this error describes a problem with the uploaded data itself,
    /// as opposed to a server-side failure.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            DatasetError::Csv(_)
                | DatasetError::Excel(_)
                | DatasetError::UnsupportedExtension(_)
                | DatasetError::Parse(_)
                | DatasetError::MissingColumn(_)
                | DatasetError::MissingItem(_)
                | DatasetError::EmptyDataset
        )
    }
}
