use thiserror::Error;

/// Failures surfaced to whoever submitted a candidate-site upload.
#[derive(Debug, Error)]
pub enum SitingError {
    #[error("No file part in the request")]
    MissingFile,

    #[error("No selected file")]
    EmptyFilename,

    #[error("Only .zip shapefiles are supported")]
    UnsupportedExtension,

    #[error("No .shp file found in ZIP")]
    NoShapefile,

    #[error("Invalid ZIP archive: {0:#}")]
    InvalidArchive(anyhow::Error),

    #[error("Invalid shapefile: {0:#}")]
    Data(anyhow::Error),

    #[error("Infrastructure data unavailable: {0:#}")]
    Infrastructure(anyhow::Error),

    #[error("Processing failed: {0:#}")]
    Unexpected(anyhow::Error),
}

impl SitingError {
    /// True for problems with the submitted upload rather than with the service.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, SitingError::Infrastructure(_) | SitingError::Unexpected(_))
    }

    /// HTTP status code for this failure.
    pub fn status(&self) -> u16 {
        match self {
            SitingError::InvalidArchive(_) | SitingError::Data(_) => 422,
            SitingError::Infrastructure(_) => 503,
            SitingError::Unexpected(_) => 500,
            _ => 400,
        }
    }
}
