use drivetime_router::RetrievalError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "No API key provided. Enter your OpenRouteService API key (--api-key or ORS_API_KEY) to enable drive-time analysis."
    )]
    MissingApiKey,

    #[error("Drive time must be between {min} and {max} minutes, got {value}")]
    DurationOutOfRange { value: u32, min: u32, max: u32 },

    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("Invalid provider settings: {0}")]
    Provider(String),
}

/// A required column is absent from one of the input tables.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("'{sheet}' sheet must include '{column}' column.")]
pub struct ValidationError {
    pub sheet: String,
    pub column: String,
}

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Unsupported input {0}: expected an .xlsx, .xls or .ods workbook, or a directory of CSV files")]
    Unsupported(String),

    #[error("Failed to open workbook: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("Failed to read {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("Input has no '{0}' sheet")]
    MissingSheet(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("'{sheet}' row {row}: column '{column}' has invalid value '{value}'")]
    InvalidCell {
        sheet: String,
        row: usize,
        column: String,
        value: String,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("Unknown project '{0}'")]
    UnknownProject(String),

    #[error("Unknown company location '{0}'")]
    UnknownCompany(String),
}

/// Any failure that ends the current interaction.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("Drive-time retrieval failed: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error(transparent)]
    State(#[from] StateError),
}
