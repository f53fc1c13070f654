use thiserror::Error;

#[derive(Error, Debug)]
pub enum SeatingError {
    #[error("Invalid transfer: {message}")]
    InvalidTransfer { message: String },

    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("Team {team_id} is full ({capacity} members)")]
    CapacityExceeded { team_id: String, capacity: usize },

    #[error("Room {name} (level {level}) already exists")]
    DuplicateRoom { name: String, level: String },

    #[error("Seat code {code} is already in the pool")]
    DuplicateSeatCode { code: String },

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("Webhook request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration field '{field}' is invalid: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Domain,
    Configuration,
    Io,
    Export,
    Notification,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SeatingError {
    pub fn not_found(entity: &str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.to_string(),
            id: id.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidTransfer { .. }
            | Self::NotFound { .. }
            | Self::CapacityExceeded { .. }
            | Self::DuplicateRoom { .. }
            | Self::DuplicateSeatCode { .. }
            | Self::ValidationError { .. } => ErrorCategory::Domain,
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::IoError(_) => ErrorCategory::Io,
            Self::CsvError(_) | Self::SerializationError(_) | Self::ZipError(_) => {
                ErrorCategory::Export
            }
            Self::HttpError(_) => ErrorCategory::Notification,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 座位已分配完成，只是通知失敗
            ErrorCategory::Notification => ErrorSeverity::Medium,
            ErrorCategory::Domain | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Io | ErrorCategory::Export => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::InvalidTransfer { .. } => "Pick two different teams for the transfer",
            Self::NotFound { .. } => "Check the student and team ids against the roster file",
            Self::CapacityExceeded { .. } => {
                "Move someone out of the destination team first or raise rules.team_capacity"
            }
            Self::DuplicateRoom { .. } => "Each (room name, level) pair may only be listed once",
            Self::DuplicateSeatCode { .. } => "Remove the repeated seat code from the room list",
            Self::ValidationError { .. } => "Fix the roster document and run again",
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => "Review the session TOML file",
            Self::IoError(_) => "Check that the paths exist and are writable",
            Self::CsvError(_) | Self::SerializationError(_) | Self::ZipError(_) => {
                "Check free disk space and the export settings"
            }
            Self::HttpError(_) => "Verify the webhook URL; seats were assigned and exported",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Domain => format!("Roster or seating rule violated: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Io => format!("File access failed: {}", self),
            ErrorCategory::Export => format!("Could not write the export: {}", self),
            ErrorCategory::Notification => format!("Could not notify teams: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, SeatingError>;
