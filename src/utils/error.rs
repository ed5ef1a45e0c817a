use thiserror::Error;

#[derive(Error, Debug)]
pub enum RedactorError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Image codec error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Unreadable image '{source_name}': {reason}")]
    UnreadableImage { source_name: String, reason: String },

    #[error("Unsupported image format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Unknown node: {id}")]
    UnknownNode { id: String },

    #[error("Node '{node}' has no input slot '{slot}'")]
    UnknownSlot { node: String, slot: String },

    #[error("Type mismatch on '{node}.{slot}': expected {expected}, found {found}")]
    TypeMismatch {
        node: String,
        slot: String,
        expected: String,
        found: String,
    },

    #[error("Node '{node}' is missing input '{slot}'")]
    MissingInput { node: String, slot: String },

    #[error("Invalid parameter on node '{node}': {reason}")]
    InvalidParameter { node: String, reason: String },

    #[error("Linking into '{node}' would create a cycle")]
    CycleDetected { node: String },

    #[error("Duplicate node id: {id}")]
    DuplicateNode { id: String },

    #[error("The end node '{id}' cannot be removed")]
    ProtectedNode { id: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Image,
    Graph,
    Configuration,
    Serialization,
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl RedactorError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            RedactorError::IoError(_) => ErrorCategory::Io,
            RedactorError::SerializationError(_) => ErrorCategory::Serialization,
            RedactorError::ImageError(_)
            | RedactorError::UnreadableImage { .. }
            | RedactorError::UnsupportedFormat { .. } => ErrorCategory::Image,
            RedactorError::ConfigError { .. }
            | RedactorError::ConfigValidationError { .. }
            | RedactorError::InvalidConfigValueError { .. }
            | RedactorError::MissingConfigError { .. } => ErrorCategory::Configuration,
            RedactorError::UnknownNode { .. }
            | RedactorError::UnknownSlot { .. }
            | RedactorError::TypeMismatch { .. }
            | RedactorError::MissingInput { .. }
            | RedactorError::InvalidParameter { .. }
            | RedactorError::CycleDetected { .. }
            | RedactorError::DuplicateNode { .. }
            | RedactorError::ProtectedNode { .. } => ErrorCategory::Graph,
            RedactorError::ProcessingError { .. } | RedactorError::ValidationError { .. } => {
                ErrorCategory::Processing
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // the graph is still editable, nothing was written
            RedactorError::MissingInput { .. } => ErrorSeverity::Low,
            RedactorError::IoError(e) if e.kind() == std::io::ErrorKind::Interrupted => {
                ErrorSeverity::Medium
            }
            RedactorError::IoError(_) => ErrorSeverity::Critical,
            RedactorError::ProcessingError { .. } => ErrorSeverity::Medium,
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            RedactorError::IoError(_) => {
                "Check that the path exists and that you have permission to read and write it"
                    .to_string()
            }
            RedactorError::SerializationError(_) => {
                "The file is not valid JSON for this tool; re-save it from image-redactor".to_string()
            }
            RedactorError::ImageError(_) | RedactorError::UnreadableImage { .. } => {
                "The image appears to be corrupt; try re-exporting it as PNG or JPEG".to_string()
            }
            RedactorError::UnsupportedFormat { .. } => {
                "Use a .png, .jpg, .jpeg or .bmp file".to_string()
            }
            RedactorError::ConfigError { .. }
            | RedactorError::ConfigValidationError { .. }
            | RedactorError::InvalidConfigValueError { .. } => {
                "Fix the configuration value and run again".to_string()
            }
            RedactorError::MissingConfigError { field } => {
                format!("Add '{}' to the configuration", field)
            }
            RedactorError::UnknownNode { .. } | RedactorError::UnknownSlot { .. } => {
                "The graph file references nodes that do not exist; re-save it".to_string()
            }
            RedactorError::TypeMismatch { expected, .. } => {
                format!("Connect an output of type {} to this slot", expected)
            }
            RedactorError::MissingInput { slot, .. } => {
                format!("Connect a node to '{}'", slot)
            }
            RedactorError::InvalidParameter { .. } => {
                "Adjust the value node feeding this filter".to_string()
            }
            RedactorError::CycleDetected { .. } => {
                "Remove the link that feeds a node's output back into itself".to_string()
            }
            RedactorError::DuplicateNode { .. } => "Give every node a unique id".to_string(),
            RedactorError::ProtectedNode { .. } => {
                "Every graph keeps exactly one end node".to_string()
            }
            RedactorError::ProcessingError { .. } => "Retry the operation".to_string(),
            RedactorError::ValidationError { .. } => {
                "Check the input described above and try again".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Io => format!("Could not access a file: {}", self),
            ErrorCategory::Image => format!("Image problem: {}", self),
            ErrorCategory::Graph => format!("Node graph problem: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Serialization => format!("Could not read or write a file: {}", self),
            ErrorCategory::Processing => format!("Processing failed: {}", self),
        }
    }

    /// Process exit code used by the command line tools.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low | ErrorSeverity::High => 1,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, RedactorError>;
