use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("No home directory")]
    NoHomeDir,

    #[error("Validation error: {field}={value} violates {constraint}")]
    Validation {
        field: String,
        value: String,
        constraint: String,
    },

    #[error("Circular dependency detected at node: {node}")]
    CircularDependency { node: String },

    #[error("No suitable member found ({candidates} candidates, required skills: {required_skills:?})")]
    InsufficientSkills {
        required_skills: Vec<String>,
        candidates: usize,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Routing failed for blueprint {blueprint_id} in project {project_id}: {message}")]
    Routing {
        blueprint_id: String,
        project_id: String,
        message: String,
    },
}

impl Error {
    /// Construct a validation error from field name, offending value, and
    /// the constraint that was violated.
    pub fn validation(
        field: impl Into<String>,
        value: impl Into<String>,
        constraint: impl Into<String>,
    ) -> Self {
        Self::Validation {
            field: field.into(),
            value: value.into(),
            constraint: constraint.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
