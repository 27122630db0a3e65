use std::path::PathBuf;

/// Failures while loading the template catalog from disk.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid manifest {path}: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Duplicate template id '{0}'")]
    DuplicateId(String),

    #[error("Template '{id}' does not compile: {source}")]
    Compile {
        id: String,
        #[source]
        source: Box<handlebars::TemplateError>,
    },
}
