use thiserror::Error;

/// Failures surfaced while fetching or reading race documents.
///
/// Optional attributes never end up here: they are read as `Option` and
/// resolved to their absent value during normalization.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("request to {url} failed: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("document has no <{0}> element")]
    MissingElement(&'static str),

    #[error("<{element}> is missing required attribute `{attr}`")]
    MissingAttribute { element: String, attr: String },

    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("invalid {column} value {value:?}")]
    InvalidCell { column: &'static str, value: String },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ScrapeError {
    /// True for failures that only concern the shape of one document.
    pub fn is_schema(&self) -> bool {
        matches!(
            self,
            Self::MissingElement(_) | Self::MissingAttribute { .. } | Self::Xml(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
