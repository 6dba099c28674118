use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Value for a field that cannot be derived from the line.
pub const UNKNOWN: &str = "?";
/// Value for a request component that is absent from an otherwise valid request.
pub const ABSENT: &str = "-";
/// Value for a numeric field that cannot be derived from the line.
pub const MISSING_NUMBER: &str = "-1";

/// One normalized document, as loaded into the store.
///
/// Every field is always present; see [`UNKNOWN`], [`ABSENT`] and
/// [`MISSING_NUMBER`] for the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputRecord {
    /// `<raw timestamp>|<line hash>`, stable across re-ingestion
    pub id: String,
    pub datetime: DateTime<Utc>,
    pub web_server: String,
    pub host: String,
    pub method: String,
    pub protocol: String,
    pub resource: String,
    pub resource_params: String,
    pub code: String,
    /// Time taken to serve the request (`%D`)
    pub time: String,
    pub remote_user: String,
    pub remote_log_name: String,
    pub referer: String,
    pub user_agent: String,
    pub bytes: String,
    pub x_forward_for: Vec<String>,
    pub is_valid_line: bool,
    /// The raw line, verbatim
    pub log_text: String,
}
