//! Map — captured fields to [`OutputRecord`].
//!
//! Two shapes: full records for lines that matched the primary format, and
//! sentinel-filled records for lines only the fallback format could frame.

use std::fmt::Write;
use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset, Utc};
use regex::Regex;
use sha2::{Digest, Sha256};

use super::model::{OutputRecord, MISSING_NUMBER, UNKNOWN};
use super::request::{split_forwarded, RequestLine};
use crate::parser::{FieldKey, FieldMap, FieldValueError};

/// `%t` as Apache writes it, brackets included.
const REQUEST_TIME_FORMAT: &str = "[%d/%b/%Y:%H:%M:%S %z]";
/// Syslog framing timestamp once the offset colon is removed.
const SYSLOG_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";
/// Hex digits of the line digest kept in the record id.
const LINE_HASH_LEN: usize = 16;

static OFFSET_COLON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([+-]\d{2}):(\d{2})$").unwrap());

// Status following a quoted request line anywhere in the text, any HTTP version
static EMBEDDED_STATUS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"HTTP/\d(?:\.\d)?"\s(\d+)(?:\s|$)"#).unwrap());

#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentMapper;

impl DocumentMapper {
    pub fn new() -> Self {
        Self
    }

    /// Build a full record from a line that matched the primary format.
    pub fn map_valid(&self, line: &str, fields: &FieldMap) -> Result<OutputRecord, FieldValueError> {
        let raw_time = require(fields, FieldKey::RequestTime)?;
        let datetime = parse_request_time(raw_time)?;

        let request = fields
            .get(&FieldKey::RequestLine)
            .map(RequestLine::decompose)
            .unwrap_or_else(RequestLine::unknown);

        let x_forward_for = fields
            .get(&FieldKey::ForwardedFor)
            .map(split_forwarded)
            .unwrap_or_else(|| vec![UNKNOWN.to_string()]);

        let host = fields
            .get(&FieldKey::HostHeader)
            .or_else(|| fields.get(&FieldKey::RemoteHost));

        Ok(OutputRecord {
            id: record_id(raw_time, line),
            datetime,
            web_server: or_unknown(fields.get(&FieldKey::SyslogServer)),
            host: or_unknown(host),
            method: request.method,
            protocol: request.protocol,
            resource: request.resource,
            resource_params: request.params,
            code: or_unknown(fields.get(&FieldKey::Status)),
            time: or_unknown(fields.get(&FieldKey::ElapsedMicros)),
            remote_user: or_unknown(fields.get(&FieldKey::RemoteUser)),
            remote_log_name: or_unknown(fields.get(&FieldKey::RemoteLogName)),
            referer: or_unknown(fields.get(&FieldKey::Referer)),
            user_agent: or_unknown(fields.get(&FieldKey::UserAgent)),
            bytes: or_unknown(fields.get(&FieldKey::ResponseBytes)),
            x_forward_for,
            is_valid_line: true,
            log_text: line.to_string(),
        })
    }

    /// Build a sentinel record from a line only the fallback format matched.
    pub fn map_fallback(&self, line: &str, fields: &FieldMap) -> Result<OutputRecord, FieldValueError> {
        let raw_time = require(fields, FieldKey::SyslogTime)?;
        let datetime = parse_syslog_time(raw_time)?;

        let code = EMBEDDED_STATUS
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .unwrap_or(MISSING_NUMBER);

        Ok(OutputRecord {
            id: record_id(raw_time, line),
            datetime,
            web_server: or_unknown(fields.get(&FieldKey::SyslogServer)),
            host: UNKNOWN.to_string(),
            method: UNKNOWN.to_string(),
            protocol: UNKNOWN.to_string(),
            resource: UNKNOWN.to_string(),
            resource_params: UNKNOWN.to_string(),
            code: code.to_string(),
            time: MISSING_NUMBER.to_string(),
            remote_user: UNKNOWN.to_string(),
            remote_log_name: UNKNOWN.to_string(),
            referer: UNKNOWN.to_string(),
            user_agent: UNKNOWN.to_string(),
            bytes: MISSING_NUMBER.to_string(),
            x_forward_for: vec![UNKNOWN.to_string()],
            is_valid_line: false,
            log_text: line.to_string(),
        })
    }
}

fn require(fields: &FieldMap, key: FieldKey) -> Result<&str, FieldValueError> {
    fields.get(&key).ok_or(FieldValueError::Missing(key))
}

fn or_unknown(value: Option<&str>) -> String {
    value.unwrap_or(UNKNOWN).to_string()
}

/// Parse `[23/Jan/2004:11:36:20 +0000]`.
pub fn parse_request_time(raw: &str) -> Result<DateTime<Utc>, FieldValueError> {
    DateTime::parse_from_str(raw, REQUEST_TIME_FORMAT)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| FieldValueError::InvalidTimestamp {
            key: FieldKey::RequestTime,
            value: raw.to_string(),
        })
}

/// Parse `2013-05-28T10:00:00+02:00` (offset colon optional, `Z` accepted).
pub fn parse_syslog_time(raw: &str) -> Result<DateTime<Utc>, FieldValueError> {
    let normalized = OFFSET_COLON.replace(raw, "$1$2");

    DateTime::parse_from_str(&normalized, SYSLOG_TIME_FORMAT)
        .or_else(|_| DateTime::<FixedOffset>::parse_from_rfc3339(raw))
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| FieldValueError::InvalidTimestamp {
            key: FieldKey::SyslogTime,
            value: raw.to_string(),
        })
}

/// `<raw timestamp>|<first 16 hex digits of sha256(line)>`.
pub fn record_id(raw_time: &str, line: &str) -> String {
    let digest = Sha256::digest(line.as_bytes());
    let mut id = String::with_capacity(raw_time.len() + 1 + LINE_HASH_LEN);
    id.push_str(raw_time);
    id.push('|');
    for b in digest.iter().take(LINE_HASH_LEN / 2) {
        let _ = write!(id, "{:02x}", b);
    }
    id
}
