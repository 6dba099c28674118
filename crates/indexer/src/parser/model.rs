use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Known format directives.
///
/// Anything the compiler does not recognise (including names produced by an
/// alias hook) lands in [`FieldKey::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldKey {
    /// `%h` remote host
    RemoteHost,
    /// `%l` remote logname (identd)
    RemoteLogName,
    /// `%u` remote user
    RemoteUser,
    /// `%t` request time, bracketed
    RequestTime,
    /// `%r` first line of the request
    RequestLine,
    /// `%>s` final status
    Status,
    /// `%b` response size
    ResponseBytes,
    /// `%D` time taken to serve the request (microseconds)
    ElapsedMicros,
    /// `%U` URL path
    UrlPath,
    /// `%_` catch-all remainder
    Remainder,
    /// `%{Host}i`
    HostHeader,
    /// `%{Referer}i`
    Referer,
    /// `%{User-Agent}i`
    UserAgent,
    /// `%{X-Forwarded-For}i`
    ForwardedFor,
    /// `%syslog_ti` syslog framing timestamp
    SyslogTime,
    /// `%syslog_ws` syslog framing web-server tag
    SyslogServer,
    /// `%syslog_n` syslog framing program tag
    SyslogTag,
    Custom(String),
}

impl FieldKey {
    pub fn from_name(name: &str) -> Self {
        match name {
            "%h" => FieldKey::RemoteHost,
            "%l" => FieldKey::RemoteLogName,
            "%u" => FieldKey::RemoteUser,
            "%t" => FieldKey::RequestTime,
            "%r" => FieldKey::RequestLine,
            "%>s" => FieldKey::Status,
            "%b" => FieldKey::ResponseBytes,
            "%D" => FieldKey::ElapsedMicros,
            "%U" => FieldKey::UrlPath,
            "%_" => FieldKey::Remainder,
            "%{Host}i" => FieldKey::HostHeader,
            "%{Referer}i" => FieldKey::Referer,
            "%{User-Agent}i" => FieldKey::UserAgent,
            "%{X-Forwarded-For}i" => FieldKey::ForwardedFor,
            "%syslog_ti" => FieldKey::SyslogTime,
            "%syslog_ws" => FieldKey::SyslogServer,
            "%syslog_n" => FieldKey::SyslogTag,
            other => FieldKey::Custom(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            FieldKey::RemoteHost => "%h",
            FieldKey::RemoteLogName => "%l",
            FieldKey::RemoteUser => "%u",
            FieldKey::RequestTime => "%t",
            FieldKey::RequestLine => "%r",
            FieldKey::Status => "%>s",
            FieldKey::ResponseBytes => "%b",
            FieldKey::ElapsedMicros => "%D",
            FieldKey::UrlPath => "%U",
            FieldKey::Remainder => "%_",
            FieldKey::HostHeader => "%{Host}i",
            FieldKey::Referer => "%{Referer}i",
            FieldKey::UserAgent => "%{User-Agent}i",
            FieldKey::ForwardedFor => "%{X-Forwarded-For}i",
            FieldKey::SyslogTime => "%syslog_ti",
            FieldKey::SyslogServer => "%syslog_ws",
            FieldKey::SyslogTag => "%syslog_n",
            FieldKey::Custom(name) => name,
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields captured from a single line, keyed by directive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    values: HashMap<FieldKey, String>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a captured value; a later value for the same key replaces the earlier one.
    pub fn insert(&mut self, key: FieldKey, value: impl Into<String>) {
        self.values.insert(key, value.into());
    }

    pub fn get(&self, key: &FieldKey) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Lookup by raw directive name, e.g. `"%>s"` or an aliased name.
    pub fn get_by_name(&self, name: &str) -> Option<&str> {
        self.get(&FieldKey::from_name(name))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum FormatCompileError {
    #[error("Empty format specification")]
    Empty,

    #[error("Unable to compile format {format:?}: {source}")]
    InvalidPattern {
        format: String,
        #[source]
        source: regex::Error,
    },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unable to parse: {line} with the {pattern} regular expression")]
pub struct LineParseError {
    pub line: String,
    pub pattern: String,
}

/// A field was captured but its content could not be interpreted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FieldValueError {
    #[error("Missing field {0}")]
    Missing(FieldKey),

    #[error("Invalid timestamp in {key}: {value:?}")]
    InvalidTimestamp { key: FieldKey, value: String },
}
