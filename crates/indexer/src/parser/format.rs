//! Format compiler — turns an Apache `LogFormat` string into one anchored regex.
//!
//! ```text
//! %h %l %u %t "%r" %>s %b "%{Referer}i" "%{User-Agent}i"
//! ```
//!
//! Every whitespace-delimited directive becomes one capture group; the groups
//! are joined with a single literal space and anchored at both ends.

use std::fmt;
use std::sync::Arc;

use regex::Regex;

use super::model::{FieldKey, FormatCompileError};

/// Maps a directive's text to the name its captured value is stored under.
pub type AliasFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// The regex fragment a directive compiles to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subpattern {
    /// Double-quoted, backslash escapes allowed inside (`"%r"`, referer, user agent)
    EscapedQuoted,
    /// Double-quoted, no internal quotes
    Quoted,
    /// `[...]` time directive; brackets are part of the capture
    Bracketed,
    /// `a, b, c` address list (`%{X-Forwarded-For}i`)
    AddressList,
    /// `%U`: at least one character, non-greedy
    NonGreedy,
    /// `%_`: everything remaining, optional
    OptionalRest,
    /// Any run of non-space characters
    NonSpace,
}

impl Subpattern {
    pub fn as_regex(&self) -> &'static str {
        match self {
            Subpattern::EscapedQuoted => r#""([^"\\]*(?:\\.[^"\\]*)*)""#,
            Subpattern::Quoted => r#""([^"]*)""#,
            Subpattern::Bracketed => r"(\[[^\]]+\])",
            Subpattern::AddressList => r"((?:\S*,\s)*\S*)",
            Subpattern::NonGreedy => r"(.+?)",
            Subpattern::OptionalRest => r"(.+)?",
            Subpattern::NonSpace => r"(\S*)",
        }
    }

    fn classify(directive: &str, quoted: bool) -> Self {
        if quoted {
            if directive == "%r" || directive.contains("Referer") || directive.contains("User-Agent") {
                Subpattern::EscapedQuoted
            } else {
                Subpattern::Quoted
            }
        } else if is_time_directive(directive) {
            Subpattern::Bracketed
        } else if directive.contains("X-Forwarded-For") {
            Subpattern::AddressList
        } else if directive == "%U" {
            Subpattern::NonGreedy
        } else if directive == "%_" {
            Subpattern::OptionalRest
        } else {
            Subpattern::NonSpace
        }
    }
}

/// Suffix match so prefixed custom time tokens (`%{%d/%b}t`) are covered too.
fn is_time_directive(directive: &str) -> bool {
    directive.starts_with('%') && directive.ends_with('t')
}

/// One directive of a format specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Text as it appeared in the specification, quotes included
    pub raw: String,
    /// Name after quote stripping and aliasing
    pub name: String,
    pub quoted: bool,
    pub subpattern: Subpattern,
}

/// A compiled format. Immutable; share it freely between parses and threads.
#[derive(Debug, Clone)]
pub struct CompiledFormat {
    tokens: Vec<Token>,
    keys: Vec<FieldKey>,
    regex: Regex,
}

impl CompiledFormat {
    /// Compile with the identity alias.
    pub fn compile(spec: &str) -> Result<Self, FormatCompileError> {
        FormatCompiler::new().compile(spec)
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Field key for each capture group, in group order.
    pub fn keys(&self) -> &[FieldKey] {
        &self.keys
    }

    pub fn names(&self) -> Vec<&str> {
        self.tokens.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    pub(crate) fn regex(&self) -> &Regex {
        &self.regex
    }
}

/// Builds [`CompiledFormat`]s. Holds only the alias strategy, no per-format state.
#[derive(Clone)]
pub struct FormatCompiler {
    alias: AliasFn,
}

impl Default for FormatCompiler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FormatCompiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatCompiler").finish_non_exhaustive()
    }
}

impl FormatCompiler {
    pub fn new() -> Self {
        Self {
            alias: Arc::new(|name: &str| name.to_string()),
        }
    }

    /// Use `alias` to rename directives, e.g. `%>s` to `status`.
    pub fn with_alias<F>(alias: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self { alias: Arc::new(alias) }
    }

    pub fn compile(&self, spec: &str) -> Result<CompiledFormat, FormatCompileError> {
        let normalized = normalize_whitespace(spec);
        if normalized.is_empty() {
            return Err(FormatCompileError::Empty);
        }

        let tokens: Vec<Token> = normalized
            .split(' ')
            .map(|raw| self.token(raw))
            .collect();

        let body = tokens
            .iter()
            .map(|t| t.subpattern.as_regex())
            .collect::<Vec<_>>()
            .join(" ");
        let pattern = format!("^{}$", body);

        let regex = Regex::new(&pattern).map_err(|source| FormatCompileError::InvalidPattern {
            format: normalized.clone(),
            source,
        })?;

        let keys = tokens.iter().map(|t| FieldKey::from_name(&t.name)).collect();

        tracing::debug!("Compiled format {:?} into {}", normalized, pattern);

        Ok(CompiledFormat { tokens, keys, regex })
    }

    fn token(&self, raw: &str) -> Token {
        let quoted = raw.starts_with('"');
        let directive = if quoted {
            let inner = &raw[1..];
            inner.strip_suffix('"').unwrap_or(inner)
        } else {
            raw
        };

        Token {
            raw: raw.to_string(),
            name: (self.alias)(directive),
            quoted,
            subpattern: Subpattern::classify(directive, quoted),
        }
    }
}

/// Collapse runs of spaces/tabs into a single space and trim both ends.
fn normalize_whitespace(spec: &str) -> String {
    spec.split([' ', '\t'])
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
