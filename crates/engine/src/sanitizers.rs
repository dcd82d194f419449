//! Fixed catalogue of cleansing and coercing operations, plus the sink
//! contexts a rendered value can reach. The table is built once at scan
//! start and never mutated, so parallel analysis passes can share it.

use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum SanitizerKind {
    /// Numeric coercion; safe in every sink context.
    Numeric,
    /// HTML escaping; safe for tag bodies and attribute values.
    HtmlEscape,
    /// SQL quoting; a parameterization boundary for query construction.
    SqlQuote,
    /// Tag stripping; only trusted on framework versions past the known
    /// bypass.
    TagStrip,
    /// URL encoding; the only escaping trusted in href context besides
    /// numeric coercion.
    UrlEncode,
    /// JSON escaping.
    JsonEscape,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Sanitizer {
    pub name: &'static str,
    pub kind: SanitizerKind,
    /// Minimum framework version the sanitizer is trusted on, when the
    /// operation had a known bypass in older releases.
    pub min_version: Option<&'static str>,
}

/// Immutable sanitizer catalogue.
#[derive(Debug)]
pub struct SanitizerTable {
    entries: Vec<Sanitizer>,
}

impl SanitizerTable {
    pub fn builtin() -> Self {
        use SanitizerKind::*;
        let entries = vec![
            Sanitizer { name: "to_i", kind: Numeric, min_version: None },
            Sanitizer { name: "to_f", kind: Numeric, min_version: None },
            Sanitizer { name: "Integer", kind: Numeric, min_version: None },
            Sanitizer { name: "h", kind: HtmlEscape, min_version: None },
            Sanitizer { name: "html_escape", kind: HtmlEscape, min_version: None },
            Sanitizer { name: "escapeHTML", kind: HtmlEscape, min_version: None },
            Sanitizer { name: "sanitize", kind: HtmlEscape, min_version: None },
            Sanitizer { name: "quote", kind: SqlQuote, min_version: None },
            Sanitizer { name: "quote_value", kind: SqlQuote, min_version: None },
            Sanitizer { name: "sanitize_sql", kind: SqlQuote, min_version: None },
            Sanitizer {
                name: "sanitize_sql_for_conditions",
                kind: SqlQuote,
                min_version: None,
            },
            // strip_tags could be bypassed before 2.3.13 (CVE-2011-2931).
            Sanitizer { name: "strip_tags", kind: TagStrip, min_version: Some("2.3.13") },
            Sanitizer { name: "url_encode", kind: UrlEncode, min_version: None },
            Sanitizer { name: "u", kind: UrlEncode, min_version: None },
            Sanitizer { name: "json_escape", kind: JsonEscape, min_version: None },
            Sanitizer { name: "to_json", kind: JsonEscape, min_version: None },
        ];
        Self { entries }
    }

    /// Looks a sanitizer up by method name, honoring version caveats:
    /// a version-gated entry is not trusted when the declared framework
    /// version is below its minimum (or is unknown).
    pub fn lookup(&self, name: &str, version: Option<&str>) -> Option<&Sanitizer> {
        let entry = self.entries.iter().find(|s| s.name == name)?;
        match entry.min_version {
            Some(min) => match version {
                Some(v) if crate::version::at_least(v, min) => Some(entry),
                _ => None,
            },
            None => Some(entry),
        }
    }

    pub fn kind_of(&self, name: &str) -> Option<SanitizerKind> {
        self.entries.iter().find(|s| s.name == name).map(|s| s.kind)
    }
}

/// Context a value reaches a render boundary in. Each context has its own
/// required sanitizer set.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
pub enum SinkContext {
    Body,
    AttrValue,
    AttrName,
    Href,
    Json,
}

impl SinkContext {
    pub fn parse(s: &str) -> Option<SinkContext> {
        match s {
            "body" => Some(SinkContext::Body),
            "attr_value" => Some(SinkContext::AttrValue),
            "attr_name" => Some(SinkContext::AttrName),
            "href" => Some(SinkContext::Href),
            "json" => Some(SinkContext::Json),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SinkContext::Body => "tag body",
            SinkContext::AttrValue => "tag attribute value",
            SinkContext::AttrName => "tag attribute name",
            SinkContext::Href => "link href",
            SinkContext::Json => "JSON output",
        }
    }

    /// Whether the applied sanitizers satisfy this context. The attribute
    /// name context accepts no sanitizer at all, and href rejects plain
    /// HTML escaping because an escaped value can still carry a
    /// `javascript:` scheme.
    pub fn satisfied_by(self, sanitized_by: &[String], table: &SanitizerTable) -> bool {
        use SanitizerKind::*;
        if self == SinkContext::AttrName {
            return false;
        }
        sanitized_by.iter().any(|name| {
            // A name outside the table is a locally-defined cleansing
            // method; the inner sanitizers it recorded decide, the bare
            // name never satisfies a context on its own.
            let Some(kind) = table.kind_of(name) else {
                return false;
            };
            match self {
                SinkContext::Body | SinkContext::AttrValue => {
                    matches!(kind, Numeric | HtmlEscape | TagStrip)
                }
                SinkContext::Href => matches!(kind, Numeric | UrlEncode),
                SinkContext::Json => matches!(kind, Numeric | JsonEscape),
                SinkContext::AttrName => false,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_gated_sanitizer_needs_a_trusted_version() {
        let table = SanitizerTable::builtin();
        assert!(table.lookup("strip_tags", Some("2.3.13")).is_some());
        assert!(table.lookup("strip_tags", Some("2.3.11")).is_none());
        assert!(table.lookup("strip_tags", None).is_none());
    }

    #[test]
    fn local_helper_names_do_not_satisfy_contexts_on_their_own() {
        let table = SanitizerTable::builtin();
        let applied = vec!["h".to_string(), "safe_link".to_string()];
        assert!(SinkContext::Body.satisfied_by(&applied, &table));
        assert!(!SinkContext::Href.satisfied_by(&applied, &table));
        assert!(!SinkContext::AttrName.satisfied_by(&applied, &table));
    }

    #[test]
    fn html_sanitizer_family_covers_body_and_attribute_values() {
        let table = SanitizerTable::builtin();
        for name in ["h", "html_escape", "escapeHTML", "sanitize"] {
            let applied = vec![name.to_string()];
            assert!(SinkContext::Body.satisfied_by(&applied, &table), "{name}");
            assert!(SinkContext::AttrValue.satisfied_by(&applied, &table), "{name}");
            assert!(!SinkContext::Href.satisfied_by(&applied, &table), "{name}");
        }
    }
}
