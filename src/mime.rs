//! Content-type lookup collaborator.
//!
//! The response view's [`set_content_type`](crate::Response::set_content_type)
//! resolves short type tokens (`"json"`, `"html"`, `".csv"`) to full
//! content-type strings through this trait. Swap the implementation with
//! [`App::mime_lookup`](crate::App::mime_lookup) to plug in a richer
//! registry; the built-in [`MimeTable`] covers the usual API payloads.

/// Resolves a type hint to a full `Content-Type` value.
///
/// Returning `None` means the hint is unknown; the response view reacts by
/// clearing the `Content-Type` header.
pub trait MimeLookup: Send + Sync + 'static {
    fn resolve(&self, hint: &str) -> Option<String>;
}

/// Built-in lookup table.
///
/// Accepts short tokens with or without a leading dot, and passes hints that
/// already contain a `/` through unchanged.
pub struct MimeTable;

impl MimeLookup for MimeTable {
    fn resolve(&self, hint: &str) -> Option<String> {
        let hint = hint.trim().trim_start_matches('.');
        if hint.is_empty() {
            return None;
        }
        if hint.contains('/') {
            return Some(hint.to_owned());
        }
        let full = match hint.to_ascii_lowercase().as_str() {
            "csv"                  => "text/csv",
            "event-stream" | "sse" => "text/event-stream",
            "form"                 => "application/x-www-form-urlencoded",
            "html" | "htm"         => "text/html; charset=utf-8",
            "json"                 => "application/json",
            "msgpack"              => "application/msgpack",
            "bin" | "octet-stream" => "application/octet-stream",
            "pdf"                  => "application/pdf",
            "text" | "txt" | "plain" => "text/plain; charset=utf-8",
            "xml"                  => "application/xml",
            _ => return None,
        };
        Some(full.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_short_tokens() {
        assert_eq!(MimeTable.resolve("json").as_deref(), Some("application/json"));
        assert_eq!(MimeTable.resolve(".html").as_deref(), Some("text/html; charset=utf-8"));
        assert_eq!(MimeTable.resolve("PNG"), None);
    }

    #[test]
    fn passes_full_types_through() {
        assert_eq!(
            MimeTable.resolve("application/vnd.api+json").as_deref(),
            Some("application/vnd.api+json"),
        );
    }

    #[test]
    fn rejects_empty_hints() {
        assert_eq!(MimeTable.resolve(""), None);
        assert_eq!(MimeTable.resolve("."), None);
    }
}
