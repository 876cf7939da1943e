//! Out-of-band title updates for partial responses.
//!
//! When only the body fragment is sent, the client still needs the new
//! document title. It travels in the `X-Header-Updates` response header.
//! The protocol went through three encodings over time; revision 1 (base64
//! over a versioned JSON object) is canonical for encoding, and the decoder
//! stays compatible with the two older forms.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;

/// Request header signalling "send the fragment only".
pub const PARTIAL_CONTENT_HEADER: &str = "x-partial-content";
/// Query-parameter fallback for the partial-content signal.
pub const PARTIAL_CONTENT_QUERY: &str = "partialContent";
/// Response header carrying the encoded title update.
pub const HEADER_UPDATES_HEADER: &str = "x-header-updates";
/// Current revision of the title-update payload.
pub const PROTOCOL_REVISION: u64 = 1;

static TITLE_RE: OnceLock<Regex> = OnceLock::new();

fn title_regex() -> &'static Regex {
    TITLE_RE.get_or_init(|| {
        Regex::new(r"(?is)<title>(.+?)</title>").expect("static title pattern compiles")
    })
}

/// First-match, case-insensitive `<title>` scan over a head fragment.
/// No match is "no update", never an error.
pub fn extract_title(head: &str) -> Option<String> {
    title_regex()
        .captures(head)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Wire encodings the header went through, oldest last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Revision 1: base64 of `{"v":1,"title":…}`.
    Base64Json,
    /// Revision 0: URL-encoded head markup containing a `<title>` tag.
    UrlEncoded,
    /// Pre-revision: the bare title string.
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderUpdates {
    pub title: String,
}

impl HeaderUpdates {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    /// Canonical (revision 1) encoding.
    pub fn encode(&self) -> String {
        self.encode_with(Encoding::Base64Json)
    }

    pub fn encode_with(&self, encoding: Encoding) -> String {
        match encoding {
            Encoding::Base64Json => {
                let payload = serde_json::json!({
                    "v": PROTOCOL_REVISION,
                    "title": self.title,
                });
                STANDARD.encode(payload.to_string())
            }
            Encoding::UrlEncoded => {
                urlencoding::encode(&format!("<title>{}</title>", self.title)).into_owned()
            }
            Encoding::Plain => self.title.clone(),
        }
    }

    /// Decode a header value from any known revision, newest first.
    ///
    /// Base64-JSON is tried first, then URL-decoded markup with a `<title>`
    /// tag, and finally the value itself is taken as a plain title. Empty
    /// values decode to nothing.
    pub fn decode(raw: &str) -> Option<Self> {
        if raw.is_empty() {
            return None;
        }

        if let Some(updates) = decode_base64_json(raw) {
            return Some(updates);
        }

        let decoded = urlencoding::decode(raw)
            .map(|cow| cow.into_owned())
            .unwrap_or_else(|_| raw.to_string());

        if let Some(title) = extract_title(&decoded) {
            return Some(Self { title });
        }

        Some(Self { title: decoded })
    }
}

fn decode_base64_json(raw: &str) -> Option<HeaderUpdates> {
    let bytes = STANDARD.decode(raw).ok()?;
    let text = String::from_utf8(bytes).ok()?;
    let value: Value = serde_json::from_str(&text).ok()?;
    let title = value.get("title")?.as_str()?;
    Some(HeaderUpdates {
        title: title.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_title_is_case_insensitive_and_first_match() {
        let head = "<meta charset=\"utf-8\"><TITLE>First</TITLE><title>Second</title>";
        assert_eq!(extract_title(head), Some("First".to_string()));
    }

    #[test]
    fn test_extract_title_without_tag_is_none() {
        assert_eq!(extract_title("<meta charset=\"utf-8\">"), None);
    }

    #[test]
    fn test_canonical_encoding_round_trips() {
        let updates = HeaderUpdates::new("Hej - Åäö");
        let decoded = HeaderUpdates::decode(&updates.encode())
            .expect("canonical encoding must decode");
        assert_eq!(decoded, updates);
    }

    #[test]
    fn test_canonical_payload_carries_protocol_revision() {
        let raw = HeaderUpdates::new("Welcome").encode();
        let bytes = STANDARD.decode(raw).expect("payload is valid base64");
        let value: Value =
            serde_json::from_str(&String::from_utf8(bytes).expect("payload is utf-8"))
                .expect("payload is JSON");
        assert_eq!(value["v"], serde_json::json!(PROTOCOL_REVISION));
        assert_eq!(value["title"], serde_json::json!("Welcome"));
    }

    #[test]
    fn test_url_encoded_revision_decodes() {
        let raw = HeaderUpdates::new("Cool person").encode_with(Encoding::UrlEncoded);
        let decoded = HeaderUpdates::decode(&raw).expect("url-encoded revision must decode");
        assert_eq!(decoded.title, "Cool person");
    }

    #[test]
    fn test_plain_revision_decodes() {
        let decoded = HeaderUpdates::decode("Welcome").expect("plain title must decode");
        assert_eq!(decoded.title, "Welcome");
    }

    #[test]
    fn test_legacy_base64_without_version_field_decodes() {
        let raw = STANDARD.encode(r#"{"title":"Old"}"#);
        let decoded = HeaderUpdates::decode(&raw).expect("unversioned payload must decode");
        assert_eq!(decoded.title, "Old");
    }

    #[test]
    fn test_empty_header_value_decodes_to_nothing() {
        assert_eq!(HeaderUpdates::decode(""), None);
    }
}
