//! Document-model boundary: payload classification and error-document rendering.
//!
//! The simulator never interprets document content beyond the discriminant
//! produced here; everything else about the document model stays opaque.

use std::fmt::{Display, Formatter};

const ROOT_QUERY_REQUEST: &str = "QueryRequest";
const ROOT_QUERY_RESPONSE: &str = "QueryResponse";
const EXCEPTION_MARKER: &str = "<Exception";

/// Closed classification of one exchanged document.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DocumentKind {
    Request,
    Response,
    ErrorResponse,
    Unknown,
}

impl DocumentKind {
    /// Stable label used in structured log events.
    pub fn label(&self) -> &'static str {
        match self {
            DocumentKind::Request => "request",
            DocumentKind::Response => "response",
            DocumentKind::ErrorResponse => "error_response",
            DocumentKind::Unknown => "unknown",
        }
    }
}

/// Structured fault raised by a data provider instead of a response document.
/// Not a system error; it is rendered into an error response and forwarded
/// exactly like a normal response.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DomainFault {
    pub code: String,
    pub message: String,
}

impl DomainFault {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl Display for DomainFault {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

/// Parse/serialize collaborator consumed by the router.
pub trait DocumentModel: Send + Sync {
    fn classify(&self, data: &[u8]) -> DocumentKind;

    /// Renders a provider fault as an error-response document.
    fn render_error(&self, fault: &DomainFault) -> Vec<u8>;
}

/// Document model for the XML query vocabulary: the discriminant is the root
/// element name, with an `Exception` element marking an error response.
#[derive(Clone, Copy, Debug, Default)]
pub struct XmlDocumentModel;

impl XmlDocumentModel {
    pub fn new() -> Self {
        Self
    }

    /// Returns the local name of the document's root element, skipping the XML
    /// declaration, comments, and namespace prefixes. No full parse.
    fn root_element_name(text: &str) -> Option<&str> {
        let mut rest = text.trim_start_matches('\u{feff}').trim_start();
        loop {
            if !rest.starts_with('<') {
                return None;
            }
            if let Some(stripped) = rest.strip_prefix("<?") {
                rest = stripped.split_once("?>")?.1.trim_start();
                continue;
            }
            if let Some(stripped) = rest.strip_prefix("<!--") {
                rest = stripped.split_once("-->")?.1.trim_start();
                continue;
            }
            if rest.starts_with("<!") {
                rest = rest.split_once('>')?.1.trim_start();
                continue;
            }
            let name = rest[1..]
                .split(|c: char| c.is_whitespace() || c == '>' || c == '/')
                .next()?;
            if name.is_empty() {
                return None;
            }
            return Some(name.rsplit(':').next().unwrap_or(name));
        }
    }
}

impl DocumentModel for XmlDocumentModel {
    fn classify(&self, data: &[u8]) -> DocumentKind {
        let Ok(text) = std::str::from_utf8(data) else {
            return DocumentKind::Unknown;
        };
        match Self::root_element_name(text) {
            Some(ROOT_QUERY_REQUEST) => DocumentKind::Request,
            Some(ROOT_QUERY_RESPONSE) => {
                if text.contains(EXCEPTION_MARKER) {
                    DocumentKind::ErrorResponse
                } else {
                    DocumentKind::Response
                }
            }
            _ => DocumentKind::Unknown,
        }
    }

    fn render_error(&self, fault: &DomainFault) -> Vec<u8> {
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <QueryResponse status=\"urn:oasis:names:tc:ebxml-regrep:ResponseStatusType:Failure\">\n\
             \x20 <Exception code=\"{}\">{}</Exception>\n\
             </QueryResponse>\n",
            xml_escape(&fault.code),
            xml_escape(&fault.message)
        )
        .into_bytes()
    }
}

fn xml_escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
