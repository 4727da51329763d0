//! Auto-responder: synthesizes a provider reply to a request without a real
//! DP operator behind it.

use crate::codec::{DocumentKind, DocumentModel, DomainFault};
use crate::message::{
    sniff_mime_type, ExchangeMessage, MessageMetadata, MessagePayload, MIME_APPLICATION_XML,
};
use async_trait::async_trait;

/// Attachment produced alongside a response document. The MIME type is
/// inferred from content when the reply message is assembled.
#[derive(Clone, Debug)]
pub struct ResponderAttachment {
    pub content_id: String,
    pub data: Vec<u8>,
}

/// Successful responder output: the response document plus attachments.
#[derive(Clone, Debug)]
pub struct ResponderReply {
    pub document: Vec<u8>,
    pub attachments: Vec<ResponderAttachment>,
}

/// Business-logic collaborator invoked for requests when auto-response is
/// enabled. A [`DomainFault`] is a regular outcome here, not a system error.
#[async_trait]
pub trait AutoResponder: Send + Sync {
    async fn respond(
        &self,
        request: &MessagePayload,
        metadata: &MessageMetadata,
    ) -> Result<ResponderReply, DomainFault>;
}

/// Responder shipped with the simulator: renders a canned response document
/// naming the addressed provider, with optional attachments, or raises a
/// configured fault for exercising the error path.
#[derive(Clone, Debug, Default)]
pub struct CannedResponder {
    fault: Option<DomainFault>,
    attachments: Vec<ResponderAttachment>,
}

impl CannedResponder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A responder that always raises `fault` instead of answering.
    pub fn failing(fault: DomainFault) -> Self {
        Self {
            fault: Some(fault),
            attachments: Vec::new(),
        }
    }

    pub fn with_attachment(mut self, content_id: impl Into<String>, data: Vec<u8>) -> Self {
        self.attachments.push(ResponderAttachment {
            content_id: content_id.into(),
            data,
        });
        self
    }
}

#[async_trait]
impl AutoResponder for CannedResponder {
    async fn respond(
        &self,
        _request: &MessagePayload,
        metadata: &MessageMetadata,
    ) -> Result<ResponderReply, DomainFault> {
        if let Some(fault) = &self.fault {
            return Err(fault.clone());
        }
        let document = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <QueryResponse status=\"urn:oasis:names:tc:ebxml-regrep:ResponseStatusType:Success\">\n\
             \x20 <Respondent scheme=\"{}\">{}</Respondent>\n\
             \x20 <ResultSet/>\n\
             </QueryResponse>\n",
            metadata.receiver.scheme(),
            metadata.receiver.value()
        )
        .into_bytes();
        Ok(ResponderReply {
            document,
            attachments: self.attachments.clone(),
        })
    }
}

/// Reply message assembled from a responder outcome, tagged with the document
/// kind it carries.
#[derive(Clone, Debug)]
pub struct ReplyMessage {
    pub message: ExchangeMessage,
    pub kind: DocumentKind,
}

/// Assembles the reply message for one responder outcome: addressing is
/// inverted from the request metadata, a fault is rendered as an
/// error-response document, and attachments ride along after the primary
/// payload with content-sniffed MIME types.
pub fn build_reply(
    document_model: &dyn DocumentModel,
    outcome: Result<ResponderReply, DomainFault>,
    request_metadata: &MessageMetadata,
    content_id: &str,
) -> ReplyMessage {
    let metadata = request_metadata.inverted();
    match outcome {
        Ok(reply) => {
            let mut payloads = Vec::with_capacity(1 + reply.attachments.len());
            payloads.push(MessagePayload {
                content_id: content_id.to_string(),
                mime_type: MIME_APPLICATION_XML.to_string(),
                data: reply.document,
            });
            for attachment in reply.attachments {
                let mime_type = sniff_mime_type(&attachment.data).to_string();
                payloads.push(MessagePayload {
                    content_id: attachment.content_id,
                    mime_type,
                    data: attachment.data,
                });
            }
            ReplyMessage {
                message: ExchangeMessage { metadata, payloads },
                kind: DocumentKind::Response,
            }
        }
        Err(fault) => ReplyMessage {
            message: ExchangeMessage {
                metadata,
                payloads: vec![MessagePayload {
                    content_id: content_id.to_string(),
                    mime_type: MIME_APPLICATION_XML.to_string(),
                    data: document_model.render_error(&fault),
                }],
            },
            kind: DocumentKind::ErrorResponse,
        },
    }
}
