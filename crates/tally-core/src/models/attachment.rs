//! Rendered bill document model

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Content type assumed for rendered bill documents.
pub const DEFAULT_ATTACHMENT_CONTENT_TYPE: &str = "application/pdf";

/// Binary rendered document stored 1:1 against a bill.
///
/// Attachments carry no timestamp: they are never merged, only overwritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Owning bill id (also the attachment key)
    pub bill_id: String,
    /// Content MIME type
    pub content_type: String,
    /// Raw payload
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl Attachment {
    /// Create a PDF attachment for a bill.
    pub fn new(bill_id: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        Self::with_content_type(bill_id, DEFAULT_ATTACHMENT_CONTENT_TYPE, bytes)
    }

    /// Create an attachment with an explicit content type.
    pub fn with_content_type(
        bill_id: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<Self> {
        let bill_id = bill_id.into().trim().to_string();
        let content_type = content_type.into().trim().to_string();

        if bill_id.is_empty() {
            return Err(Error::InvalidInput(
                "Attachment bill_id cannot be empty".to_string(),
            ));
        }
        if content_type.is_empty() {
            return Err(Error::InvalidInput(
                "Attachment content_type cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            bill_id,
            content_type,
            bytes,
        })
    }

    /// Payload size in bytes.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }
}
