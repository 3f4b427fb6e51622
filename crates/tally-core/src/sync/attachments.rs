//! Rendered bill document transfer.
//!
//! Documents are keyed 1:1 by bill id and never merged: the last upload wins
//! remotely and every download overwrites the local copy.

use crate::remote::{RemoteChannel, UploadProgress};
use crate::Result;

/// Upload/download of bill documents over a remote channel.
pub struct AttachmentTransfer<'a, C> {
    channel: &'a C,
}

impl<'a, C: RemoteChannel> AttachmentTransfer<'a, C> {
    pub const fn new(channel: &'a C) -> Self {
        Self { channel }
    }

    /// Upload a document, reporting 0-100 progress when a callback is given.
    pub async fn upload(
        &self,
        bill_id: &str,
        bytes: &[u8],
        progress: Option<UploadProgress>,
    ) -> Result<()> {
        tracing::debug!("Uploading document for bill {bill_id} ({} bytes)", bytes.len());
        self.channel
            .push_attachment(bill_id, bytes, progress)
            .await?;
        Ok(())
    }

    /// Download a document, `None` when the remote store has none.
    pub async fn download(&self, bill_id: &str) -> Result<Option<Vec<u8>>> {
        let bytes = self.channel.fetch_attachment(bill_id).await?;
        if let Some(bytes) = &bytes {
            tracing::debug!("Downloaded document for bill {bill_id} ({} bytes)", bytes.len());
        }
        Ok(bytes)
    }
}
