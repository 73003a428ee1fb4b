//! Reading `--file` arguments into attachments.

use crate::error::{Error, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_ENGINE;
use runtime::Attachment;
use std::path::Path;
use tracing::warn;

/// Images are embedded as base64 data URLs; anything else is read as text,
/// with invalid UTF-8 replaced.
pub fn load(path: &Path) -> Result<Attachment> {
    let mime = mime_guess::from_path(path)
        .first_raw()
        .unwrap_or("application/octet-stream");
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let unreadable = |source| Error::Attachment {
        path: path.to_path_buf(),
        source,
    };

    if mime.starts_with("image/") {
        let bytes = std::fs::read(path).map_err(unreadable)?;
        let data = format!("data:{mime};base64,{}", BASE64_ENGINE.encode(bytes));
        Ok(Attachment::new(name, mime, data))
    } else {
        let bytes = std::fs::read(path).map_err(unreadable)?;
        let content = String::from_utf8(bytes).unwrap_or_else(|e| {
            warn!(file = %name, mime, "attachment is not UTF-8, replacing invalid bytes");
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        });
        Ok(Attachment::new(name, mime, "").with_content(content))
    }
}
