use bytes::Bytes;
use chrono::{DateTime, Local};
use std::path::Path;

use crate::constants::MAX_IMAGE_BYTES;
use crate::utils::{PatouError, Result};

/// Who produced a message in the transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

/// A single entry in a conversation.
///
/// User messages carry text, an image, or both; bot messages carry text only.
/// The timestamp is client-local and purely for display.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub sender: Sender,
    pub text: Option<String>,
    pub image: Option<ImageAttachment>,
    pub timestamp: DateTime<Local>,
}

impl Message {
    /// Create a user message from the raw input box contents.
    ///
    /// Blank text is normalized to `None`; callers must ensure at least one
    /// of text/image is present before sending.
    pub fn user(text: &str, image: Option<ImageAttachment>) -> Self {
        let text = if text.trim().is_empty() {
            None
        } else {
            Some(text.to_string())
        };
        Self {
            sender: Sender::User,
            text,
            image,
            timestamp: Local::now(),
        }
    }

    /// Create a bot reply message
    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Bot,
            text: Some(text.into()),
            image: None,
            timestamp: Local::now(),
        }
    }

    /// Text content, or an empty string for image-only messages
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}

/// An image selected by the user, held in memory for the next send.
///
/// The blob is opaque to the client: it is forwarded to the server as a
/// multipart file part and never persisted locally.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageAttachment {
    pub file_name: String,
    pub bytes: Bytes,
}

impl ImageAttachment {
    /// Load an image from disk, rejecting files over the size cap
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| PatouError::InvalidImage(format!("{} has no file name", path.display())))?;

        let data = std::fs::read(path)?;
        if data.len() > MAX_IMAGE_BYTES {
            return Err(PatouError::InvalidImage(format!(
                "{} is {} bytes, larger than the {} byte limit",
                path.display(),
                data.len(),
                MAX_IMAGE_BYTES
            )));
        }

        Ok(Self {
            file_name,
            bytes: Bytes::from(data),
        })
    }

    /// Guess the MIME type from the file extension for the multipart part
    pub fn mime_type(&self) -> &'static str {
        let ext = self
            .file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "gif" => "image/gif",
            "webp" => "image/webp",
            "bmp" => "image/bmp",
            _ => "application/octet-stream",
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_user_message_normalizes_blank_text() {
        let msg = Message::user("   ", None);
        assert_eq!(msg.text, None);
        assert_eq!(msg.sender, Sender::User);

        let msg = Message::user("bonjour", None);
        assert_eq!(msg.text(), "bonjour");
    }

    #[test]
    fn test_bot_message_has_no_image() {
        let msg = Message::bot("salut");
        assert_eq!(msg.sender, Sender::Bot);
        assert_eq!(msg.text(), "salut");
        assert!(msg.image.is_none());
    }

    #[test]
    fn test_mime_type_guessing() {
        let attachment = |name: &str| ImageAttachment {
            file_name: name.to_string(),
            bytes: Bytes::new(),
        };

        assert_eq!(attachment("chien.png").mime_type(), "image/png");
        assert_eq!(attachment("chat.JPG").mime_type(), "image/jpeg");
        assert_eq!(attachment("hamster.jpeg").mime_type(), "image/jpeg");
        assert_eq!(attachment("perroquet.webp").mime_type(), "image/webp");
        assert_eq!(attachment("mystere").mime_type(), "application/octet-stream");
    }

    #[test]
    fn test_load_reads_file_and_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lapin.png");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"not really a png").unwrap();

        let image = ImageAttachment::load(&path).unwrap();
        assert_eq!(image.file_name, "lapin.png");
        assert_eq!(image.len(), 16);
        assert_eq!(image.mime_type(), "image/png");
    }

    #[test]
    fn test_load_rejects_file_over_size_cap() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("enorme.png");
        std::fs::write(&path, vec![0u8; MAX_IMAGE_BYTES + 1]).unwrap();

        let err = ImageAttachment::load(&path).unwrap_err();
        assert!(matches!(err, PatouError::InvalidImage(_)));
        assert!(err.to_string().contains("larger than"));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = ImageAttachment::load("/nonexistent/zorro.png").unwrap_err();
        assert!(matches!(err, PatouError::Io(_)));
    }
}
