use lettre::message::header::ContentType;

/// A file uploaded alongside the newsletter, sent to every recipient.
#[derive(Debug, Clone)]
pub struct Attachment {
    filename: String,
    content_type: String,
    content: Vec<u8>,
}

impl Attachment {
    /// Builds an attachment, keeping only the last path component of `filename`.
    ///
    /// When the client did not declare a content type it is guessed from the file extension.
    pub fn new(
        filename: &str,
        content_type: Option<String>,
        content: Vec<u8>,
    ) -> Result<Self, String> {
        let filename = filename
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or_default()
            .trim()
            .to_owned();
        if filename.is_empty() {
            return Err("attachment filename is empty".into());
        }

        let content_type = content_type
            .filter(|ct| !ct.trim().is_empty())
            .unwrap_or_else(|| {
                mime_guess::from_path(&filename)
                    .first_or_octet_stream()
                    .to_string()
            });
        if ContentType::parse(&content_type).is_err() {
            return Err(format!(
                "`{}` is not a valid content type for {}.",
                content_type, filename
            ));
        }

        Ok(Self {
            filename,
            content_type,
            content,
        })
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }
}
