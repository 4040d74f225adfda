//! Multipart request decoding and the uploads directory.

mod decoder;
mod store;

pub use decoder::decode;
pub use store::{content_type_for, PendingFile, UploadStore};

use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::services::Fields;

/// Field under which the public URL of a stored file is handed to collaborators
pub const IMAGE_URL_FIELD: &str = "imageUrl";

/// Conventional name of the single file part accepted by upload routes
pub const IMAGE_FIELD: &str = "image";

/// Public path prefix uploaded files are served under
pub const PUBLIC_PREFIX: &str = "/uploads";

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Malformed multipart body: {0}")]
    Malformed(String),

    #[error("Request body too large")]
    TooLarge,

    #[error("Failed to write uploaded file: {0}")]
    Storage(#[from] std::io::Error),
}

/// A file part that has been written to the uploads directory
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub original_name: String,
    pub stored_name: String,
    pub extension: Option<String>,
    pub path: PathBuf,
    pub public_url: String,
}

/// Decoded multipart body: text fields plus at most one stored file
#[derive(Debug, Default)]
pub struct FormPayload {
    pub fields: BTreeMap<String, String>,
    pub file: Option<UploadedFile>,
}

impl FormPayload {
    /// Merge text fields and the file URL into one argument object.
    ///
    /// A text field named [`IMAGE_URL_FIELD`] is replaced when a file was stored.
    pub fn into_fields(self) -> Fields {
        let mut fields: Fields = self
            .fields
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect();

        if let Some(file) = self.file {
            fields.insert(IMAGE_URL_FIELD.to_string(), Value::String(file.public_url));
        }

        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_file_overrides_image_url_text() {
        let mut payload = FormPayload::default();
        payload.fields.insert("title".into(), "Dusk".into());
        payload.fields.insert(IMAGE_URL_FIELD.into(), "/elsewhere.png".into());
        payload.file = Some(UploadedFile {
            original_name: "a.png".into(),
            stored_name: "abc.png".into(),
            extension: Some("png".into()),
            path: PathBuf::from("/tmp/abc.png"),
            public_url: "/uploads/abc.png".into(),
        });

        let fields = payload.into_fields();
        assert_eq!(fields["imageUrl"], "/uploads/abc.png");
        assert_eq!(fields["title"], "Dusk");
    }

    #[test]
    fn text_image_url_survives_without_file() {
        let mut payload = FormPayload::default();
        payload.fields.insert(IMAGE_URL_FIELD.into(), "/uploads/old.png".into());

        let fields = payload.into_fields();
        assert_eq!(fields["imageUrl"], "/uploads/old.png");
    }
}
