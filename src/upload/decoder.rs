use axum::extract::multipart::{Field, MultipartError};
use axum::extract::Multipart;
use axum::http::StatusCode;

use super::{FormPayload, UploadError, UploadStore, UploadedFile};

/// Decode a multipart body into text fields and at most one stored file.
///
/// Only a part named `file_field` with a non-empty filename is written to
/// `store`; the first such part wins. Other file parts are skipped, as is
/// every file part when `file_field` is `None`.
pub async fn decode(
    mut multipart: Multipart,
    store: &UploadStore,
    file_field: Option<&str>,
) -> Result<FormPayload, UploadError> {
    let mut payload = FormPayload::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(str::to_owned) else {
            tracing::debug!("Skipping unnamed multipart part");
            continue;
        };

        match field.file_name().map(str::to_owned) {
            None => {
                let value = field.text().await.map_err(multipart_error)?;
                payload.fields.insert(name, value);
            }
            // An empty filename means the client attached no file
            Some(filename) if filename.is_empty() => {
                tracing::debug!("File part '{}' has no filename, nothing stored", name);
            }
            Some(filename) => {
                if file_field != Some(name.as_str()) || payload.file.is_some() {
                    tracing::debug!("Ignoring file part '{}' ({})", name, filename);
                    continue;
                }
                payload.file = Some(persist(field, &filename, store).await?);
            }
        }
    }

    Ok(payload)
}

async fn persist(
    mut field: Field<'_>,
    filename: &str,
    store: &UploadStore,
) -> Result<UploadedFile, UploadError> {
    let mut pending = store.create(filename).await?;

    // Any early return drops `pending`, which removes the partial file
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        pending.write(&chunk).await?;
    }
    let upload = pending.finish().await?;

    tracing::info!(
        "Stored upload '{}' as {}",
        upload.original_name,
        upload.stored_name
    );
    Ok(upload)
}

fn multipart_error(err: MultipartError) -> UploadError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        UploadError::TooLarge
    } else {
        UploadError::Malformed(err.body_text())
    }
}
