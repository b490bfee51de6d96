use crate::{
    error::{EnhanceError, Result},
    server::validate::{AnalyzeForm, UploadedFile},
};
use actix_multipart::{Field, Multipart};
use futures::TryStreamExt;

const MAX_TEXT_FIELD_BYTES: usize = 64 * 1024;

/// Drains the analyze form. Unknown fields are read and ignored.
pub async fn read_analyze_form(
    mut payload: Multipart,
    max_image_bytes: usize,
) -> Result<AnalyzeForm> {
    let mut form = AnalyzeForm::default();

    while let Some(field) = payload.try_next().await.map_err(malformed)? {
        let name = field.name().to_string();
        match name.as_str() {
            "image" => {
                let filename = field.content_disposition().get_filename().map(String::from);
                let content_type = field
                    .content_type()
                    .map(|mime| mime.essence_str().to_string());
                let bytes = read_field(field, max_image_bytes, |size| {
                    EnhanceError::ImageTooLarge {
                        size,
                        limit: max_image_bytes,
                    }
                })
                .await?;
                form.image = Some(UploadedFile {
                    filename,
                    content_type,
                    bytes,
                });
            }
            "idea" | "target" | "artStyle" | "mode" => {
                let text = read_text(field, &name).await?;
                match name.as_str() {
                    "idea" => form.idea = Some(text),
                    "target" => form.target = Some(text),
                    "artStyle" => form.art_style = Some(text),
                    _ => form.mode = Some(text),
                }
            }
            other => {
                log::debug!("Ignoring unexpected form field '{}'", other);
                read_field(field, MAX_TEXT_FIELD_BYTES, |_| {
                    EnhanceError::InvalidRequest(format!("Field '{}' is too large", other))
                })
                .await?;
            }
        }
    }

    Ok(form)
}

async fn read_text(field: Field, name: &str) -> Result<String> {
    let bytes = read_field(field, MAX_TEXT_FIELD_BYTES, |_| {
        EnhanceError::InvalidRequest(format!("Field '{}' is too large", name))
    })
    .await?;
    String::from_utf8(bytes)
        .map_err(|_| EnhanceError::InvalidRequest(format!("Field '{}' is not valid UTF-8", name)))
}

async fn read_field<F>(mut field: Field, limit: usize, too_large: F) -> Result<Vec<u8>>
where
    F: Fn(usize) -> EnhanceError,
{
    let mut bytes = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(malformed)? {
        if bytes.len() + chunk.len() > limit {
            return Err(too_large(bytes.len() + chunk.len()));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

fn malformed(err: actix_multipart::MultipartError) -> EnhanceError {
    EnhanceError::InvalidRequest(format!("Malformed multipart body: {}", err))
}
