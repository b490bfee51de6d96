use crate::{
    error::{EnhanceError, Result},
    models::{
        AnalyzeMode, ArtStyle, ImageEnhanceRequest, ReferenceImage, TargetTool,
        TextEnhanceRequest,
    },
};
use serde_json::Value;

/// A file part received in the analyze form.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Raw fields of `POST /api/analyze` before validation.
#[derive(Debug, Clone, Default)]
pub struct AnalyzeForm {
    pub image: Option<UploadedFile>,
    pub idea: Option<String>,
    pub target: Option<String>,
    pub art_style: Option<String>,
    pub mode: Option<String>,
}

pub fn validate_text_request(body: &Value) -> Result<TextEnhanceRequest> {
    let idea = match body.get("idea") {
        Some(Value::String(idea)) if !idea.trim().is_empty() => idea.clone(),
        Some(Value::String(_)) => {
            return Err(EnhanceError::InvalidRequest("'idea' must not be empty".into()))
        }
        Some(_) => return Err(EnhanceError::InvalidRequest("'idea' must be a string".into())),
        None => return Err(EnhanceError::InvalidRequest("Missing 'idea'".into())),
    };

    Ok(TextEnhanceRequest {
        idea,
        target: TargetTool::from_key(str_field(body, "target")),
        art_style: ArtStyle::from_key(str_field(body, "artStyle")),
    })
}

fn str_field<'a>(body: &'a Value, name: &str) -> &'a str {
    body.get(name).and_then(Value::as_str).unwrap_or_default()
}

pub fn validate_image_request(form: AnalyzeForm) -> Result<ImageEnhanceRequest> {
    let file = form
        .image
        .ok_or_else(|| EnhanceError::InvalidRequest("Missing 'image' file".into()))?;
    if file.filename.is_none() {
        return Err(EnhanceError::InvalidRequest("'image' must be a file".into()));
    }
    if file.bytes.is_empty() {
        return Err(EnhanceError::InvalidRequest("'image' is empty".into()));
    }

    let mime_type = file
        .content_type
        .filter(|ct| ct.starts_with("image/"))
        .or_else(|| sniff_image_type(&file.bytes).map(String::from))
        .ok_or_else(|| EnhanceError::InvalidRequest("'image' is not a supported image".into()))?;

    Ok(ImageEnhanceRequest {
        idea: form.idea.filter(|idea| !idea.trim().is_empty()),
        target: TargetTool::from_key(form.target.as_deref().unwrap_or_default()),
        art_style: ArtStyle::from_key(form.art_style.as_deref().unwrap_or_default()),
        mode: AnalyzeMode::from_key(form.mode.as_deref().unwrap_or_default()),
        image: ReferenceImage {
            mime_type,
            bytes: file.bytes,
        },
    })
}

/// Recognizes the formats the provider accepts from their magic bytes.
fn sniff_image_type(bytes: &[u8]) -> Option<&'static str> {
    match bytes {
        [0x89, b'P', b'N', b'G', ..] => Some("image/png"),
        [0xff, 0xd8, 0xff, ..] => Some("image/jpeg"),
        [b'G', b'I', b'F', b'8', ..] => Some("image/gif"),
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some("image/webp"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn png(content_type: Option<&str>) -> UploadedFile {
        UploadedFile {
            filename: Some("ref.png".into()),
            content_type: content_type.map(String::from),
            bytes: vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a],
        }
    }

    #[test]
    fn text_request_requires_string_idea() {
        assert!(matches!(
            validate_text_request(&json!({})),
            Err(EnhanceError::InvalidRequest(_))
        ));
        assert!(matches!(
            validate_text_request(&json!({ "idea": 42 })),
            Err(EnhanceError::InvalidRequest(_))
        ));
        assert!(matches!(
            validate_text_request(&json!({ "idea": "   " })),
            Err(EnhanceError::InvalidRequest(_))
        ));
    }

    #[test]
    fn text_request_tolerates_unknown_enums() {
        let request = validate_text_request(&json!({
            "idea": "a red dragon logo",
            "target": 7,
            "artStyle": "vector-logo"
        }))
        .unwrap();
        assert_eq!(request.target, TargetTool::Generic);
        assert_eq!(request.art_style, ArtStyle::VectorLogo);
    }

    #[test]
    fn image_request_requires_a_file() {
        let missing = validate_image_request(AnalyzeForm::default());
        assert!(matches!(missing, Err(EnhanceError::InvalidRequest(_))));

        let not_a_file = validate_image_request(AnalyzeForm {
            image: Some(UploadedFile {
                filename: None,
                ..png(Some("image/png"))
            }),
            ..Default::default()
        });
        assert!(matches!(not_a_file, Err(EnhanceError::InvalidRequest(_))));
    }

    #[test]
    fn image_request_defaults_and_sniffing() {
        let request = validate_image_request(AnalyzeForm {
            image: Some(png(Some("application/octet-stream"))),
            idea: Some("  ".into()),
            mode: Some("style-only".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(request.image.mime_type, "image/png");
        assert_eq!(request.idea, None);
        assert_eq!(request.mode, AnalyzeMode::StyleOnly);
        assert_eq!(request.target, TargetTool::Generic);
    }

    #[test]
    fn unrecognized_bytes_are_rejected() {
        let result = validate_image_request(AnalyzeForm {
            image: Some(UploadedFile {
                filename: Some("notes.txt".into()),
                content_type: Some("text/plain".into()),
                bytes: b"hello".to_vec(),
            }),
            ..Default::default()
        });
        assert!(matches!(result, Err(EnhanceError::InvalidRequest(_))));
    }
}
