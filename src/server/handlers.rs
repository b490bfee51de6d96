use crate::{
    error::Result,
    logger,
    server::{multipart::read_analyze_form, validate, AppState},
};
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use serde_json::{json, Value};
use uuid::Uuid;

/// `POST /api/enhance`
pub async fn enhance(state: web::Data<AppState>, body: web::Json<Value>) -> Result<HttpResponse> {
    let request_id = short_id();
    let request = validate::validate_text_request(&body)?;
    log::info!(
        "[req:{}] enhance target={} style={}",
        request_id,
        request.target.as_str(),
        request.art_style.as_str()
    );

    let _timer = logger::timer(&format!("enhance {}", request_id));
    let result = state.enhancer.enhance_text(&request).await.map_err(|e| {
        log::error!("[req:{}] enhance failed: {}", request_id, e);
        e
    })?;
    Ok(HttpResponse::Ok().json(result))
}

/// `POST /api/analyze`
pub async fn analyze(state: web::Data<AppState>, payload: Multipart) -> Result<HttpResponse> {
    let request_id = short_id();
    let form = read_analyze_form(payload, state.max_image_bytes).await?;
    let request = validate::validate_image_request(form)?;
    log::info!(
        "[req:{}] analyze mode={} target={} style={} image={} ({} bytes)",
        request_id,
        request.mode.as_str(),
        request.target.as_str(),
        request.art_style.as_str(),
        request.image.mime_type,
        request.image.bytes.len()
    );

    let _timer = logger::timer(&format!("analyze {}", request_id));
    let result = state.enhancer.enhance_image(&request).await.map_err(|e| {
        log::error!("[req:{}] analyze failed: {}", request_id, e);
        e
    })?;
    Ok(HttpResponse::Ok().json(result))
}

/// `GET /api/health`
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "models": state.enhancer.models(),
        "apiKeyConfigured": state.enhancer.has_backend(),
        "cachedEntries": state.enhancer.cache().len(),
    }))
}

fn short_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}
