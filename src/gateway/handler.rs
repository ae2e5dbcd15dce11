use axum::Json;
use axum::extract::State;
use serde_json::Value;
use tracing::info;

use super::error::GatewayError;
use super::payload::{
    CacheListResponse, CompareImagesResponse, EnrichResponse, ExtractAttributesResponse,
    HealthResponse, MessageResponse, VerifyImageResponse,
};
use super::state::HandlerState;
use crate::aggregator::SourceAggregator;
use crate::cache::RecordStore;
use crate::pipeline::{ProductQuery, is_valid_upc};
use crate::vision::ImageVerifyRequest;

/// Pulls a required non-empty string field out of a JSON body.
fn required_str(body: &Value, field: &str) -> Result<String, GatewayError> {
    body.get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| GatewayError::missing_field(field))
}

fn optional_str(body: &Value, field: &str) -> Option<String> {
    body.get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
}

pub async fn health<A, R>(State(state): State<HandlerState<A, R>>) -> Json<HealthResponse>
where
    A: SourceAggregator + 'static,
    R: RecordStore + 'static,
{
    Json(HealthResponse {
        status: "ok",
        clip_model: state.models.clip_state().as_str(),
        text_model: state.models.text_state().as_str(),
    })
}

pub async fn enrich<A, R>(
    State(state): State<HandlerState<A, R>>,
    Json(body): Json<Value>,
) -> Result<Json<EnrichResponse>, GatewayError>
where
    A: SourceAggregator + 'static,
    R: RecordStore + 'static,
{
    let name = required_str(&body, "name")?;
    let brand = required_str(&body, "brand_name")?;
    let upc = required_str(&body, "upc")?;

    if !is_valid_upc(&upc) {
        return Err(GatewayError::BadRequest {
            detail: format!("Invalid UPC '{}': must be 8 to 13 digits", upc),
        });
    }

    let query = ProductQuery {
        name,
        brand,
        upc,
        size: optional_str(&body, "size"),
        color: optional_str(&body, "color"),
    };

    let outcome = state.enricher.enrich(query).await?;

    Ok(Json(EnrichResponse {
        record: outcome.record,
        cached: outcome.cached,
        persisted: outcome.persisted,
        cache_error: outcome.cache_error,
    }))
}

pub async fn list_cache<A, R>(
    State(state): State<HandlerState<A, R>>,
) -> Result<Json<CacheListResponse>, GatewayError>
where
    A: SourceAggregator + 'static,
    R: RecordStore + 'static,
{
    let products = state.store.get_all().await?;
    Ok(Json(CacheListResponse {
        count: products.len(),
        products,
    }))
}

pub async fn clear_cache<A, R>(
    State(state): State<HandlerState<A, R>>,
) -> Result<Json<MessageResponse>, GatewayError>
where
    A: SourceAggregator + 'static,
    R: RecordStore + 'static,
{
    let removed = state.store.clear().await?;
    info!(removed, "Cache cleared");
    Ok(Json(MessageResponse {
        message: format!("Cleared {} cached products", removed),
    }))
}

pub async fn verify_image<A, R>(
    State(state): State<HandlerState<A, R>>,
    Json(body): Json<Value>,
) -> Result<Json<VerifyImageResponse>, GatewayError>
where
    A: SourceAggregator + 'static,
    R: RecordStore + 'static,
{
    let request = ImageVerifyRequest {
        image_url: required_str(&body, "image_url")?,
        expected_brand: required_str(&body, "expected_brand")?,
        expected_product: required_str(&body, "expected_product")?,
        expected_color: optional_str(&body, "expected_color"),
        expected_size: optional_str(&body, "expected_size"),
    };

    let (verification, raw_scores) = state.verifier.verify(&request).await?;

    Ok(Json(VerifyImageResponse {
        success: true,
        verification,
        raw_scores,
    }))
}

pub async fn compare_images<A, R>(
    State(state): State<HandlerState<A, R>>,
    Json(body): Json<Value>,
) -> Result<Json<CompareImagesResponse>, GatewayError>
where
    A: SourceAggregator + 'static,
    R: RecordStore + 'static,
{
    let image1_url = required_str(&body, "image1_url")?;
    let image2_url = required_str(&body, "image2_url")?;

    let comparison = state.verifier.compare(&image1_url, &image2_url).await?;

    Ok(Json(CompareImagesResponse {
        success: true,
        similarity_score: comparison.similarity_score,
        are_similar: comparison.are_similar,
        image1_classification: comparison.image1_classification,
        image2_classification: comparison.image2_classification,
    }))
}

pub async fn extract_attributes<A, R>(
    State(state): State<HandlerState<A, R>>,
    Json(body): Json<Value>,
) -> Result<Json<ExtractAttributesResponse>, GatewayError>
where
    A: SourceAggregator + 'static,
    R: RecordStore + 'static,
{
    let text = required_str(&body, "text")?;

    let attrs = state.verifier.extract_attributes(&text).await?;

    Ok(Json(ExtractAttributesResponse {
        success: true,
        text,
        product_type: attrs.product_type,
        product_type_score: attrs.product_type_score,
        set_type: attrs.set_type,
        is_set: attrs.is_gift_set,
        all_product_scores: attrs.all_product_scores,
    }))
}

pub async fn preload<A, R>(
    State(state): State<HandlerState<A, R>>,
) -> Result<Json<MessageResponse>, GatewayError>
where
    A: SourceAggregator + 'static,
    R: RecordStore + 'static,
{
    state
        .models
        .preload()
        .await
        .map_err(|e| GatewayError::Internal {
            detail: e.to_string(),
        })?;

    Ok(Json(MessageResponse {
        message: format!(
            "Models loaded: clip={}, text={}",
            state.models.clip_state().as_str(),
            state.models.text_state().as_str()
        ),
    }))
}
