use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, error, info, warn};

use application::{ApplicationError, Envelope, HealthResponse, MessageEnvelope, RecordService};
use domain::Record;

type SharedService<R> = Arc<RecordService<R>>;

/// Full REST surface for one record collection, mounted at `/<collection>`.
pub fn build_router<R: Record>(service: SharedService<R>) -> Router {
    let collection_path = format!("/{}", R::COLLECTION);
    let record_path = format!("/{}/:id", R::COLLECTION);

    Router::new()
        .route("/", get(banner_handler::<R>))
        .route("/health", get(health_check::<R>))
        .route(
            &collection_path,
            get(list_handler::<R>).post(create_handler::<R>),
        )
        .route(
            &record_path,
            get(get_handler::<R>)
                .put(update_handler::<R>)
                .delete(delete_handler::<R>),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(service)
}

/// Plain-text banner served by the secondary informational listener.
pub fn build_info_router<R: Record>() -> Router {
    Router::new().route("/", get(banner_handler::<R>))
}

// --- API Handlers ---

async fn banner_handler<R: Record>() -> String {
    format!("Serviço de {}", R::SERVICE_NAME)
}

async fn health_check<R: Record>(State(service): State<SharedService<R>>) -> Json<HealthResponse> {
    info!(collection = R::COLLECTION, "Health check endpoint called");
    Json(service.health())
}

/// GET /<collection>
async fn list_handler<R: Record>(State(service): State<SharedService<R>>) -> Response {
    info!(collection = R::COLLECTION, "Received request to list records");
    match service.list().await {
        Ok(records) => (StatusCode::OK, Json(Envelope::list(records))).into_response(),
        Err(e) => {
            error!(collection = R::COLLECTION, "Failed to list records via handler: {}", e);
            map_application_error_to_response(e)
        }
    }
}

/// GET /<collection>/:id
async fn get_handler<R: Record>(
    State(service): State<SharedService<R>>,
    Path(id): Path<String>,
) -> Response {
    info!(collection = R::COLLECTION, id = %id, "Received request to get record");
    match service.get(&id).await {
        Ok(record) => (StatusCode::OK, Json(Envelope::data(record))).into_response(),
        Err(e) => map_application_error_to_response(e),
    }
}

/// POST /<collection>
async fn create_handler<R: Record>(
    State(service): State<SharedService<R>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    info!(collection = R::COLLECTION, "Received request to create record");
    let draft = match read_payload::<R::Draft>(&headers, &body) {
        Ok(draft) => draft,
        Err(e) => return map_application_error_to_response(e),
    };
    match service.create(draft).await {
        Ok(record) => {
            info!(collection = R::COLLECTION, id = %record.id(), "Record created successfully via handler");
            (
                StatusCode::CREATED,
                Json(Envelope::data_with_message(R::created_message(), record)),
            )
                .into_response()
        }
        Err(e) => map_application_error_to_response(e),
    }
}

/// PUT /<collection>/:id
async fn update_handler<R: Record>(
    State(service): State<SharedService<R>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    info!(collection = R::COLLECTION, id = %id, "Received request to update record");
    let patch = match read_payload::<R::Patch>(&headers, &body) {
        Ok(patch) => patch,
        Err(e) => return map_application_error_to_response(e),
    };
    match service.update(&id, patch).await {
        Ok(record) => (
            StatusCode::OK,
            Json(Envelope::data_with_message(R::updated_message(), record)),
        )
            .into_response(),
        Err(e) => map_application_error_to_response(e),
    }
}

/// DELETE /<collection>/:id
async fn delete_handler<R: Record>(
    State(service): State<SharedService<R>>,
    Path(id): Path<String>,
) -> Response {
    info!(collection = R::COLLECTION, id = %id, "Received request to delete record");
    match service.delete(&id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(MessageEnvelope::message(R::deleted_message())),
        )
            .into_response(),
        Err(e) => map_application_error_to_response(e),
    }
}

/// Decodes a request payload. A body that is empty or not declared as JSON
/// carries no fields, so it reads as the payload's default; only a JSON body
/// that fails to decode is rejected.
fn read_payload<T: DeserializeOwned + Default>(
    headers: &HeaderMap,
    body: &Bytes,
) -> Result<T, ApplicationError> {
    if body.is_empty() || !has_json_content_type(headers) {
        debug!("Request carried no JSON body, using an empty payload");
        return Ok(T::default());
    }
    Json::<T>::from_bytes(body)
        .map(|Json(payload)| payload)
        .map_err(invalid_body)
}

fn has_json_content_type(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
    else {
        return false;
    };
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json"
        || (essence.starts_with("application/") && essence.ends_with("+json"))
}

fn invalid_body(rejection: JsonRejection) -> ApplicationError {
    ApplicationError::InvalidInput(format!(
        "Corpo da requisição inválido: {}",
        rejection.body_text()
    ))
}

/// Maps ApplicationError to an HTTP status and a failure envelope.
fn map_application_error_to_response(err: ApplicationError) -> Response {
    let status = match &err {
        ApplicationError::NotFound(_) => StatusCode::NOT_FOUND,
        ApplicationError::InvalidInput(msg) => {
            warn!("Rejected request body: {}", msg);
            StatusCode::BAD_REQUEST
        }
        ApplicationError::DomainError(domain_err) => {
            warn!("Domain validation failed: {}", domain_err);
            StatusCode::BAD_REQUEST
        }
    };
    (status, Json(MessageEnvelope::failure(err.to_string()))).into_response()
}
