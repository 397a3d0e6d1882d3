use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use super::domain::SurveyConfig;
use super::source::SurveySource;
use crate::error::AppError;

/// Router serving the survey config and module documents to clients.
pub fn survey_data_router<S>(source: Arc<S>) -> Router
where
    S: SurveySource + 'static,
{
    Router::new()
        .route("/data/:file", get(document_handler::<S>))
        .route("/api/v1/survey", get(survey_handler::<S>))
        .with_state(source)
}

pub(crate) async fn document_handler<S>(
    State(source): State<Arc<S>>,
    Path(file): Path<String>,
) -> Result<Response, AppError>
where
    S: SurveySource + 'static,
{
    let bytes = source.document(&file)?;
    let content_type = mime_guess::from_path(&file).first_or_octet_stream();
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, content_type.essence_str().to_string())],
        bytes,
    )
        .into_response())
}

/// Parsed and validated survey config.
pub(crate) async fn survey_handler<S>(
    State(source): State<Arc<S>>,
) -> Result<Json<SurveyConfig>, AppError>
where
    S: SurveySource + 'static,
{
    Ok(Json(source.load_config()?))
}
