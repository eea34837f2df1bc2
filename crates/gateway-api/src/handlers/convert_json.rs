//! JSON conversion with base64 payloads: `POST /convert/json`.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;

use gateway_converter::ConversionError;
use gateway_converter::codec::encode_base64;
use gateway_converter::formats::output_filename;
use gateway_core::error::AppError;

use crate::dto::request::{ContentPolicy, ConvertParams};
use crate::dto::response::ConvertResponse;
use crate::error::{public_message, report_internal, status_for};
use crate::state::AppState;

/// POST /convert/json
pub async fn convert_json(State(state): State<AppState>, body: Bytes) -> Response {
    let params: ConvertParams = match serde_json::from_slice(&body) {
        Ok(params) => params,
        Err(e) => {
            tracing::debug!(error = %e, "Unparsable JSON conversion request");
            return (
                StatusCode::BAD_REQUEST,
                Json(ConvertResponse::failed(
                    None,
                    None,
                    format!("Invalid request body: {e}"),
                )),
            )
                .into_response();
        }
    };

    let from = params.from.clone();
    let to = params.to.clone();

    let result = match params.into_request(ContentPolicy::Lenient) {
        Ok(request) => state.converter.convert(request).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(output) => {
            let filename = output_filename(&to);
            Json(ConvertResponse::ok(from, to, encode_base64(&output), filename)).into_response()
        }
        Err(e) => failure_response(from, to, e),
    }
}

fn failure_response(from: String, to: String, err: ConversionError) -> Response {
    let err = AppError::from(err);
    report_internal(&err);
    let (status, _) = status_for(err.kind);
    (
        status,
        Json(ConvertResponse::failed(
            Some(from),
            Some(to),
            public_message(&err),
        )),
    )
        .into_response()
}
