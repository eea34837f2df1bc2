//! Multipart form conversion: `POST /convert`.

use axum::body::Body;
use axum::extract::multipart::{Multipart, MultipartError, MultipartRejection};
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::Response;

use gateway_converter::formats::output_filename;
use gateway_core::error::AppError;

use crate::dto::request::ConvertForm;
use crate::error::ApiError;
use crate::state::AppState;

/// POST /convert
///
/// Returns the converted document as an attachment.
pub async fn convert_form(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let mut multipart = multipart.map_err(|e| ApiError::Rejected {
        status: e.status(),
        message: e.body_text(),
    })?;

    let mut form = ConvertForm::default();
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        if name == "file" {
            let named = field.file_name().is_some_and(|n| !n.is_empty());
            let data = field.bytes().await.map_err(multipart_error)?;
            // Browsers send an empty, unnamed part when no file was chosen
            if named || !data.is_empty() {
                form.file = Some(data);
            }
        } else {
            let value = field.text().await.map_err(multipart_error)?;
            form.set_text(&name, value);
        }
    }

    let request = form.into_request()?;
    let filename = output_filename(&request.to_format);
    let output = state.converter.convert(request).await?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        )
        .body(Body::from(output))
        .map_err(|e| AppError::internal(format!("Failed to build response: {e}")).into())
}

fn multipart_error(err: MultipartError) -> ApiError {
    ApiError::Rejected {
        status: err.status(),
        message: err.body_text(),
    }
}
