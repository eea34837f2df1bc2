//! JSON-RPC 2.0 endpoint: `POST /rpc`.
//!
//! Always answers HTTP 200; failures travel in the `error` member.

use axum::Json;
use axum::extract::State;
use bytes::Bytes;
use serde_json::Value;

use gateway_converter::ConversionError;
use gateway_converter::codec::encode_base64;

use crate::dto::request::{ContentPolicy, ConvertParams};
use crate::dto::rpc::{
    CONVERSION_FAILED, INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND,
    PARSE_ERROR, RpcConvertResult, RpcError, RpcResponse,
};
use crate::state::AppState;

/// POST /rpc
pub async fn rpc(State(state): State<AppState>, body: Bytes) -> Json<RpcResponse> {
    Json(dispatch(&state, &body).await)
}

async fn dispatch(state: &AppState, body: &[u8]) -> RpcResponse {
    let envelope: Value = match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(e) => {
            return RpcResponse::failure(
                Value::Null,
                RpcError::new(PARSE_ERROR, "Parse error").with_data(e.to_string()),
            );
        }
    };

    let Value::Object(mut envelope) = envelope else {
        return RpcResponse::failure(
            Value::Null,
            RpcError::new(INVALID_REQUEST, "Invalid Request").with_data("expected a JSON object"),
        );
    };

    let id = envelope.remove("id").unwrap_or(Value::Null);

    let method = match envelope.remove("method") {
        Some(Value::String(method)) => method,
        _ => {
            return RpcResponse::failure(
                id,
                RpcError::new(INVALID_REQUEST, "Invalid Request")
                    .with_data("'method' must be a string"),
            );
        }
    };

    if method != "convert" {
        tracing::debug!(method = %method, "Unknown RPC method");
        return RpcResponse::failure(
            id,
            RpcError::new(METHOD_NOT_FOUND, format!("Method not found: {method}")),
        );
    }

    let params = envelope.remove("params").unwrap_or(Value::Null);
    let params: ConvertParams = match serde_json::from_value(params) {
        Ok(params) => params,
        Err(e) => {
            return RpcResponse::failure(
                id,
                RpcError::new(INVALID_PARAMS, "Invalid params").with_data(e.to_string()),
            );
        }
    };

    let from = params.from.clone();
    let to = params.to.clone();

    let result = match params.into_request(ContentPolicy::Strict) {
        Ok(request) => state.converter.convert(request).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(output) => RpcResponse::success(
            id,
            RpcConvertResult {
                from,
                to,
                content: encode_base64(&output),
            },
        ),
        Err(e) => RpcResponse::failure(id, rpc_error(&e)),
    }
}

/// JSON-RPC error object for a conversion failure.
pub fn rpc_error(err: &ConversionError) -> RpcError {
    match err {
        ConversionError::InvalidFormat { .. } | ConversionError::InvalidParams(_) => {
            RpcError::new(INVALID_PARAMS, err.to_string())
        }
        ConversionError::ToolUnavailable(_)
        | ConversionError::ExecutionTimeout { .. }
        | ConversionError::ExecutionFailure { .. } => {
            let error = RpcError::new(CONVERSION_FAILED, format!("Conversion failed: {err}"));
            match err.diagnostics() {
                Some(stderr) => error.with_data(stderr.trim().to_string()),
                None => error,
            }
        }
        ConversionError::Internal(detail) => {
            tracing::error!(error = %detail, "Internal error during RPC conversion");
            RpcError::new(INTERNAL_ERROR, "Internal error")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_converter::FormatRole;

    #[test]
    fn test_error_codes() {
        let invalid = ConversionError::InvalidFormat {
            role: FormatRole::Input,
            format: String::new(),
        };
        assert_eq!(rpc_error(&invalid).code, INVALID_PARAMS);

        let failure = ConversionError::ExecutionFailure {
            message: "Tool exited with code 64".into(),
            exit_code: Some(64),
            stderr: Some("Unknown output format nope\n".into()),
        };
        let error = rpc_error(&failure);
        assert_eq!(error.code, CONVERSION_FAILED);
        assert_eq!(error.data, Some(Value::from("Unknown output format nope")));

        let timeout = ConversionError::ExecutionTimeout { timeout_seconds: 5 };
        assert_eq!(rpc_error(&timeout).code, CONVERSION_FAILED);

        let internal = rpc_error(&ConversionError::internal("disk on fire"));
        assert_eq!(internal.code, INTERNAL_ERROR);
        assert!(!internal.message.contains("disk"));
    }
}
