use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use nftdrop_infra::redemption::RedemptionError;

pub fn redemption_error_to_response(err: RedemptionError) -> axum::response::Response {
    let message = err.to_string();
    match err {
        RedemptionError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", message),
        RedemptionError::AlreadyRedeemed | RedemptionError::NotFoundOrRedeemed => {
            json_error(StatusCode::BAD_REQUEST, "already_redeemed", message)
        }
        RedemptionError::Transfer(_) => {
            json_error(StatusCode::BAD_REQUEST, "transfer_failed", message)
        }
        RedemptionError::InvalidContract
        | RedemptionError::InvalidQuantity
        | RedemptionError::InvalidWallet => {
            json_error(StatusCode::BAD_REQUEST, "invalid_request", message)
        }
        RedemptionError::Store(_) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", message)
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
