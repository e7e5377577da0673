use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use nftdrop_infra::redemption::RedemptionService;

use crate::app::{dto, errors};
use crate::middleware::{ApiKeyState, api_key_middleware};

/// Airdrop routes for one API version.
///
/// `/generate` and `/redeem` are public; everything else requires the
/// shared admin secret. The list route only exists on the persistent (V2)
/// surface.
pub fn router(service: Arc<RedemptionService>, auth: ApiKeyState, with_list: bool) -> Router {
    let public = Router::new()
        .route("/generate", post(generate))
        .route("/redeem", post(redeem));

    let mut admin = Router::new().route(
        "/:redeem_code",
        get(get_job).put(update_job).delete(delete_job),
    );
    if with_list {
        admin = admin.route("/", get(list_jobs));
    }

    public
        .merge(admin.layer(axum::middleware::from_fn_with_state(
            auth,
            api_key_middleware,
        )))
        .layer(Extension(service))
}

pub async fn generate(
    Extension(service): Extension<Arc<RedemptionService>>,
    Json(body): Json<dto::GenerateRequest>,
) -> axum::response::Response {
    let (Some(quantity), Some(contract_address)) = (body.quantity, body.contract_address) else {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_request",
            "Missing required fields",
        );
    };
    // A wrong-typed contract value falls through the format validator.
    let contract_address = contract_address.as_str().unwrap_or_default();

    match service.generate(quantity.as_i64(), contract_address).await {
        Ok(job) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "redeemCode": job.redeem_code,
                "quantity": job.quantity,
                "contractAddress": job.contract_address,
            })),
        )
            .into_response(),
        Err(e) => errors::redemption_error_to_response(e),
    }
}

pub async fn redeem(
    Extension(service): Extension<Arc<RedemptionService>>,
    Json(body): Json<dto::RedeemRequest>,
) -> axum::response::Response {
    let (Some(redeem_code), Some(wallet_address)) = (body.redeem_code, body.wallet_address) else {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_request",
            "Missing required fields",
        );
    };
    let Some(redeem_code) = redeem_code.as_str() else {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_request",
            "Invalid redeem code",
        );
    };
    let wallet_address = wallet_address.as_str().unwrap_or_default();

    match service.redeem(redeem_code, wallet_address).await {
        Ok(job) => (StatusCode::OK, Json(job)).into_response(),
        Err(e) => errors::redemption_error_to_response(e),
    }
}

pub async fn get_job(
    Extension(service): Extension<Arc<RedemptionService>>,
    Path(redeem_code): Path<String>,
) -> axum::response::Response {
    match service.get(&redeem_code).await {
        Ok(job) => (StatusCode::OK, Json(job)).into_response(),
        Err(e) => errors::redemption_error_to_response(e),
    }
}

pub async fn update_job(
    Extension(service): Extension<Arc<RedemptionService>>,
    Path(redeem_code): Path<String>,
    Json(body): Json<dto::UpdateRequest>,
) -> axum::response::Response {
    let (Some(quantity), Some(contract_address)) = (body.quantity, body.contract_address) else {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_request",
            "Missing required fields",
        );
    };
    let contract_address = contract_address.as_str().unwrap_or_default();
    let redeemed_by = body
        .redeemed_by
        .as_ref()
        .map(|v| v.as_str().unwrap_or_default());

    match service
        .admin_update(
            &redeem_code,
            quantity.as_i64(),
            contract_address,
            redeemed_by,
        )
        .await
    {
        Ok(job) => (StatusCode::OK, Json(job)).into_response(),
        Err(e) => errors::redemption_error_to_response(e),
    }
}

pub async fn delete_job(
    Extension(service): Extension<Arc<RedemptionService>>,
    Path(redeem_code): Path<String>,
) -> axum::response::Response {
    match service.admin_delete(&redeem_code).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "message": "Airdrop job deleted" })),
        )
            .into_response(),
        Err(e) => errors::redemption_error_to_response(e),
    }
}

pub async fn list_jobs(
    Extension(service): Extension<Arc<RedemptionService>>,
) -> axum::response::Response {
    match service.list().await {
        Ok(jobs) => (StatusCode::OK, Json(serde_json::json!({ "jobs": jobs }))).into_response(),
        Err(e) => errors::redemption_error_to_response(e),
    }
}
