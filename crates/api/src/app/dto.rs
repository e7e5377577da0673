use serde::Deserialize;
use serde_json::Value;

// Fields arrive as `Option<Value>` so the handlers can answer "Missing
// required fields" for absent ones and route wrong-typed values through
// the domain validators instead of a serde rejection.

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub quantity: Option<Value>,
    pub contract_address: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemRequest {
    pub redeem_code: Option<Value>,
    pub wallet_address: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    pub quantity: Option<Value>,
    pub contract_address: Option<Value>,
    pub redeemed_by: Option<Value>,
}
