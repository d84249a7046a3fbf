use crate::{json_response, AppState};
use aws_lambda_events::apigw::ApiGatewayV2httpResponse;
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub service: String,
    pub stage: String,
}

pub async fn handle(state: &AppState) -> ApiGatewayV2httpResponse {
    json_response(
        200,
        &HealthResponse {
            status: "healthy",
            version: env!("CARGO_PKG_VERSION"),
            service: state.config.service_name.clone(),
            stage: state.config.stage.clone(),
        },
    )
}
