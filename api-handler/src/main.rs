use std::sync::Arc;

use aws_lambda_events::apigw::{ApiGatewayV2httpRequest, ApiGatewayV2httpResponse};
use aws_lambda_events::encodings::Body;
use aws_lambda_events::http::{HeaderMap, HeaderValue};
use aws_sdk_dynamodb::Client as DynamoClient;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_sesv2::Client as SesClient;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde::Serialize;
use shared::config::AppConfig;
use shared::storage::DynamoItemStore;
use shared::ItemStore;
use tracing::{info, instrument};
use tracing_subscriber::filter::LevelFilter;

mod error;
mod routes;
mod services;
#[cfg(test)]
mod test_utils;

use routes::Route;
use services::{FileStore, Mailer, S3FileStore, SesMailer};

/// Collaborators built once at startup and shared by every invocation.
pub struct AppState {
    pub items: Arc<dyn ItemStore>,
    pub files: Arc<dyn FileStore>,
    pub mailer: Arc<dyn Mailer>,
    pub config: AppConfig,
}

fn cors_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("access-control-allow-origin", HeaderValue::from_static("*"));
    headers.insert(
        "access-control-allow-methods",
        HeaderValue::from_static("GET, POST, PUT, DELETE, OPTIONS"),
    );
    headers.insert(
        "access-control-allow-headers",
        HeaderValue::from_static("Content-Type, Authorization"),
    );
    headers
}

pub fn json_response<T: Serialize>(status_code: i64, body: &T) -> ApiGatewayV2httpResponse {
    let mut headers = cors_headers();
    headers.insert("content-type", HeaderValue::from_static("application/json"));

    ApiGatewayV2httpResponse {
        status_code,
        headers,
        multi_value_headers: HeaderMap::new(),
        body: Some(Body::Text(serde_json::to_string(body).unwrap_or_default())),
        is_base64_encoded: false,
        cookies: vec![],
    }
}

fn preflight_response() -> ApiGatewayV2httpResponse {
    ApiGatewayV2httpResponse {
        status_code: 200,
        headers: cors_headers(),
        multi_value_headers: HeaderMap::new(),
        body: None,
        is_base64_encoded: false,
        cookies: vec![],
    }
}

#[instrument(skip(state, event), fields(path = %event.payload.raw_path.as_deref().unwrap_or("/")))]
async fn router(
    state: &AppState,
    event: LambdaEvent<ApiGatewayV2httpRequest>,
) -> Result<ApiGatewayV2httpResponse, Error> {
    Ok(dispatch(state, event.payload).await)
}

async fn dispatch(
    state: &AppState,
    mut request: ApiGatewayV2httpRequest,
) -> ApiGatewayV2httpResponse {
    let method = request.request_context.http.method.as_str().to_string();
    let path = request.raw_path.clone().unwrap_or_else(|| "/".to_string());

    info!(method = %method, path = %path, "Handling request");

    let route = Route::resolve(&method, &path);
    route.bind_path_parameters(&mut request);

    match route {
        Route::Preflight => preflight_response(),
        Route::Health => routes::health::handle(state).await,
        Route::ListItems => routes::items::list(state, &request).await,
        Route::CreateItem => routes::items::create(state, &request).await,
        Route::GetItem(_) => routes::items::get(state, &request).await,
        Route::UpdateItem(_) => routes::items::update(state, &request).await,
        Route::DeleteItem(_) => routes::items::delete(state, &request).await,
        Route::UploadFile => routes::files::upload(state, &request).await,
        Route::GetFile(_) => routes::files::get(state, &request).await,
        Route::SendEmail => routes::email::send(state, &request).await,
        Route::NotFound => error::ApiError::NotFound(error::ROUTE_NOT_FOUND).into_response(),
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .without_time()
        .init();

    let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .load()
        .await;
    let config = AppConfig::from_env();

    info!(
        table = %config.table_name,
        bucket = %config.bucket_name,
        service = %config.service_name,
        stage = %config.stage,
        "Starting Lambda"
    );

    let state = AppState {
        items: Arc::new(DynamoItemStore::new(
            DynamoClient::new(&aws_config),
            config.table_name.clone(),
        )),
        files: Arc::new(S3FileStore::new(
            S3Client::new(&aws_config),
            config.bucket_name.clone(),
        )),
        mailer: Arc::new(SesMailer::new(SesClient::new(&aws_config))),
        config,
    };
    lambda_runtime::run(service_fn(|event| router(&state, event))).await
}
