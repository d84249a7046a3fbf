use std::env;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub table_name: String,
    pub bucket_name: String,
    pub source_email: String,
    pub service_name: String,
    pub stage: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads settings through `lookup`, falling back to defaults for unset keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let service_name = var("SERVICE_NAME", "serverless-starter");
        let stage = var("STAGE", "dev");
        let bucket_name =
            lookup("BUCKET_NAME").unwrap_or_else(|| format!("{service_name}-{stage}-bucket"));

        Self {
            table_name: var("DYNAMODB_TABLE", "items-table"),
            bucket_name,
            source_email: var("SOURCE_EMAIL", "no-reply@example.com"),
            service_name,
            stage,
        }
    }
}
