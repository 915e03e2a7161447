use std::env;
use thiserror::Error;

pub const DEFAULT_AWS_REGION: &str = "us-east-1";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// ストアと DynamoDB クライアントの構築に必要な設定
///
/// テーブル名は未設定でも構築でき、最初のテーブル操作でエラーになる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub todos_table: Option<String>,
    pub aws_region: String,
    pub dynamodb_endpoint: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 任意の参照関数から設定を組み立てる（空文字は未設定扱い）
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let dynamodb_endpoint = get("DYNAMODB_ENDPOINT");
        if let Some(endpoint) = &dynamodb_endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(ConfigError::Invalid {
                    name: "DYNAMODB_ENDPOINT",
                    reason: format!("expected an http(s) URL, got {endpoint}"),
                });
            }
        }

        Ok(Config {
            todos_table: get("TODOS_TABLE"),
            aws_region: get("DEFAULT_AWS_REGION")
                .unwrap_or_else(|| DEFAULT_AWS_REGION.to_string()),
            dynamodb_endpoint,
        })
    }
}
