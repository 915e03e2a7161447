use serde::{Deserialize, Serialize};

/// 外部 ID プロバイダー（Auth0 互換）の接続パラメーター
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthConfig {
    pub domain: String,
    pub client_id: String,
    pub callback_url: String,
}

/// フロントエンドに埋め込む静的設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    pub api_endpoint: String,
    pub auth: AuthConfig,
}

impl ClientConfig {
    pub fn new(api_id: &str, region: &str, stage: &str, auth: AuthConfig) -> Self {
        Self {
            api_endpoint: api_gateway_endpoint(api_id, region, stage),
            auth,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// API Gateway のデプロイ済みステージ URL
pub fn api_gateway_endpoint(api_id: &str, region: &str, stage: &str) -> String {
    format!("https://{api_id}.execute-api.{region}.amazonaws.com/{stage}")
}
