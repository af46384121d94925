use crate::errors::AppError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct Capabilities {
    pub mcp_version: &'static str,
    pub base_dir: String,
    pub tools: Vec<ToolInfo>,
    pub streaming: bool,
}

#[derive(Debug, Serialize)]
pub struct ToolInfo {
    pub name: String,
    pub input_schema: serde_json::Value,
    pub output_schema: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorObj {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl From<&AppError> for ErrorObj {
    fn from(e: &AppError) -> Self {
        Self { code: e.code().to_string(), message: e.to_string(), hint: e.hint().map(str::to_string) }
    }
}
