use crate::{
    errors::AppError,
    mcp::registry::Tool,
    tools::{io_error, open_for_write, required_str, DocumentRoot},
};
use async_trait::async_trait;
use base64::Engine;
use serde_json::json;
use std::{fs, io::Write};

pub struct FsWriteTool {
    root: DocumentRoot,
}
impl FsWriteTool {
    pub fn new(root: DocumentRoot) -> Self {
        Self { root }
    }
}

#[async_trait]
impl Tool for FsWriteTool {
    fn name(&self) -> &'static str { "fs_write" }
    fn capabilities(&self) -> serde_json::Value {
        json!({"input": {"type":"object","required":["path","content_b64"],"properties": {"path": {"type":"string"},"content_b64":{"type":"string"},"mode":{"type":"string"}}}, "output": {"type":"object","properties": {"bytes_written":{"type":"integer"},"canonical_path":{"type":"string"}}}})
    }
    async fn call(&self, params: serde_json::Value) -> Result<serde_json::Value, AppError> {
        let path = required_str(&params, "path")?;
        let content_b64 = required_str(&params, "content_b64")?;
        let mode = match params.get("mode").and_then(|v| v.as_str()) {
            Some(m) => Some(
                u32::from_str_radix(m, 8)
                    .map_err(|_| AppError::ToolError(format!("invalid mode {m:?}")))?,
            ),
            None => None,
        };
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(content_b64)
            .map_err(|_| AppError::ToolError("invalid base64".into()))?;

        // nothing touches the disk until the path is accepted
        let full = self.root.resolve(path)?;
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }
        let mut file = open_for_write(&full, mode).map_err(|e| io_error(&full, e))?;
        file.write_all(&bytes).map_err(|e| io_error(&full, e))?;
        Ok(json!({"bytes_written": bytes.len(), "canonical_path": full.to_string_lossy()}))
    }
}
