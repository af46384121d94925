use crate::{errors::AppError, mcp::registry::Tool, tools::{required_str, DocumentRoot}};
use async_trait::async_trait;
use serde_json::json;

/// Runs the validator alone, for collaborators that do their own I/O.
pub struct ResolvePathTool { root: DocumentRoot }

impl ResolvePathTool { pub fn new(root: DocumentRoot) -> Self { Self { root } } }

#[async_trait]
impl Tool for ResolvePathTool {
    fn name(&self) -> &'static str { "resolve_path" }
    fn capabilities(&self) -> serde_json::Value {
        json!({"input": {"type":"object","required":["path"],"properties": {"path": {"type":"string"}}}, "output": {"type":"object","properties": {"canonical_path":{"type":"string"}}}})
    }
    async fn call(&self, params: serde_json::Value) -> Result<serde_json::Value, AppError> {
        let path = required_str(&params, "path")?;
        let full = self.root.resolve(path)?;
        Ok(json!({"canonical_path": full.to_string_lossy()}))
    }
}
