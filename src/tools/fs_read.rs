use crate::{
    errors::AppError,
    mcp::registry::Tool,
    tools::{io_error, open_for_read, required_str, DocumentRoot},
};
use async_trait::async_trait;
use axum::body::Body;
use base64::Engine;
use serde_json::json;
use std::io::Read;
use std::path::Path;

pub struct FsReadTool {
    root: DocumentRoot,
    max_read_kb: usize,
}

impl FsReadTool {
    pub fn new(root: DocumentRoot, max_read_kb: usize) -> Self {
        Self { root, max_read_kb }
    }

    fn max_bytes(&self) -> u64 {
        (self.max_read_kb as u64) * 1024
    }

    fn check_size(&self, file: &std::fs::File, full: &Path) -> Result<u64, AppError> {
        let size = file.metadata().map_err(|e| io_error(full, e))?.len();
        if size > self.max_bytes() {
            return Err(AppError::FileTooLarge { size, max: self.max_bytes() });
        }
        Ok(size)
    }
}

pub(crate) enum CappedRead {
    TooLarge(u64),
    Io(std::io::Error),
}

/// Reads at most `max + 1` bytes so a file that grew after its size was
/// checked is still refused.
pub(crate) fn read_capped(reader: impl Read, size_hint: u64, max: u64) -> Result<Vec<u8>, CappedRead> {
    let mut data = Vec::with_capacity(size_hint.min(max) as usize);
    reader.take(max + 1).read_to_end(&mut data).map_err(CappedRead::Io)?;
    if data.len() as u64 > max {
        return Err(CappedRead::TooLarge(data.len() as u64));
    }
    Ok(data)
}

#[async_trait]
impl Tool for FsReadTool {
    fn name(&self) -> &'static str { "fs_read" }
    fn capabilities(&self) -> serde_json::Value {
        json!({"input": {"type":"object","required":["path"],"properties": {"path": {"type":"string"}}}, "output": {"type":"object","properties": {"content_b64":{"type":"string"},"encoding":{"type":"string"},"canonical_path":{"type":"string"}}}})
    }

    async fn call(&self, params: serde_json::Value) -> Result<serde_json::Value, AppError> {
        let path = required_str(&params, "path")?;
        let full = self.root.resolve(path)?;
        let file = open_for_read(&full).map_err(|e| io_error(&full, e))?;
        let size = self.check_size(&file, &full)?;
        let data = read_capped(file, size, self.max_bytes()).map_err(|e| match e {
            CappedRead::TooLarge(seen) => AppError::FileTooLarge { size: seen, max: self.max_bytes() },
            CappedRead::Io(e) => io_error(&full, e),
        })?;
        let b64 = base64::engine::general_purpose::STANDARD.encode(data);
        Ok(json!({"content_b64": b64, "encoding": "base64", "canonical_path": full.to_string_lossy()}))
    }

    async fn call_stream(
        &self,
        params: serde_json::Value,
    ) -> Result<crate::server::StreamBody, AppError> {
        use futures::StreamExt;
        use tokio::io::AsyncReadExt;
        use tokio::sync::mpsc;
        use tokio_stream::wrappers::ReceiverStream;

        let path = required_str(&params, "path")?;
        let full = self.root.resolve(path)?;
        // open before responding so validation and open errors keep their status
        let std_file = open_for_read(&full).map_err(|e| io_error(&full, e))?;
        self.check_size(&std_file, &full)?;
        let mut file = tokio::fs::File::from_std(std_file);
        let max_bytes = self.max_bytes();

        let (tx, rx) = mpsc::channel::<String>(32);
        tokio::spawn(async move {
            let canonical = full.to_string_lossy().into_owned();
            let _ = tx.send(line(json!({"event":"start","tool":"fs_read","canonical_path": canonical}))).await;
            let mut buf = [0u8; 8192];
            let mut total = 0u64;
            loop {
                match file.read(&mut buf).await {
                    Ok(0) => break,
                    Ok(n) => {
                        total += n as u64;
                        if total > max_bytes {
                            let _ = tx.send(line(json!({"event":"error","error":{"code":"FileTooLarge","message":format!("file exceeds {max_bytes} bytes")}}))).await;
                            return;
                        }
                        let b64 = base64::engine::general_purpose::STANDARD.encode(&buf[..n]);
                        let _ = tx.send(line(json!({"event":"chunk","chunk_b64": b64}))).await;
                    }
                    Err(e) => {
                        let _ = tx.send(line(json!({"event":"error","error":{"code":"Internal","message": e.to_string()}}))).await;
                        return;
                    }
                }
            }
            let _ = tx.send(line(json!({"event":"end","result": {"bytes": total}}))).await;
        });

        Ok(Body::from_stream(ReceiverStream::new(rx).map(Ok::<_, std::io::Error>)))
    }
}

fn line(v: serde_json::Value) -> String {
    format!("{v}\n")
}
