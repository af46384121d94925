use anyhow::Context;
use basegate::{
    config::Config,
    logging,
    mcp::registry::ToolRegistry,
    server::{self, AppState},
    tools::DocumentRoot,
    workspace,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let args: Vec<String> = std::env::args().collect();
    let mut config_path = PathBuf::from("basegate.toml");
    let mut i = 1;
    while i < args.len() {
        if args[i] == "--config" {
            i += 1;
            if i >= args.len() { eprintln!("--config requires a path"); std::process::exit(2); }
            config_path = PathBuf::from(&args[i]);
        }
        i += 1;
    }

    let cfg = Config::load(&config_path).context("loading config")?;
    workspace::set_host_workspace_root(cfg.workspace_root());
    let base_dir = cfg.validate().context("validating config")?;

    let root = DocumentRoot::new(cfg.validator(), base_dir.clone());
    let registry = ToolRegistry::new(root, &cfg.limits);

    let addr = format!("{}:{}", cfg.server.bind_addr, cfg.server.port);
    info!(
        addr = %addr,
        base_path = %cfg.server.base_path,
        base_dir = %base_dir.display(),
        workspace_root = ?cfg.workspace_root(),
        tools = ?registry.list_names(),
        "basegate ready"
    );

    server::serve(AppState {
        cfg: Arc::new(cfg),
        registry: Arc::new(registry),
        base_dir: Arc::new(base_dir),
    })
    .await
}
