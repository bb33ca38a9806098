use std::net::IpAddr;
use std::path::Path;

use anyhow::{anyhow, bail, Context};
use colored::Colorize;
use jdb_server::{JdbServer, ServerConfig};
use jdb_store::{DocumentStore, FileBackend};
use jdb_tree::{resolve, DocPath};
use serde_json::Value;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
    match cli.command {
        Command::Serve(args) => runtime.block_on(cmd_serve(args)),
        Command::Get(args) => runtime.block_on(cmd_get(args)),
    }
}

async fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = server_config(&args)?;
    println!(
        "{} Serving {} on port {}",
        "✓".green().bold(),
        config.db_path.display().to_string().bold(),
        config.bind_addr.port().to_string().yellow()
    );
    if !config.watch {
        println!("  {}", "file watching disabled".dimmed());
    }
    JdbServer::new(config).serve().await?;
    Ok(())
}

async fn cmd_get(args: GetArgs) -> anyhow::Result<()> {
    let node = lookup(&args.db, &args.path).await?;
    println!("{}", serde_json::to_string_pretty(&node)?);
    Ok(())
}

/// Merge the optional config file with command-line overrides.
fn server_config(args: &ServeArgs) -> anyhow::Result<ServerConfig> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    if let Some(db_path) = &args.db_path {
        config.db_path = db_path.clone();
    }
    if let Some(port) = args.port {
        config = config.with_port(port);
    }
    if let Some(host) = &args.host {
        let ip: IpAddr = host.parse().with_context(|| format!("invalid host address {host:?}"))?;
        config.bind_addr.set_ip(ip);
    }
    if args.no_watch {
        config.watch = false;
    }
    Ok(config)
}

/// Read `db` and return the node at `raw_path`.
async fn lookup(db: &Path, raw_path: &str) -> anyhow::Result<Value> {
    if !db.exists() {
        bail!("document file {} does not exist", db.display());
    }
    let path = DocPath::from_uri_path(raw_path)?;
    let store = DocumentStore::new(FileBackend::new(db));
    let document = store
        .load()
        .await
        .ok_or_else(|| anyhow!("couldn't read document from {}", db.display()))?;
    resolve(&document, &path)
        .cloned()
        .ok_or_else(|| anyhow!("nothing at {path}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;

    fn serve_args() -> ServeArgs {
        ServeArgs { db_path: None, port: None, host: None, config: None, no_watch: false }
    }

    #[test]
    fn defaults_without_flags() {
        assert_eq!(server_config(&serve_args()).unwrap(), ServerConfig::default());
    }

    #[test]
    fn flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("jdb.toml");
        std::fs::write(&file, "db_path = \"from-file.json\"\nbind_addr = \"127.0.0.1:7000\"\n").unwrap();

        let args = ServeArgs {
            config: Some(file),
            port: Some(7100),
            no_watch: true,
            ..serve_args()
        };
        let config = server_config(&args).unwrap();
        assert_eq!(config.db_path, PathBuf::from("from-file.json"));
        assert_eq!(config.bind_addr, "127.0.0.1:7100".parse().unwrap());
        assert!(!config.watch);
    }

    #[test]
    fn host_must_be_an_ip() {
        let args = ServeArgs { host: Some("not an ip".into()), ..serve_args() };
        assert!(server_config(&args).is_err());
        let args = ServeArgs { host: Some("127.0.0.1".into()), db_path: Some("x.json".into()), ..serve_args() };
        let config = server_config(&args).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:8000".parse().unwrap());
        assert_eq!(config.db_path, PathBuf::from("x.json"));
    }

    #[tokio::test]
    async fn lookup_resolves_paths() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("db.json");
        std::fs::write(&db, json!({"people": [{"id": 1, "name": "Ann"}]}).to_string()).unwrap();

        assert_eq!(lookup(&db, "/people/1").await.unwrap(), json!({"id": 1, "name": "Ann"}));
        assert!(lookup(&db, "/people/2").await.is_err());
        assert!(lookup(&dir.path().join("none.json"), "/people").await.is_err());
    }
}
