use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "jdb",
    about = "Serve a JSON file as a path-addressed REST API",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Serve a document file over HTTP
    Serve(ServeArgs),
    /// Print the node at a path of a document file
    Get(GetArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// Document file (defaults to ./db.json)
    pub db_path: Option<PathBuf>,
    #[arg(short, long)]
    pub port: Option<u16>,
    #[arg(long)]
    pub host: Option<String>,
    /// TOML file with server settings; flags take precedence
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Don't reload the document when the file changes
    #[arg(long)]
    pub no_watch: bool,
}

#[derive(Args)]
pub struct GetArgs {
    /// Address such as /people/1
    pub path: String,
    #[arg(long, default_value = "./db.json")]
    pub db: PathBuf,
}
