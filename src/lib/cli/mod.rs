use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "bizops-agent",
    version,
    about = "Answers business questions by orchestrating MCP tool calls"
)]
pub struct Cli {
    /// Configuration file (defaults to config/agent.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Tenant (business id) the question is asked for
    #[arg(long, short)]
    pub tenant: Option<String>,
    #[arg(long, short, value_enum, default_value_t = RunMode::Cli)]
    pub mode: RunMode,
    #[arg(long, default_value = "127.0.0.1:8080")]
    pub rest_addr: SocketAddr,
    /// Overrides `policy.max_rounds`
    #[arg(long)]
    pub max_rounds: Option<usize>,
    /// Overrides the configured system prompt
    #[arg(long)]
    pub system: Option<String>,
    /// Conversation id for turn memory in cli mode
    #[arg(long)]
    pub conversation: Option<String>,
    /// Read the question from a file
    #[arg(long)]
    pub prompt_file: Option<PathBuf>,
    /// The question; read from stdin when omitted
    pub utterance: Vec<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum RunMode {
    /// Answer one question and exit
    Cli,
    /// JSON-lines requests on stdin
    Stdio,
    /// REST API server
    Rest,
}
