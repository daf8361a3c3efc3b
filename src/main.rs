use bizops_mcp_agent::{Cli, run};
use clap::Parser;
use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    run(Cli::parse()).await
}
