use anyhow::Result;
use clap::Parser;
use weather_lens::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    weather_lens::init_logging(&cli);
    weather_lens::run(cli).await
}
