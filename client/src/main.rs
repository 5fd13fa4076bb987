use {
    anyhow::Result,
    clap::Parser,
    webdrop::{cli::Cli, config::Config, run, setup_logger},
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.clone())?;
    setup_logger(&config.log_filter)?;
    run(cli, config).await
}
