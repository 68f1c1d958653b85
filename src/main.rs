use anyhow::Result;
use bvp_cache::cli::Cli;
use clap::Parser;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("bvp_cache=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    cli.run()
}
