use std::io::Write;

use clap::Parser;
use spa_build::{BuildCommand, DEFAULT_PUBLIC_URL};

#[derive(Parser, Debug)]
#[command(name = "spa_build")]
#[command(about = "Build the SPA bundle for the static origin")]
struct Cli {
    /// Directory of the front-end project.
    #[arg(long, default_value = "my-app")]
    app_dir: String,

    /// URL the bundle is deployed under, exported as `PUBLIC_URL`.
    #[arg(long, default_value = DEFAULT_PUBLIC_URL)]
    public_url: String,

    /// npm script to run.
    #[arg(long, default_value = "build")]
    script: String,
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter("spa_build=info")
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output = BuildCommand::npm(&cli.app_dir, &cli.script, &cli.public_url).run()?;

    let mut stdout = std::io::stdout();
    stdout.write_all(&output)?;
    stdout.flush()?;

    Ok(())
}
