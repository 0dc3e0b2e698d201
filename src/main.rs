use clap::Parser;
use cplgen::cli::{execute, Cli};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cplgen=info,cplgen_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match execute(&cli) {
        Ok(compilation) => info!(
            output = %cli.output.display(),
            components = compilation.document.sections.len(),
            "Configuration written"
        ),
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(1);
        }
    }
}
