use almofasir::cli::{Cli, Commands};
use almofasir::services::reslug::ReslugOptions;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "almofasir=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Init { path, name }) => {
            almofasir::cli::init::run(path, name).await?;
        }
        Some(Commands::Serve { host, port }) => {
            almofasir::cli::serve::run(&cli.config, host, port).await?;
        }
        Some(Commands::Migrate { command }) => {
            almofasir::cli::migrate::run(&cli.config, command).await?;
        }
        Some(Commands::Slugify {
            text,
            max_length,
            max_tokens,
        }) => {
            almofasir::cli::slug::slugify(&cli.config, &text, max_length, max_tokens)?;
        }
        Some(Commands::Validate { slugs }) => {
            almofasir::cli::slug::validate(&cli.config, &slugs)?;
        }
        Some(Commands::Import { dir }) => {
            almofasir::cli::import::run(&cli.config, &dir).await?;
        }
        Some(Commands::Reslug {
            dry_run,
            only_invalid,
            report,
        }) => {
            let options = ReslugOptions {
                dry_run,
                only_invalid,
            };
            almofasir::cli::reslug::run(&cli.config, options, report).await?;
        }
        Some(Commands::Audit { json, samples }) => {
            almofasir::cli::audit::run(&cli.config, json, samples).await?;
        }
        None => {
            use clap::CommandFactory;
            Cli::command().print_help()?;
        }
    }

    Ok(())
}
