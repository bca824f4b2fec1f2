mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use ps_core::config::Config;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "picstash=trace,ps_server=trace,ps_db=debug,ps_core=debug,tower_http=debug".to_string()
        } else {
            "picstash=debug,ps_server=debug,ps_db=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("picstash {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::HashPassword { password } => hash_password(&password),
    }
}

async fn start_server(
    host: Option<String>,
    port: Option<u16>,
    config_path: Option<&std::path::Path>,
) -> Result<()> {
    let mut config = Config::load_or_default(config_path);

    // CLI flags win over the config file.
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    tracing::info!("Starting picstash server");
    tracing::info!(
        "Server will listen on {}:{}",
        config.server.host,
        config.server.port
    );

    ps_server::start(config).await?;
    Ok(())
}

fn validate_config(path: Option<&std::path::Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let contents = std::fs::read_to_string(p)?;
            Config::from_json(&contents)?
        }
        None => {
            println!("No config file specified, using defaults");
            Config::default()
        }
    };

    println!("✓ Configuration is valid");
    println!("  Server: {}:{}", config.server.host, config.server.port);
    println!("  Database: {}", config.server.db_path.display());
    println!(
        "  Placeholder image: {}",
        config.server.placeholder_path.display()
    );
    println!("  Registration open: {}", config.auth.allow_registration);
    println!(
        "  Session timeout: {} hours",
        config.auth.session_timeout_hours
    );
    println!("  Upload limit: {} bytes", config.uploads.max_bytes);
    println!(
        "  Allowed types: {}",
        config.uploads.allowed_types.join(", ")
    );
    println!(
        "  Rate limit: {} mutations/minute",
        config.rate_limit.mutations_per_minute
    );

    let warnings = config.validate();
    if !warnings.is_empty() {
        println!("\nWarnings:");
        for warning in &warnings {
            println!("  - {warning}");
        }
    }

    Ok(())
}

fn hash_password(password: &str) -> Result<()> {
    let hash = ps_server::middleware::auth::hash_password(password)?;
    println!("{}", hash);
    Ok(())
}
