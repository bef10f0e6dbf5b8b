use crate::config::load_config;
use crate::generator::dependencies_config::dependencies_for;
use crate::generator::{
    format_project, generate_project, openapi_file_name, render_project, GenerateOptions,
};
use crate::spec::load_openapi;
use anyhow::Context;
use clap::{Parser, Subcommand};
use http::Method;
use std::path::PathBuf;
use tracing::{info, warn};

/// Command-line interface for x402-proxy-gen
///
/// Scaffolds an axum reverse proxy that charges for each request with x402.
#[derive(Parser, Debug)]
#[command(name = "x402-proxy-gen", version)]
#[command(about = "Generate x402 payment-gated reverse proxies", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a proxy project from a configuration file
    Generate {
        /// Proxy configuration (TOML, YAML or JSON)
        #[arg(short, long)]
        config: PathBuf,

        /// Output directory (default: ./<project_name>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// OpenAPI document to take routes from, overriding `openapi` in the config
        #[arg(long)]
        openapi: Option<PathBuf>,

        /// Write into a non-empty output directory
        #[arg(short, long, default_value_t = false)]
        force: bool,

        /// List the files that would be written without writing them
        #[arg(long, default_value_t = false)]
        dry_run: bool,

        /// Do not run `cargo fmt` on the generated project
        #[arg(long, default_value_t = false)]
        skip_fmt: bool,

        /// Path to dependencies configuration file (x402-proxy-dependencies.toml)
        /// If not provided, will auto-detect alongside the configuration file
        #[arg(long)]
        dependencies_config: Option<PathBuf>,
    },
    /// Print the endpoints and auth schemes found in an OpenAPI document
    Inspect {
        /// Path to the OpenAPI document (YAML or JSON)
        #[arg(short, long)]
        openapi: PathBuf,
    },
}

fn method_list(methods: &[Method]) -> String {
    if methods.is_empty() {
        return "ANY".to_string();
    }
    methods
        .iter()
        .map(Method::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

pub fn run_cli(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Generate {
            config,
            output,
            openapi,
            force,
            dry_run,
            skip_fmt,
            dependencies_config,
        } => {
            let loaded = load_config(config, openapi.as_deref())
                .with_context(|| format!("invalid proxy configuration {}", config.display()))?;
            let project = &loaded.project;
            info!(
                project = %project.project_name,
                routes = project.routes.len(),
                network = %project.network,
                "configuration loaded"
            );

            let mut options = GenerateOptions::new(
                output
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(&project.project_name)),
            );
            options.force = *force;
            options.openapi_source = loaded.openapi.clone();
            options.dependencies = dependencies_for(dependencies_config.as_deref(), config)?;

            if *dry_run {
                let rendered = render_project(project, &options.render_options())?;
                println!(
                    "Would write {} to {}:",
                    rendered.name,
                    options.output_dir.display()
                );
                for file in &rendered.files {
                    println!("  {} ({} bytes)", file.path.display(), file.contents.len());
                }
                if let Some(source) = &options.openapi_source {
                    println!(
                        "  {} (copy of {})",
                        openapi_file_name(source),
                        source.display()
                    );
                }
                return Ok(());
            }

            let dir = generate_project(project, &options)
                .with_context(|| format!("failed to generate {}", project.project_name))?;
            if *skip_fmt {
                info!("skipping cargo fmt");
            } else if let Err(err) = format_project(&dir) {
                warn!(error = %err, "cargo fmt failed, generated sources are left unformatted");
            }
            println!("Generated {} in {}", project.project_name, dir.display());
            Ok(())
        }
        Commands::Inspect { openapi } => {
            let surface = load_openapi(openapi)?;
            println!("{} ({})", surface.title, surface.slug());
            println!();
            println!("Endpoints:");
            for endpoint in &surface.endpoints {
                let id = endpoint
                    .operation_id
                    .as_deref()
                    .map(|id| format!(" [{id}]"))
                    .unwrap_or_default();
                println!("  {:<24} {}{}", method_list(&endpoint.methods), endpoint.path, id);
            }
            println!();
            println!("Security schemes:");
            if surface.security_schemes.is_empty() {
                println!("  (none)");
            }
            for scheme in &surface.security_schemes {
                match scheme.auth_candidate() {
                    Some(auth) => println!("  {}: {}", scheme.name, auth.describe()),
                    None => println!("  {}: not supported by the proxy", scheme.name),
                }
            }
            Ok(())
        }
    }
}
