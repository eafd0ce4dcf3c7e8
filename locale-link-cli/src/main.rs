use std::{fs::File, io::Write, path::PathBuf};

use clap::{Parser, Subcommand};
use locale_link::{EffectiveConfig, LinkTarget, Query, ResolveContext, resolve, rewrite};
use locale_link_cli::{ConfigFormat, load_user_config};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
}

/// Options shared by every subcommand that resolves a configuration.
#[derive(clap::Args, Debug)]
struct ResolveArgs {
    /// The user configuration file (JSON, YAML or TOML)
    #[arg(short, long)]
    config: PathBuf,

    /// Override the config format instead of inferring it from the extension
    #[arg(long, value_enum)]
    format: Option<ConfigFormat>,

    /// Resolve with production defaults (fallbackLng = defaultLanguage)
    #[arg(long)]
    production: bool,

    /// Resolve as a client runtime: no namespace scan, no backend paths
    #[arg(long)]
    client: bool,

    /// Directory localePath is relative to (defaults to the current directory)
    #[arg(long)]
    root: Option<PathBuf>,
}

/// Supported subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve a configuration file and print the effective configuration.
    Resolve {
        #[command(flatten)]
        resolve: ResolveArgs,

        /// Write the JSON to this file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Print the href/as pair a link would be rendered with.
    Rewrite {
        #[command(flatten)]
        resolve: ResolveArgs,

        /// The logical link target, e.g. `/foo/bar?baz`
        #[arg(long)]
        href: String,

        /// Explicit displayed target
        #[arg(long = "as")]
        as_: Option<String>,

        /// Active locale
        #[arg(short, long)]
        lng: Option<String>,

        /// Treat `--href` as a path and pass `key=value` pairs as a structured query
        #[arg(short, long)]
        query: Vec<String>,
    },

    /// Print the concrete translation file paths for a language and namespace.
    Paths {
        #[command(flatten)]
        resolve: ResolveArgs,

        /// Language code
        #[arg(short, long)]
        lng: String,

        /// Namespace
        #[arg(short, long)]
        ns: String,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PathsOutput {
    load_path: PathBuf,
    add_path: PathBuf,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args.commands) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(commands: Commands) -> Result<(), String> {
    match commands {
        Commands::Resolve { resolve, output } => {
            let config = resolve_config(&resolve)?;
            let json = serde_json::to_string_pretty(&config).map_err(|e| e.to_string())?;
            match output {
                Some(output_path) => {
                    File::create(&output_path)
                        .and_then(|mut f| f.write_all(json.as_bytes()))
                        .map_err(|e| format!("Error writing to {}: {}", output_path, e))?;
                    eprintln!("✅ Effective configuration written to: {}", output_path);
                }
                None => println!("{}", json),
            }
        }
        Commands::Rewrite {
            resolve,
            href,
            as_,
            lng,
            query,
        } => {
            let config = resolve_config(&resolve)?;
            let mut target = if query.is_empty() {
                LinkTarget::new(href)
            } else {
                LinkTarget::new(locale_link::Href::structured(href, parse_query_args(&query)?))
            };
            target.as_ = as_;
            target.locale = lng;
            let link = rewrite(&target, &config);
            let json = serde_json::to_string_pretty(&link).map_err(|e| e.to_string())?;
            println!("{}", json);
        }
        Commands::Paths { resolve, lng, ns } => {
            if resolve.client {
                return Err("backend paths are only computed in a server context".to_string());
            }
            let config = resolve_config(&resolve)?;
            let backend = config
                .backend
                .ok_or_else(|| "backend paths were not computed".to_string())?;
            let output = PathsOutput {
                load_path: backend.load_path_for(&lng, &ns),
                add_path: backend.add_path_for(&lng, &ns),
            };
            let json = serde_json::to_string_pretty(&output).map_err(|e| e.to_string())?;
            println!("{}", json);
        }
    }
    Ok(())
}

fn resolve_config(args: &ResolveArgs) -> Result<EffectiveConfig, String> {
    let user = load_user_config(&args.config, args.format)?;

    let mut ctx = ResolveContext::from_env().map_err(|e| e.to_string())?;
    if args.production {
        ctx = ctx.with_production(true);
    }
    if args.client {
        ctx = ctx.with_filesystem(false);
    }
    if let Some(root) = &args.root {
        ctx = ctx.with_root(root);
    }
    debug!(?ctx, "resolving configuration");

    resolve(&user, &ctx).map_err(|e| e.to_string())
}

fn parse_query_args(pairs: &[String]) -> Result<Query, String> {
    pairs
        .iter()
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
            None if !pair.is_empty() => Ok((pair.clone(), String::new())),
            _ => Err(format!("Invalid query pair: '{}'. Expected key=value", pair)),
        })
        .collect()
}
