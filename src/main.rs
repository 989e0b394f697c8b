use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use pkg_audit::audit::command::npm_install_command;
use pkg_audit::audit::pipeline::MetadataPipeline;
use pkg_audit::audit::render::{render_json, render_text};
use pkg_audit::audit::session::SessionReport;
use pkg_audit::audit::types::AuditReport;
use pkg_audit::config::{self, AuditConfig};
use pkg_audit::logging;
use pkg_audit::manifest::PackageJsonParser;
use pkg_audit::version::cache::Cache;
use pkg_audit::version::registries::NpmRegistry;

#[derive(Parser)]
#[command(name = "pkg-audit")]
#[command(version, about = "Report outdated dependencies of an npm package.json")]
struct Cli {
    /// Package cache database
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Audit a manifest against the registry
    Audit(AuditArgs),
    /// Rebuild a saved report from the cache
    Replay {
        session: PathBuf,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(clap::Args)]
struct AuditArgs {
    /// package.json to read; `-` or nothing reads stdin
    manifest: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Registry lookups per batch
    #[arg(long)]
    batch_size: Option<usize>,

    /// Install NAME at VERSION instead of the latest release
    #[arg(long = "target", value_name = "NAME@VERSION", value_parser = parse_target)]
    targets: Vec<(String, String)>,

    /// Limit the upgrade command to these packages
    #[arg(long = "select", value_name = "NAME")]
    selected: Vec<String>,

    /// Write a session file for `replay`
    #[arg(long)]
    save_session: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Split `name@version` at the last `@`, so scoped names keep their prefix
fn parse_target(value: &str) -> Result<(String, String), String> {
    match value.rfind('@') {
        Some(at) if at > 0 && at + 1 < value.len() => {
            Ok((value[..at].to_string(), value[at + 1..].to_string()))
        }
        _ => Err(format!("expected NAME@VERSION, got {:?}", value)),
    }
}

fn read_manifest(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        _ => {
            let mut content = String::new();
            std::io::stdin()
                .read_to_string(&mut content)
                .context("failed to read manifest from stdin")?;
            Ok(content)
        }
    }
}

fn print_report(report: &AuditReport, command: &str, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => print!("{}", render_text(report, command)),
        OutputFormat::Json => println!("{}", render_json(report, command)?),
    }
    Ok(())
}

async fn run_audit(args: AuditArgs, cache: Arc<Cache>, config: &AuditConfig) -> anyhow::Result<()> {
    let content = read_manifest(args.manifest.as_deref())?;
    let manifest = PackageJsonParser::new().parse(&content)?;

    let registry = Arc::new(NpmRegistry::from_config(&config.registry)?);
    let pipeline = MetadataPipeline::from_config(cache, registry, config);
    let batch_size = args.batch_size.unwrap_or(config.pipeline.batch_size);

    let mut report = pipeline.audit(&manifest, batch_size).await?;

    for (name, version) in &args.targets {
        report.set_target_version(name, version)?;
    }

    let command = if args.selected.is_empty() {
        npm_install_command(report.outdated_entries())
    } else {
        npm_install_command(report.entries_named(&args.selected)?)
    };

    if let Some(path) = &args.save_session {
        SessionReport::from_report(&report).save(path)?;
        info!("Session saved to {}", path.display());
    }

    print_report(&report, &command, args.format)
}

fn run_replay(session: &Path, format: OutputFormat, cache: &Cache) -> anyhow::Result<()> {
    let report = SessionReport::load(session)?.restore(cache)?;
    let command = npm_install_command(report.outdated_entries());
    print_report(&report, &command, format)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(config::config_path);
    let config = AuditConfig::load(&config_path)?;

    let _guard = logging::init(&config::log_path())?;

    let db_path = cli.db.unwrap_or_else(config::db_path);
    if let Some(parent) = db_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let cache = Arc::new(Cache::new(&db_path)?);

    match cli.command {
        Command::Audit(args) => tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?
            .block_on(run_audit(args, cache, &config)),
        Command::Replay { session, format } => run_replay(&session, format, &cache),
    }
}
