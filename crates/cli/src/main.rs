mod manifest;
mod report;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use cliroute_argparse::{CommandTree, ParserSettings};
use std::{fs, path::PathBuf};
use tracing_subscriber::{EnvFilter, fmt};

use crate::manifest::{DEFAULT_MANIFEST_NAME, Manifest, write_default_manifest};
use crate::report::{CheckReport, ResolutionReport};

/// Exit status for invocations the tree rejects.
const PARSE_ERROR_EXIT: i32 = 2;

#[derive(Parser)]
#[command(name = "cliroute")]
#[command(version, about = "Resolve command lines against a declarative command tree", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a sample cliroute.json manifest
    Init(InitArgs),

    /// Build the command tree and list every reachable command
    Check(CheckArgs),

    /// Resolve an invocation against the command tree and print the result as JSON
    Resolve(ResolveArgs),
}

#[derive(Parser)]
struct InitArgs {
    /// Project directory (default: current directory)
    #[arg(value_name = "DIR")]
    dir: Option<PathBuf>,

    /// Replace an existing manifest
    #[arg(long)]
    force: bool,
}

#[derive(Parser)]
struct CheckArgs {
    /// Path to cliroute.json manifest
    #[arg(short, long, default_value = DEFAULT_MANIFEST_NAME, value_name = "FILE")]
    manifest: PathBuf,

    /// Only output JSON (no human-readable output)
    #[arg(long)]
    json: bool,
}

#[derive(Parser)]
struct ResolveArgs {
    /// Path to cliroute.json manifest
    #[arg(short, long, default_value = DEFAULT_MANIFEST_NAME, value_name = "FILE")]
    manifest: PathBuf,

    #[command(flatten)]
    settings: SettingsArgs,

    /// The invocation to resolve, after `--`
    #[arg(last = true, value_name = "ARGS")]
    argv: Vec<String>,
}

/// Flags that switch manifest settings on (or casting off) for one run.
#[derive(Args)]
struct SettingsArgs {
    /// Drop options that match no definition
    #[arg(long)]
    ignore_unknown_options: bool,

    /// Drop positional values beyond the declared parameters
    #[arg(long)]
    ignore_unknown_parameters: bool,

    /// Accept command names after the first option
    #[arg(long)]
    allow_commands_after_options: bool,

    /// Hand values through without casting
    #[arg(long)]
    no_type_casting: bool,
}

impl SettingsArgs {
    fn apply(&self, mut settings: ParserSettings) -> ParserSettings {
        settings.ignore_unknown_options |= self.ignore_unknown_options;
        settings.ignore_unknown_parameters |= self.ignore_unknown_parameters;
        settings.allow_commands_after_options |= self.allow_commands_after_options;
        if self.no_type_casting {
            settings.apply_type_casting = false;
        }
        settings
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Init(args) => init(args),
        Commands::Check(args) => check(args),
        Commands::Resolve(args) => resolve(args),
    }
}

fn init(args: InitArgs) -> Result<()> {
    let dir = args.dir.unwrap_or_else(|| PathBuf::from("."));

    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create directory: {}", dir.display()))?;

    let manifest_path = write_default_manifest(&dir, args.force)?;

    eprintln!("Created: {}", manifest_path.display());
    eprintln!("\nNext steps:");
    eprintln!("  1. Edit {DEFAULT_MANIFEST_NAME} to declare your commands");
    eprintln!("  2. Run: cliroute check");
    eprintln!("  3. Run: cliroute resolve -- greet world");

    Ok(())
}

fn load_tree(manifest: &Manifest, path: &std::path::Path) -> Result<CommandTree> {
    CommandTree::from_manifest(manifest.tree.clone())
        .with_context(|| format!("invalid command tree in {}", path.display()))
}

fn check(args: CheckArgs) -> Result<()> {
    tracing::debug!("executing check command");

    let manifest = Manifest::from_file(&args.manifest)?;
    let tree = load_tree(&manifest, &args.manifest)?;
    let report = CheckReport::new(&manifest.tree.root, &tree);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    eprintln!("=== Command Tree ===");
    eprintln!("Manifest: {}", args.manifest.display());
    eprintln!("Root: {}", report.root);
    eprintln!("Commands: {}", report.commands.len());
    for entry in &report.commands {
        let path = if entry.path.is_empty() {
            "(root)".to_string()
        } else {
            entry.path.join(" ")
        };
        eprintln!("  {path}  -> {}", entry.command);
    }
    eprintln!("OK: tree is valid");

    Ok(())
}

fn resolve(args: ResolveArgs) -> Result<()> {
    tracing::debug!("executing resolve command");

    let manifest = Manifest::from_file(&args.manifest)?;
    let settings = args.settings.apply(manifest.settings.clone());
    let tree = load_tree(&manifest, &args.manifest)?;

    let resolution = match tree.resolve(&args.argv, &settings) {
        Ok(resolution) => resolution,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(PARSE_ERROR_EXIT);
        }
    };

    let report = ResolutionReport::from(&resolution);
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
