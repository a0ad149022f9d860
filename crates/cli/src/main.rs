mod manifest;
mod options;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use ngcli_argparse::help::render_help;
use ngcli_argparse::{
    Arguments, OptionModel, ParseArgumentException, parse_arguments, parse_free_form_arguments,
};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt};

use crate::manifest::{CommandEntry, LoadedManifest, load_manifest, write_default_manifest};
use crate::options::load_options;

#[derive(Parser)]
#[command(name = "ngcli")]
#[command(version, about = "Schema-driven command line front end", long_about = None)]
#[command(disable_help_subcommand = true)]
struct Cli {
    /// Path to ngcli.json manifest (default: ./ngcli.json)
    #[arg(long, global = true, value_name = "FILE")]
    manifest: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a default ngcli.json manifest
    Init(InitArgs),

    /// Parse arguments for a manifest command and print them as JSON
    Run(RunArgs),

    /// Parse arguments against a schema file and print them as JSON
    Parse(ParseArgs),

    /// Print the option list projected from a schema file
    Options(OptionsArgs),

    /// Show help for a manifest command
    Help(HelpArgs),

    /// List manifest commands
    List,
}

#[derive(Parser)]
struct InitArgs {
    /// Project directory (default: current directory)
    #[arg(value_name = "DIR")]
    dir: Option<PathBuf>,

    /// Overwrite an existing manifest
    #[arg(long)]
    force: bool,
}

#[derive(Parser)]
struct RunArgs {
    /// Command name or alias, followed by the arguments handed to it
    ///
    /// Everything after the command name is forwarded verbatim, including
    /// `--`, `--help` and `--manifest`.
    #[arg(
        value_name = "COMMAND",
        required = true,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    argv: Vec<String>,
}

#[derive(Parser)]
struct ParseArgs {
    /// JSON Schema describing the options (free-form parsing when omitted)
    #[arg(short, long, value_name = "FILE")]
    schema: Option<PathBuf>,

    /// Arguments to parse
    #[arg(value_name = "ARGS", trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

#[derive(Parser)]
struct OptionsArgs {
    /// JSON Schema describing the options
    #[arg(short, long, value_name = "FILE")]
    schema: PathBuf,
}

#[derive(Parser)]
struct HelpArgs {
    /// Command name or alias
    #[arg(value_name = "COMMAND")]
    command: String,
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Init(args) => init(args),
        Commands::Run(args) => run(cli.manifest, args),
        Commands::Parse(args) => parse(args),
        Commands::Options(args) => print_options(args),
        Commands::Help(args) => help(cli.manifest, args),
        Commands::List => list(cli.manifest),
    }
}

fn init(args: InitArgs) -> Result<()> {
    let dir = args.dir.unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create directory: {}", dir.display()))?;

    let dest = write_default_manifest(&dir, args.force)?;

    eprintln!("Created: {}", dest.display());
    eprintln!("\nNext steps:");
    eprintln!("  1. Add commands to ngcli.json, each with an options schema");
    eprintln!("  2. Run: ngcli list");
    Ok(())
}

fn run(manifest: Option<PathBuf>, args: RunArgs) -> Result<()> {
    let Some((name, rest)) = args.argv.split_first() else {
        bail!("missing command name");
    };
    let loaded = require_manifest(manifest)?;
    let command = resolve(&loaded, name)?;
    tracing::debug!(command = %command.name, args = rest.len(), "running command");

    let parsed = match loaded.schema_path(command) {
        Some(path) => parse_with(&load_options(&path)?, rest)?,
        None => parse_free_form_arguments(rest),
    };
    log_parsed(&parsed);
    print_json(&parsed)
}

fn parse(args: ParseArgs) -> Result<()> {
    let parsed = match &args.schema {
        Some(path) => parse_with(&load_options(path)?, &args.args)?,
        None => parse_free_form_arguments(&args.args),
    };
    log_parsed(&parsed);
    print_json(&parsed)
}

fn log_parsed(parsed: &Arguments) {
    for (name, value) in parsed.iter() {
        tracing::debug!(option = name, %value, "parsed option");
    }
    if let Some(leftovers) = parsed.leftovers() {
        tracing::debug!(?leftovers, "unmatched arguments");
    }
}

fn print_options(args: OptionsArgs) -> Result<()> {
    let options = load_options(&args.schema)?;
    print_json(&options)
}

fn help(manifest: Option<PathBuf>, args: HelpArgs) -> Result<()> {
    let loaded = require_manifest(manifest)?;
    let command = resolve(&loaded, &args.command)?;
    let options = match loaded.schema_path(command) {
        Some(path) => load_options(&path)?,
        None => Vec::new(),
    };
    print!("{}", render_help(command, &options));
    Ok(())
}

fn list(manifest: Option<PathBuf>) -> Result<()> {
    let loaded = require_manifest(manifest)?;
    let commands: Vec<&CommandEntry> = loaded
        .manifest
        .commands
        .iter()
        .filter(|c| !c.hidden)
        .collect();

    if commands.is_empty() {
        eprintln!("No commands defined in manifest.");
        return Ok(());
    }

    let width = commands
        .iter()
        .map(|c| command_label(c).len())
        .max()
        .unwrap_or(0);
    for cmd in commands {
        let left = command_label(cmd);
        if cmd.description.is_empty() {
            println!("{left}");
        } else {
            println!("{left:width$}  {}", cmd.description);
        }
    }
    Ok(())
}

fn command_label(command: &CommandEntry) -> String {
    if command.aliases.is_empty() {
        command.name.clone()
    } else {
        format!("{} ({})", command.name, command.aliases.join(", "))
    }
}

fn parse_with(options: &[OptionModel], args: &[String]) -> Result<Arguments> {
    parse_arguments(args, options).map_err(|err: ParseArgumentException| {
        if !err.ignored.is_empty() {
            tracing::debug!(ignored = ?err.ignored, "tokens ignored while parsing");
        }
        err.into()
    })
}

fn require_manifest(manifest: Option<PathBuf>) -> Result<LoadedManifest> {
    match load_manifest(manifest.as_deref())? {
        Some(loaded) => Ok(loaded),
        None => bail!("no ngcli.json found in the current directory (run `ngcli init`)"),
    }
}

fn resolve<'m>(loaded: &'m LoadedManifest, raw: &str) -> Result<&'m CommandEntry> {
    match loaded.manifest.resolve_command(raw) {
        Some(command) => Ok(command),
        None => bail!("unknown command: {raw}"),
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{json}");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
