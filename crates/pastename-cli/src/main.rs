//! pastename CLI: rename pasted attachments in a markdown vault.
//!
//! Commands: render, resolve, generate, rename, batch, watch, config,
//! completions

mod formatter;

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{bail, Context};
use chrono::{DateTime, FixedOffset, Local};
use clap::{CommandFactory, Parser};
use pastename_core::settings::SETTINGS_FILE_NAME;
use pastename_core::{render_with, resolve, NameContext, Settings};
use pastename_vault::{
    AttachmentEvent, AttachmentWatcher, BatchResult, PhysicalFs, RenameOutcome, RenameTask, Vault, VaultFs,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use formatter::{format_json, format_output, OutputFormat, Rows};

#[derive(Parser)]
#[command(name = "pastename")]
#[command(version)]
#[command(about = "Template-driven renaming of pasted attachments")]
struct Cli {
    /// Vault root directory
    #[arg(long, global = true, default_value = ".")]
    vault: PathBuf,

    /// Settings file (defaults to .pastename.yaml in the vault root)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format for tabular results
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Render a name template
    Render(RenderArgs),
    /// De-duplicate a candidate name against existing names
    Resolve(ResolveArgs),
    /// Generate a name for an attachment without renaming it
    Generate {
        attachment: PathBuf,
        /// Note the attachment was pasted into
        #[arg(long)]
        note: Option<PathBuf>,
        /// Override the configured name template
        #[arg(long)]
        template: Option<String>,
    },
    /// Rename an attachment and fix its link in the note
    Rename {
        attachment: PathBuf,
        #[arg(long)]
        note: Option<PathBuf>,
        /// Use this stem instead of the generated one
        #[arg(long)]
        name: Option<String>,
        /// Rename without confirmation when the generated name is meaningful
        #[arg(long)]
        auto: bool,
    },
    /// Rename the attachments embedded in a note by regex
    Batch {
        #[arg(long)]
        note: PathBuf,
        /// Regex matched against each attachment stem
        #[arg(long)]
        pattern: String,
        /// Replacement for the matched part ($1, $2 for groups)
        #[arg(long, default_value = "")]
        replace: String,
        /// Perform the renames instead of only printing the plan
        #[arg(long)]
        apply: bool,
    },
    /// Watch the vault and rename new attachments
    Watch {
        /// Note that receives the new attachments
        #[arg(long)]
        note: PathBuf,
        /// Handle every new attachment, not just pasted images
        #[arg(long)]
        handle_all: bool,
        /// Stop after this many seconds without events
        #[arg(long)]
        idle_timeout: Option<u64>,
    },
    /// Print the effective settings as YAML
    Config,
    /// Generate shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

#[derive(clap::Args)]
struct RenderArgs {
    template: String,
    /// Read context values from this note
    #[arg(long)]
    note: Option<PathBuf>,
    #[arg(long)]
    file_name: Option<String>,
    #[arg(long)]
    dir_name: Option<String>,
    #[arg(long)]
    first_heading: Option<String>,
    #[arg(long)]
    image_name_key: Option<String>,
    /// Frontmatter value as key=value (repeatable)
    #[arg(long = "set", value_parser = parse_key_value)]
    frontmatter: Vec<(String, String)>,
    /// Render at this RFC 3339 time instead of now
    #[arg(long)]
    at: Option<String>,
    /// Seed for random tokens
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(clap::Args)]
struct ResolveArgs {
    candidate: String,
    /// Existing name (repeatable)
    #[arg(long = "sibling")]
    siblings: Vec<String>,
    /// Read existing names from this directory
    #[arg(long)]
    dir: Option<PathBuf>,
    /// Put the number in front of the name
    #[arg(long)]
    prefix: bool,
    #[arg(long)]
    delimiter: Option<String>,
    #[arg(long)]
    always_number: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = load_settings(&cli)?;

    match cli.command {
        Commands::Render(args) => cmd_render(&cli.vault, settings, &args),
        Commands::Resolve(args) => cmd_resolve(&settings, &args),
        Commands::Generate {
            attachment,
            note,
            template,
        } => {
            let mut settings = settings;
            if let Some(template) = template {
                settings.image_name_pattern = template;
            }
            let vault = open_vault(&cli.vault, settings)?;
            let generated = vault.generate_name(&attachment, note.as_deref())?;
            println!("{}", format_json(&generated));
            Ok(())
        }
        Commands::Rename {
            attachment,
            note,
            name,
            auto,
        } => {
            let auto = auto || settings.auto_rename;
            let vault = open_vault(&cli.vault, settings)?;
            let outcome = match name {
                Some(name) => RenameOutcome::Renamed(
                    vault
                        .rename_manual(&attachment, &name, note.as_deref())
                        .with_context(|| format!("renaming {}", attachment.display()))?,
                ),
                None => vault
                    .rename_attachment(&attachment, note.as_deref(), auto)
                    .with_context(|| format!("renaming {}", attachment.display()))?,
            };
            println!("{}", format_json(&outcome));
            Ok(())
        }
        Commands::Batch {
            note,
            pattern,
            replace,
            apply,
        } => {
            let vault = open_vault(&cli.vault, settings)?;
            let tasks = vault.plan_batch(&note, &pattern, &replace)?;
            if apply {
                let results = vault.apply_batch(&note, &tasks);
                print!("{}", with_newline(format_output(&results, &result_rows(&results), cli.format)));
            } else {
                print!("{}", with_newline(format_output(&tasks, &plan_rows(&tasks), cli.format)));
            }
            Ok(())
        }
        Commands::Watch {
            note,
            handle_all,
            idle_timeout,
        } => {
            let handle_all = handle_all || settings.handle_all_attachments;
            let vault = open_vault(&cli.vault, settings)?;
            cmd_watch(&vault, &note, handle_all, idle_timeout.map(Duration::from_secs))
        }
        Commands::Config => {
            print!("{}", settings.to_yaml().context("serializing settings")?);
            Ok(())
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "pastename", &mut io::stdout());
            Ok(())
        }
    }
}

/// `--config` if given, else the vault's settings file, else defaults.
fn load_settings(cli: &Cli) -> anyhow::Result<Settings> {
    let path = match &cli.config {
        Some(path) => {
            if !path.is_file() {
                bail!("config file {} not found", path.display());
            }
            path.clone()
        }
        None => cli.vault.join(SETTINGS_FILE_NAME),
    };
    let settings = Settings::load(&path).with_context(|| format!("loading {}", path.display()))?;
    settings.validate().context("invalid settings")?;
    Ok(settings)
}

fn open_vault(root: &Path, settings: Settings) -> anyhow::Result<Vault> {
    Vault::with_settings(root, settings).with_context(|| format!("opening vault {}", root.display()))
}

fn cmd_render(vault_root: &Path, settings: Settings, args: &RenderArgs) -> anyhow::Result<()> {
    let opts = settings.render_options();
    let mut ctx = match &args.note {
        Some(note) => open_vault(vault_root, settings)?.note_context(note)?,
        None => NameContext::default(),
    };
    apply_overrides(&mut ctx, args);

    let now: DateTime<FixedOffset> = match &args.at {
        Some(at) => DateTime::parse_from_rfc3339(at).with_context(|| format!("invalid --at time {at}"))?,
        None => Local::now().fixed_offset(),
    };
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let rendered = render_with(&args.template, &ctx, &now, &mut rng, &opts);
    println!(
        "{}",
        format_json(&serde_json::json!({
            "template": args.template,
            "rendered": rendered,
        }))
    );
    Ok(())
}

fn apply_overrides(ctx: &mut NameContext, args: &RenderArgs) {
    if let Some(v) = &args.file_name {
        ctx.file_name.clone_from(v);
    }
    if let Some(v) = &args.dir_name {
        ctx.dir_name.clone_from(v);
    }
    if let Some(v) = &args.first_heading {
        ctx.first_heading.clone_from(v);
    }
    if let Some(v) = &args.image_name_key {
        ctx.image_name_key.clone_from(v);
    }
    if !args.frontmatter.is_empty() {
        let fm = ctx.frontmatter.get_or_insert_with(HashMap::new);
        for (key, value) in &args.frontmatter {
            fm.insert(key.clone(), serde_json::Value::String(value.clone()));
        }
    }
}

fn cmd_resolve(settings: &Settings, args: &ResolveArgs) -> anyhow::Result<()> {
    let mut settings = settings.clone();
    if args.prefix {
        settings.dup_number_at_start = true;
    }
    if let Some(delimiter) = &args.delimiter {
        settings.dup_number_delimiter.clone_from(delimiter);
    }
    if args.always_number {
        settings.always_number = true;
    }
    let policy = settings.dedup_policy().context("invalid duplicate numbering")?;

    let mut siblings = args.siblings.clone();
    if let Some(dir) = &args.dir {
        let listed = PhysicalFs
            .list_file_names(dir)
            .with_context(|| format!("listing {}", dir.display()))?;
        siblings.extend(listed);
    }

    let final_name = resolve(&args.candidate, &siblings, &policy);
    info!(
        position = ?policy.position(),
        siblings = siblings.len(),
        name = %final_name.name,
        "resolved"
    );
    println!("{}", format_json(&final_name));
    Ok(())
}

fn cmd_watch(
    vault: &Vault,
    note: &Path,
    handle_all: bool,
    idle_timeout: Option<Duration>,
) -> anyhow::Result<()> {
    let watcher = AttachmentWatcher::start(vault.root(), vault.filter().clone(), handle_all)
        .context("starting watcher")?;
    info!(root = %vault.root().display(), "watching for new attachments");

    let tick = idle_timeout.unwrap_or(Duration::from_secs(3600));
    loop {
        let Some(AttachmentEvent::Created(path)) = watcher.recv_timeout(tick) else {
            if idle_timeout.is_some() {
                return Ok(());
            }
            continue;
        };
        match vault.rename_attachment(&path, Some(note), true) {
            Ok(outcome) => println!("{}", serde_json::to_string(&outcome).context("serializing outcome")?),
            Err(e) => warn!(path = %path.display(), "rename failed: {e}"),
        }
    }
}

fn plan_rows(tasks: &[RenameTask]) -> Rows {
    Rows {
        columns: vec!["old_name", "new_name", "link"],
        rows: tasks
            .iter()
            .map(|t| vec![t.old_name.clone(), t.new_name.clone(), t.link_target.clone()])
            .collect(),
    }
}

fn result_rows(results: &[BatchResult]) -> Rows {
    Rows {
        columns: vec!["status", "old_name", "new_name", "detail"],
        rows: results
            .iter()
            .map(|r| match r {
                BatchResult::Renamed(renamed) => vec![
                    "renamed".to_string(),
                    renamed.old_name.clone(),
                    renamed.new_name.clone(),
                    format!("{:?}", renamed.link),
                ],
                BatchResult::Failed { from, reason } => vec![
                    "failed".to_string(),
                    from.file_name()
                        .map(|s| s.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                    String::new(),
                    reason.clone(),
                ],
            })
            .collect(),
    }
}

fn with_newline(mut s: String) -> String {
    if !s.ends_with('\n') {
        s.push('\n');
    }
    s
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected key=value, got '{s}'"))
}
