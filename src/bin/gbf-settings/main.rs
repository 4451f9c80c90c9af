//! `gbf-settings` entrypoint: inspect and edit the bot settings file, load combat
//! scripts, and run the backend's Twitter/Discord credential tests.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gbf_settings::config::{self, AppConfig, ResolvedConfig};
use gbf_settings::credential_test::{BackendCommand, CredentialKind, CredentialTester, TestOutcome};
use gbf_settings::form::render_form;
use gbf_settings::settings::persistence::{load_settings, save_settings};
use gbf_settings::settings::rules::{self, ScriptTarget};
use gbf_settings::settings::{SettingsField, SettingsStore};
use gbf_settings::init_logging;

const DEFAULT_TEST_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Parser)]
#[command(name = "gbf-settings", version, about = "Granblue Fantasy bot settings")]
struct Cli {
    #[command(flatten)]
    app: AppConfig,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the settings form for the current file
    Show,
    /// Print one field's value
    Get { field: String },
    /// Set one field through the form rules and save
    Set { field: String, value: String },
    /// Load a combat script (.txt); no path clears the selection
    Script {
        /// Store into the nightmare profile instead of the main one
        #[arg(long)]
        nightmare: bool,
        path: Option<PathBuf>,
    },
    /// Run a backend credential test and report the result
    Test {
        #[arg(value_enum)]
        kind: CredentialKind,
        #[arg(long = "timeout-secs", default_value_t = DEFAULT_TEST_TIMEOUT_SECS)]
        timeout_secs: u64,
    },
    /// List every settings key with its form label
    Fields,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let user_config = config::load_user_config();
    let config = cli.app.resolve(&user_config)?;
    init_logging(&config);
    tracing::debug!(?config, "gbf-settings starting");

    match cli.command {
        Command::Show => {
            let settings = load_settings(&config.settings_file)?;
            print!("{}", render_form(&settings));
        }
        Command::Get { field } => {
            let field = SettingsField::from_key(&field)?;
            let settings = load_settings(&config.settings_file)?;
            println!("{}", field.render(&settings));
        }
        Command::Set { field, value } => set_field(&config.settings_file, &field, &value)?,
        Command::Script { nightmare, path } => {
            let target = if nightmare {
                ScriptTarget::Nightmare
            } else {
                ScriptTarget::Main
            };
            load_script(&config.settings_file, target, path.as_deref())?;
        }
        Command::Test { kind, timeout_secs } => {
            return run_credential_test(&config, kind, Duration::from_secs(timeout_secs));
        }
        Command::Fields => {
            for field in SettingsField::ALL {
                println!("{:<36} {}", field.key(), field.label());
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn open_store(path: &Path) -> Result<SettingsStore> {
    Ok(SettingsStore::with_settings(load_settings(path)?))
}

fn set_field(path: &Path, key: &str, raw: &str) -> Result<()> {
    let field = SettingsField::from_key(key)?;
    let update = field.parse_update(raw)?;
    let store = open_store(path)?;
    let warnings = rules::apply_edit(&store, update)?;
    let settings = store.get();
    save_settings(path, &settings)?;

    println!("{} = {}", field.key(), field.render(&settings));
    for warning in warnings {
        eprintln!("warning: {warning}");
    }
    Ok(())
}

fn load_script(path: &Path, target: ScriptTarget, script: Option<&Path>) -> Result<()> {
    let store = open_store(path)?;
    let loaded = rules::select_combat_script(&store, target, script);
    save_settings(path, &store.get())?;
    if loaded.is_empty() {
        println!("Combat script: None Selected");
    } else {
        println!(
            "Combat script: {} ({} lines)",
            loaded.name,
            loaded.lines.len()
        );
    }
    Ok(())
}

fn run_credential_test(
    config: &ResolvedConfig,
    kind: CredentialKind,
    timeout: Duration,
) -> Result<ExitCode> {
    let command = BackendCommand::from_interpreter(&config.interpreter, &config.backend_script)
        .with_context(|| format!("invalid interpreter command {:?}", config.interpreter))?;
    let mut tester = CredentialTester::for_backend(command);

    tester.start(kind);
    if !tester.wait_until_idle(kind, timeout) {
        tester.fail_in_flight(
            kind,
            &format!("backend did not finish within {}s", timeout.as_secs()),
        );
    }
    for notification in tester.poll() {
        println!("{}: {}", notification.kind, notification.outcome.message());
    }

    match tester.run(kind).outcome() {
        Some(TestOutcome::Succeeded) => Ok(ExitCode::SUCCESS),
        Some(TestOutcome::Failed) => Ok(ExitCode::FAILURE),
        None => {
            eprintln!("{kind}: backend exited without reporting a result");
            Ok(ExitCode::from(2))
        }
    }
}
