use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{bail, eyre, WrapErr};
use color_eyre::Result;
use idlerealm_admin::{BalanceEditor, DeleteOutcome, EntityKind, ListQuery, SaveOutcome};
use idlerealm_client::{ApiClient, ClientConfig, HttpAdminApi, SessionEvent};
use idlerealm_core::UpgradeMode;
use tracing::{debug, info};

mod console;
mod preview;

use console::Console;

#[derive(Parser, Debug)]
#[command(author, version, about = "Idlerealm balance tools", long_about = None)]
struct Cli {
    /// Client configuration file (RON); built-in defaults when missing.
    #[arg(long, global = true, default_value = "idlerealm.ron")]
    config: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show costs, production and affordable levels for a RON balance sheet.
    Preview {
        sheet: PathBuf,
        /// Balance to spend on each factory instead of the sheet's resources.
        #[arg(long)]
        balance: Option<f64>,
        /// Upgrade mode: 1, 10, 100 or max.
        #[arg(long, default_value = "1")]
        mode: UpgradeMode,
    },
    /// Store the bearer token used for backend requests.
    Login { token: String },
    /// Inspect and edit balance tables on the backend.
    Admin {
        #[command(subcommand)]
        action: AdminCommand,
    },
}

#[derive(Subcommand, Debug)]
enum AdminCommand {
    /// List rows of a table.
    List {
        kind: EntityKind,
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
    /// Edit fields of one row: `field=value` pairs, previewed then saved.
    Set {
        kind: EntityKind,
        id: u64,
        #[arg(required = true, value_parser = parse_assignment)]
        fields: Vec<(String, String)>,
        /// Skip the confirmation prompt.
        #[arg(long, short)]
        yes: bool,
    },
    /// Delete one row.
    Delete {
        kind: EntityKind,
        id: u64,
        #[arg(long, short)]
        yes: bool,
    },
}

fn parse_assignment(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.split_once('=') {
        Some((field, value)) if !field.trim().is_empty() => Ok((field.trim().to_string(), value.to_string())),
        _ => Err(format!("expected field=value, got `{raw}`")),
    }
}

fn load_config(path: &Path) -> Result<ClientConfig> {
    if path.exists() {
        ClientConfig::load(path).wrap_err_with(|| format!("loading {}", path.display()))
    } else {
        debug!(path = %path.display(), "no config file, using defaults");
        Ok(ClientConfig::default())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .compact()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Preview { sheet, balance, mode } => {
            let state = preview::load_sheet(&sheet)?;
            let rows = preview::preview(&state, balance, mode);
            print!("{}", preview::render(&rows, mode));
            Ok(())
        }
        Command::Login { token } => {
            let config = load_config(&cli.config)?;
            let client = ApiClient::new(&config)?;
            client.login(token.trim())?;
            if config.token_path.is_none() {
                println!("No token_path configured; the token only lives for this process.");
            }
            Ok(())
        }
        Command::Admin { action } => {
            let config = load_config(&cli.config)?;
            let client = ApiClient::new(&config)?;
            let result = run_admin(&client, &config, action).await;
            if client.session() == SessionEvent::LoggedOut {
                eprintln!("Session expired; run `idlerealm login <token>` again.");
            }
            result
        }
    }
}

async fn run_admin(client: &ApiClient, config: &ClientConfig, action: AdminCommand) -> Result<()> {
    let api = HttpAdminApi::new(client.clone());

    match action {
        AdminCommand::List { kind, search, offset } => {
            let mut editor = BalanceEditor::new(api, Console::new(false));
            let query = ListQuery {
                search,
                limit: Some(config.page_size),
                offset: Some(offset),
            };
            if !editor.refresh(kind, &query).await {
                bail!("could not load {kind}");
            }
            let total = editor.state().table(kind).map_or(0, |t| t.total);
            for row in editor.state().rows(kind) {
                let columns: Vec<String> = row
                    .fields
                    .iter()
                    .map(|(field, value)| format!("{field}={}", value.to_text()))
                    .collect();
                println!("{:>6}  {}", row.id, columns.join("  "));
            }
            println!("{} / {total}", editor.state().rows(kind).len());
            Ok(())
        }
        AdminCommand::Set { kind, id, fields, yes } => {
            let mut editor = BalanceEditor::new(api, Console::new(yes));
            if !editor.refresh(kind, &ListQuery::default()).await {
                bail!("could not load {kind}");
            }
            if editor.state().row(kind, id).is_none() {
                bail!("{kind}:{id} not found");
            }
            let descriptor = kind.descriptor();
            for (field, value) in fields {
                if descriptor.field(&field).is_none() {
                    bail!("{kind} has no editable field `{field}`");
                }
                editor.update_field(kind, id, &field, value);
            }

            match editor.request_save(kind, id).await {
                SaveOutcome::Saved => {
                    info!(%kind, id, "saved");
                    Ok(())
                }
                SaveOutcome::NoChanges | SaveOutcome::Cancelled | SaveOutcome::AlreadySaving => Ok(()),
                SaveOutcome::Failed(err) => Err(eyre!(err)).wrap_err_with(|| format!("saving {kind}:{id}")),
            }
        }
        AdminCommand::Delete { kind, id, yes } => {
            let mut editor = BalanceEditor::new(api, Console::new(yes));
            match editor.request_delete(kind, id).await {
                DeleteOutcome::Deleted | DeleteOutcome::Cancelled => Ok(()),
                DeleteOutcome::Failed(err) => Err(eyre!(err)).wrap_err_with(|| format!("deleting {kind}:{id}")),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_admin_set() {
        let cli = Cli::try_parse_from([
            "idlerealm",
            "admin",
            "set",
            "realm-unlock-costs",
            "4",
            "amount=1500",
            "resourceId=2",
            "--yes",
        ])
        .unwrap();
        let Command::Admin {
            action: AdminCommand::Set { kind, id, fields, yes },
        } = cli.command
        else {
            panic!("expected admin set");
        };
        assert_eq!(kind, EntityKind::RealmUnlockCosts);
        assert_eq!(id, 4);
        assert_eq!(fields[0], ("amount".to_string(), "1500".to_string()));
        assert!(yes);
    }

    #[test]
    fn test_parse_preview_mode() {
        let cli = Cli::try_parse_from(["idlerealm", "preview", "sheet.ron", "--mode", "max"]).unwrap();
        assert!(matches!(cli.command, Command::Preview { mode: UpgradeMode::Max, .. }));
        assert!(Cli::try_parse_from(["idlerealm", "preview", "sheet.ron", "--mode", "7"]).is_err());
    }

    #[test]
    fn test_parse_assignment() {
        assert_eq!(parse_assignment("name= Forge"), Ok(("name".into(), " Forge".into())));
        assert_eq!(parse_assignment("description="), Ok(("description".into(), String::new())));
        assert!(parse_assignment("=5").is_err());
        assert!(parse_assignment("name").is_err());
    }
}
