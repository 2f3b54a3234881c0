use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use log::warn;

use crate::client::models::draft::Draft;
use crate::client::models::notification::{titles, Notification};
use crate::client::models::wallpaper::FilterStatus;
use crate::client::services::api_client::ApiClient;
use crate::client::services::auth_service::AuthService;
use crate::client::services::moderation::{ApproveOutcome, ModerationReconciler};
use crate::client::services::newsletter::NewsletterService;
use crate::client::utils::local_store::{FileStore, LocalStore};
use crate::client::utils::session_store::SessionStore;
use crate::common::config::ConsoleConfig;
use crate::common::errors::ConsoleError;

#[derive(Debug, Parser)]
#[command(name = "tp-console", version, about = "Newsletter and wallpaper moderation console")]
pub struct Cli {
    /// Backend base URL (overrides API_BASE_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and remember the session
    Login {
        username: String,
        #[arg(long, env = "TP_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    Logout,
    /// Print the stored user id
    Whoami,
    /// Subscriber and sent-email counters
    Stats,
    /// Send a newsletter to every active subscriber (or a test send)
    Send {
        #[command(flatten)]
        draft: DraftArgs,
        #[arg(long)]
        test: bool,
    },
    /// Show the plain-text preview of a newsletter
    Preview {
        #[command(flatten)]
        draft: DraftArgs,
    },
    #[command(subcommand)]
    Wallpapers(WallpaperCommand),
}

#[derive(Debug, Args)]
pub struct DraftArgs {
    #[arg(long, default_value = "")]
    pub subject: String,
    #[arg(long, conflicts_with = "body_file")]
    pub body: Option<String>,
    #[arg(long)]
    pub body_file: Option<PathBuf>,
}

impl DraftArgs {
    fn into_draft(self) -> anyhow::Result<Draft> {
        let content = match (self.body, self.body_file) {
            (Some(body), _) => body,
            (None, Some(path)) => {
                std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?
            }
            (None, None) => String::new(),
        };
        Ok(Draft::new(self.subject, content))
    }
}

#[derive(Debug, Subcommand)]
pub enum WallpaperCommand {
    /// List submissions
    List {
        #[arg(long, default_value_t = FilterStatus::Pending)]
        status: FilterStatus,
    },
    /// Approve one or more submissions by id
    Approve {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Pending / approved / total counters
    Counts,
}

struct Console {
    api: ApiClient,
    store: Arc<dyn LocalStore>,
    session: Arc<SessionStore>,
}

impl Console {
    fn build(mut config: ConsoleConfig, cli_api_url: Option<&str>) -> anyhow::Result<Self> {
        if let Some(raw) = cli_api_url {
            config.api_base_url =
                url::Url::parse(raw).map_err(|e| ConsoleError::Config(format!("--api-url '{}': {}", raw, e)))?;
        }
        let store: Arc<dyn LocalStore> = Arc::new(FileStore::new(config.local_store_path()));
        let session = Arc::new(SessionStore::keyring(store.clone(), config.keyring_fallback));
        let api = ApiClient::from_config(&config)?;
        Ok(Self { api, store, session })
    }
}

fn notify(n: Notification) {
    if n.is_error() {
        eprintln!("{}", n);
    } else {
        println!("{}", n);
    }
}

pub async fn run(cli: Cli, config: ConsoleConfig) -> anyhow::Result<()> {
    let console = Console::build(config, cli.api_url.as_deref())?;

    match cli.command {
        Command::Login { username, password } => {
            let password = password.unwrap_or_default();
            let auth = AuthService::new(console.api.clone(), console.session.clone());
            match auth.login(&username, &password).await {
                Ok(_) => notify(Notification::success(titles::ACCESS_GRANTED, "Welcome to the Protocol Network.")),
                Err(ConsoleError::Validation(_)) => {
                    notify(Notification::error(titles::ACCESS_DENIED, "All credentials are required to proceed."));
                    anyhow::bail!("login aborted");
                }
                Err(e) => {
                    notify(Notification::error(titles::ACCESS_DENIED, "Login failed. Please check your credentials."));
                    return Err(e.into());
                }
            }
        }
        Command::Logout => {
            AuthService::new(console.api.clone(), console.session.clone()).logout()?;
            notify(Notification::info(titles::SESSION_TERMINATED, "Logging out of the system..."));
        }
        Command::Whoami => match console.session.load() {
            Some(id) => println!("{}", id),
            None => anyhow::bail!(ConsoleError::NotAuthenticated),
        },
        Command::Stats => {
            let svc = NewsletterService::new(console.api.clone(), console.session.clone());
            match svc.stats().await {
                Ok(stats) => {
                    println!("Active Subscribers: {}", stats.total_subscribers);
                    println!("Sent This Month:    {}", stats.total_emails_sent);
                }
                Err(ConsoleError::NotAuthenticated) => anyhow::bail!(ConsoleError::NotAuthenticated),
                Err(e) => {
                    notify(Notification::error(titles::DATA_FETCH_ERROR, "Unable to retrieve subscriber or email data."));
                    return Err(e.into());
                }
            }
        }
        Command::Send { draft, test } => {
            let draft = draft.into_draft()?;
            let svc = NewsletterService::new(console.api.clone(), console.session.clone());
            let (result, ok_title, ok_desc, fail_title, fail_desc) = if test {
                (
                    svc.send_test(&draft).await,
                    titles::TEST_TRANSMISSION_SUCCESSFUL,
                    "Test email sent successfully.",
                    titles::TEST_TRANSMISSION_FAILED,
                    "There was an error sending the test email.",
                )
            } else {
                (
                    svc.send(&draft).await,
                    titles::TRANSMISSION_SUCCESSFUL,
                    "Newsletter deployed to all active subscribers.",
                    titles::TRANSMISSION_FAILED,
                    "There was an error sending the newsletter.",
                )
            };
            match result {
                Ok(()) => notify(Notification::success(ok_title, ok_desc)),
                Err(ConsoleError::Validation(_)) => {
                    notify(Notification::error(titles::ACCESS_DENIED, "Subject and content are required to proceed."));
                    anyhow::bail!("nothing sent");
                }
                Err(e) => {
                    notify(Notification::error(fail_title, fail_desc));
                    return Err(e.into());
                }
            }
        }
        Command::Preview { draft } => {
            let draft = draft.into_draft()?;
            print!("{}", draft.preview());
            println!("-- {} CHARS, {} LINES", draft.char_count(), draft.line_count());
        }
        Command::Wallpapers(cmd) => {
            console.session.require_user_id()?;
            let moderation = ModerationReconciler::new(console.api.clone(), console.store.clone());
            run_wallpapers(&moderation, cmd).await?;
        }
    }
    Ok(())
}

async fn run_wallpapers(moderation: &ModerationReconciler<ApiClient>, cmd: WallpaperCommand) -> anyhow::Result<()> {
    let loaded = moderation.load().await;

    match cmd {
        WallpaperCommand::List { status } => {
            if let Err(e) = loaded {
                notify(Notification::error(titles::DATA_FETCH_ERROR, "Unable to retrieve wallpaper data."));
                return Err(e.into());
            }
            let items = moderation.filtered_view(status);
            if items.is_empty() {
                println!("NO WALLPAPERS FOUND");
            }
            for w in items {
                let badge = if w.is_approved { "APPROVED" } else { "PENDING " };
                println!("[{}] {}  {}  {}", badge, w.id, w.display_author(), w.display_url());
            }
        }
        WallpaperCommand::Counts => {
            if let Err(e) = loaded {
                notify(Notification::error(titles::DATA_FETCH_ERROR, "Unable to retrieve wallpaper data."));
                return Err(e.into());
            }
            let c = moderation.counts();
            println!("PENDING ({})  APPROVED ({})  ALL ({})", c.pending, c.approved, c.all);
        }
        WallpaperCommand::Approve { ids } => {
            // the server decides whether an id exists; a failed list does not block approval
            if let Err(e) = loaded {
                warn!("Approving without a fresh list: {}", e);
                notify(Notification::warning(titles::STALE_DATA, "Wallpaper list unavailable, approving by id only."));
            }
            let mut failed = 0usize;
            for (id, result) in moderation.approve_many(&ids).await {
                match result {
                    Ok(ApproveOutcome::Approved) => notify(Notification::success(
                        titles::WALLPAPER_APPROVED,
                        format!("Wallpaper {} has been successfully approved.", id),
                    )),
                    Ok(ApproveOutcome::AlreadyInFlight) => {
                        notify(Notification::info(titles::WALLPAPER_APPROVED, format!("Approval of {} already in progress.", id)))
                    }
                    Err(ConsoleError::Validation(_)) => {
                        failed += 1;
                        notify(Notification::error(titles::APPROVAL_FAILED, "Missing wallpaper identifier."))
                    }
                    Err(_) => {
                        failed += 1;
                        notify(Notification::error(
                            titles::APPROVAL_FAILED,
                            format!("There was an error approving wallpaper {}.", id),
                        ))
                    }
                }
            }
            if failed > 0 {
                anyhow::bail!("{} of {} approvals failed", failed, ids.len());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn wallpapers_list_defaults_to_pending() {
        let cli = Cli::try_parse_from(["tp-console", "wallpapers", "list"]).unwrap();
        match cli.command {
            Command::Wallpapers(WallpaperCommand::List { status }) => assert_eq!(status, FilterStatus::Pending),
            other => panic!("unexpected {:?}", other),
        }

        let cli = Cli::try_parse_from(["tp-console", "--api-url", "http://x", "wallpapers", "list", "--status", "all"]).unwrap();
        assert_eq!(cli.api_url.as_deref(), Some("http://x"));
        assert!(matches!(cli.command, Command::Wallpapers(WallpaperCommand::List { status: FilterStatus::All })));

        assert!(Cli::try_parse_from(["tp-console", "wallpapers", "list", "--status", "rejected"]).is_err());
    }

    #[test]
    fn approve_needs_at_least_one_id() {
        assert!(Cli::try_parse_from(["tp-console", "wallpapers", "approve"]).is_err());
        let cli = Cli::try_parse_from(["tp-console", "wallpapers", "approve", "a", "b"]).unwrap();
        assert!(matches!(cli.command, Command::Wallpapers(WallpaperCommand::Approve { ref ids }) if ids.len() == 2));
    }

    #[test]
    fn body_and_body_file_conflict() {
        assert!(Cli::try_parse_from(["tp-console", "send", "--subject", "s", "--body", "b", "--body-file", "f.txt"]).is_err());
    }

    #[test]
    fn draft_from_body_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("body.txt");
        std::fs::write(&path, "line one\nline two").unwrap();
        let args = DraftArgs { subject: "Weekly".to_string(), body: None, body_file: Some(path) };
        let draft = args.into_draft().unwrap();
        assert_eq!(draft.line_count(), 2);
        assert_eq!(draft.subject, "Weekly");
    }
}
