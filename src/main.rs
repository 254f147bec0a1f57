use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use uuid::Uuid;

use offer_wizard::config::Config;
use offer_wizard::engine::{compute_errors_with, compute_sections, PublishContext};
use offer_wizard::logging;
use offer_wizard::persistence::DraftStore;
use offer_wizard::session::{OfferSession, PublishOutcome};
use offer_wizard::submission::StubSubmitter;

#[derive(Parser)]
#[command(name = "offer-wizard")]
#[command(about = "Inspect and manage offer drafts saved by the creation wizard")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file path
    #[arg(short, long)]
    config: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List saved drafts, most recent first
    List,

    /// Print a stored draft record as JSON
    Show {
        /// Draft id
        id: String,
    },

    /// Report section completeness and validation errors for a draft
    Check {
        /// Draft id
        id: String,
    },

    /// Validate and publish a draft through the stand-in submitter
    Publish {
        /// Draft id
        id: String,
    },

    /// Delete a stored draft
    Discard {
        /// Draft id
        id: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (needed for logging setup)
    let config = Config::load(cli.config.as_deref())?;
    let _logging_handle = logging::init_logging(&config, cli.debug)?;

    let store = DraftStore::open(config.drafts_path());
    tracing::debug!(drafts = %config.drafts_path().display(), "Draft store opened");

    match cli.command {
        Some(Commands::List) | None => cmd_list(&store),
        Some(Commands::Show { id }) => cmd_show(&store, &id),
        Some(Commands::Check { id }) => cmd_check(&config, &store, &id),
        Some(Commands::Publish { id }) => cmd_publish(&config, store, &id).await,
        Some(Commands::Discard { id, yes }) => cmd_discard(&store, &id, yes),
    }
}

fn parse_id(id: &str) -> Result<Uuid> {
    Uuid::parse_str(id).with_context(|| format!("'{id}' is not a valid draft id"))
}

fn cmd_list(store: &DraftStore) -> Result<()> {
    let drafts = store.list();
    if drafts.is_empty() {
        println!("No saved drafts");
        return Ok(());
    }

    println!("Saved drafts ({})", drafts.len());
    println!("{}", "─".repeat(72));
    for draft in drafts {
        let offer_type = draft.offer_type.map_or("-", |t| t.label());
        let merchant = draft.merchant_name.as_deref().unwrap_or("no merchant");
        println!(
            "{}  {:<8}  {:<22}  {}",
            draft.draft_id,
            draft.current_step,
            offer_type,
            merchant
        );
        if !draft.headline.is_empty() {
            println!("    {}", draft.headline);
        }
        println!(
            "    saved {}",
            draft.saved_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }
    Ok(())
}

fn cmd_show(store: &DraftStore, id: &str) -> Result<()> {
    let id = parse_id(id)?;
    let Some(record) = store.load(id) else {
        bail!("No readable draft with id {id}");
    };
    let json = serde_json::to_string_pretty(&record).context("Failed to render draft record")?;
    println!("{json}");
    Ok(())
}

fn cmd_check(config: &Config, store: &DraftStore, id: &str) -> Result<()> {
    let id = parse_id(id)?;
    let Some(record) = store.load(id) else {
        bail!("No readable draft with id {id}");
    };

    let draft = record.to_draft();
    let ctx = PublishContext::with_brands(config.publishing.brands.iter().cloned());
    let sections = compute_sections(&draft, &ctx);
    let report = compute_errors_with(&draft, true, &ctx);

    println!("Draft {id} (step: {})", record.current_step.label());
    println!("{}", "─".repeat(40));
    for status in &sections.sections {
        let mark = if status.complete { "✓" } else { "·" };
        println!("{mark} {}", status.id.key());
        for (field, message) in report.errors_in(status.id) {
            println!("    {}: {message}", field.label());
        }
    }

    if report.is_valid() {
        println!("\nReady to publish");
    } else {
        println!(
            "\n{} problem(s); start with {}",
            report.errors.len(),
            report
                .first_section_with_error
                .map_or("-", |s| s.key())
        );
    }
    Ok(())
}

async fn cmd_publish(config: &Config, store: DraftStore, id: &str) -> Result<()> {
    let id = parse_id(id)?;
    let Some(mut session) = OfferSession::resume(config, store, id) else {
        bail!("No readable draft with id {id}");
    };

    let submitter = StubSubmitter::from_config(&config.publish);
    match session.publish(&submitter).await {
        PublishOutcome::Published(receipt) => {
            println!("Published offer {}", receipt.offer_id);
            Ok(())
        }
        PublishOutcome::Invalid { section, message } => {
            bail!("Draft is not ready ({}): {message}", section.key())
        }
        PublishOutcome::Failed { message } => {
            bail!("Publish failed, draft kept: {message}")
        }
    }
}

fn cmd_discard(store: &DraftStore, id: &str, skip_confirm: bool) -> Result<()> {
    let id = parse_id(id)?;

    if !skip_confirm {
        println!("Discard draft {id}? This cannot be undone.");
        print!("[y/N] ");
        std::io::Write::flush(&mut std::io::stdout())?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled");
            return Ok(());
        }
    }

    if store.delete(id) {
        println!("Discarded draft {id}");
    } else {
        println!("No draft with id {id}");
    }
    Ok(())
}
