//! Scrutineer - Formula Student rule compliance CLI
//!
//! The `scrutineer` command checks proposed engineering tasks against the
//! competition rules and keeps a per-session ledger of approved work.
//!
//! ## Commands
//!
//! - `rules`: List categories, or show the rules of one category
//! - `submit`: Check a task; compliant tasks are recorded straight away
//! - `approve` / `reject`: Decide on a suggested replacement
//! - `pending`: Show runs waiting for a decision
//! - `tasks`: Show the session ledger
//! - `recall`: Search long-term memory of past runs

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use tracing::{info, warn, Level};
use uuid::Uuid;

use scrutineer_core::checker::ComplianceJudge;
use scrutineer_core::llm::{GeminiClient, ModelError, ModelResult};
use scrutineer_core::proposer::AlternativeProposer;
use scrutineer_core::{
    ApprovalWorkflow, Category, ComplianceVerdict, ConfirmationDecision, Decision, RuleStore,
    RunOutcome, ScrutineerConfig, SessionState,
};
use scrutineer_state::{
    FsSessionStore, MemoryQuery, MemoryService, SessionId, SessionStore, SurrealMemoryService,
};

#[derive(Parser)]
#[command(name = "scrutineer")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Formula Student rule compliance checks with human approval", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Path to the configuration file
    #[arg(long, global = true, env = "SCRUTINEER_CONFIG", default_value = "scrutineer.toml")]
    config: PathBuf,

    /// Session whose ledger to use (default: `workflow.default_session`)
    #[arg(short, long, global = true, env = "SCRUTINEER_SESSION")]
    session: Option<String>,

    /// Directory for session files and the memory database
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file and create the state directory
    Init {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },

    /// List rule categories, or show the rules of one category
    Rules {
        /// Category name (spaces, hyphens and case are ignored)
        category: Option<String>,
    },

    /// Check a task against a category's rules
    Submit {
        /// Rule category the task falls under
        #[arg(short, long)]
        category: String,

        /// Task description
        #[arg(short, long)]
        task: String,

        /// Ask for approval on stdin instead of suspending the run
        #[arg(short, long)]
        wait: bool,
    },

    /// Approve the suggested replacement of a suspended run
    Approve {
        /// Run ID printed by `submit`
        run_id: Uuid,

        /// Note kept with the decision
        #[arg(short, long)]
        comment: Option<String>,
    },

    /// Reject the suggested replacement of a suspended run
    Reject {
        /// Run ID printed by `submit`
        run_id: Uuid,

        /// Reason for rejecting
        #[arg(short, long)]
        comment: Option<String>,
    },

    /// List runs waiting for a decision
    Pending,

    /// Show the task ledger
    Tasks,

    /// Search long-term memory of past runs
    Recall {
        /// Words to look for
        query: String,

        /// Maximum number of entries to show
        #[arg(short, long, default_value = "10")]
        limit: usize,

        /// Search every session, not just the current one
        #[arg(long)]
        all_sessions: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    scrutineer_core::init_tracing(cli.json, level);

    let mut config = ScrutineerConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config.display()))?;
    config.apply_env_overrides();
    if let Some(dir) = cli.state_dir {
        config.storage.state_dir = dir;
    }

    let session_id = SessionId::new(
        cli.session
            .unwrap_or_else(|| config.workflow.default_session.clone()),
    )
    .context("Invalid session id")?;

    match cli.command {
        Commands::Init { force } => cmd_init(&cli.config, &config, force),
        Commands::Rules { category } => {
            let rules = config.load_rules().context("Failed to load rules")?;
            println!("{}", cmd_rules(&rules, category.as_deref())?);
            Ok(())
        }
        Commands::Submit {
            category,
            task,
            wait,
        } => {
            let store = open_store(&config)?;
            let workflow = build_workflow(&config, true).await?;
            let stdin = std::io::stdin();
            let result = cmd_submit(
                &workflow,
                &store,
                &session_id,
                &category,
                &task,
                wait.then(|| stdin.lock()),
            )
            .await;
            workflow.flush_memory().await;
            println!("{}", result?);
            Ok(())
        }
        Commands::Approve { run_id, comment } => {
            cmd_decide_and_print(&config, &session_id, run_id, Decision::Approve, comment).await
        }
        Commands::Reject { run_id, comment } => {
            cmd_decide_and_print(&config, &session_id, run_id, Decision::Reject, comment).await
        }
        Commands::Pending => {
            let store = open_store(&config)?;
            println!("{}", cmd_pending(&store, &session_id).await?);
            Ok(())
        }
        Commands::Tasks => {
            let store = open_store(&config)?;
            println!("{}", cmd_tasks(&store, &session_id).await?);
            Ok(())
        }
        Commands::Recall {
            query,
            limit,
            all_sessions,
        } => {
            let memory = SurrealMemoryService::connect(&config.memory_url())
                .await
                .context("Failed to open long-term memory")?;
            let scope = (!all_sessions).then_some(&session_id);
            println!("{}", cmd_recall(&memory, &query, limit, scope).await?);
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Wiring
// ---------------------------------------------------------------------------

fn open_store(config: &ScrutineerConfig) -> Result<FsSessionStore> {
    FsSessionStore::new(&config.storage.state_dir).with_context(|| {
        format!(
            "Failed to open session store in {}",
            config.storage.state_dir.display()
        )
    })
}

/// Stand-in for the model when no API key is configured.
///
/// Resuming a run never consults the model, so `approve` and `reject` work
/// without credentials.
struct NoModel {
    var: String,
}

#[async_trait]
impl ComplianceJudge for NoModel {
    async fn judge(&self, _category: &Category, _task: &str) -> ModelResult<ComplianceVerdict> {
        Err(ModelError::MissingApiKey {
            var: self.var.clone(),
        })
    }
}

#[async_trait]
impl AlternativeProposer for NoModel {
    async fn propose(&self, _task: &str, _reason: &str) -> ModelResult<String> {
        Err(ModelError::MissingApiKey {
            var: self.var.clone(),
        })
    }
}

async fn build_workflow(config: &ScrutineerConfig, needs_model: bool) -> Result<ApprovalWorkflow> {
    let rules = Arc::new(config.load_rules().context("Failed to load rules")?);

    let (judge, proposer): (Arc<dyn ComplianceJudge>, Arc<dyn AlternativeProposer>) =
        match config.gemini_config() {
            Ok(gemini) => {
                let client =
                    Arc::new(GeminiClient::new(gemini).context("Failed to build model client")?);
                info!(event = "model.configured", model = %client.model());
                (client.clone() as Arc<dyn ComplianceJudge>, client as Arc<dyn AlternativeProposer>)
            }
            Err(e) if needs_model => {
                return Err(e).context("A model API key is required to check tasks");
            }
            Err(_) => {
                let offline = Arc::new(NoModel {
                    var: config.model.api_key_env.clone(),
                });
                (
                    offline.clone() as Arc<dyn ComplianceJudge>,
                    offline as Arc<dyn AlternativeProposer>,
                )
            }
        };

    let mut workflow = ApprovalWorkflow::new(rules, judge, proposer)
        .with_revalidation(config.workflow.revalidate_alternatives);

    if config.storage.memory_enabled {
        match SurrealMemoryService::connect(&config.memory_url()).await {
            Ok(memory) => workflow = workflow.with_memory(Arc::new(memory)),
            Err(e) => warn!(event = "memory.unavailable", error = %e),
        }
    }

    Ok(workflow)
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Write a default config file and create the state directory.
fn cmd_init(path: &Path, config: &ScrutineerConfig, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    ScrutineerConfig::write_default(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    open_store(config)?;

    info!(event = "config.initialized", path = %path.display());
    println!("Wrote {}", path.display());
    println!("State directory: {}", config.storage.state_dir.display());
    Ok(())
}

fn cmd_rules(rules: &RuleStore, category: Option<&str>) -> Result<String> {
    let Some(label) = category else {
        let mut out = String::from("Categories:");
        for cat in rules.categories() {
            out.push_str(&format!("\n  {} ({} rules)", cat.name, cat.rules.len()));
        }
        return Ok(out);
    };

    match rules.lookup(label) {
        Ok(cat) => {
            let mut out = format!("{}:", cat.name);
            for rule in &cat.rules {
                out.push_str(&format!("\n  - {}: {}", rule.name, rule.text));
            }
            Ok(out)
        }
        Err(not_found) => bail!(
            "{} Valid categories: {}",
            not_found,
            not_found.valid_categories.join(", ")
        ),
    }
}

/// Run one submission; with `input`, resolve a suspension interactively.
async fn cmd_submit<R: BufRead>(
    workflow: &ApprovalWorkflow,
    store: &dyn SessionStore,
    session_id: &SessionId,
    category: &str,
    task: &str,
    input: Option<R>,
) -> Result<String> {
    let mut session = SessionState::load(store, session_id)
        .await
        .context("Failed to load session")?;

    let outcome = workflow.submit(&mut session, category, task).await?;
    session.save(store).await.context("Failed to save session")?;

    let (Some(mut input), RunOutcome::AwaitingConfirmation { run_id, request }) = (input, &outcome)
    else {
        return Ok(render_outcome(&outcome));
    };

    let mut out = render_outcome(&outcome);
    out.push('\n');
    let decision = prompt_decision(&mut input, &request.hint())?;
    let decision = ConfirmationDecision::new(request.request_id.clone(), decision);

    // Other writers may have touched the session while the prompt was open.
    let mut session = SessionState::load(store, session_id)
        .await
        .context("Failed to reload session")?;
    if session.pending_run(run_id).is_none() {
        bail!("Run {run_id} was resolved elsewhere while waiting for a decision");
    }
    let resumed = workflow.resume(&mut session, *run_id, decision).await?;
    session.save(store).await.context("Failed to save session")?;
    out.push_str(&render_outcome(&resumed));
    Ok(out)
}

fn prompt_decision(input: &mut impl BufRead, hint: &str) -> Result<Decision> {
    eprint!("{hint}\nApprove? [y/N] ");
    std::io::stderr().flush().ok();

    let mut line = String::new();
    input
        .read_line(&mut line)
        .context("Failed to read decision")?;
    Ok(match line.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Decision::Approve,
        _ => Decision::Reject,
    })
}

async fn cmd_decide_and_print(
    config: &ScrutineerConfig,
    session_id: &SessionId,
    run_id: Uuid,
    decision: Decision,
    comment: Option<String>,
) -> Result<()> {
    let store = open_store(config)?;
    let workflow = build_workflow(config, false).await?;
    let result = cmd_decide(&workflow, &store, session_id, run_id, decision, comment).await;
    workflow.flush_memory().await;
    println!("{}", result?);
    Ok(())
}

/// Resume a suspended run with a reviewer decision.
async fn cmd_decide(
    workflow: &ApprovalWorkflow,
    store: &dyn SessionStore,
    session_id: &SessionId,
    run_id: Uuid,
    decision: Decision,
    comment: Option<String>,
) -> Result<String> {
    let mut session = SessionState::load(store, session_id)
        .await
        .context("Failed to load session")?;
    let request_id = session
        .pending_run(&run_id)
        .map(|run| run.request.request_id.clone())
        .with_context(|| {
            format!("No run {run_id} is awaiting confirmation in session '{session_id}'")
        })?;

    let decision = ConfirmationDecision::new(request_id, decision).with_comment(comment);
    let outcome = workflow.resume(&mut session, run_id, decision).await?;
    session.save(store).await.context("Failed to save session")?;
    Ok(render_outcome(&outcome))
}

async fn cmd_pending(store: &dyn SessionStore, session_id: &SessionId) -> Result<String> {
    let session = SessionState::load(store, session_id)
        .await
        .context("Failed to load session")?;
    let runs = session.pending_runs();
    if runs.is_empty() {
        return Ok(format!("No runs awaiting confirmation in session '{session_id}'."));
    }

    let mut out = String::new();
    for run in runs {
        let req = &run.request;
        out.push_str(&format!(
            "{}  [{}] '{}' -> '{}'\n    Reason: {}\n    Since: {}\n",
            run.run_id,
            req.category,
            req.original_task,
            req.suggested_replacement,
            req.reason,
            run.suspended_at.format("%Y-%m-%d %H:%M:%S UTC"),
        ));
    }
    Ok(out.trim_end().to_string())
}

async fn cmd_tasks(store: &dyn SessionStore, session_id: &SessionId) -> Result<String> {
    let session = SessionState::load(store, session_id)
        .await
        .context("Failed to load session")?;
    if session.list().is_empty() {
        return Ok(format!("No tasks in the ledger for session '{session_id}'."));
    }
    let lines: Vec<String> = session
        .list()
        .iter()
        .enumerate()
        .map(|(i, t)| format!("{:>3}. {}", i + 1, t))
        .collect();
    Ok(lines.join("\n"))
}

async fn cmd_recall(
    memory: &dyn MemoryService,
    query: &str,
    limit: usize,
    session: Option<&SessionId>,
) -> Result<String> {
    let mut q = MemoryQuery::all().with_text(query).with_limit(limit);
    if let Some(id) = session {
        q = q.for_session(id.clone());
    }

    let hits = memory
        .search(&q)
        .await
        .context("Failed to search memory")?;
    if hits.is_empty() {
        return Ok(format!("Nothing in memory matches '{query}'."));
    }

    let mut out = String::new();
    for entry in hits {
        out.push_str(&format!(
            "[{}] {} {} ({})\n{}\n\n",
            entry.created_at.format("%Y-%m-%d %H:%M"),
            entry.session_id,
            entry.kind,
            entry.content_digest.short(),
            entry.content,
        ));
    }
    Ok(out.trim_end().to_string())
}

fn render_outcome(outcome: &RunOutcome) -> String {
    match outcome {
        RunOutcome::Committed { ack, message, .. } => match message {
            Some(m) => format!("{m}\n{ack}"),
            None => ack.clone(),
        },
        RunOutcome::AwaitingConfirmation { run_id, request } => {
            let mut out = format!(
                "Not compliant with {}.\nReason: {}\nSuggested: {}",
                request.category, request.reason, request.suggested_replacement
            );
            if let Some(check) = &request.suggestion_check {
                let verdict = if check.compliant { "compliant" } else { "NOT compliant" };
                out.push_str(&format!("\nRe-check: {verdict} ({})", check.reason));
            }
            out.push_str(&format!(
                "\nRun {run_id} is awaiting confirmation: \
                 `scrutineer approve {run_id}` or `scrutineer reject {run_id}`."
            ));
            out
        }
        RunOutcome::Rejected { message, .. } => {
            format!("{message}\nNothing was added to the ledger.")
        }
        RunOutcome::CategoryNotFound { not_found, .. } => format!(
            "{} Valid categories: {}",
            not_found,
            not_found.valid_categories.join(", ")
        ),
    }
}
