/*
[INPUT]:  Loaded AppConfig, subcommand arguments, shutdown token
[OUTPUT]: Console output for list/create/take/submit/cancel/watch/deploy
[POS]:    CLI layer - one-shot and headless commands
[UPDATE]: When subcommands or their output change
*/

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use console::style;
use tokio::sync::mpsc;
use tokio::time::{Instant, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use task_reward_adapter::GatewayError;
use task_reward_adapter::rpc::bytecode_from_artifact;
use task_reward_app::dispatcher::CreateTaskForm;
use task_reward_app::session::{AccountChange, ActionReport};
use task_reward_app::task::{short_address, unix_now};
use task_reward_app::{
    Action, AccountWatcher, AppConfig, RefreshOutcome, Session, Snapshot, TaskAction, TaskRecord,
    ViewMode, WalletEvent,
};

pub(crate) fn build_session(config: &AppConfig) -> Result<Session> {
    let contract = config.build_contract()?;
    Ok(Session::new(Arc::new(contract)).with_preferred_account(config.preferred_account()?))
}

/// Connect the wallet; an initial refresh failure is only logged.
async fn connect_session(config: &AppConfig) -> Result<Session> {
    let mut session = build_session(config)?;
    let outcome = session.connect().await.context("connect wallet")?;
    if let RefreshOutcome::Failed(err) = &outcome {
        warn!(error = %err, "initial refresh failed");
    }
    Ok(session)
}

fn ensure_published(outcome: RefreshOutcome) -> Result<()> {
    match outcome {
        RefreshOutcome::Failed(err) => Err(err).context("synchronize tasks"),
        _ => Ok(()),
    }
}

pub async fn run_list(config: &AppConfig, view: ViewMode) -> Result<()> {
    let mut session = build_session(config)?;
    session.set_view_mode(view);

    match session.connect().await {
        Ok(outcome) => ensure_published(outcome)?,
        Err(GatewayError::NoAccounts) if view == ViewMode::All => {
            warn!("wallet exposes no accounts; listing without an identity");
            ensure_published(session.refresh().await)?;
        }
        Err(err) => return Err(err).context("connect wallet"),
    }

    if let Some(account) = session.account() {
        println!(
            "{} {}  {} {}",
            style("Account:").bold(),
            account,
            style("View:").bold(),
            view.label()
        );
    }
    for line in render_task_lines(&session.visible_tasks(), session.account(), unix_now()) {
        println!("{line}");
    }
    Ok(())
}

pub async fn run_create(config: &AppConfig, form: CreateTaskForm) -> Result<()> {
    let request = form.validate(Utc::now()).context("invalid task")?;
    let mut session = connect_session(config).await?;
    let report = session
        .dispatch(&Action::Create(request))
        .await
        .context("create task")?;
    print_report(&report);
    Ok(())
}

pub async fn run_task_action(config: &AppConfig, action: TaskAction, id: u64) -> Result<()> {
    let mut session = connect_session(config).await?;
    let account = session.require_account()?;

    match session.task(id) {
        Some(task) if !task.is_eligible(action, Some(account), unix_now()) => {
            warn!(
                id,
                action = action.label(),
                status = %task.status,
                "action not offered for this task; the contract will decide"
            );
        }
        Some(_) => {}
        None => warn!(id, "task not in the current snapshot"),
    }

    let report = session
        .dispatch(&Action::for_task(action, id))
        .await
        .with_context(|| format!("{} task {id}", action.label().to_lowercase()))?;
    print_report(&report);
    Ok(())
}

/// Follow wallet account changes and refresh periodically until shutdown.
pub async fn run_watch(config: &AppConfig, shutdown: CancellationToken) -> Result<()> {
    let mut session = connect_session(config).await?;
    for line in describe_changes(None, session.snapshot()) {
        info!("{line}");
    }

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let watcher = AccountWatcher::new(session.gateway(), config.account_poll_interval())
        .spawn(event_tx, shutdown.clone());

    let mut refresh_timer = config
        .refresh_interval()
        .map(|period| interval_at(Instant::now() + period, period));
    info!(
        refresh_interval = ?config.refresh_interval(),
        "watching; press Ctrl-C to stop"
    );

    loop {
        let refresh_due = async {
            match refresh_timer.as_mut() {
                Some(timer) => {
                    timer.tick().await;
                }
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            _ = shutdown.cancelled() => break,
            Some(WalletEvent::AccountsChanged(accounts)) = event_rx.recv() => {
                match session.on_accounts_changed(&accounts) {
                    AccountChange::Disconnected => info!("wallet disconnected; snapshot cleared"),
                    AccountChange::Connected(account) => {
                        info!(account = %account, "account switched");
                        refresh_and_log(&mut session).await;
                    }
                }
            }
            _ = refresh_due => refresh_and_log(&mut session).await,
        }
    }

    watcher.await.context("join account watcher")?;
    info!("watch stopped");
    Ok(())
}

async fn refresh_and_log(session: &mut Session) {
    if !session.is_connected() {
        return;
    }
    let before = session.snapshot().cloned();
    if let RefreshOutcome::Published { .. } = session.refresh().await {
        for line in describe_changes(before.as_ref(), session.snapshot()) {
            info!("{line}");
        }
    }
}

pub async fn run_deploy(config: &AppConfig, artifact_path: &Path) -> Result<()> {
    let content = std::fs::read_to_string(artifact_path)
        .with_context(|| format!("read artifact {}", artifact_path.display()))?;
    let artifact: serde_json::Value =
        serde_json::from_str(&content).context("parse artifact json")?;
    let bytecode = bytecode_from_artifact(&artifact)?;

    let rpc = config.rpc_client()?;
    let accounts = rpc.request_accounts().await.context("request accounts")?;
    let preferred = config.preferred_account()?;
    let from = preferred
        .filter(|account| accounts.contains(account))
        .or_else(|| accounts.first().copied())
        .ok_or_else(|| anyhow!("wallet exposes no accounts"))?;
    let chain_id = rpc.chain_id().await.context("read chain id")?;
    info!(chain_id, from = %from, bytes = bytecode.len(), "deploying contract");

    let address = rpc
        .deploy_contract(from, bytecode)
        .await
        .context("deploy contract")?;

    println!(
        "{} contract deployed at {}",
        style("SUCCESS!").bold().green(),
        style(address.to_checksum(None)).cyan()
    );
    println!("Add it to your config as: contract_address: \"{}\"", address.to_checksum(None));
    Ok(())
}

fn print_report(report: &ActionReport) {
    println!(
        "{} {} confirmed (tx {})",
        style("OK").bold().green(),
        report.action,
        report.tx_hash
    );
    match &report.refresh {
        RefreshOutcome::Published { count } => println!("{count} task(s) on contract"),
        RefreshOutcome::Stale => {}
        RefreshOutcome::Failed(err) => eprintln!(
            "{} refresh after {} failed: {err}",
            style("warning:").yellow(),
            report.action
        ),
    }
}

/// One line per task, or the empty-list placeholder.
pub(crate) fn render_task_lines(
    tasks: &[&TaskRecord],
    account: Option<task_reward_adapter::Address>,
    now: u64,
) -> Vec<String> {
    if tasks.is_empty() {
        return vec!["No tasks found".to_string()];
    }
    tasks
        .iter()
        .map(|task| {
            let actions = task
                .available_actions(account, now)
                .into_iter()
                .map(TaskAction::label)
                .collect::<Vec<_>>()
                .join("/");
            format!(
                "#{:<4} {:<22} {:>14}  due {:<19}  by {}  solver {:<13}  {}{}",
                task.id,
                task.status_label(now),
                task.reward_label(),
                task.deadline_label(),
                short_address(task.creator),
                task.solver_label(),
                task.title,
                if actions.is_empty() {
                    String::new()
                } else {
                    format!("  [{actions}]")
                }
            )
        })
        .collect()
}

/// Human-readable differences between two snapshots.
pub(crate) fn describe_changes(before: Option<&Snapshot>, after: Option<&Snapshot>) -> Vec<String> {
    let Some(after) = after else {
        return Vec::new();
    };
    let Some(before) = before else {
        return vec![format!("{} task(s) loaded", after.tasks.len())];
    };

    let mut changes = Vec::new();
    for task in after.tasks.iter().rev() {
        match before.get(task.id) {
            None => changes.push(format!(
                "task #{} created by {}: {} ({})",
                task.id,
                short_address(task.creator),
                task.title,
                task.reward_label()
            )),
            Some(previous) if previous.status != task.status => changes.push(format!(
                "task #{} {} -> {}",
                task.id,
                previous.status.label(),
                task.status.label()
            )),
            Some(_) => {}
        }
    }
    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use task_reward_adapter::{Address, TaskStatus, U256};

    fn task(id: u64, status: TaskStatus) -> TaskRecord {
        TaskRecord {
            id,
            creator: Address::repeat_byte(0xaa),
            title: format!("task {id}"),
            description: String::new(),
            reward_wei: U256::from(500_000_000_000_000_000u64),
            deadline: Some(2_000),
            status,
            solver: None,
        }
    }

    #[test]
    fn test_empty_list_placeholder() {
        assert_eq!(render_task_lines(&[], None, 0), vec!["No tasks found"]);
    }

    #[test]
    fn test_task_line_shows_offered_actions() {
        let open = task(1, TaskStatus::Open);
        let lines = render_task_lines(&[&open], Some(Address::repeat_byte(0xbb)), 1_000);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("#1 "));
        assert!(lines[0].contains("0.5 ETH"));
        assert!(lines[0].ends_with("[Take]"));

        let expired = render_task_lines(&[&open], Some(Address::repeat_byte(0xbb)), 3_000);
        assert!(expired[0].contains("Open (expired)"));
        assert!(!expired[0].contains("[Take]"));
    }

    #[test]
    fn test_describe_changes() {
        let before = Snapshot::new(vec![task(1, TaskStatus::Open)]);
        let after = Snapshot::new(vec![task(2, TaskStatus::Open), task(1, TaskStatus::InProgress)]);

        let changes = describe_changes(Some(&before), Some(&after));
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0], "task #1 Open -> In Progress");
        assert!(changes[1].starts_with("task #2 created by"));

        assert_eq!(describe_changes(None, Some(&after)), vec!["2 task(s) loaded"]);
        assert!(describe_changes(Some(&before), None).is_empty());
    }
}
