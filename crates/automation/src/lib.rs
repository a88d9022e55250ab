//! Edgebar Automation
//!
//! Runs the scripts and URIs configured under `automatic`. Relative script
//! paths resolve against a base directory (the data directory). A batch runs
//! every task concurrently; one failing task never stops its siblings.

use edgebar_config::{AutomationTask, Trigger};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::process::Command;
use tokio::task::JoinSet;

#[derive(Debug, Error)]
pub enum AutomationError {
    #[error("Script not found: {0}")]
    MissingScript(PathBuf),

    #[error("Empty script entry")]
    EmptyScript,

    #[error("Failed to launch {target}: {source}")]
    Spawn {
        target: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{target} exited with {status}")]
    Failed { target: String, status: String },
}

/// A fully resolved process launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: OsString,
    pub args: Vec<OsString>,
    pub current_dir: Option<PathBuf>,
}

impl Invocation {
    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args).kill_on_drop(false);
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }
        command
    }
}

/// Whether the entry is a URI rather than a file path.
fn is_uri(script: &str) -> bool {
    match script.split_once(':') {
        // A single letter before the colon is a drive (C:\...).
        Some((scheme, rest)) if scheme.len() > 1 => {
            rest.starts_with("//")
                || scheme.eq_ignore_ascii_case("mailto")
                || scheme.eq_ignore_ascii_case("ms-settings")
        }
        _ => false,
    }
}

fn opener(target: &str) -> Invocation {
    let (program, mut args): (&str, Vec<OsString>) = if cfg!(windows) {
        ("cmd", vec!["/C".into(), "start".into(), "".into()])
    } else if cfg!(target_os = "macos") {
        ("open", Vec::new())
    } else {
        ("xdg-open", Vec::new())
    };
    args.push(target.into());
    Invocation {
        program: program.into(),
        args,
        current_dir: None,
    }
}

/// Turn a task into the process to launch.
pub fn plan(task: &AutomationTask, base_dir: &Path) -> Result<Invocation, AutomationError> {
    let script = task.script.trim();
    if script.is_empty() {
        return Err(AutomationError::EmptyScript);
    }
    if is_uri(script) {
        return Ok(opener(script));
    }

    let path = Path::new(script);
    let path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    };
    if !path.exists() {
        return Err(AutomationError::MissingScript(path));
    }

    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let task_args = task.args.iter().map(OsString::from);
    let (program, mut args): (OsString, Vec<OsString>) = match extension.as_str() {
        "ps1" => (
            "powershell".into(),
            vec![
                "-NoProfile".into(),
                "-ExecutionPolicy".into(),
                "Bypass".into(),
                "-File".into(),
                path.clone().into(),
            ],
        ),
        "bat" | "cmd" => ("cmd".into(), vec!["/C".into(), path.clone().into()]),
        "sh" => ("sh".into(), vec![path.clone().into()]),
        _ => (path.clone().into(), Vec::new()),
    };
    args.extend(task_args);

    Ok(Invocation {
        program,
        args,
        current_dir: path.parent().map(Path::to_path_buf),
    })
}

/// Run one task to completion.
pub async fn run_task(task: &AutomationTask, base_dir: &Path) -> Result<(), AutomationError> {
    let invocation = plan(task, base_dir)?;
    tracing::info!(script = %task.script, "Running automation task");

    let status = invocation
        .command()
        .status()
        .await
        .map_err(|source| AutomationError::Spawn {
            target: task.script.clone(),
            source,
        })?;

    if status.success() {
        Ok(())
    } else {
        Err(AutomationError::Failed {
            target: task.script.clone(),
            status: status.to_string(),
        })
    }
}

/// Outcome of a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub succeeded: usize,
    pub failed: usize,
}

/// Run every task concurrently and wait for all of them.
pub async fn run_all(tasks: Vec<AutomationTask>, base_dir: PathBuf) -> BatchReport {
    let mut set = JoinSet::new();
    for task in tasks {
        let base_dir = base_dir.clone();
        set.spawn(async move {
            let result = run_task(&task, &base_dir).await;
            (task.script, result)
        });
    }

    let mut report = BatchReport::default();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((_, Ok(()))) => report.succeeded += 1,
            Ok((script, Err(e))) => {
                tracing::warn!(%script, "Automation task failed: {}", e);
                report.failed += 1;
            }
            Err(e) => {
                tracing::error!("Automation task panicked: {}", e);
                report.failed += 1;
            }
        }
    }
    report
}

/// Run the tasks bound to `trigger` and wait for all of them.
pub async fn run_trigger(tasks: &[AutomationTask], trigger: Trigger, base_dir: &Path) -> BatchReport {
    let selected: Vec<AutomationTask> = tasks.iter().filter(|t| t.runs_on(trigger)).cloned().collect();
    if selected.is_empty() {
        return BatchReport::default();
    }
    tracing::info!(?trigger, count = selected.len(), "Running automation batch");
    let report = run_all(selected, base_dir.to_path_buf()).await;
    tracing::info!(?trigger, succeeded = report.succeeded, failed = report.failed, "Automation batch finished");
    report
}
