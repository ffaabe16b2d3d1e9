//! Invocation of the simulator's result export tool.
//!
//! One blocking call per record kind, e.g.
//! `opp_scavetool export -T v -F JSON -o <results>/data_vec.json a.vec b.vec`,
//! run from the configured working directory. The call is bounded by the
//! configured timeout; a tool that hangs is killed.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use lt_config::PipelineConfig;
use lt_results::RecordKind;
use tracing::{info, warn};
use wait_timeout::ChildExt;

use crate::error::{AppError, AppResult};

/// A fully resolved export command line.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportCommand {
    pub program: String,
    pub args: Vec<OsString>,
    pub working_dir: PathBuf,
    pub timeout: Duration,
}

impl ExportCommand {
    /// Shell-like rendering for logs and dry runs.
    pub fn display(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        line
    }
}

fn type_filter(kind: RecordKind) -> &'static str {
    match kind {
        RecordKind::Vector => "v",
        RecordKind::Scalar => "s",
    }
}

/// Build the export command for `kind`, writing to `output`.
pub fn build_export_command(
    config: &PipelineConfig,
    kind: RecordKind,
    output: &Path,
) -> AppResult<ExportCommand> {
    let working_dir = config.export_working_dir().to_path_buf();
    let patterns = match kind {
        RecordKind::Vector => &config.export_tool.vector_inputs,
        RecordKind::Scalar => &config.export_tool.scalar_inputs,
    };

    let mut inputs = Vec::new();
    for pattern in patterns {
        let resolved = resolve_inputs(&working_dir, pattern)?;
        if resolved.is_empty() {
            return Err(AppError::NoExportInputs {
                pattern: pattern.clone(),
                dir: working_dir,
            });
        }
        inputs.extend(resolved);
    }

    let mut args: Vec<OsString> = ["export", "-T", type_filter(kind), "-F", "JSON", "-o"]
        .into_iter()
        .map(OsString::from)
        .collect();
    args.push(absolute(output)?.into_os_string());
    args.extend(inputs.into_iter().map(OsString::from));

    Ok(ExportCommand {
        program: config.export_tool.program.clone(),
        args,
        working_dir,
        timeout: Duration::from_secs(config.export_tool.timeout_s),
    })
}

/// `*.ext` expands to the matching file names in `dir`, sorted; anything else
/// is passed through as-is.
fn resolve_inputs(dir: &Path, pattern: &str) -> AppResult<Vec<String>> {
    let Some(suffix) = pattern.strip_prefix('*') else {
        return Ok(vec![pattern.to_string()]);
    };
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if name.ends_with(suffix) {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

// The tool runs in another directory, so relative outputs must be pinned first.
fn absolute(path: &Path) -> AppResult<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

/// Run the command to completion. Non-zero exit, signal death and timeout are errors.
pub fn run_export(command: &ExportCommand) -> AppResult<()> {
    info!(command = %command.display(), dir = %command.working_dir.display(), "running export tool");

    let mut child = Command::new(&command.program)
        .args(&command.args)
        .current_dir(&command.working_dir)
        .stdin(Stdio::null())
        .spawn()
        .map_err(|source| AppError::ExportToolSpawn {
            program: command.program.clone(),
            source,
        })?;

    match child.wait_timeout(command.timeout)? {
        Some(status) if status.success() => Ok(()),
        Some(status) => Err(AppError::ExportTool {
            code: status.code(),
        }),
        None => {
            warn!(timeout_s = command.timeout.as_secs(), "export tool timed out, killing it");
            child.kill()?;
            child.wait()?;
            Err(AppError::ExportToolTimeout {
                timeout_s: command.timeout.as_secs(),
            })
        }
    }
}
