//! Engine that pipes each source file through an external program.
//!
//! The program reads the file on stdin and writes the transformed content
//! to stdout, which lands under `out_dir` mirroring the source path.

use crate::engine::TransformEngine;
use crate::error::{Error, Result};
use crate::job::Job;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

/// How to invoke the external program. Loaded from the `[engine]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandSpec {
    pub command: PathBuf,
    #[serde(default)]
    pub args: Vec<String>,
    pub out_dir: PathBuf,
    /// Replacement extension for outputs. `None` keeps the source's.
    #[serde(default)]
    pub extension: Option<String>,
}

pub struct CommandEngine {
    program: PathBuf,
    args: Vec<String>,
    out_dir: PathBuf,
    extension: Option<String>,
    transformed: usize,
}

impl CommandEngine {
    /// Resolve the program and prepare the output directory.
    pub fn new(spec: &CommandSpec) -> Result<Self> {
        let program = resolve_program(&spec.command)?;
        std::fs::create_dir_all(&spec.out_dir)?;

        debug!(
            program = %program.display(),
            out_dir = %spec.out_dir.display(),
            "command engine ready"
        );

        Ok(Self {
            program,
            args: spec.args.clone(),
            out_dir: spec.out_dir.clone(),
            extension: spec.extension.clone(),
            transformed: 0,
        })
    }

    /// Jobs this engine has completed.
    pub fn transformed(&self) -> usize {
        self.transformed
    }

    fn target_for(&self, source: &Path) -> PathBuf {
        target_path(&self.out_dir, self.extension.as_deref(), source)
    }
}

impl CommandSpec {
    /// Output path the engine writes for `source`.
    pub fn target_for(&self, source: &Path) -> PathBuf {
        target_path(&self.out_dir, self.extension.as_deref(), source)
    }

    /// Fail if two jobs would write the same output file.
    ///
    /// Run before the pool starts; concurrent workers would otherwise
    /// overwrite each other's output.
    pub fn check_targets<'a>(&self, jobs: impl IntoIterator<Item = &'a Job>) -> Result<()> {
        let mut claimed: HashMap<PathBuf, &str> = HashMap::new();
        for job in jobs {
            let target = self.target_for(Path::new(&job.source));
            if let Some(other) = claimed.insert(target.clone(), &job.source) {
                return Err(Error::Config(format!(
                    "{other} and {} both map to {}",
                    job.source,
                    target.display()
                )));
            }
        }
        Ok(())
    }
}

impl TransformEngine for CommandEngine {
    fn transform(&mut self, job: &Job) -> Result<String> {
        let source = Path::new(&job.source);
        let content = std::fs::read(source)
            .map_err(|e| Error::transform(&job.source, format!("cannot read source: {e}")))?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                Error::transform(
                    &job.source,
                    format!("cannot spawn {}: {e}", self.program.display()),
                )
            })?;

        // Feed stdin from a separate thread so a full stdout pipe cannot deadlock us.
        let stdin = child.stdin.take();
        let feeder = std::thread::spawn(move || -> std::io::Result<()> {
            if let Some(mut stdin) = stdin {
                stdin.write_all(&content)?;
            }
            Ok(())
        });

        let waited = child.wait_with_output();
        let fed = feeder
            .join()
            .map_err(|_| Error::transform(&job.source, "stdin writer panicked"))?;
        let output = waited.map_err(|e| {
            Error::transform(
                &job.source,
                format!("cannot wait for {}: {e}", self.program.display()),
            )
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::transform(
                &job.source,
                format!(
                    "{} exited with status {}: {}",
                    self.program.display(),
                    output.status.code().unwrap_or(-1),
                    stderr.trim()
                ),
            ));
        }
        // A program may exit early without reading all input; only report
        // the broken pipe if it also failed.
        match fed {
            Err(e) if e.kind() != std::io::ErrorKind::BrokenPipe => {
                return Err(Error::transform(&job.source, format!("cannot write stdin: {e}")));
            }
            _ => {}
        }

        let target = self.target_for(source);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&target, &output.stdout)?;

        self.transformed += 1;
        Ok(target.display().to_string())
    }
}

/// Mirror `source` under `out_dir`.
///
/// Root, prefix and `..` components are dropped so outputs stay inside
/// `out_dir`; distinct sources can therefore share a target, which
/// [`CommandSpec::check_targets`] rejects.
fn target_path(out_dir: &Path, extension: Option<&str>, source: &Path) -> PathBuf {
    let relative: PathBuf = source
        .components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .collect();
    let target = out_dir.join(relative);
    match extension {
        Some(ext) => target.with_extension(ext),
        None => target,
    }
}

/// Find the program once, at engine construction.
///
/// Paths with a directory part resolve against the process CWD; bare names
/// are searched on `PATH`.
fn resolve_program(command: &Path) -> Result<PathBuf> {
    if command.components().count() > 1 {
        let abs = if command.is_relative() {
            std::env::current_dir()?.join(command)
        } else {
            command.to_path_buf()
        };
        return if abs.is_file() {
            Ok(abs)
        } else {
            Err(Error::Engine(format!("program not found: {}", abs.display())))
        };
    }

    let path = std::env::var_os("PATH").unwrap_or_default();
    std::env::split_paths(&path)
        .map(|dir| dir.join(command))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| Error::Engine(format!("{} not found on PATH", command.display())))
}
