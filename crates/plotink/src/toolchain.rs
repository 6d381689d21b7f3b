//! External toolchain adapter: wrapper document, TeX compiler, rasterizer.
//!
//! Both tools run as subprocesses with the workspace as their working
//! directory (they emit auxiliary files relative to cwd). Tool stdout is
//! never echoed; stdout and stderr are captured together and surface only in
//! error values. Rendering toolchains are assumed deterministic, so nothing
//! here retries.

use crate::workspace::Workspace;
use crate::{Error, Result};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

const WAIT_POLL: Duration = Duration::from_millis(25);

/// Build the minimal standalone wrapper around a markup file.
///
/// `markup_file` is a bare file name: the compiler runs inside the workspace,
/// and a relative `\input` sidesteps TeX's trouble with absolute temp paths.
pub fn wrapper_document(markup_file: &str) -> String {
    format!(
        "\\documentclass{{standalone}}\n\
         \\usepackage{{pgfplots}}\n\
         \\usepgfplotslibrary{{groupplots}}\n\
         \\pgfplotsset{{compat=newest}}\n\
         \\begin{{document}}\n\
         \\input{{{markup_file}}}\n\
         \\end{{document}}\n"
    )
}

/// The pair of command-line tools that turn markup into pixels.
#[derive(Debug, Clone)]
pub struct Toolchain {
    /// TeX compiler binary, invoked with `--interaction=nonstopmode`.
    pub compiler: String,
    /// PDF rasterizer binary, `pdftoppm`-compatible CLI.
    pub rasterizer: String,
    /// Raster resolution. High enough that the perceptual hash is stable
    /// across sub-pixel layout differences.
    pub dpi: u32,
    /// Per-invocation deadline; an expired tool is killed.
    pub timeout: Duration,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            compiler: "pdflatex".to_string(),
            rasterizer: "pdftoppm".to_string(),
            dpi: 600,
            timeout: Duration::from_secs(120),
        }
    }
}

impl Toolchain {
    /// Compile the workspace's wrapper document to a PDF.
    pub fn compile_to_document(&self, workspace: &Workspace) -> Result<PathBuf> {
        let wrapper = workspace.wrapper_path();
        let wrapper_name = file_name(&wrapper);
        run_tool(
            &self.compiler,
            &["--interaction=nonstopmode", &wrapper_name],
            workspace.dir(),
            self.timeout,
        )?;
        Ok(workspace.document_path())
    }

    /// Rasterize the compiled document, producing the `-1.png` page file.
    pub fn rasterize(&self, workspace: &Workspace) -> Result<PathBuf> {
        let document = workspace.document_path();
        let document_name = file_name(&document);
        let prefix = file_name(workspace.base());
        let dpi = self.dpi.to_string();
        run_tool(
            &self.rasterizer,
            &["-rx", &dpi, "-ry", &dpi, "-png", &document_name, &prefix],
            workspace.dir(),
            self.timeout,
        )?;

        let raster = workspace.raster_path();
        if !raster.is_file() {
            return Err(Error::MissingArtifact { path: raster });
        }
        Ok(raster)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

/// Run one external tool to completion.
///
/// The child's stdout and stderr are drained concurrently (TeX logs overrun
/// pipe buffers easily) and returned combined, stdout first. Non-zero exit
/// is [`Error::Toolchain`]; blowing the deadline kills the child and is
/// [`Error::ToolchainTimeout`].
pub(crate) fn run_tool(
    program: &str,
    args: &[&str],
    cwd: &Path,
    timeout: Duration,
) -> Result<String> {
    tracing::debug!(tool = program, ?args, cwd = %cwd.display(), "invoking external tool");

    let mut child = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| Error::Io {
            action: "spawn",
            path: PathBuf::from(program),
            source,
        })?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let stdout_reader = std::thread::spawn(move || drain(stdout));
    let stderr_reader = std::thread::spawn(move || drain(stderr));

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if Instant::now() >= deadline {
                    let _ = child.kill();
                    let _ = child.wait();
                    let _ = stdout_reader.join();
                    let _ = stderr_reader.join();
                    tracing::warn!(tool = program, ?timeout, "external tool timed out");
                    return Err(Error::ToolchainTimeout {
                        tool: program.to_string(),
                        timeout,
                    });
                }
                std::thread::sleep(WAIT_POLL);
            }
            Err(source) => {
                let _ = child.kill();
                return Err(Error::Io {
                    action: "wait for",
                    path: PathBuf::from(program),
                    source,
                });
            }
        }
    };

    let mut output = stdout_reader.join().unwrap_or_default();
    output.push_str(&stderr_reader.join().unwrap_or_default());

    if status.success() {
        Ok(output)
    } else {
        Err(Error::Toolchain {
            tool: program.to_string(),
            status,
            output,
        })
    }
}

fn drain(pipe: Option<impl Read>) -> String {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        let _ = pipe.read_to_end(&mut buf);
    }
    String::from_utf8_lossy(&buf).into_owned()
}
