//! Archive/extract primitive
//!
//! Shells out to `tar` for gzip-compressed tarballs of a directory's
//! children. The child's diagnostic output is captured into an anonymous
//! temp file (never a pipe, so a chatty child cannot stall us) and folded
//! into the error when it exits non-zero.

use modelzoo_core::config::ArchiveConfig;
use std::ffi::OsString;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use thiserror::Error;

const PUMP_BUFFER_BYTES: usize = 64 * 1024;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program} failed ({status}): {diagnostics}")]
    Exit {
        program: String,
        status: ExitStatus,
        diagnostics: String,
    },

    /// The destination stream rejected archive bytes
    #[error("writing archive stream failed: {0}")]
    Sink(#[source] io::Error),

    /// Moving bytes between us and the child failed
    #[error("archive pipe failed: {0}")]
    Pipe(#[source] io::Error),

    #[error("archive {} does not exist", .0.display())]
    MissingSource(PathBuf),
}

/// Wrapper around the external archiver
#[derive(Debug, Clone)]
pub struct Archiver {
    program: OsString,
}

impl Default for Archiver {
    fn default() -> Self {
        Self::from_config(&ArchiveConfig::default())
    }
}

impl Archiver {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn from_config(config: &ArchiveConfig) -> Self {
        Self::new(&config.program)
    }

    /// `tar czf <dest> -C <dir> .`
    pub fn compress_to_file(&self, dir: &Path, dest: &Path) -> Result<(), ArchiveError> {
        let mut cmd = self.command();
        cmd.arg("czf").arg(dest).arg("-C").arg(dir).arg(".");
        self.run(cmd, Stdio::null(), false)
    }

    /// `tar czf - -C <dir> .` with stdout pumped into `sink`
    ///
    /// Returns the number of archive bytes written. If `sink` fails the
    /// child is killed and the sink's error is returned as `Sink`.
    pub fn compress_to_writer<W: Write + ?Sized>(
        &self,
        dir: &Path,
        sink: &mut W,
    ) -> Result<u64, ArchiveError> {
        let diagnostics = capture_file()?;
        let mut cmd = self.command();
        cmd.arg("czf")
            .arg("-")
            .arg("-C")
            .arg(dir)
            .arg(".")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(stdio_for(&diagnostics)?);
        let mut child = self.spawn(&mut cmd)?;

        let Some(mut stdout) = child.stdout.take() else {
            abandon(&mut child);
            return Err(ArchiveError::Pipe(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "archiver stdout was not captured",
            )));
        };

        let mut buf = vec![0u8; PUMP_BUFFER_BYTES];
        let mut total: u64 = 0;
        loop {
            let n = match stdout.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    drop(stdout);
                    abandon(&mut child);
                    return Err(ArchiveError::Pipe(e));
                }
            };
            if let Err(e) = sink.write_all(&buf[..n]) {
                drop(stdout);
                abandon(&mut child);
                return Err(ArchiveError::Sink(e));
            }
            total += n as u64;
        }
        drop(stdout);

        let status = child.wait().map_err(ArchiveError::Pipe)?;
        self.check(status, diagnostics)?;
        sink.flush().map_err(ArchiveError::Sink)?;
        Ok(total)
    }

    /// `tar xzf <archive> -C <dir>`
    pub fn extract_file(&self, archive: &Path, dir: &Path) -> Result<(), ArchiveError> {
        if !archive.is_file() {
            return Err(ArchiveError::MissingSource(archive.to_path_buf()));
        }
        let mut cmd = self.command();
        cmd.arg("xzf").arg(archive).arg("-C").arg(dir);
        self.run(cmd, Stdio::null(), true)
    }

    /// `tar xzf - -C <dir>` fed from `bytes`
    pub fn extract_bytes(&self, bytes: &[u8], dir: &Path) -> Result<(), ArchiveError> {
        let diagnostics = capture_file()?;
        let mut cmd = self.command();
        cmd.arg("xzf")
            .arg("-")
            .arg("-C")
            .arg(dir)
            .stdin(Stdio::piped())
            .stdout(stdio_for(&diagnostics)?)
            .stderr(stdio_for(&diagnostics)?);
        let mut child = self.spawn(&mut cmd)?;

        // A write error here usually means the child quit early on bad
        // input; its exit status and diagnostics are the better report.
        let fed = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(bytes),
            None => Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "archiver stdin was not captured",
            )),
        };

        let status = child.wait().map_err(ArchiveError::Pipe)?;
        self.check(status, diagnostics)?;
        fed.map_err(ArchiveError::Pipe)
    }

    fn command(&self) -> Command {
        Command::new(&self.program)
    }

    fn program_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    fn spawn(&self, cmd: &mut Command) -> Result<Child, ArchiveError> {
        cmd.spawn().map_err(|source| ArchiveError::Spawn {
            program: self.program_name(),
            source,
        })
    }

    fn run(&self, mut cmd: Command, stdout: Stdio, combine: bool) -> Result<(), ArchiveError> {
        let diagnostics = capture_file()?;
        let stdout = if combine {
            stdio_for(&diagnostics)?
        } else {
            stdout
        };
        cmd.stdin(Stdio::null())
            .stdout(stdout)
            .stderr(stdio_for(&diagnostics)?);
        let mut child = self.spawn(&mut cmd)?;
        let status = child.wait().map_err(ArchiveError::Pipe)?;
        self.check(status, diagnostics)
    }

    fn check(&self, status: ExitStatus, diagnostics: File) -> Result<(), ArchiveError> {
        if status.success() {
            return Ok(());
        }
        Err(ArchiveError::Exit {
            program: self.program_name(),
            status,
            diagnostics: read_diagnostics(diagnostics),
        })
    }
}

fn capture_file() -> Result<File, ArchiveError> {
    tempfile::tempfile().map_err(ArchiveError::Pipe)
}

fn stdio_for(file: &File) -> Result<Stdio, ArchiveError> {
    Ok(Stdio::from(file.try_clone().map_err(ArchiveError::Pipe)?))
}

fn read_diagnostics(mut file: File) -> String {
    let mut raw = Vec::new();
    let read = file
        .seek(SeekFrom::Start(0))
        .and_then(|_| file.read_to_end(&mut raw));
    match read {
        Ok(_) => String::from_utf8_lossy(&raw).trim().to_string(),
        Err(e) => format!("<diagnostics unavailable: {}>", e),
    }
}

/// Kill and reap a child we are giving up on
fn abandon(child: &mut Child) {
    child.kill().ok();
    child.wait().ok();
}
