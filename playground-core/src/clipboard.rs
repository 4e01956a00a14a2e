//! Clipboard access with a fallback path
//!
//! The primary writer is the platform clipboard (via `arboard`). When that is
//! missing or fails, the text is piped into the platform's copy command.
//! Linux swaps the two: `arboard` serves the selection from this process, so
//! it vanishes on exit, while `wl-copy`, `xclip` and `xsel` keep serving it.

use async_trait::async_trait;
use std::io::Write;
use std::process::{Command, Stdio};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum ClipboardError {
    #[error("Clipboard unavailable: {0}")]
    Unavailable(String),
    #[error("Clipboard write failed: {0}")]
    Write(String),
}

/// Primary clipboard writer.
#[async_trait]
pub trait ClipboardWriter: Send + Sync {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Legacy copy mechanism used when the primary writer fails.
pub trait FallbackCopier: Send + Sync {
    /// Returns whether the text ended up on the clipboard.
    fn copy(&self, text: &str) -> bool;
}

/// Platform clipboard through `arboard`.
///
/// On X11 and Wayland the selection is served by this process, so it only
/// outlives the process if a clipboard manager picks it up.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl SystemClipboard {
    fn set_text(text: &str) -> Result<(), ClipboardError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
        clipboard
            .set_text(text)
            .map_err(|e| ClipboardError::Write(e.to_string()))
    }
}

#[async_trait]
impl ClipboardWriter for SystemClipboard {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let text = text.to_string();
        tokio::task::spawn_blocking(move || Self::set_text(&text))
            .await
            .map_err(|e| ClipboardError::Write(e.to_string()))?
    }
}

impl FallbackCopier for SystemClipboard {
    fn copy(&self, text: &str) -> bool {
        match Self::set_text(text) {
            Ok(()) => true,
            Err(e) => {
                debug!("arboard copy failed: {e}");
                false
            }
        }
    }
}

/// Copies by piping the text into an external command, trying each
/// candidate in order.
#[derive(Debug, Clone)]
pub struct CommandCopier {
    candidates: Vec<(String, Vec<String>)>,
}

impl Default for CommandCopier {
    fn default() -> Self {
        let candidates: &[(&str, &[&str])] = if cfg!(target_os = "macos") {
            &[("pbcopy", &[])]
        } else if cfg!(target_os = "windows") {
            &[("clip", &[])]
        } else {
            &[
                ("wl-copy", &[]),
                ("xclip", &["-selection", "clipboard"]),
                ("xsel", &["--clipboard", "--input"]),
            ]
        };

        Self {
            candidates: candidates
                .iter()
                .map(|(program, args)| {
                    (
                        program.to_string(),
                        args.iter().map(|a| a.to_string()).collect(),
                    )
                })
                .collect(),
        }
    }
}

impl CommandCopier {
    /// A copier that only tries one command.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            candidates: vec![(program.into(), args)],
        }
    }
}

impl CommandCopier {
    fn run(&self, text: &str) -> Result<(), ClipboardError> {
        for (program, args) in &self.candidates {
            match run_copy_command(program, args, text) {
                Ok(()) => {
                    debug!("Copied to clipboard with {program}");
                    return Ok(());
                }
                Err(e) => debug!("Copy command {program} failed: {e}"),
            }
        }
        Err(ClipboardError::Unavailable(
            "no copy command succeeded".to_string(),
        ))
    }
}

impl FallbackCopier for CommandCopier {
    fn copy(&self, text: &str) -> bool {
        self.run(text).is_ok()
    }
}

#[async_trait]
impl ClipboardWriter for CommandCopier {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let copier = self.clone();
        let text = text.to_string();
        tokio::task::spawn_blocking(move || copier.run(&text))
            .await
            .map_err(|e| ClipboardError::Write(e.to_string()))?
    }
}

fn run_copy_command(program: &str, args: &[String], text: &str) -> std::io::Result<()> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    if let Some(mut stdin) = child.stdin.take() {
        if let Err(e) = stdin.write_all(text.as_bytes()) {
            let _ = child.kill();
            let _ = child.wait();
            return Err(e);
        }
    }

    let status = child.wait()?;
    if status.success() {
        Ok(())
    } else {
        Err(std::io::Error::other(format!("{program} exited with {status}")))
    }
}

/// Clipboard with an optional primary writer and an optional fallback.
#[derive(Clone, Default)]
pub struct Clipboard {
    primary: Option<Arc<dyn ClipboardWriter>>,
    fallback: Option<Arc<dyn FallbackCopier>>,
}

impl Clipboard {
    pub fn new(
        primary: Option<Arc<dyn ClipboardWriter>>,
        fallback: Option<Arc<dyn FallbackCopier>>,
    ) -> Self {
        Self { primary, fallback }
    }

    /// `arboard` first and copy commands second, except on Linux where the
    /// copy commands go first.
    pub fn system() -> Self {
        if cfg!(target_os = "linux") {
            Self::new(
                Some(Arc::new(CommandCopier::default())),
                Some(Arc::new(SystemClipboard)),
            )
        } else {
            Self::new(
                Some(Arc::new(SystemClipboard)),
                Some(Arc::new(CommandCopier::default())),
            )
        }
    }

    /// Copy `text`, returning whether either mechanism succeeded. Empty text
    /// is never copied.
    pub async fn copy_text(&self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }

        if let Some(primary) = &self.primary {
            match primary.write_text(text).await {
                Ok(()) => return true,
                Err(e) => warn!("Clipboard write failed, trying fallback: {e}"),
            }
        }

        match &self.fallback {
            Some(fallback) => fallback.copy(text),
            None => false,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{FakeCopier, FakeWriter};
    use super::*;

    #[tokio::test]
    async fn primary_writer_is_used_first() {
        let writer = Arc::new(FakeWriter::default());
        let copier = Arc::new(FakeCopier::new(true));
        let clipboard = Clipboard::new(Some(writer.clone()), Some(copier.clone()));

        assert!(clipboard.copy_text("hello").await);
        assert_eq!(writer.written(), vec!["hello".to_string()]);
        assert_eq!(copier.call_count(), 0);
    }

    #[tokio::test]
    async fn falls_back_when_primary_fails() {
        let copier = Arc::new(FakeCopier::new(true));
        let clipboard = Clipboard::new(Some(Arc::new(FakeWriter::failing())), Some(copier.clone()));

        assert!(clipboard.copy_text("hello").await);
        assert_eq!(copier.call_count(), 1);
    }

    #[tokio::test]
    async fn falls_back_when_primary_missing() {
        let copier = Arc::new(FakeCopier::new(true));
        let clipboard = Clipboard::new(None, Some(copier.clone()));

        assert!(clipboard.copy_text("hello").await);
        assert_eq!(copier.call_count(), 1);
    }

    #[tokio::test]
    async fn reports_failure_when_both_fail() {
        let clipboard = Clipboard::new(
            Some(Arc::new(FakeWriter::failing())),
            Some(Arc::new(FakeCopier::new(false))),
        );
        assert!(!clipboard.copy_text("hello").await);
        assert!(!Clipboard::default().copy_text("hello").await);
    }

    #[tokio::test]
    async fn empty_text_is_not_copied() {
        let writer = Arc::new(FakeWriter::default());
        let clipboard = Clipboard::new(Some(writer.clone()), None);
        assert!(!clipboard.copy_text("").await);
        assert!(writer.written().is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn command_copier_as_primary_writer() {
        assert!(CommandCopier::new("cat", vec![]).write_text("hello").await.is_ok());
        assert!(matches!(
            CommandCopier::new("false", vec![]).write_text("hello").await,
            Err(ClipboardError::Unavailable(_))
        ));

        let copier = Arc::new(FakeCopier::new(true));
        let clipboard = Clipboard::new(
            Some(Arc::new(CommandCopier::new("false", vec![]))),
            Some(copier.clone()),
        );
        assert!(clipboard.copy_text("hello").await);
        assert_eq!(copier.call_count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn command_copier_fails_when_command_ignores_input() {
        let text = "x".repeat(1 << 20);
        assert!(!CommandCopier::new("true", vec![]).copy(&text));
    }

    #[cfg(unix)]
    #[test]
    fn command_copier_pipes_text() {
        assert!(CommandCopier::new("cat", vec![]).copy("hello"));
        assert!(!CommandCopier::new("false", vec![]).copy("hello"));
        assert!(!CommandCopier::new("definitely-not-a-copy-command", vec![]).copy("hello"));
    }
}
