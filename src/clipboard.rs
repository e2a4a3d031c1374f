use std::io::Write;
use std::process::{Command, Stdio};

use anyhow::{anyhow, bail, Result};

/// Write-only access to the system clipboard. Best effort; callers
/// surface a warning on failure and carry on.
pub trait Clipboard {
    fn copy(&mut self, text: &str) -> Result<()>;
}

/// Clipboard backed by whichever helper binary the platform provides.
pub struct OsClipboard;

impl OsClipboard {
    fn candidates() -> &'static [(&'static str, &'static [&'static str])] {
        &[
            ("pbcopy", &[]),
            ("wl-copy", &[]),
            ("xclip", &["-selection", "clipboard"]),
        ]
    }

    fn pipe_to(program: &str, args: &[&str], text: &str) -> Result<()> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        child
            .stdin
            .as_mut()
            .ok_or_else(|| anyhow!("no stdin for {}", program))?
            .write_all(text.as_bytes())?;

        let status = child.wait()?;
        if !status.success() {
            bail!("{} exited with {}", program, status);
        }
        Ok(())
    }
}

impl Clipboard for OsClipboard {
    fn copy(&mut self, text: &str) -> Result<()> {
        for (program, args) in Self::candidates() {
            if Self::pipe_to(program, args, text).is_ok() {
                return Ok(());
            }
        }
        bail!("no clipboard helper found (tried pbcopy, wl-copy, xclip)")
    }
}
