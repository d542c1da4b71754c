//! mpv playback backend.
//!
//! One `mpv --no-video` child per play. Stopping kills the child and reaps it
//! on a background task so the event loop never waits on process exit. A
//! child that exits by itself is noticed by `is_running`.

use std::io;
use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use podcast_proto::platform;
use podcast_proto::player::MediaBackend;

pub struct MpvBackend {
    binary: PathBuf,
    stderr_log: PathBuf,
    child: Option<Child>,
}

impl MpvBackend {
    pub fn new(binary: PathBuf) -> Self {
        Self {
            binary,
            stderr_log: platform::data_dir().join("mpv-stderr.log"),
            child: None,
        }
    }

    fn spawn(&self, url: &str) -> io::Result<Child> {
        let stderr_file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.stderr_log)?;

        let child = Command::new(&self.binary)
            .arg("--no-video")
            .arg("--quiet")
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(stderr_file)
            .kill_on_drop(true)
            .spawn()?;
        info!("mpv: spawned pid {:?} for {}", child.id(), url);
        Ok(child)
    }
}

impl MediaBackend for MpvBackend {
    fn play(&mut self, url: &str) -> io::Result<()> {
        self.stop();
        self.child = Some(self.spawn(url)?);
        Ok(())
    }

    fn stop(&mut self) {
        let Some(mut child) = self.child.take() else {
            return;
        };
        let pid = child.id();
        if let Err(e) = child.start_kill() {
            // Already exited on its own (end of episode, bad URL).
            debug!("mpv: kill pid {:?}: {}", pid, e);
        }
        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) => debug!("mpv: pid {:?} exited with {}", pid, status),
                Err(e) => warn!("mpv: reaping pid {:?} failed: {}", pid, e),
            }
        });
    }

    fn is_running(&mut self) -> bool {
        let Some(child) = self.child.as_mut() else {
            return false;
        };
        let pid = child.id();
        match child.try_wait() {
            Ok(None) => true,
            Ok(Some(status)) => {
                info!("mpv: pid {:?} exited on its own with {}", pid, status);
                self.child = None;
                false
            }
            Err(e) => {
                warn!("mpv: polling pid {:?} failed: {}", pid, e);
                true
            }
        }
    }
}

impl Drop for MpvBackend {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.start_kill();
        }
    }
}
