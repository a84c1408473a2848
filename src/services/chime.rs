//! Audible alert played when a timer finishes

use std::{
    io::Write,
    path::Path,
    process::Stdio,
    time::Duration,
};

use tokio::{process::Command, runtime::Handle, time::sleep};
use tracing::{debug, warn};

use super::AlertSink;

/// Players tried in order; the first whose sound file exists wins
const PLAYER_CANDIDATES: &[(&str, &str)] = &[
    ("paplay", "/usr/share/sounds/freedesktop/stereo/complete.oga"),
    ("pw-play", "/usr/share/sounds/freedesktop/stereo/complete.oga"),
    ("aplay", "/usr/share/sounds/sound-icons/guitar-11.wav"),
    ("aplay", "/usr/share/sounds/generic.wav"),
];

/// Offsets of the beeps making up one chime
const CHIME_PATTERN_MS: [u64; 4] = [0, 220, 440, 660];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChimeBackend {
    /// External sound player on a sound file
    Player { program: String, sound_file: String },
    /// Terminal bell on stderr
    Bell,
    Silent,
}

#[derive(Debug, Clone)]
pub struct Chime {
    backend: ChimeBackend,
}

impl Chime {
    /// Pick a backend for this host. `enabled = false` always yields a silent chime.
    pub fn detect(enabled: bool) -> Self {
        if !enabled {
            return Self::with_backend(ChimeBackend::Silent);
        }
        let backend = PLAYER_CANDIDATES
            .iter()
            .find(|(_, sound_file)| Path::new(sound_file).exists())
            .map(|(program, sound_file)| ChimeBackend::Player {
                program: program.to_string(),
                sound_file: sound_file.to_string(),
            })
            .unwrap_or(ChimeBackend::Bell);
        debug!(?backend, "Chime backend selected");
        Self::with_backend(backend)
    }

    pub fn with_backend(backend: ChimeBackend) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &ChimeBackend {
        &self.backend
    }
}

impl ChimeBackend {
    /// Sound one beep. Returns `false` when the rest of the chime should be dropped.
    fn strike(&self) -> bool {
        match self {
            ChimeBackend::Player {
                program,
                sound_file,
            } => {
                let child = Command::new(program)
                    .arg(sound_file)
                    .stdin(Stdio::null())
                    .stdout(Stdio::null())
                    .stderr(Stdio::null())
                    .spawn();
                match child {
                    Ok(mut child) => {
                        let program = program.clone();
                        tokio::spawn(async move {
                            match child.wait().await {
                                Ok(status) if status.success() => {}
                                Ok(status) => debug!("{} exited with {}", program, status),
                                Err(e) => debug!("Failed to wait for {}: {}", program, e),
                            }
                        });
                        true
                    }
                    Err(e) => {
                        warn!("Failed to execute {}: {}", program, e);
                        false
                    }
                }
            }
            ChimeBackend::Bell => {
                let mut stderr = std::io::stderr();
                stderr.write_all(b"\x07").and_then(|_| stderr.flush()).is_ok()
            }
            ChimeBackend::Silent => false,
        }
    }
}

/// Call `strike` at every offset of the chime pattern, stopping at the first failure
async fn walk_pattern(mut strike: impl FnMut() -> bool) {
    let mut elapsed = 0;
    for offset in CHIME_PATTERN_MS {
        sleep(Duration::from_millis(offset - elapsed)).await;
        elapsed = offset;
        if !strike() {
            return;
        }
    }
}

impl AlertSink for Chime {
    fn play_alert(&self) {
        if self.backend == ChimeBackend::Silent {
            debug!("Chime is silent, skipping alert");
            return;
        }
        let Ok(runtime) = Handle::try_current() else {
            debug!("No runtime available, skipping alert");
            return;
        };

        let backend = self.backend.clone();
        runtime.spawn(async move { walk_pattern(|| backend.strike()).await });
    }
}
