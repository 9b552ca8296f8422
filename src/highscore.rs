use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use log::{debug, info, warn};

/// Where the high score lives between runs.
pub trait ScoreStore {
    /// Stored high score, or 0 when there is none or it can't be read.
    fn load(&self) -> u32;

    /// Best effort; failures are logged, never returned.
    fn save(&mut self, score: u32);
}

/// Plain text file holding the score as a decimal number.
#[derive(Debug, Clone)]
pub struct FileScoreStore {
    path: PathBuf,
}

impl FileScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileScoreStore { path: path.into() }
    }
}

impl ScoreStore for FileScoreStore {
    fn load(&self) -> u32 {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("no high score file at {}", self.path.display());
                return 0;
            }
            Err(e) => {
                warn!("error reading high score from {}: {}", self.path.display(), e);
                return 0;
            }
        };

        match contents.trim().parse::<u32>() {
            Ok(score) => {
                info!("loaded high score {} from {}", score, self.path.display());
                score
            }
            Err(e) => {
                warn!("ignoring malformed high score {:?}: {}", contents, e);
                0
            }
        }
    }

    fn save(&mut self, score: u32) {
        match fs::write(&self.path, score.to_string()) {
            Ok(()) => info!("saved high score {} to {}", score, self.path.display()),
            Err(e) => warn!("error saving high score to {}: {}", self.path.display(), e),
        }
    }
}

/// Keeps the score in memory and remembers every write.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct MemoryScoreStore {
    score: u32,
    saves: Vec<u32>,
}

#[cfg(test)]
impl MemoryScoreStore {
    pub fn new(score: u32) -> Self {
        MemoryScoreStore { score, saves: vec![] }
    }

    pub fn saves(&self) -> &[u32] {
        &self.saves
    }
}

#[cfg(test)]
impl ScoreStore for MemoryScoreStore {
    fn load(&self) -> u32 {
        self.score
    }

    fn save(&mut self, score: u32) {
        self.score = score;
        self.saves.push(score);
    }
}
