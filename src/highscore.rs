use std::{fs, io, path::{Path, PathBuf}};

use log::{info, warn};
use thiserror::Error;

pub const DEFAULT_HIGH_SCORE_FILE: &str = "highscore.txt";

#[derive(Debug, Error)]
pub enum HighScoreError {
    #[error("could not save high score to {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
}

/// Plain text file holding a single non-negative integer.
pub struct HighScoreFile {
    path: PathBuf,
}

impl HighScoreFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        HighScoreFile { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file is created holding 0. Anything unreadable counts as no
    /// previous high score.
    pub fn load(&self) -> u32 {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("No high score file at {}, creating it", self.path.display());
                if let Err(e) = self.save(0) {
                    warn!("{}", e);
                }
                return 0;
            }
            Err(e) => {
                warn!("Error reading high score from {}: {}", self.path.display(), e);
                return 0;
            }
        };

        match contents.trim().parse() {
            Ok(score) => {
                info!("Loaded high score {} from {}", score, self.path.display());
                score
            }
            Err(e) => {
                warn!("Ignoring malformed high score {:?} in {}: {}", contents.trim(), self.path.display(), e);
                0
            }
        }
    }

    pub fn save(&self, score: u32) -> Result<(), HighScoreError> {
        fs::write(&self.path, score.to_string()).map_err(|source| HighScoreError::Write {
            path: self.path.clone(),
            source,
        })
    }
}
