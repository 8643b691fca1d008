//! On-disk cache of service answers, keyed by question text.
//!
//! One JSON file per cache directory records the endpoint the answers came
//! from. Pointing the cache at a different endpoint discards everything it
//! holds, so answers from two deployments never mix.

use crate::config;
use crate::error::{QaError, Result};
use crate::validator::Answer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheFile {
    endpoint: String,
    answers: BTreeMap<String, Answer>,
}

/// Cached answers for a single endpoint.
pub struct AnswerCache {
    /// Directory holding `answers.json`.
    pub cache_dir: PathBuf,
    /// If true, misses are errors instead of falling through to the network.
    pub offline: bool,
    endpoint: String,
    answers: BTreeMap<String, Answer>,
}

impl AnswerCache {
    /// Open (or create) the cache for `endpoint`.
    ///
    /// If `cache_dir` is `None`, uses the platform-appropriate default cache
    /// directory. A corrupt cache file is removed and the cache starts empty.
    pub fn new(cache_dir: Option<PathBuf>, offline: bool, endpoint: &str) -> Result<Self> {
        let dir = cache_dir.unwrap_or_else(config::default_cache_dir);
        fs::create_dir_all(&dir)?;
        let mut cache = Self {
            cache_dir: dir,
            offline,
            endpoint: endpoint.to_string(),
            answers: BTreeMap::new(),
        };
        cache.answers = cache.read_file()?;
        debug!(
            entries = cache.answers.len(),
            dir = %cache.cache_dir.display(),
            "opened answer cache"
        );
        Ok(cache)
    }

    /// Path of the backing JSON file.
    pub fn path(&self) -> PathBuf {
        self.cache_dir.join(config::ANSWER_CACHE_FILE)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    /// Cached answer for `question`, if any. Keys ignore surrounding whitespace.
    pub fn get(&self, question: &str) -> Option<&Answer> {
        self.answers.get(question.trim())
    }

    /// Like [`get`](Self::get), but a miss in offline mode is
    /// [`QaError::Offline`].
    pub fn lookup(&self, question: &str) -> Result<Option<Answer>> {
        match self.get(question) {
            Some(answer) => Ok(Some(answer.clone())),
            None if self.offline => Err(QaError::Offline(format!(
                "no cached answer for {:?} and offline mode is enabled",
                question.trim()
            ))),
            None => Ok(None),
        }
    }

    /// Store an answer and persist the cache.
    pub fn insert(&mut self, question: &str, answer: Answer) -> Result<()> {
        self.answers.insert(question.trim().to_string(), answer);
        self.write_file()
    }

    /// Drop every cached answer, on disk too.
    pub fn clear(&mut self) -> Result<()> {
        self.answers.clear();
        let path = self.path();
        if path.exists() {
            fs::remove_file(&path)?;
        }
        info!(dir = %self.cache_dir.display(), "answer cache cleared");
        Ok(())
    }

    fn read_file(&self) -> Result<BTreeMap<String, Answer>> {
        let path = self.path();
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = fs::read_to_string(&path)?;
        match serde_json::from_str::<CacheFile>(&contents) {
            Ok(file) if file.endpoint == self.endpoint => Ok(file.answers),
            Ok(file) => {
                info!(
                    cached = %file.endpoint,
                    current = %self.endpoint,
                    "endpoint changed; discarding cached answers"
                );
                fs::remove_file(&path)?;
                Ok(BTreeMap::new())
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "corrupt answer cache; removing");
                fs::remove_file(&path)?;
                Ok(BTreeMap::new())
            }
        }
    }

    /// Write to a temp file first and rename on success, so an interrupted
    /// write never leaves a truncated cache behind.
    fn write_file(&self) -> Result<()> {
        let file = CacheFile {
            endpoint: self.endpoint.clone(),
            answers: self.answers.clone(),
        };
        let path = self.path();
        let tmp = tmp_path(&path);
        let result = (|| -> Result<()> {
            fs::write(&tmp, serde_json::to_vec_pretty(&file)?)?;
            fs::rename(&tmp, &path)?;
            Ok(())
        })();
        if result.is_err() {
            let _ = fs::remove_file(&tmp);
        }
        result
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    path.with_extension(format!(
        "{}.tmp",
        path.extension().and_then(|e| e.to_str()).unwrap_or("")
    ))
}
