//! Text search over the scanned corpus
//!
//! Used by the analyzer when structural information is not enough: to
//! look for a quoted service name anywhere, a template `<#include>`, or to
//! find the exact position of a declaration inside its file. File
//! contents are read at most once per run and searched as raw bytes, so
//! offsets stay exact whatever the file's encoding.

mod lines;

pub use lines::LineIndex;

use crate::config::glob_match;
use crate::error::{Error, Result};
use crate::model::CorpusFile;
use regex::bytes::Regex;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{trace, warn};

/// One occurrence of a search term
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchMatch {
    pub path: PathBuf,
    /// Byte offset into the file contents
    pub offset: usize,
    /// Byte length of the match
    pub length: usize,
    /// 1-based
    pub line: usize,
    /// 1-based byte column
    pub column: usize,
}

struct CachedFile {
    contents: Vec<u8>,
    lines: LineIndex,
}

/// Literal and regex search over corpus files
pub struct TextSearch<'a> {
    corpus: &'a [CorpusFile],
    max_file_size: u64,
    cache: RefCell<HashMap<PathBuf, Option<Rc<CachedFile>>>>,
}

impl<'a> TextSearch<'a> {
    pub fn new(corpus: &'a [CorpusFile], max_file_size: u64) -> Self {
        Self {
            corpus,
            max_file_size,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// All occurrences of `needle` in corpus files matching any of `globs`
    pub fn search_literal(&self, needle: &str, globs: &[String]) -> Vec<SearchMatch> {
        self.files_matching(globs)
            .flat_map(|file| self.literal_in(&file.path, needle))
            .collect()
    }

    /// All matches of `pattern` in corpus files matching any of `globs`
    pub fn search_regex(&self, pattern: &str, globs: &[String]) -> Result<Vec<SearchMatch>> {
        let regex = compile(pattern)?;
        Ok(self
            .files_matching(globs)
            .flat_map(|file| self.regex_in(&file.path, &regex))
            .collect())
    }

    pub fn search_literal_in_file(&self, needle: &str, path: &Path) -> Vec<SearchMatch> {
        self.literal_in(path, needle)
    }

    pub fn search_regex_in_file(&self, pattern: &str, path: &Path) -> Result<Vec<SearchMatch>> {
        let regex = compile(pattern)?;
        Ok(self.regex_in(path, &regex))
    }

    fn files_matching<'s>(&'s self, globs: &'s [String]) -> impl Iterator<Item = &'a CorpusFile> + 's {
        let corpus: &'a [CorpusFile] = self.corpus;
        corpus
            .iter()
            .filter(move |file| globs.iter().any(|glob| glob_match(glob, &file.relative)))
    }

    fn literal_in(&self, path: &Path, needle: &str) -> Vec<SearchMatch> {
        if needle.is_empty() {
            return Vec::new();
        }
        // An escaped literal always compiles
        match compile(&regex::escape(needle)) {
            Ok(regex) => self.regex_in(path, &regex),
            Err(e) => {
                warn!("{}", e);
                Vec::new()
            }
        }
    }

    fn regex_in(&self, path: &Path, regex: &Regex) -> Vec<SearchMatch> {
        let Some(file) = self.load(path) else {
            return Vec::new();
        };
        regex
            .find_iter(&file.contents)
            .map(|m| located(path, &file.lines, m.start(), m.len()))
            .collect()
    }

    /// Read a file once. Unreadable and oversized files yield no matches.
    fn load(&self, path: &Path) -> Option<Rc<CachedFile>> {
        if let Some(cached) = self.cache.borrow().get(path) {
            return cached.clone();
        }

        let loaded = self.read(path).map(Rc::new);
        self.cache.borrow_mut().insert(path.to_path_buf(), loaded.clone());
        loaded
    }

    fn read(&self, path: &Path) -> Option<CachedFile> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > self.max_file_size => {
                warn!(
                    "Not searching {}: {} bytes exceeds the {} byte limit",
                    path.display(),
                    meta.len(),
                    self.max_file_size
                );
                return None;
            }
            Ok(_) => {}
            Err(e) => {
                warn!("Not searching {}: {}", path.display(), e);
                return None;
            }
        }

        match std::fs::read(path) {
            Ok(bytes) => {
                trace!("Loaded {} for search", path.display());
                let lines = LineIndex::new(&bytes);
                Some(CachedFile { contents: bytes, lines })
            }
            Err(e) => {
                warn!("Not searching {}: {}", path.display(), e);
                None
            }
        }
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| Error::Pattern {
        pattern: pattern.to_string(),
        source,
    })
}

fn located(path: &Path, lines: &LineIndex, offset: usize, length: usize) -> SearchMatch {
    SearchMatch {
        path: path.to_path_buf(),
        offset,
        length,
        line: lines.line(offset),
        column: lines.column(offset),
    }
}
