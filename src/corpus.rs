use std::io::BufRead;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{EvalError, Result};

/// Ordered, immutable sentences read from one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentenceSet {
    path: PathBuf,
    lines: Vec<String>,
}

impl SentenceSet {
    pub fn new(path: impl Into<PathBuf>, lines: Vec<String>) -> Self {
        Self {
            path: path.into(),
            lines,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Join the sentences into one newline-separated document
    pub fn as_document(&self) -> String {
        self.lines.join("\n")
    }
}

/// Independent reference translations, aligned by line with one source set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceGroup {
    sets: Vec<SentenceSet>,
}

impl ReferenceGroup {
    pub fn new(sets: Vec<SentenceSet>) -> Self {
        Self { sets }
    }

    pub fn sets(&self) -> &[SentenceSet] {
        &self.sets
    }

    /// Reference streams as plain line slices, the shape the metrics take
    pub fn streams(&self) -> Vec<&[String]> {
        self.sets.iter().map(|set| set.lines()).collect()
    }

    /// Number of aligned lines (length of the shortest reference)
    pub fn line_count(&self) -> usize {
        self.sets.iter().map(SentenceSet::len).min().unwrap_or(0)
    }
}

/// Result of reading one or more files: a lone source set or a reference group
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Corpus {
    Single(SentenceSet),
    Group(ReferenceGroup),
}

/// Read exactly `line_count` lines from `path`, stripping line terminators
pub fn read_sentences<P: AsRef<Path>>(path: P, line_count: usize) -> Result<SentenceSet> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(EvalError::FileNotFound(path.display().to_string()));
    }

    let file = std::fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);

    let mut lines = Vec::with_capacity(line_count);
    for line in reader.lines().take(line_count) {
        lines.push(line?);
    }

    if lines.len() < line_count {
        return Err(EvalError::ShortInput {
            path: path.display().to_string(),
            expected: line_count,
            found: lines.len(),
        });
    }

    debug!("Read {} lines from {}", lines.len(), path.display());
    Ok(SentenceSet::new(path, lines))
}

/// Read one sentence set per reference file
pub fn read_references<P: AsRef<Path>>(paths: &[P], line_count: usize) -> Result<ReferenceGroup> {
    let sets = paths
        .iter()
        .map(|path| read_sentences(path, line_count))
        .collect::<Result<Vec<_>>>()?;

    Ok(ReferenceGroup::new(sets))
}

/// Read a single file as a source set, or several files as a reference group
pub fn read_corpus<P: AsRef<Path>>(paths: &[P], line_count: usize) -> Result<Corpus> {
    match paths {
        [] => Err(EvalError::Config("No corpus files given".to_string())),
        [single] => Ok(Corpus::Single(read_sentences(single, line_count)?)),
        many => Ok(Corpus::Group(read_references(many, line_count)?)),
    }
}
