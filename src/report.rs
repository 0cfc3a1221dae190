//! Batch report types.
//!
//! Batch operations never stop at the first bad file. Each image is handled
//! on its own and the outcome is summarized as counts plus a list of
//! per-file failures, e.g. "Loaded annotations for 41 of 42 images".

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use crate::classes::ClassDef;

/// Which batch operation a report describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchKind {
    Load,
    Save,
}

/// Summary of a load or save over every image in the session.
#[derive(Clone, Debug, Serialize)]
pub struct BatchReport {
    pub kind: BatchKind,
    /// Images the batch visited.
    pub total: usize,
    /// Images that ended up with at least one box.
    pub annotated: usize,
    /// Records read or written.
    pub records: usize,
    /// Lines dropped while loading (malformed or unknown class).
    pub dropped: usize,
    /// Items that failed outright.
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn new(kind: BatchKind) -> Self {
        Self {
            kind,
            total: 0,
            annotated: 0,
            records: 0,
            dropped: 0,
            failures: Vec::new(),
        }
    }

    /// Records a failure for one file.
    pub fn fail(&mut self, path: impl Into<PathBuf>, message: impl Into<String>) {
        self.failures.push(BatchFailure {
            path: path.into(),
            message: message.into(),
        });
    }

    /// Returns true if every item succeeded.
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self.kind {
            BatchKind::Load => "Loaded",
            BatchKind::Save => "Saved",
        };
        writeln!(
            f,
            "{} annotations for {} of {} images ({} records)",
            verb, self.annotated, self.total, self.records
        )?;

        if self.dropped > 0 {
            writeln!(f, "  dropped {} unreadable record(s)", self.dropped)?;
        }

        if !self.failures.is_empty() {
            writeln!(f, "  {} failure(s):", self.failures.len())?;
            for failure in &self.failures {
                writeln!(f, "    {}: {}", failure.path.display(), failure.message)?;
            }
        }

        Ok(())
    }
}

/// A single file that could not be processed.
#[derive(Clone, Debug, Serialize)]
pub struct BatchFailure {
    pub path: PathBuf,
    pub message: String,
}

/// Snapshot of a session for display.
#[derive(Clone, Debug, Serialize)]
pub struct SessionSummary {
    pub root: PathBuf,
    pub labels_dir: PathBuf,
    pub classes: Vec<ClassDef>,
    pub images: Vec<ImageSummary>,
    pub total_boxes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load: Option<BatchReport>,
}

/// Per-image line of a [`SessionSummary`].
#[derive(Clone, Debug, Serialize)]
pub struct ImageSummary {
    pub file_name: String,
    pub boxes: usize,
}

impl fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Images: {}", self.root.display())?;
        writeln!(f, "Labels: {}", self.labels_dir.display())?;
        writeln!(f)?;

        writeln!(f, "Classes ({}):", self.classes.len())?;
        for class in &self.classes {
            writeln!(f, "  [{}] {} {}", class.export_id, class.name, class.color)?;
        }
        writeln!(f)?;

        writeln!(
            f,
            "{} images, {} boxes:",
            self.images.len(),
            self.total_boxes
        )?;
        for image in &self.images {
            writeln!(f, "  {:>5}  {}", image.boxes, image.file_name)?;
        }

        if let Some(load) = &self.load {
            writeln!(f)?;
            write!(f, "{}", load)?;
        }

        Ok(())
    }
}
