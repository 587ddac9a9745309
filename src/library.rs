use crate::geom::Point;
use chrono::Local;
use include_dir::{include_dir, Dir};
use itertools::Itertools;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Reference shapes shipped with the binary.
static SHAPE_DIR: Dir = include_dir!("src/shapes");

/// A named exemplar shape. Identity is by name; several shapes may share one
/// name (one-vs-many matching is a classifier concern, not a library one).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceShape {
    pub name: String,
    pub points: Vec<Point>,
}

impl ReferenceShape {
    pub fn new(name: impl Into<String>, points: Vec<Point>) -> Self {
        Self {
            name: name.into(),
            points,
        }
    }
}

/// Startup failures that leave the program without a usable shape set.
#[derive(Debug)]
pub enum LibraryError {
    /// A bundled definition failed to parse. The build ships broken; abort.
    Bundled { file: String, source: serde_json::Error },
    /// Bundled and user sets merged to nothing.
    Empty,
    Io(io::Error),
}

impl fmt::Display for LibraryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LibraryError::Bundled { file, source } => {
                write!(f, "malformed bundled shape '{file}': {source}")
            }
            LibraryError::Empty => write!(f, "shape library is empty; no goal can be offered"),
            LibraryError::Io(e) => write!(f, "shape library io error: {e}"),
        }
    }
}

impl Error for LibraryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            LibraryError::Bundled { source, .. } => Some(source),
            LibraryError::Io(e) => Some(e),
            LibraryError::Empty => None,
        }
    }
}

impl From<io::Error> for LibraryError {
    fn from(e: io::Error) -> Self {
        LibraryError::Io(e)
    }
}

/// What startup loading found, including non-fatal skips.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub bundled: usize,
    pub user: usize,
    pub warnings: Vec<String>,
}

/// The merged reference set both modes draw from. Built once at startup and
/// append-only afterwards; guaranteed non-empty by construction. Add is the
/// only write path and the two modes never run concurrently, so a single
/// writer is assumed rather than locked for.
#[derive(Debug)]
pub struct ShapeLibrary {
    shapes: Vec<ReferenceShape>,
    user_dir: PathBuf,
}

impl ShapeLibrary {
    /// Load bundled ∪ user shapes. Duplicate names across the two sources are
    /// all retained. Fails when a bundled entry is malformed or the merged
    /// set ends up empty.
    pub fn load(user_dir: impl Into<PathBuf>) -> Result<(Self, LoadReport), LibraryError> {
        let user_dir = user_dir.into();
        let mut report = LoadReport::default();

        let mut shapes = load_bundled()?;
        report.bundled = shapes.len();

        let (user_shapes, warnings) = load_user_shapes(&user_dir);
        report.user = user_shapes.len();
        report.warnings = warnings;
        shapes.extend(user_shapes);

        if shapes.is_empty() {
            return Err(LibraryError::Empty);
        }

        Ok((Self { shapes, user_dir }, report))
    }

    pub fn all(&self) -> &[ReferenceShape] {
        &self.shapes
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Uniform random pick, used for goal selection. The non-empty invariant
    /// makes this total.
    pub fn choose<R: Rng>(&self, rng: &mut R) -> &ReferenceShape {
        &self.shapes[rng.gen_range(0..self.shapes.len())]
    }

    /// Append a shape in memory and persist it to the user directory under a
    /// timestamp-qualified filename that never overwrites an existing file.
    pub fn add(&mut self, shape: ReferenceShape) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.user_dir)?;

        let stem = file_stem(&shape.name);
        let ts = Local::now().format("%Y%m%d%H%M%S%3f");
        let mut path = self.user_dir.join(format!("{stem}-{ts}.json"));
        let mut n = 1;
        while path.exists() {
            path = self.user_dir.join(format!("{stem}-{ts}-{n}.json"));
            n += 1;
        }

        let data = serde_json::to_vec_pretty(&shape)?;
        fs::write(&path, data)?;
        self.shapes.push(shape);
        Ok(path)
    }
}

/// Deserialize every bundled definition. Any malformed entry is fatal.
pub fn load_bundled() -> Result<Vec<ReferenceShape>, LibraryError> {
    SHAPE_DIR
        .files()
        .sorted_by_key(|f| f.path().to_path_buf())
        .filter(|f| f.path().extension().is_some_and(|e| e == "json"))
        .map(|f| {
            let file = f.path().display().to_string();
            let bytes = f.contents();
            serde_json::from_slice(bytes).map_err(|source| LibraryError::Bundled { file, source })
        })
        .collect()
}

/// Deserialize every `*.json` in the user directory, in sorted filename
/// order so the load order never depends on filesystem iteration. A file
/// that fails to parse is skipped with a warning; a missing directory just
/// means no user shapes yet.
pub fn load_user_shapes(dir: &Path) -> (Vec<ReferenceShape>, Vec<String>) {
    let mut shapes = Vec::new();
    let mut warnings = Vec::new();

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return (shapes, warnings),
    };

    let paths: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|e| e == "json"))
        .sorted()
        .collect();

    for path in paths {
        match fs::read(&path).map_err(|e| e.to_string()).and_then(|bytes| {
            serde_json::from_slice::<ReferenceShape>(&bytes).map_err(|e| e.to_string())
        }) {
            Ok(shape) => shapes.push(shape),
            Err(e) => warnings.push(format!("skipping {}: {e}", path.display())),
        }
    }

    (shapes, warnings)
}

/// Default writable location for user-authored shapes.
pub fn default_user_dir() -> Option<PathBuf> {
    if let Ok(home) = std::env::var("HOME") {
        Some(
            PathBuf::from(home)
                .join(".local")
                .join("share")
                .join("strokr")
                .join("shapes"),
        )
    } else {
        directories::ProjectDirs::from("", "", "strokr")
            .map(|pd| pd.data_local_dir().join("shapes"))
    }
}

// Shape names are free-form; the file stem is not.
fn file_stem(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if stem.is_empty() {
        "shape".to_string()
    } else {
        stem
    }
}
