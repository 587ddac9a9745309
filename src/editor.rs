use crate::classify::{Classification, Classifier};
use crate::library::{ReferenceShape, ShapeLibrary};
use crate::recorder::{RecorderMode, StrokeRecorder, TrailSink};
use crate::session::MIN_CANDIDATE_POINTS;
use std::error::Error;
use std::fmt;
use std::io;

/// Why a commit was rejected. Rejections leave the recorder and the library
/// untouched.
#[derive(Debug)]
pub enum CommitError {
    EmptyName,
    NoPoints,
    Io(io::Error),
}

impl fmt::Display for CommitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommitError::EmptyName => write!(f, "shape needs a name"),
            CommitError::NoPoints => write!(f, "draw something first"),
            CommitError::Io(e) => write!(f, "could not save shape: {e}"),
        }
    }
}

impl Error for CommitError {}

/// Authoring flow for new reference shapes: draw multi-stroke, test against
/// the library, commit under a name. Built on the same recorder/classifier
/// stack as the play session, just with accumulation across strokes.
#[derive(Debug)]
pub struct EditorController {
    pub recorder: StrokeRecorder,
    /// Status line for the UI: recognition results, commit errors.
    pub message: Option<String>,
}

impl EditorController {
    pub fn new(trail: Box<dyn TrailSink>) -> Self {
        Self {
            recorder: StrokeRecorder::new(RecorderMode::MultiStroke, trail),
            message: None,
        }
    }

    /// Classify the accumulated points against the full library without
    /// clearing them, so the author can keep refining. Never mutates the
    /// library. No-op below the minimum point count.
    pub fn recognize(
        &mut self,
        classifier: &dyn Classifier,
        library: &ShapeLibrary,
    ) -> Option<Classification> {
        if self.recorder.points().len() <= MIN_CANDIDATE_POINTS {
            return None;
        }
        let result = classifier.classify(self.recorder.points(), library.all());
        if let Some(ref c) = result {
            self.message = Some(format!("{} {:.2}", c.label, c.score));
        }
        result
    }

    /// Persist the accumulated points as a new reference shape and reset for
    /// a fresh one. Rejected without state change when the name is blank or
    /// nothing was drawn.
    pub fn commit(
        &mut self,
        name: &str,
        library: &mut ShapeLibrary,
    ) -> Result<(), CommitError> {
        let name = name.trim();
        if name.is_empty() {
            self.message = Some(CommitError::EmptyName.to_string());
            return Err(CommitError::EmptyName);
        }
        if self.recorder.points().is_empty() {
            self.message = Some(CommitError::NoPoints.to_string());
            return Err(CommitError::NoPoints);
        }

        let shape = ReferenceShape::new(name, self.recorder.points().to_vec());
        match library.add(shape) {
            Ok(_) => {
                self.recorder.reset();
                self.message = Some(format!("added '{name}'"));
                Ok(())
            }
            Err(e) => {
                let err = CommitError::Io(e);
                self.message = Some(err.to_string());
                Err(err)
            }
        }
    }
}
