use crate::geom::Point;

/// Receiver for stroke-trail effects. The recorder announces trail lifecycle
/// here so the effects layer never needs a process-wide dispatcher; pass
/// [`NullTrail`] when no effects are wanted.
pub trait TrailSink {
    fn restart(&mut self, x: f64, y: f64);
    fn extend(&mut self, x: f64, y: f64);
    fn finish(&mut self);
}

/// No-op trail sink.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTrail;

impl TrailSink for NullTrail {
    fn restart(&mut self, _x: f64, _y: f64) {}
    fn extend(&mut self, _x: f64, _y: f64) {}
    fn finish(&mut self) {}
}

/// Governs what happens when a stroke ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderMode {
    /// Play session: every End completes a whole candidate shape and the
    /// recorder resets immediately after handing it off.
    SingleShot,
    /// Editor: points accumulate across Begin/Move/End cycles (one stroke id
    /// per Begin) until the caller resets explicitly.
    MultiStroke,
}

/// Accumulates phase events into the current candidate shape.
pub struct StrokeRecorder {
    mode: RecorderMode,
    stroke_id: i32,
    stroke_open: bool,
    points: Vec<Point>,
    trail: Box<dyn TrailSink>,
}

impl std::fmt::Debug for StrokeRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrokeRecorder")
            .field("mode", &self.mode)
            .field("stroke_id", &self.stroke_id)
            .field("stroke_open", &self.stroke_open)
            .field("points", &self.points.len())
            .finish()
    }
}

impl StrokeRecorder {
    pub fn new(mode: RecorderMode, trail: Box<dyn TrailSink>) -> Self {
        Self {
            mode,
            stroke_id: -1,
            stroke_open: false,
            points: Vec::new(),
            trail,
        }
    }

    pub fn mode(&self) -> RecorderMode {
        self.mode
    }

    /// Ordered points of the in-progress candidate.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn current_stroke_id(&self) -> i32 {
        self.stroke_id
    }

    pub fn is_stroke_open(&self) -> bool {
        self.stroke_open
    }

    /// Start a new stroke. A prior stroke that never saw its End (input lost
    /// focus, release off-area) is discarded here, point by point, so no
    /// partial stroke leaks into the eventual candidate.
    pub fn on_begin(&mut self, x: f64, y: f64) {
        if self.stroke_open {
            let abandoned = self.stroke_id;
            self.points.retain(|p| p.stroke_id != abandoned);
        }

        self.stroke_id += 1;
        self.stroke_open = true;
        self.points.push(Point::new(x, y, self.stroke_id));
        self.trail.restart(x, y);
    }

    /// Extend the open stroke. A Move with no prior Begin is ignored.
    pub fn on_move(&mut self, x: f64, y: f64) {
        if !self.stroke_open {
            return;
        }
        self.points.push(Point::new(x, y, self.stroke_id));
        self.trail.extend(x, y);
    }

    /// Close the open stroke. In SingleShot mode the completed candidate is
    /// handed to the caller and the recorder resets; in MultiStroke mode the
    /// points stay accumulated and `None` is returned.
    pub fn on_end(&mut self, x: f64, y: f64) -> Option<Vec<Point>> {
        if !self.stroke_open {
            return None;
        }
        self.points.push(Point::new(x, y, self.stroke_id));
        self.stroke_open = false;
        self.trail.finish();

        match self.mode {
            RecorderMode::SingleShot => {
                let candidate = std::mem::take(&mut self.points);
                self.stroke_id = -1;
                Some(candidate)
            }
            RecorderMode::MultiStroke => None,
        }
    }

    /// Explicit clear, used after a submission or rejected attempt.
    pub fn reset(&mut self) {
        self.stroke_id = -1;
        self.stroke_open = false;
        self.points.clear();
    }
}
