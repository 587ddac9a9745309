use crate::geom::Rect;

/// Kind of pointing device the raw sample came from. Touch devices report
/// pressed while a finger is down; mice while the primary button is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Mouse,
    Touch,
}

/// One raw per-frame pointer reading, before normalization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub x: f64,
    pub y: f64,
    pub pressed: bool,
    pub kind: PointerKind,
}

/// Normalized pointer phase. A stationary held pointer produces no event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Begin,
    Move,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseEvent {
    pub phase: Phase,
    pub x: f64,
    pub y: f64,
}

/// Folds heterogeneous pointer input into a uniform Begin/Move/End stream.
///
/// Holds only the previous frame's press state and position, enough to
/// detect transitions and nonzero motion. Events whose position falls
/// outside the caller's active rectangle are suppressed entirely (not
/// queued), but the press-state memory still advances so a release outside
/// the area leaves the stroke abandoned rather than phantom-ended.
#[derive(Debug, Default)]
pub struct InputNormalizer {
    was_pressed: bool,
    last_pos: Option<(f64, f64)>,
}

impl InputNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify one raw sample. Returns at most one event per call.
    pub fn sample(&mut self, s: PointerSample, active: &Rect) -> Option<PhaseEvent> {
        let phase = match (self.was_pressed, s.pressed) {
            (false, true) => Some(Phase::Begin),
            (true, false) => Some(Phase::End),
            (true, true) => {
                let moved = match self.last_pos {
                    Some((lx, ly)) => lx != s.x || ly != s.y,
                    None => true,
                };
                if moved {
                    Some(Phase::Move)
                } else {
                    None
                }
            }
            (false, false) => None,
        };

        self.was_pressed = s.pressed;
        self.last_pos = Some((s.x, s.y));

        let phase = phase?;
        if !active.contains(s.x, s.y) {
            return None;
        }

        Some(PhaseEvent {
            phase,
            x: s.x,
            y: s.y,
        })
    }
}
