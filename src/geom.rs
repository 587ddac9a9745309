use serde::{Deserialize, Serialize};

/// A captured pointer position. Points are ordered by capture time; that
/// order encodes drawing order and is preserved through serialization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    /// Groups points of one continuous press-to-release path within a
    /// multi-stroke shape.
    #[serde(rename = "stroke")]
    pub stroke_id: i32,
}

impl Point {
    pub fn new(x: f64, y: f64, stroke_id: i32) -> Self {
        Self { x, y, stroke_id }
    }
}

/// Axis-aligned rectangle used for the draw-area hit test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.x + self.w && y >= self.y && y < self.y + self.h
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains() {
        let r = Rect::new(10.0, 10.0, 20.0, 20.0);

        assert!(r.contains(10.0, 10.0));
        assert!(r.contains(25.0, 25.0));
        assert!(!r.contains(30.0, 30.0)); // exclusive far edge
        assert!(!r.contains(9.9, 15.0));
        assert!(!r.contains(15.0, 31.0));
    }

    #[test]
    fn test_point_serde_roundtrip() {
        let p = Point::new(1.5, -2.25, 3);
        let json = serde_json::to_string(&p).unwrap();
        let back: Point = serde_json::from_str(&json).unwrap();
        assert_eq!(p, back);
    }

    #[test]
    fn test_point_stroke_field_name() {
        let p: Point = serde_json::from_str(r#"{"x":1.0,"y":2.0,"stroke":4}"#).unwrap();
        assert_eq!(p.stroke_id, 4);
    }
}
