//! Point-cloud shape matcher, the bundled [`Classifier`] implementation.
//!
//! Candidate and reference are each resampled to a fixed-size cloud,
//! normalized for scale and translation, then compared with a greedy
//! bidirectional nearest-point matching. Stroke order and direction do not
//! matter; stroke boundaries are respected during resampling (no
//! interpolation across a pen lift).

use crate::classify::{Classification, Classifier};
use crate::geom::Point;
use crate::library::ReferenceShape;

const CLOUD_SIZE: usize = 32;

#[derive(Debug, Default, Clone, Copy)]
pub struct PointCloudMatcher;

impl PointCloudMatcher {
    pub fn new() -> Self {
        Self
    }
}

impl Classifier for PointCloudMatcher {
    fn classify(
        &self,
        candidate: &[Point],
        references: &[ReferenceShape],
    ) -> Option<Classification> {
        let candidate = normalize(candidate);

        let mut best: Option<(&ReferenceShape, f64)> = None;
        for reference in references {
            let cloud = normalize(&reference.points);
            let d = greedy_cloud_distance(&candidate, &cloud);
            if best.map_or(true, |(_, bd)| d < bd) {
                best = Some((reference, d));
            }
        }

        best.map(|(shape, d)| Classification {
            label: shape.name.clone(),
            score: ((2.0 - d) / 2.0).max(0.0),
        })
    }
}

fn dist(a: &Point, b: &Point) -> f64 {
    ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
}

fn path_length(points: &[Point]) -> f64 {
    points
        .windows(2)
        .filter(|w| w[0].stroke_id == w[1].stroke_id)
        .map(|w| dist(&w[0], &w[1]))
        .sum()
}

/// Resample to exactly CLOUD_SIZE points, evenly spaced along the drawn
/// path.
fn resample(points: &[Point]) -> Vec<Point> {
    if points.is_empty() {
        return vec![Point::new(0.0, 0.0, 0); CLOUD_SIZE];
    }
    let mut src = points.to_vec();
    let interval = path_length(&src) / (CLOUD_SIZE - 1) as f64;
    let mut out = vec![src[0]];
    let mut accumulated = 0.0;

    if interval > 0.0 {
        let mut i = 1;
        while i < src.len() {
            if src[i].stroke_id == src[i - 1].stroke_id {
                let d = dist(&src[i - 1], &src[i]);
                if accumulated + d >= interval && d > 0.0 {
                    let t = (interval - accumulated) / d;
                    let q = Point::new(
                        src[i - 1].x + t * (src[i].x - src[i - 1].x),
                        src[i - 1].y + t * (src[i].y - src[i - 1].y),
                        src[i].stroke_id,
                    );
                    out.push(q);
                    src.insert(i, q);
                    accumulated = 0.0;
                } else {
                    accumulated += d;
                }
            }
            i += 1;
        }
    }

    while out.len() < CLOUD_SIZE {
        out.push(*src.last().unwrap_or(&points[0]));
    }
    out.truncate(CLOUD_SIZE);
    out
}

/// Uniform scale to a unit bounding box, then translate the centroid to the
/// origin.
fn normalize(points: &[Point]) -> Vec<Point> {
    let mut cloud = resample(points);

    let (mut min_x, mut min_y) = (f64::MAX, f64::MAX);
    let (mut max_x, mut max_y) = (f64::MIN, f64::MIN);
    for p in &cloud {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    let scale = (max_x - min_x).max(max_y - min_y).max(f64::EPSILON);
    for p in &mut cloud {
        p.x = (p.x - min_x) / scale;
        p.y = (p.y - min_y) / scale;
    }

    let n = cloud.len() as f64;
    let cx = cloud.iter().map(|p| p.x).sum::<f64>() / n;
    let cy = cloud.iter().map(|p| p.y).sum::<f64>() / n;
    for p in &mut cloud {
        p.x -= cx;
        p.y -= cy;
    }
    cloud
}

/// Minimum over several start alignments, in both directions.
fn greedy_cloud_distance(a: &[Point], b: &[Point]) -> f64 {
    let n = a.len();
    let step = (n as f64).sqrt().floor().max(1.0) as usize;

    let mut min = f64::MAX;
    let mut start = 0;
    while start < n {
        min = min.min(one_way_distance(a, b, start));
        min = min.min(one_way_distance(b, a, start));
        start += step;
    }
    min
}

fn one_way_distance(a: &[Point], b: &[Point], start: usize) -> f64 {
    let n = a.len();
    let mut matched = vec![false; n];
    let mut sum = 0.0;

    for offset in 0..n {
        let i = (start + offset) % n;
        let mut best = f64::MAX;
        let mut best_j = 0;
        for (j, taken) in matched.iter().enumerate() {
            if !taken {
                let d = dist(&a[i], &b[j]);
                if d < best {
                    best = d;
                    best_j = j;
                }
            }
        }
        matched[best_j] = true;
        let weight = 1.0 - (offset as f64) / (n as f64);
        sum += weight * best;
    }
    sum
}
