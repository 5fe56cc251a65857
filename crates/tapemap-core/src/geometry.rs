use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Axis-aligned pixel rectangle.
///
/// `width` and `height` count pixels inclusively, so a single point has a
/// 1x1 bounding box.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl PixelRect {
    #[inline]
    pub fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }
}

/// Circle in pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Point2<f32>,
    pub radius: f32,
}

impl Circle {
    #[inline]
    fn contains(&self, p: &Point2<f32>) -> bool {
        let eps = 1e-4 * self.radius.max(1.0);
        (p - self.center).norm() <= self.radius + eps
    }
}

/// Signed polygon area via the shoelace formula.
///
/// The polygon is treated as closed. The sign follows the winding of the
/// points; callers normalize the winding by reversing point order when the
/// area is negative.
pub fn signed_area(points: &[Point2<f32>]) -> f32 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut acc = 0.0f64;
    let n = points.len();
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        acc += a.x as f64 * b.y as f64 - b.x as f64 * a.y as f64;
    }
    (0.5 * acc) as f32
}

/// Integer bounding rectangle of a point set (inclusive pixel extent).
pub fn bounding_rect(points: &[Point2<f32>]) -> Option<PixelRect> {
    let first = points.first()?;
    let mut min_x = first.x.floor() as i32;
    let mut min_y = first.y.floor() as i32;
    let mut max_x = min_x;
    let mut max_y = min_y;
    for p in &points[1..] {
        let x = p.x.floor() as i32;
        let y = p.y.floor() as i32;
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }
    Some(PixelRect {
        x: min_x,
        y: min_y,
        width: max_x - min_x + 1,
        height: max_y - min_y + 1,
    })
}

/// Smallest circle containing every point.
///
/// Incremental Welzl construction over the points in the given order, so the
/// result is deterministic for a fixed input sequence.
pub fn min_enclosing_circle(points: &[Point2<f32>]) -> Option<Circle> {
    let first = *points.first()?;
    let mut c = Circle {
        center: first,
        radius: 0.0,
    };

    for i in 1..points.len() {
        if c.contains(&points[i]) {
            continue;
        }
        c = Circle {
            center: points[i],
            radius: 0.0,
        };
        for j in 0..i {
            if c.contains(&points[j]) {
                continue;
            }
            c = circle_from_two(points[i], points[j]);
            for k in 0..j {
                if !c.contains(&points[k]) {
                    c = circle_from_three(points[i], points[j], points[k]);
                }
            }
        }
    }

    Some(c)
}

fn circle_from_two(a: Point2<f32>, b: Point2<f32>) -> Circle {
    let center = nalgebra::center(&a, &b);
    Circle {
        center,
        radius: 0.5 * (b - a).norm(),
    }
}

fn circle_from_three(a: Point2<f32>, b: Point2<f32>, c: Point2<f32>) -> Circle {
    let (ax, ay) = (a.x as f64, a.y as f64);
    let (bx, by) = (b.x as f64 - ax, b.y as f64 - ay);
    let (cx, cy) = (c.x as f64 - ax, c.y as f64 - ay);

    let d = 2.0 * (bx * cy - by * cx);
    if d.abs() < 1e-12 {
        // collinear: the widest pair spans the other point
        return [
            circle_from_two(a, b),
            circle_from_two(a, c),
            circle_from_two(b, c),
        ]
        .into_iter()
        .fold(circle_from_two(a, b), |best, cand| {
            if cand.radius > best.radius {
                cand
            } else {
                best
            }
        });
    }

    let b2 = bx * bx + by * by;
    let c2 = cx * cx + cy * cy;
    let ux = (cy * b2 - by * c2) / d;
    let uy = (bx * c2 - cx * b2) / d;

    Circle {
        center: Point2::new((ux + ax) as f32, (uy + ay) as f32),
        radius: (ux * ux + uy * uy).sqrt() as f32,
    }
}
