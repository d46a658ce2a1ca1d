//! Rendered-space geometry and the mapping from original image pixels onto it.

use crate::word::WordBox;

/// A point in rendered (on-screen image) coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle given by its top-left corner and size.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The rectangle spanned by two arbitrary corners, normalised so that the size is never negative.
    pub fn from_two_points(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Whether the two rectangles touch or intersect. A shared edge counts as an overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        !(self.right() < other.left()
            || self.left() > other.right()
            || self.bottom() < other.top()
            || self.top() > other.bottom())
    }

    /// The smallest rectangle containing both `self` and `other`.
    pub fn union(&self, other: &Rect) -> Rect {
        let left = self.left().min(other.left());
        let top = self.top().min(other.top());
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(left, top, right - left, bottom - top)
    }

    /// Whether the rectangle covers a positive area.
    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// Original and rendered dimensions of the currently displayed image.
///
/// A zero dimension means "not known yet"; the matching scale factor then falls back to 1.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ImageGeometry {
    pub original_width: f32,
    pub original_height: f32,
    pub rendered_width: f32,
    pub rendered_height: f32,
}

impl ImageGeometry {
    pub fn new(
        original_width: f32,
        original_height: f32,
        rendered_width: f32,
        rendered_height: f32,
    ) -> Self {
        Self {
            original_width,
            original_height,
            rendered_width,
            rendered_height,
        }
    }

    pub fn scale_x(&self) -> f32 {
        scale(self.rendered_width, self.original_width)
    }

    pub fn scale_y(&self) -> f32 {
        scale(self.rendered_height, self.original_height)
    }

    /// Whether any of the four dimensions is unknown, which forces the identity fallback on that axis.
    pub fn is_degenerate(&self) -> bool {
        !(is_measured(self.original_width)
            && is_measured(self.original_height)
            && is_measured(self.rendered_width)
            && is_measured(self.rendered_height))
    }

    /// Map a box in original-image pixels into rendered coordinates.
    pub fn to_rendered(&self, bbox: &WordBox) -> Rect {
        let (sx, sy) = (self.scale_x(), self.scale_y());
        Rect::new(bbox.x * sx, bbox.y * sy, bbox.width * sx, bbox.height * sy)
    }
}

fn is_measured(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

fn scale(rendered: f32, original: f32) -> f32 {
    if is_measured(rendered) && is_measured(original) {
        rendered / original
    } else {
        1.0
    }
}
