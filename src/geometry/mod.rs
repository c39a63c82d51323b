//! Geometric primitives for the clipping editor.
//!
//! Rectangles are kept in *normalized page space*: every coordinate is a
//! fraction of the unrotated page raster's width or height, in `[0, 1]`.
//! Normalized rectangles survive zoom, rotation, and re-rendering at a
//! different scale; pixel coordinates only appear at the hit-testing and
//! compositing boundaries.

/// Minimum width/height (normalized) for a freshly drawn rectangle to be kept.
///
/// Anything smaller on release is treated as an accidental click, not an
/// intentional rectangle.
pub const MIN_RECT_SIZE: f64 = 0.01;

/// Grab radius in canvas pixels around a corner or edge handle.
pub const HANDLE_RADIUS_PX: f64 = 10.0 / 2.0 + 5.0;

/// A 2D point in normalized page space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// X coordinate, fraction of page width
    pub x: f64,
    /// Y coordinate, fraction of page height
    pub y: f64,
}

impl Point {
    /// Create a new point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Clamp both coordinates into `[0, 1]`.
    pub fn clamped(self) -> Self {
        Self {
            x: self.x.clamp(0.0, 1.0),
            y: self.y.clamp(0.0, 1.0),
        }
    }
}

/// An axis-aligned rectangle in normalized page space.
///
/// `x, y` is the top-left corner. A rectangle with `w == 0` or `h == 0` is
/// "empty/unset"; negative extents only exist transiently during a drag and
/// are flipped back through the origin by [`NormRect::normalized`].
///
/// # Examples
///
/// ```
/// use pdf_clipper::geometry::NormRect;
///
/// let r = NormRect::new(0.25, 0.25, 0.5, 0.25);
/// assert!(!r.is_empty());
/// assert_eq!(r.right(), 0.75);
/// assert_eq!(r.bottom(), 0.5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct NormRect {
    /// X coordinate of the top-left corner
    pub x: f64,
    /// Y coordinate of the top-left corner
    pub y: f64,
    /// Width
    pub w: f64,
    /// Height
    pub h: f64,
}

impl NormRect {
    /// The empty/unset rectangle.
    pub const EMPTY: NormRect = NormRect {
        x: 0.0,
        y: 0.0,
        w: 0.0,
        h: 0.0,
    };

    /// Create a new rectangle.
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// The whole-page rectangle `{0, 0, 1, 1}`.
    pub fn full_page() -> Self {
        Self::new(0.0, 0.0, 1.0, 1.0)
    }

    /// Whether this rectangle is empty/unset (`w == 0` or `h == 0`).
    pub fn is_empty(&self) -> bool {
        self.w <= 0.0 || self.h <= 0.0
    }

    /// Whether both extents meet [`MIN_RECT_SIZE`].
    pub fn is_intentional(&self) -> bool {
        self.w >= MIN_RECT_SIZE && self.h >= MIN_RECT_SIZE
    }

    /// Right edge x-coordinate.
    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    /// Bottom edge y-coordinate.
    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    /// Flip any negative extent back through the origin so `w, h >= 0`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_clipper::geometry::NormRect;
    ///
    /// let r = NormRect::new(0.5, 0.5, -0.2, 0.1).normalized();
    /// assert_eq!(r, NormRect::new(0.3, 0.5, 0.2, 0.1));
    /// ```
    pub fn normalized(mut self) -> Self {
        if self.w < 0.0 {
            self.x += self.w;
            self.w = -self.w;
        }
        if self.h < 0.0 {
            self.y += self.h;
            self.h = -self.h;
        }
        self
    }

    /// Span rectangle between a fixed drag anchor and the current pointer.
    ///
    /// The origin/size are normalized regardless of drag direction, so the
    /// result always has non-negative extents.
    pub fn from_drag(anchor: Point, current: Point) -> Self {
        Self {
            x: anchor.x.min(current.x),
            y: anchor.y.min(current.y),
            w: (current.x - anchor.x).abs(),
            h: (current.y - anchor.y).abs(),
        }
    }

    /// Translate by a delta.
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Clamp the rectangle into the unit square, preserving its size where
    /// possible (extents larger than the page are trimmed).
    pub fn clamped_to_page(mut self) -> Self {
        self = self.normalized();
        self.w = self.w.min(1.0);
        self.h = self.h.min(1.0);
        self.x = self.x.clamp(0.0, 1.0 - self.w);
        self.y = self.y.clamp(0.0, 1.0 - self.h);
        self
    }

    /// Scale to pixel coordinates `(x, y, w, h)` for a raster of the given
    /// dimensions.
    pub fn to_pixels(&self, raster_w: u32, raster_h: u32) -> (f64, f64, f64, f64) {
        (
            self.x * raster_w as f64,
            self.y * raster_h as f64,
            self.w * raster_w as f64,
            self.h * raster_h as f64,
        )
    }
}

/// A resize handle on one of the eight compass directions.
///
/// Corner handles move two edges; edge handles move one. The original corner
/// set (`tl/tr/bl/br`) is the `Nw/Ne/Sw/Se` subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle {
    /// Top edge
    N,
    /// Bottom edge
    S,
    /// Right edge
    E,
    /// Left edge
    W,
    /// Top-right corner
    Ne,
    /// Top-left corner
    Nw,
    /// Bottom-right corner
    Se,
    /// Bottom-left corner
    Sw,
}

impl Handle {
    /// Whether dragging this handle moves the left edge.
    pub fn affects_left(&self) -> bool {
        matches!(self, Handle::W | Handle::Nw | Handle::Sw)
    }

    /// Whether dragging this handle moves the right edge.
    pub fn affects_right(&self) -> bool {
        matches!(self, Handle::E | Handle::Ne | Handle::Se)
    }

    /// Whether dragging this handle moves the top edge.
    pub fn affects_top(&self) -> bool {
        matches!(self, Handle::N | Handle::Nw | Handle::Ne)
    }

    /// Whether dragging this handle moves the bottom edge.
    pub fn affects_bottom(&self) -> bool {
        matches!(self, Handle::S | Handle::Sw | Handle::Se)
    }
}

/// Resize `initial` by a pointer delta applied through `handle`.
///
/// Left/top handles shift the origin and shrink the size in lockstep
/// (`x += dx; w -= dx`); right/bottom handles adjust size only. The result is
/// normalized, so dragging an edge past its opposite edge flips the rectangle
/// instead of producing a negative extent.
///
/// # Examples
///
/// ```
/// use pdf_clipper::geometry::{resize, Handle, NormRect};
///
/// let r = NormRect::new(0.125, 0.125, 0.25, 0.25);
/// // Drag the south-east corner outward by 0.125 in both axes.
/// assert_eq!(resize(r, Handle::Se, 0.125, 0.125), NormRect::new(0.125, 0.125, 0.375, 0.375));
/// // Drag the north-west corner inward by the same amount.
/// assert_eq!(resize(r, Handle::Nw, 0.125, 0.125), NormRect::new(0.25, 0.25, 0.125, 0.125));
/// ```
pub fn resize(initial: NormRect, handle: Handle, dx: f64, dy: f64) -> NormRect {
    let mut r = initial;
    if handle.affects_left() {
        r.x += dx;
        r.w -= dx;
    }
    if handle.affects_top() {
        r.y += dy;
        r.h -= dy;
    }
    if handle.affects_right() {
        r.w += dx;
    }
    if handle.affects_bottom() {
        r.h += dy;
    }
    r.normalized()
}

/// Hit-test a pointer (canvas pixels) against a rectangle's resize handles.
///
/// Corners take priority over edges so a corner grab near two edges resolves
/// to the diagonal handle. Returns `None` when the pointer is not within
/// `radius` of any handle.
pub fn hit_handle(
    rect: &NormRect,
    px: f64,
    py: f64,
    canvas_w: f64,
    canvas_h: f64,
    radius: f64,
) -> Option<Handle> {
    if rect.is_empty() {
        return None;
    }
    let (rx, ry) = (rect.x * canvas_w, rect.y * canvas_h);
    let (rw, rh) = (rect.w * canvas_w, rect.h * canvas_h);

    let near = |a: f64, b: f64| (a - b).abs() < radius;

    // Corners first
    if near(px, rx) && near(py, ry) {
        return Some(Handle::Nw);
    }
    if near(px, rx + rw) && near(py, ry) {
        return Some(Handle::Ne);
    }
    if near(px, rx) && near(py, ry + rh) {
        return Some(Handle::Sw);
    }
    if near(px, rx + rw) && near(py, ry + rh) {
        return Some(Handle::Se);
    }

    // Then edges, with the pointer inside the edge's span
    let in_x_span = px >= rx && px <= rx + rw;
    let in_y_span = py >= ry && py <= ry + rh;
    if near(py, ry) && in_x_span {
        return Some(Handle::N);
    }
    if near(py, ry + rh) && in_x_span {
        return Some(Handle::S);
    }
    if near(px, rx) && in_y_span {
        return Some(Handle::W);
    }
    if near(px, rx + rw) && in_y_span {
        return Some(Handle::E);
    }
    None
}

/// Whether a pointer (canvas pixels) falls inside a rectangle's body.
pub fn hit_body(rect: &NormRect, px: f64, py: f64, canvas_w: f64, canvas_h: f64) -> bool {
    let (rx, ry, rw, rh) = (
        rect.x * canvas_w,
        rect.y * canvas_h,
        rect.w * canvas_w,
        rect.h * canvas_h,
    );
    px >= rx && px <= rx + rw && py >= ry && py <= ry + rh
}

/// Pixel dimensions of the axis-aligned bounding box of a `w × h` raster
/// rotated by `degrees` around its center.
///
/// # Examples
///
/// ```
/// use pdf_clipper::geometry::rotated_raster_size;
///
/// assert_eq!(rotated_raster_size(100, 200, 0.0), (100, 200));
/// assert_eq!(rotated_raster_size(100, 200, 90.0), (200, 100));
/// ```
pub fn rotated_raster_size(w: u32, h: u32, degrees: f64) -> (u32, u32) {
    let rad = degrees.to_radians();
    let (sin, cos) = (rad.sin().abs(), rad.cos().abs());
    let (wf, hf) = (w as f64, h as f64);
    (
        (wf * cos + hf * sin).floor() as u32,
        (wf * sin + hf * cos).floor() as u32,
    )
}
