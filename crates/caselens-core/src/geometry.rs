// crates/caselens-core/src/geometry.rs
//
// Screen-space ↔ native-pixel-space mapping.
//
// Every pointer event arrives in screen points; every overlay element
// (stroke, calibration line, measurement, region) is stored in native video
// pixels so it stays glued to the footage across window resizes.
//
// ViewportGeometry is recomputed from scratch on every layout pass from the
// panel rect and the source's intrinsic dimensions. It is never cached across
// passes, so a resize or sidebar toggle can never leave a stale mapping.

use serde::{Deserialize, Serialize};

/// Intrinsic dimensions assumed until a probe has answered.
pub const FALLBACK_NATIVE_W: u32 = 1920;
pub const FALLBACK_NATIVE_H: u32 = 1080;

/// A point in native video pixel space (origin top-left of the frame).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NativePoint {
    pub x: f32,
    pub y: f32,
}

impl NativePoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Euclidean distance between two native points, in native pixels.
///
/// ```
/// use caselens_core::geometry::{pixel_length, NativePoint};
/// let a = NativePoint::new(0.0, 0.0);
/// let b = NativePoint::new(3.0, 4.0);
/// assert!((pixel_length(a, b) - 5.0).abs() < 1e-6);
/// ```
pub fn pixel_length(a: NativePoint, b: NativePoint) -> f32 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    (dx * dx + dy * dy).sqrt()
}

/// An axis-aligned rectangle in native pixel space. `min` ≤ `max` on both axes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NativeRect {
    pub min: NativePoint,
    pub max: NativePoint,
}

impl NativeRect {
    /// Build a normalized rect from any two opposite corners, so a drag in
    /// any direction produces the same rectangle.
    pub fn from_corners(a: NativePoint, b: NativePoint) -> Self {
        Self {
            min: NativePoint::new(a.x.min(b.x), a.y.min(b.y)),
            max: NativePoint::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Clamp the rect to a `frame_w` × `frame_h` frame.
    pub fn clamped_to(&self, frame_w: f32, frame_h: f32) -> Self {
        Self {
            min: NativePoint::new(self.min.x.clamp(0.0, frame_w), self.min.y.clamp(0.0, frame_h)),
            max: NativePoint::new(self.max.x.clamp(0.0, frame_w), self.max.y.clamp(0.0, frame_h)),
        }
    }

    /// Integer pixel bounds `(x, y, w, h)` for cropping. The crop a decoder
    /// produces from these bounds has exactly `w` × `h` pixels.
    ///
    /// ```
    /// use caselens_core::geometry::{NativePoint, NativeRect};
    /// let r = NativeRect::from_corners(NativePoint::new(10.4, 20.6), NativePoint::new(110.4, 80.6));
    /// assert_eq!(r.pixel_bounds(), (10, 21, 100, 60));
    /// ```
    pub fn pixel_bounds(&self) -> (u32, u32, u32, u32) {
        let x0 = self.min.x.round().max(0.0) as u32;
        let y0 = self.min.y.round().max(0.0) as u32;
        let x1 = self.max.x.round().max(0.0) as u32;
        let y1 = self.max.y.round().max(0.0) as u32;
        (x0, y0, x1.saturating_sub(x0), y1.saturating_sub(y0))
    }
}

/// Where the video lands on screen this layout pass, plus the intrinsic
/// dimensions it was laid out for. All mapping goes through this value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportGeometry {
    pub left:     f32,
    pub top:      f32,
    pub width:    f32,
    pub height:   f32,
    pub native_w: f32,
    pub native_h: f32,
}

impl ViewportGeometry {
    /// Letterbox-fit a `native_w` × `native_h` frame into the given panel
    /// rect, centered on both axes.
    pub fn fit(
        panel_left: f32,
        panel_top:  f32,
        panel_w:    f32,
        panel_h:    f32,
        native_w:   u32,
        native_h:   u32,
    ) -> Self {
        let nw = native_w.max(1) as f32;
        let nh = native_h.max(1) as f32;
        let pw = panel_w.max(1.0);
        let ph = panel_h.max(1.0);
        let scale = (pw / nw).min(ph / nh);
        let w = nw * scale;
        let h = nh * scale;
        Self {
            left:     panel_left + (pw - w) * 0.5,
            top:      panel_top + (ph - h) * 0.5,
            width:    w,
            height:   h,
            native_w: nw,
            native_h: nh,
        }
    }

    /// Map a screen point into native pixel space.
    ///
    /// The center of the display rect maps to the center of the frame for any
    /// display size:
    ///
    /// ```
    /// use caselens_core::geometry::ViewportGeometry;
    /// let vp = ViewportGeometry::fit(40.0, 10.0, 777.0, 505.0, 1280, 720);
    /// let p = vp.to_native(vp.left + vp.width / 2.0, vp.top + vp.height / 2.0);
    /// assert!((p.x - 640.0).abs() < 0.01);
    /// assert!((p.y - 360.0).abs() < 0.01);
    /// ```
    pub fn to_native(&self, screen_x: f32, screen_y: f32) -> NativePoint {
        let sx = self.native_w / self.width;
        let sy = self.native_h / self.height;
        NativePoint::new((screen_x - self.left) * sx, (screen_y - self.top) * sy)
    }

    /// Map a native point back to screen space (for overlay painting).
    pub fn to_screen(&self, p: NativePoint) -> (f32, f32) {
        let sx = self.width / self.native_w;
        let sy = self.height / self.native_h;
        (self.left + p.x * sx, self.top + p.y * sy)
    }

    /// True when a screen point falls inside the displayed video area.
    pub fn contains(&self, screen_x: f32, screen_y: f32) -> bool {
        screen_x >= self.left
            && screen_x <= self.left + self.width
            && screen_y >= self.top
            && screen_y <= self.top + self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_click_maps_to_native_center_for_any_display_size() {
        for &(pw, ph) in &[(320.0, 200.0), (1280.0, 720.0), (333.3, 911.0)] {
            let vp = ViewportGeometry::fit(0.0, 0.0, pw, ph, 1920, 1080);
            let p = vp.to_native(vp.left + vp.width / 2.0, vp.top + vp.height / 2.0);
            assert!((p.x - 960.0).abs() < 0.01, "x at {pw}x{ph}: {}", p.x);
            assert!((p.y - 540.0).abs() < 0.01, "y at {pw}x{ph}: {}", p.y);
        }
    }

    #[test]
    fn letterbox_fit_preserves_aspect_and_centers() {
        // Wide panel around a 16:9 source: height-bound, horizontal bars.
        let vp = ViewportGeometry::fit(0.0, 0.0, 2000.0, 500.0, 1920, 1080);
        assert!((vp.height - 500.0).abs() < 0.01);
        let expect_w = 500.0 * 1920.0 / 1080.0;
        assert!((vp.width - expect_w).abs() < 0.01);
        assert!((vp.left - (2000.0 - expect_w) * 0.5).abs() < 0.01);
        assert!((vp.top - 0.0).abs() < 0.01);
    }

    #[test]
    fn roundtrip_screen_native_screen() {
        let vp = ViewportGeometry::fit(12.0, 34.0, 640.0, 480.0, 1280, 720);
        let native = vp.to_native(100.0, 200.0);
        let (sx, sy) = vp.to_screen(native);
        assert!((sx - 100.0).abs() < 0.01);
        assert!((sy - 200.0).abs() < 0.01);
    }

    #[test]
    fn rect_normalizes_any_drag_direction() {
        let a = NativePoint::new(50.0, 80.0);
        let b = NativePoint::new(10.0, 20.0);
        let r = NativeRect::from_corners(a, b);
        assert_eq!(r.min, NativePoint::new(10.0, 20.0));
        assert_eq!(r.max, NativePoint::new(50.0, 80.0));
        assert!((r.width() - 40.0).abs() < 1e-6);
        assert!((r.height() - 60.0).abs() < 1e-6);
    }

    #[test]
    fn clamp_keeps_rect_inside_frame() {
        let r = NativeRect::from_corners(NativePoint::new(-20.0, 50.0), NativePoint::new(3000.0, 1200.0));
        let c = r.clamped_to(1920.0, 1080.0);
        assert_eq!(c.min, NativePoint::new(0.0, 50.0));
        assert_eq!(c.max, NativePoint::new(1920.0, 1080.0));
    }
}
