//! Screen geometry and hit testing.
//!
//! The panel is laid out on a fixed 1280x720 canvas: an 80 px header across
//! the top, then one equal-width panel per light separated by 20 px margins.
//! Each panel holds a power button and, below it, a brightness slider.
//!
//! ```text
//! +--------------------------------------------------+
//! | header (name, temperature, humidity)             |
//! +--------------------------------------------------+
//! | +--------+ +--------+ +--------+ +--------+      |
//! | | [ ON ] | | [OFF ] | | [ ON ] | | [OFF ] |      |
//! | | ====o- | | ----o- | | =o---- | | ----o- |      |
//! | +--------+ +--------+ +--------+ +--------+      |
//! +--------------------------------------------------+
//! ```
//!
//! All rectangles use inclusive bounds on both edges.

/// Canvas width in pixels.
pub const SCREEN_WIDTH: i32 = 1280;
/// Canvas height in pixels.
pub const SCREEN_HEIGHT: i32 = 720;
/// Height of the header strip.
pub const HEADER_HEIGHT: i32 = 80;
/// Gap between panels and around the panel row.
pub const PANEL_MARGIN: i32 = 20;
/// Inset of the power button from the panel's left and right edges.
pub const BUTTON_INSET: i32 = 20;
/// Vertical offset of the power button from the panel top (room for the name).
pub const BUTTON_OFFSET_Y: i32 = 60;
/// Height of the power button.
pub const BUTTON_HEIGHT: i32 = 150;
/// Inset of the slider track from the panel's left and right edges.
pub const SLIDER_INSET: i32 = 30;
/// Gap between the power button and the slider track.
pub const SLIDER_GAP: i32 = 40;
/// Height of the slider track.
pub const SLIDER_HEIGHT: i32 = 40;
/// Extra touch tolerance around the slider track.
pub const SLIDER_TOUCH_PAD: i32 = 20;

/// A point on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    /// Horizontal position, 0 at the left edge.
    pub x: i32,
    /// Vertical position, 0 at the top edge.
    pub y: i32,
}

impl Point {
    /// Create a point.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

impl Rect {
    /// Create a rectangle.
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge (inclusive).
    pub const fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Bottom edge (inclusive).
    pub const fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Whether `point` lies inside, edges included.
    pub const fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    /// Grow the rectangle by `pad` on every side.
    pub const fn padded(&self, pad: i32) -> Self {
        Self::new(self.x - pad, self.y - pad, self.width + 2 * pad, self.height + 2 * pad)
    }
}

/// A touch-sensitive control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    /// The power button of light `n`.
    PowerButton(usize),
    /// The brightness slider of light `n`.
    BrightnessSlider(usize),
}

/// Geometry for a row of `panel_count` light panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    panel_count: usize,
    panel_width: i32,
}

impl Layout {
    /// Layout for `panel_count` panels on the standard canvas.
    pub fn new(panel_count: usize) -> Self {
        let n = panel_count.max(1) as i32;
        Self {
            panel_count,
            panel_width: (SCREEN_WIDTH - PANEL_MARGIN * (n + 1)) / n,
        }
    }

    /// Number of panels.
    pub fn panel_count(&self) -> usize {
        self.panel_count
    }

    /// The header strip.
    pub fn header(&self) -> Rect {
        Rect::new(0, 0, SCREEN_WIDTH, HEADER_HEIGHT)
    }

    /// Outline of panel `index`.
    pub fn panel(&self, index: usize) -> Rect {
        let x = PANEL_MARGIN + index as i32 * (self.panel_width + PANEL_MARGIN);
        Rect::new(
            x,
            HEADER_HEIGHT + PANEL_MARGIN,
            self.panel_width,
            SCREEN_HEIGHT - HEADER_HEIGHT - PANEL_MARGIN * 2,
        )
    }

    /// The power button of panel `index`.
    pub fn power_button(&self, index: usize) -> Rect {
        let panel = self.panel(index);
        Rect::new(
            panel.x + BUTTON_INSET,
            panel.y + BUTTON_OFFSET_Y,
            panel.width - BUTTON_INSET * 2,
            BUTTON_HEIGHT,
        )
    }

    /// The visible slider track of panel `index`.
    pub fn slider_track(&self, index: usize) -> Rect {
        let panel = self.panel(index);
        let button = self.power_button(index);
        Rect::new(
            panel.x + SLIDER_INSET,
            button.bottom() + SLIDER_GAP,
            panel.width - SLIDER_INSET * 2,
            SLIDER_HEIGHT,
        )
    }

    /// The touch area of the slider of panel `index`.
    pub fn slider_hit_area(&self, index: usize) -> Rect {
        self.slider_track(index).padded(SLIDER_TOUCH_PAD)
    }

    /// The control under `point`, if any.
    pub fn hit_test(&self, point: Point) -> Option<Region> {
        (0..self.panel_count).find_map(|i| {
            if self.power_button(i).contains(point) {
                Some(Region::PowerButton(i))
            } else if self.slider_hit_area(i).contains(point) {
                Some(Region::BrightnessSlider(i))
            } else {
                None
            }
        })
    }

    /// Brightness for a touch at horizontal position `x` on slider `index`.
    ///
    /// Positions left of the track give 1 and right of it give 100.
    pub fn slider_value(&self, index: usize, x: i32) -> i64 {
        let track = self.slider_track(index);
        if track.width <= 0 {
            return 1;
        }
        (((x - track.x) as i64 * 100) / track.width as i64).clamp(1, 100)
    }
}
