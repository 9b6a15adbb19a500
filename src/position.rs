//! Dropdown positioning.
//!
//! Picks where an open dropdown's overlay goes from nothing but geometry: the
//! trigger's bounding box, the overlay's width, and the viewport. It knows
//! nothing about menus, locales, or pages, and gives the same answer for
//! every resolved menu.
//!
//! ```text
//!            Down                   Left                    Right
//!         [ trigger ]            [ trigger ]|          |[ trigger ]
//!     +-----------------+  +-----------------+|          |+-----------------+
//!     |  centered under |  |  right edges    ||          ||  left edges     |
//!     +-----------------+  |  aligned        ||          ||  aligned        |
//!                          +-----------------+|          |+-----------------+
//!                                        viewport edge  viewport edge
//! ```
//!
//! - **Down** (default): centered under the trigger.
//! - **Left**: centered would cross the right viewport edge, so the overlay's
//!   right edge is aligned with the trigger's right edge and it grows leftward.
//! - **Right**: centered would cross the left viewport edge, so the overlay's
//!   left edge is aligned with the trigger's left edge and it grows rightward.
//!
//! An overlay wider than the viewport overflows on both sides; it then grows
//! toward whichever half of the viewport holds the trigger's center. An
//! overlay that fits the viewport but would still cross an edge after
//! re-anchoring (a wide overlay on a narrow trigger) is shifted back inside.
//!
//! The embedded client script (`static/nav.js`) applies the same rules in the
//! browser, and reruns them on viewport resize while a dropdown is open.

use serde::{Deserialize, Serialize};

/// An axis-aligned box in viewport coordinates (CSS pixels, origin top-left).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn center_x(&self) -> f64 {
        self.left + self.width / 2.0
    }

    /// False for a trigger with no width or no height, i.e. not rendered.
    pub fn is_laid_out(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Down,
    Left,
    Right,
}

impl Direction {
    /// Class the client script puts on the dropdown's list item.
    pub fn css_class(self) -> &'static str {
        match self {
            Direction::Down => "opens-down",
            Direction::Left => "opens-left",
            Direction::Right => "opens-right",
        }
    }
}

/// Chosen direction plus the overlay's top-left corner in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub direction: Direction,
    pub left: f64,
    pub top: f64,
}

/// Choose where to open an overlay `submenu_width` wide below `trigger`.
pub fn choose_placement(trigger: Rect, submenu_width: f64, viewport: Viewport) -> Placement {
    let centered_left = trigger.center_x() - submenu_width / 2.0;
    let overflows_left = centered_left < 0.0;
    let overflows_right = centered_left + submenu_width > viewport.width;

    let direction = match (overflows_left, overflows_right) {
        (false, false) => Direction::Down,
        (false, true) => Direction::Left,
        (true, false) => Direction::Right,
        (true, true) if trigger.center_x() > viewport.width / 2.0 => Direction::Left,
        (true, true) => Direction::Right,
    };

    let anchored = match direction {
        Direction::Down => centered_left,
        Direction::Left => trigger.right() - submenu_width,
        Direction::Right => trigger.left,
    };
    // An overlay that fits the viewport is kept inside it.
    let left = if submenu_width <= viewport.width {
        anchored.clamp(0.0, viewport.width - submenu_width)
    } else {
        anchored
    };

    Placement {
        direction,
        left,
        top: trigger.bottom(),
    }
}

/// What to do with a dropdown when the viewport changes size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResizeOutcome {
    /// Nothing is open; nothing to do.
    Idle,
    Reposition(Placement),
    /// The trigger is no longer laid out (e.g. the layout switched to the
    /// mobile drawer), so the overlay is closed instead.
    Close,
}

/// Recompute an open dropdown's placement after a resize.
///
/// `trigger` is `None` or zero-sized when the trigger is no longer rendered.
pub fn on_resize(
    open: bool,
    trigger: Option<Rect>,
    submenu_width: f64,
    viewport: Viewport,
) -> ResizeOutcome {
    if !open {
        return ResizeOutcome::Idle;
    }
    match trigger {
        Some(rect) if rect.is_laid_out() => {
            ResizeOutcome::Reposition(choose_placement(rect, submenu_width, viewport))
        }
        _ => ResizeOutcome::Close,
    }
}
