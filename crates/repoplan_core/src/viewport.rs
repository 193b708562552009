//! Pan/zoom viewport state for the tree rendering surface.
//!
//! # Responsibility
//! - Track the 2D transform (pan offsets plus scale) a surface applies
//!   when drawing the workspace tree.
//! - Turn pointer and wheel events into transform updates.
//!
//! # Invariants
//! - `scale` stays within `[MIN_SCALE, MAX_SCALE]` at all times.
//! - Only background-originated pointer-downs start a drag; node hits
//!   are left to selection handling.
//! - Event handling is synchronous and never touches the network.

/// Lower zoom bound.
pub const MIN_SCALE: f32 = 0.5;
/// Upper zoom bound.
pub const MAX_SCALE: f32 = 2.0;
/// Zoom change applied per wheel event.
pub const SCALE_STEP: f32 = 0.05;

/// Transform the rendering surface applies to the tree layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    /// Horizontal pan offset in surface pixels.
    pub offset_x: f32,
    /// Vertical pan offset in surface pixels.
    pub offset_y: f32,
    /// Zoom factor, clamped to `[MIN_SCALE, MAX_SCALE]`.
    pub scale: f32,
}

impl ViewTransform {
    /// Identity transform: no pan, 1:1 zoom.
    pub fn identity() -> Self {
        Self {
            offset_x: 0.0,
            offset_y: 0.0,
            scale: 1.0,
        }
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::identity()
    }
}

/// What a pointer-down event landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    /// Empty canvas; eligible to start a pan drag.
    Background,
    /// A node element; panning must not start.
    Node,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DragState {
    Idle,
    /// Live drag, remembering the last observed pointer position.
    Dragging { last_x: f32, last_y: f32 },
}

/// Interactive pan/zoom controller for one rendering surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    transform: ViewTransform,
    drag: DragState,
}

impl Viewport {
    /// Creates a viewport at the identity transform.
    pub fn new() -> Self {
        Self {
            transform: ViewTransform::identity(),
            drag: DragState::Idle,
        }
    }

    /// Current transform for the rendering surface.
    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    /// Returns whether a pan drag is live.
    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, DragState::Dragging { .. })
    }

    /// Handles pointer-down at surface position `(x, y)`.
    ///
    /// Only [`PointerTarget::Background`] starts a drag; a pointer-down
    /// on a node leaves the viewport untouched.
    pub fn pointer_down(&mut self, x: f32, y: f32, target: PointerTarget) {
        if target == PointerTarget::Background {
            self.drag = DragState::Dragging { last_x: x, last_y: y };
        }
    }

    /// Advances a live drag by the delta since the previous event and
    /// rebases the anchor, so content tracks the pointer exactly.
    ///
    /// Ignored while idle; surfaces may report hover moves freely.
    pub fn pointer_move(&mut self, x: f32, y: f32) {
        if let DragState::Dragging { last_x, last_y } = self.drag {
            self.transform.offset_x += x - last_x;
            self.transform.offset_y += y - last_y;
            self.drag = DragState::Dragging { last_x: x, last_y: y };
        }
    }

    /// Ends any live drag, wherever the pointer is released.
    pub fn pointer_up(&mut self) {
        self.drag = DragState::Idle;
    }

    /// Applies one zoom step per wheel event: wheel-up (`delta_y < 0`)
    /// zooms in, wheel-down zooms out. Pan offsets are left unchanged;
    /// zoom is anchored at the content origin.
    pub fn wheel(&mut self, delta_y: f32) {
        if delta_y < 0.0 {
            self.transform.scale = (self.transform.scale + SCALE_STEP).min(MAX_SCALE);
        } else if delta_y > 0.0 {
            self.transform.scale = (self.transform.scale - SCALE_STEP).max(MIN_SCALE);
        }
    }

    /// Restores the identity transform and ends any drag.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}
