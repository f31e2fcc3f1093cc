//! The lens: a full-screen single-asset viewer.
//!
//! The lens is either closed or open on one relpath. Its index is always
//! derived from the visible sequence passed in by the caller, so filter or
//! sort changes never leave it pointing at a stale position.
//!
//! Zoom is a multiplicative factor in `[MIN_ZOOM, MAX_ZOOM]`; the pan offset
//! is in screen pixels relative to the viewport centre and is only non-zero
//! while zoomed in.

use std::collections::HashSet;

pub const MIN_ZOOM: f64 = 1.0;
pub const MAX_ZOOM: f64 = 6.0;
pub const ZOOM_IN_STEP: f64 = 1.1;
pub const ZOOM_OUT_STEP: f64 = 0.9;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Cursor position relative to the centre of the stage whose top-left corner
    /// sits at `origin` with the given `size`, all in client coordinates.
    pub fn from_stage_centre(client: Point, origin: Point, size: (f64, f64)) -> Point {
        Point {
            x: client.x - (origin.x + size.0 / 2.0),
            y: client.y - (origin.y + size.1 / 2.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LensState {
    #[default]
    Closed,
    Open {
        relpath: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LensCommand {
    Next,
    Prev,
    First,
    Last,
    Close,
    ZoomIn,
    ZoomOut,
    ResetZoom,
    Delete,
    Download,
    OpenWorkflow,
}

impl LensCommand {
    /// Maps a `KeyboardEvent.key` value to a lens command.
    pub fn from_key(key: &str) -> Option<Self> {
        let cmd = match key {
            "ArrowRight" | "ArrowDown" => LensCommand::Next,
            "ArrowLeft" | "ArrowUp" => LensCommand::Prev,
            "Home" => LensCommand::First,
            "End" => LensCommand::Last,
            "Escape" => LensCommand::Close,
            "+" | "=" => LensCommand::ZoomIn,
            "-" | "_" => LensCommand::ZoomOut,
            "0" => LensCommand::ResetZoom,
            "Delete" => LensCommand::Delete,
            "d" | "D" => LensCommand::Download,
            "w" | "W" => LensCommand::OpenWorkflow,
            _ => return None,
        };
        Some(cmd)
    }
}

/// Work the UI has to carry out after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LensEffect {
    None,
    Redraw,
    Closed,
    Delete(String),
    Download(String),
    OpenWorkflow(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lens {
    state: LensState,
    zoom: f64,
    offset: Point,
}

impl Default for Lens {
    fn default() -> Self {
        Self::new()
    }
}

impl Lens {
    pub fn new() -> Self {
        Self { state: LensState::Closed, zoom: MIN_ZOOM, offset: Point::ORIGIN }
    }

    pub fn state(&self) -> &LensState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, LensState::Open { .. })
    }

    pub fn current(&self) -> Option<&str> {
        match &self.state {
            LensState::Open { relpath } => Some(relpath),
            LensState::Closed => None,
        }
    }

    pub fn index_in(&self, seq: &[String]) -> Option<usize> {
        let current = self.current()?;
        seq.iter().position(|r| r == current)
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn offset(&self) -> Point {
        self.offset
    }

    /// Opens on `relpath` if it is part of the visible sequence.
    pub fn open(&mut self, relpath: &str, seq: &[String]) -> bool {
        if !seq.iter().any(|r| r == relpath) {
            return false;
        }
        self.state = LensState::Open { relpath: relpath.to_string() };
        self.reset();
        true
    }

    pub fn close(&mut self) {
        self.state = LensState::Closed;
        self.reset();
    }

    pub fn next(&mut self, seq: &[String]) -> bool {
        match self.index_in(seq) {
            Some(i) if i + 1 < seq.len() => self.show(&seq[i + 1]),
            _ => false,
        }
    }

    pub fn prev(&mut self, seq: &[String]) -> bool {
        match self.index_in(seq) {
            Some(i) if i > 0 => self.show(&seq[i - 1]),
            _ => false,
        }
    }

    pub fn first(&mut self, seq: &[String]) -> bool {
        match (self.index_in(seq), seq.first()) {
            (Some(i), Some(first)) if i > 0 => self.show(first),
            _ => false,
        }
    }

    pub fn last(&mut self, seq: &[String]) -> bool {
        match (self.index_in(seq), seq.last()) {
            (Some(i), Some(last)) if i + 1 < seq.len() => self.show(last),
            _ => false,
        }
    }

    /// Re-targets the lens after items disappeared from the sequence.
    ///
    /// Stays put if the current item survived, otherwise moves to the nearest
    /// survivor (next first, then previous) in `before` order, and closes if
    /// nothing survived.
    pub fn retarget(&mut self, before: &[String], after: &[String]) {
        let Some(current) = self.current().map(str::to_string) else {
            return;
        };
        if after.iter().any(|r| *r == current) {
            return;
        }
        let survivors: HashSet<&str> = after.iter().map(String::as_str).collect();
        let target = match before.iter().position(|r| *r == current) {
            Some(i) => before[i + 1..]
                .iter()
                .find(|r| survivors.contains(r.as_str()))
                .or_else(|| before[..i].iter().rev().find(|r| survivors.contains(r.as_str()))),
            None => after.first(),
        };
        match target.cloned() {
            Some(relpath) => {
                self.show(&relpath);
            }
            None => self.close(),
        }
    }

    /// Multiplies the zoom by `factor`, keeping the point under `cursor`
    /// (relative to the viewport centre) fixed on screen.
    pub fn zoom_by(&mut self, factor: f64, cursor: Point) {
        if !self.is_open() || !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let target = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        if target <= MIN_ZOOM {
            self.reset();
            return;
        }
        let ratio = target / self.zoom;
        self.offset = Point::new(
            cursor.x - (cursor.x - self.offset.x) * ratio,
            cursor.y - (cursor.y - self.offset.y) * ratio,
        );
        self.zoom = target;
    }

    pub fn zoom_in(&mut self, cursor: Point) {
        self.zoom_by(ZOOM_IN_STEP, cursor);
    }

    pub fn zoom_out(&mut self, cursor: Point) {
        self.zoom_by(ZOOM_OUT_STEP, cursor);
    }

    /// Wheel handler: negative `delta_y` (scroll up) zooms in.
    pub fn wheel(&mut self, delta_y: f64, cursor: Point) {
        if delta_y < 0.0 {
            self.zoom_in(cursor);
        } else if delta_y > 0.0 {
            self.zoom_out(cursor);
        }
    }

    pub fn reset(&mut self) {
        self.zoom = MIN_ZOOM;
        self.offset = Point::ORIGIN;
    }

    /// Drags the image. Ignored unless zoomed in.
    pub fn pan(&mut self, dx: f64, dy: f64) -> bool {
        if self.zoom <= MIN_ZOOM {
            return false;
        }
        self.offset = Point::new(self.offset.x + dx, self.offset.y + dy);
        true
    }

    /// CSS transform for the lens image element.
    pub fn css_transform(&self) -> String {
        format!("translate({:.1}px, {:.1}px) scale({:.3})", self.offset.x, self.offset.y, self.zoom)
    }

    pub fn dispatch(&mut self, command: LensCommand, seq: &[String]) -> LensEffect {
        let Some(current) = self.current().map(str::to_string) else {
            return LensEffect::None;
        };
        let changed = match command {
            LensCommand::Next => self.next(seq),
            LensCommand::Prev => self.prev(seq),
            LensCommand::First => self.first(seq),
            LensCommand::Last => self.last(seq),
            LensCommand::Close => {
                self.close();
                return LensEffect::Closed;
            }
            LensCommand::ZoomIn => {
                self.zoom_in(Point::ORIGIN);
                true
            }
            LensCommand::ZoomOut => {
                self.zoom_out(Point::ORIGIN);
                true
            }
            LensCommand::ResetZoom => {
                self.reset();
                true
            }
            LensCommand::Delete => return LensEffect::Delete(current),
            LensCommand::Download => return LensEffect::Download(current),
            LensCommand::OpenWorkflow => return LensEffect::OpenWorkflow(current),
        };
        if changed {
            LensEffect::Redraw
        } else {
            LensEffect::None
        }
    }

    fn show(&mut self, relpath: &str) -> bool {
        self.state = LensState::Open { relpath: relpath.to_string() };
        self.reset();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn open_requires_membership() {
        let s = seq(&["a", "b"]);
        let mut lens = Lens::new();
        assert!(!lens.open("zzz", &s));
        assert!(!lens.is_open());
        assert!(lens.open("b", &s));
        assert_eq!(lens.index_in(&s), Some(1));
    }

    #[test]
    fn navigation_clamps_without_wrapping() {
        let s = seq(&["a", "b", "c"]);
        let mut lens = Lens::new();
        lens.open("a", &s);
        assert!(!lens.prev(&s));
        assert!(lens.next(&s));
        assert!(lens.next(&s));
        assert_eq!(lens.current(), Some("c"));
        assert!(!lens.next(&s));
        assert!(lens.first(&s));
        assert_eq!(lens.current(), Some("a"));
        assert!(lens.last(&s));
        assert_eq!(lens.current(), Some("c"));
        assert!(!lens.last(&s));
    }

    #[test]
    fn navigating_resets_transform() {
        let s = seq(&["a", "b"]);
        let mut lens = Lens::new();
        lens.open("a", &s);
        lens.zoom_in(Point::new(10.0, 10.0));
        lens.pan(5.0, 5.0);
        lens.next(&s);
        assert_eq!(lens.zoom(), MIN_ZOOM);
        assert_eq!(lens.offset(), Point::ORIGIN);
    }

    #[test]
    fn zoom_stays_within_bounds() {
        let s = seq(&["a"]);
        let mut lens = Lens::new();
        lens.open("a", &s);
        for _ in 0..100 {
            lens.zoom_in(Point::new(40.0, -20.0));
            assert!(lens.zoom() <= MAX_ZOOM);
        }
        assert_eq!(lens.zoom(), MAX_ZOOM);
        for _ in 0..100 {
            lens.zoom_out(Point::new(40.0, -20.0));
            assert!(lens.zoom() >= MIN_ZOOM);
        }
        assert_eq!(lens.zoom(), MIN_ZOOM);
        assert_eq!(lens.offset(), Point::ORIGIN);
    }

    #[test]
    fn stage_centre_accounts_for_the_stage_origin() {
        // Stage below a 40px toolbar: its centre is not the window centre.
        let centre = Point::from_stage_centre(Point::new(500.0, 340.0), Point::new(0.0, 40.0), (1000.0, 600.0));
        assert_eq!(centre, Point::ORIGIN);
        let off = Point::from_stage_centre(Point::new(120.0, 90.0), Point::new(20.0, 40.0), (200.0, 100.0));
        assert_eq!(off, Point::ORIGIN);
        let corner = Point::from_stage_centre(Point::new(20.0, 40.0), Point::new(20.0, 40.0), (200.0, 100.0));
        assert_eq!(corner, Point::new(-100.0, -50.0));
    }

    #[test]
    fn zoom_keeps_cursor_point_fixed() {
        let s = seq(&["a"]);
        let mut lens = Lens::new();
        lens.open("a", &s);
        let cursor = Point::new(100.0, 50.0);
        lens.zoom_by(2.0, cursor);
        // Image point under the cursor: (cursor - offset) / zoom must be unchanged (it was 100,50 at zoom 1).
        let offset = lens.offset();
        assert!(((cursor.x - offset.x) / lens.zoom() - 100.0).abs() < 1e-9);
        assert!(((cursor.y - offset.y) / lens.zoom() - 50.0).abs() < 1e-9);
        assert_eq!(offset, Point::new(-100.0, -50.0));
    }

    #[test]
    fn pan_only_when_zoomed() {
        let s = seq(&["a"]);
        let mut lens = Lens::new();
        lens.open("a", &s);
        assert!(!lens.pan(10.0, 10.0));
        assert_eq!(lens.offset(), Point::ORIGIN);
        lens.zoom_in(Point::ORIGIN);
        assert!(lens.pan(10.0, -4.0));
        assert_eq!(lens.offset(), Point::new(10.0, -4.0));
        lens.reset();
        assert_eq!(lens.zoom(), 1.0);
        assert_eq!(lens.offset(), Point::ORIGIN);
    }

    #[test]
    fn retarget_prefers_next_survivor() {
        let before = seq(&["a", "b", "c", "d"]);
        let mut lens = Lens::new();
        lens.open("b", &before);
        lens.retarget(&before, &seq(&["a", "d"]));
        assert_eq!(lens.current(), Some("d"));
    }

    #[test]
    fn retarget_falls_back_to_previous_survivor() {
        let before = seq(&["a", "b", "c"]);
        let mut lens = Lens::new();
        lens.open("c", &before);
        lens.retarget(&before, &seq(&["a", "b"]));
        assert_eq!(lens.current(), Some("b"));
    }

    #[test]
    fn retarget_closes_when_nothing_survives() {
        let before = seq(&["a"]);
        let mut lens = Lens::new();
        lens.open("a", &before);
        lens.retarget(&before, &[]);
        assert!(!lens.is_open());
    }

    #[test]
    fn retarget_keeps_surviving_current() {
        let before = seq(&["a", "b", "c"]);
        let mut lens = Lens::new();
        lens.open("b", &before);
        lens.retarget(&before, &seq(&["b"]));
        assert_eq!(lens.current(), Some("b"));
    }

    #[test]
    fn keyboard_dispatch() {
        let s = seq(&["a", "b"]);
        let mut lens = Lens::new();
        assert_eq!(lens.dispatch(LensCommand::Next, &s), LensEffect::None);
        lens.open("a", &s);
        assert_eq!(LensCommand::from_key("ArrowRight"), Some(LensCommand::Next));
        assert_eq!(LensCommand::from_key("q"), None);
        assert_eq!(lens.dispatch(LensCommand::Next, &s), LensEffect::Redraw);
        assert_eq!(lens.dispatch(LensCommand::Next, &s), LensEffect::None);
        assert_eq!(lens.dispatch(LensCommand::Delete, &s), LensEffect::Delete("b".into()));
        assert_eq!(lens.dispatch(LensCommand::OpenWorkflow, &s), LensEffect::OpenWorkflow("b".into()));
        assert_eq!(lens.dispatch(LensCommand::Close, &s), LensEffect::Closed);
        assert!(!lens.is_open());
    }
}
