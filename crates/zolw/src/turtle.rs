use std::{cell::RefCell, rc::Rc, str::FromStr};

use kurbo::{Point, Rect, Vec2};
use log::trace;

/// What happens when the turtle reaches the edge of its field.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TurtleMode {
    /// Leave through one edge, come back in through the opposite one.
    Wrap,
    /// Stop at the edge.
    Fence,
    /// There is no edge.
    Window,
}

impl TurtleMode {
    pub fn name(&self) -> &'static str {
        match self {
            TurtleMode::Wrap => "WRAP",
            TurtleMode::Fence => "FENCE",
            TurtleMode::Window => "WINDOW",
        }
    }
}

impl FromStr for TurtleMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "wrap" => Ok(TurtleMode::Wrap),
            "fence" => Ok(TurtleMode::Fence),
            "window" => Ok(TurtleMode::Window),
            other => Err(format!("unknown turtle mode \"{other}\"")),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PenMode {
    Paint,
    Erase,
    Reverse,
}

impl PenMode {
    pub fn name(&self) -> &'static str {
        match self {
            PenMode::Paint => "PAINT",
            PenMode::Erase => "ERASE",
            PenMode::Reverse => "REVERSE",
        }
    }
}

impl FromStr for PenMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "paint" => Ok(PenMode::Paint),
            "erase" => Ok(PenMode::Erase),
            "reverse" => Ok(PenMode::Reverse),
            other => Err(format!("unknown pen mode \"{other}\"")),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Pen {
    pub down: bool,
    pub mode: PenMode,
    /// A CSS color.
    pub color: String,
    pub size: f64,
}

impl Default for Pen {
    fn default() -> Self {
        Pen {
            down: true,
            mode: PenMode::Paint,
            color: "black".to_owned(),
            size: 1.0,
        }
    }
}

const PALETTE: [&str; 16] = [
    "black", "blue", "lime", "cyan", "red", "magenta", "yellow", "white", "brown", "tan", "green",
    "aquamarine", "salmon", "purple", "orange", "gray",
];

/// The CSS color for a palette index.
pub fn palette_color(index: i64) -> &'static str {
    PALETTE[index.rem_euclid(PALETTE.len() as i64) as usize]
}

/// The CSS color for red, green and blue components, each running from 0 to 99.
pub fn rgb_color(r: f64, g: f64, b: f64) -> String {
    let channel = |c: f64| (c.clamp(0.0, 99.0) * 255.0 / 99.0).floor() as u8;
    format!("#{:02x}{:02x}{:02x}", channel(r), channel(g), channel(b))
}

/// Something that can show what the turtle does.
///
/// Every method has a do-nothing default, and the turtle never asks a canvas anything: it
/// works the same whether or not anything is watching.
pub trait Canvas {
    fn move_to(&mut self, _to: Point) {}
    fn turn_to(&mut self, _heading: f64) {}
    fn set_pen(&mut self, _pen: &Pen) {}
    fn set_visibility(&mut self, _visible: bool) {}
    fn draw_segment(&mut self, _from: Point, _to: Point, _pen: &Pen) {}
    fn draw_label(&mut self, _at: Point, _text: &str, _height: f64) {}
    fn clear(&mut self) {}
}

#[derive(Debug, Default)]
pub struct NullCanvas;

impl Canvas for NullCanvas {}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    Segment { from: Point, to: Point, pen: Pen },
    Label { at: Point, text: String, height: f64 },
    Clear,
}

/// A canvas that remembers what it was asked to draw.
#[derive(Debug, Default)]
pub struct Recorder {
    pub ops: Vec<DrawOp>,
}

impl Recorder {
    /// The segments drawn since the last clear.
    pub fn segments(&self) -> impl Iterator<Item = (Point, Point, &Pen)> + '_ {
        let start = self
            .ops
            .iter()
            .rposition(|op| *op == DrawOp::Clear)
            .map_or(0, |i| i + 1);
        self.ops[start..].iter().filter_map(|op| match op {
            DrawOp::Segment { from, to, pen } => Some((*from, *to, pen)),
            _ => None,
        })
    }
}

impl Canvas for Recorder {
    fn draw_segment(&mut self, from: Point, to: Point, pen: &Pen) {
        self.ops.push(DrawOp::Segment {
            from,
            to,
            pen: pen.clone(),
        });
    }

    fn draw_label(&mut self, at: Point, text: &str, height: f64) {
        self.ops.push(DrawOp::Label {
            at,
            text: text.to_owned(),
            height,
        });
    }

    fn clear(&mut self) {
        self.ops.push(DrawOp::Clear);
    }
}

impl<C: Canvas> Canvas for Rc<RefCell<C>> {
    fn move_to(&mut self, to: Point) {
        self.borrow_mut().move_to(to)
    }

    fn turn_to(&mut self, heading: f64) {
        self.borrow_mut().turn_to(heading)
    }

    fn set_pen(&mut self, pen: &Pen) {
        self.borrow_mut().set_pen(pen)
    }

    fn set_visibility(&mut self, visible: bool) {
        self.borrow_mut().set_visibility(visible)
    }

    fn draw_segment(&mut self, from: Point, to: Point, pen: &Pen) {
        self.borrow_mut().draw_segment(from, to, pen)
    }

    fn draw_label(&mut self, at: Point, text: &str, height: f64) {
        self.borrow_mut().draw_label(at, text, height)
    }

    fn clear(&mut self) {
        self.borrow_mut().clear()
    }
}

/// Turtle state.
///
/// Headings are in degrees, with 0 pointing up (towards positive y) and increasing clockwise.
#[derive(Clone, Debug, PartialEq)]
pub struct Turtle {
    pub position: Point,
    pub heading: f64,
    pub pen: Pen,
    pub visible: bool,
    pub mode: TurtleMode,
    pub label_height: f64,
    bounds: Rect,
}

const DEFAULT_LABEL_HEIGHT: f64 = 12.0;

fn normalize(degrees: f64) -> f64 {
    let h = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs.
    if h >= 360.0 {
        0.0
    } else {
        h
    }
}

/// The unit vector pointing along a heading.
fn direction(heading: f64) -> Vec2 {
    let rad = heading.to_radians();
    Vec2::new(rad.sin(), rad.cos())
}

impl Turtle {
    pub fn new(half_width: f64, half_height: f64, mode: TurtleMode) -> Turtle {
        Turtle {
            position: Point::ORIGIN,
            heading: 0.0,
            pen: Pen::default(),
            visible: true,
            mode,
            label_height: DEFAULT_LABEL_HEIGHT,
            bounds: Rect::new(-half_width, -half_height, half_width, half_height),
        }
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn forward(&mut self, distance: f64, canvas: &mut dyn Canvas) {
        let target = self.position + direction(self.heading) * distance;
        self.move_to(target, canvas);
    }

    pub fn turn(&mut self, degrees: f64, canvas: &mut dyn Canvas) {
        self.set_heading(self.heading + degrees, canvas);
    }

    pub fn set_heading(&mut self, degrees: f64, canvas: &mut dyn Canvas) {
        self.heading = normalize(degrees);
        canvas.turn_to(self.heading);
    }

    /// Moves in a straight line to `target`, drawing if the pen is down and respecting the
    /// boundary mode.
    pub fn move_to(&mut self, target: Point, canvas: &mut dyn Canvas) {
        if !(target.x.is_finite() && target.y.is_finite()) {
            return;
        }
        trace!("moving from {:?} to {target:?}", self.position);
        match self.mode {
            TurtleMode::Window => {
                self.stroke(self.position, target, canvas);
                self.position = target;
            }
            TurtleMode::Fence => {
                let from = self.clamp(self.position);
                let to = match self.exit(from, target) {
                    Some((t, _)) => self.snap(from + (target - from) * t),
                    None => target,
                };
                self.stroke(from, to, canvas);
                self.position = to;
            }
            TurtleMode::Wrap => self.wrap_to(target, canvas),
        }
        canvas.move_to(self.position);
    }

    pub fn home(&mut self, canvas: &mut dyn Canvas) {
        self.move_to(Point::ORIGIN, canvas);
        self.set_heading(0.0, canvas);
    }

    /// The heading that would point the turtle at `target`.
    pub fn towards(&self, target: Point) -> f64 {
        let d = target - self.position;
        normalize(d.x.atan2(d.y).to_degrees())
    }

    /// Draws an arc of `degrees` around the turtle, starting at its heading and going clockwise.
    ///
    /// The turtle itself doesn't move.
    pub fn arc(&mut self, degrees: f64, radius: f64, canvas: &mut dyn Canvas) {
        if !self.pen.down {
            return;
        }
        let center = self.position;
        let at = |angle: f64| center + direction(angle) * radius;
        let sweep = degrees.abs();
        let sign = degrees.signum();
        let mut prev = at(self.heading);
        let mut steps: Vec<f64> = (10..)
            .step_by(10)
            .map(f64::from)
            .take_while(|a| *a < sweep)
            .collect();
        steps.push(sweep);
        for a in steps {
            let p = at(self.heading + sign * a);
            canvas.draw_segment(prev, p, &self.pen);
            prev = p;
        }
    }

    /// Clears the drawing, leaving the turtle where it is.
    pub fn clean(&mut self, canvas: &mut dyn Canvas) {
        canvas.clear();
    }

    /// Clears the drawing and puts the turtle back in the middle, without drawing on the way.
    pub fn clear_screen(&mut self, canvas: &mut dyn Canvas) {
        canvas.clear();
        self.position = Point::ORIGIN;
        self.heading = 0.0;
        canvas.move_to(self.position);
        canvas.turn_to(self.heading);
    }

    pub fn set_pen_down(&mut self, down: bool, canvas: &mut dyn Canvas) {
        self.pen.down = down;
        canvas.set_pen(&self.pen);
    }

    pub fn set_pen_mode(&mut self, mode: PenMode, canvas: &mut dyn Canvas) {
        self.pen.mode = mode;
        canvas.set_pen(&self.pen);
    }

    pub fn set_pen_color(&mut self, color: String, canvas: &mut dyn Canvas) {
        self.pen.color = color;
        canvas.set_pen(&self.pen);
    }

    pub fn set_pen_size(&mut self, size: f64, canvas: &mut dyn Canvas) {
        self.pen.size = size;
        canvas.set_pen(&self.pen);
    }

    pub fn set_visible(&mut self, visible: bool, canvas: &mut dyn Canvas) {
        self.visible = visible;
        canvas.set_visibility(visible);
    }

    pub fn label(&self, text: &str, canvas: &mut dyn Canvas) {
        canvas.draw_label(self.position, text, self.label_height);
    }

    fn stroke(&self, from: Point, to: Point, canvas: &mut dyn Canvas) {
        if self.pen.down {
            canvas.draw_segment(from, to, &self.pen);
        }
    }

    fn clamp(&self, p: Point) -> Point {
        let b = self.bounds;
        Point::new(p.x.clamp(b.x0, b.x1), p.y.clamp(b.y0, b.y1))
    }

    // Pins coordinates that are within rounding error of an edge onto it.
    fn snap(&self, p: Point) -> Point {
        let b = self.bounds;
        let pin = |v: f64, lo: f64, hi: f64| {
            if (v - lo).abs() < 1e-9 {
                lo
            } else if (v - hi).abs() < 1e-9 {
                hi
            } else {
                v
            }
        };
        Point::new(pin(p.x, b.x0, b.x1), pin(p.y, b.y0, b.y1))
    }

    /// Where the segment from `from` (inside the bounds) to `to` first leaves the bounds.
    ///
    /// Returns the fraction of the way along the segment, and the direction of the edge that
    /// was crossed (several components are set if it left through a corner).
    fn exit(&self, from: Point, to: Point) -> Option<(f64, Vec2)> {
        let b = self.bounds;
        let d = to - from;
        let mut best: Option<(f64, Vec2)> = None;
        let mut consider = |t: f64, edge: Vec2| {
            best = match best {
                Some((best_t, best_edge)) if (t - best_t).abs() < 1e-12 => {
                    Some((best_t, best_edge + edge))
                }
                Some((best_t, _)) if t > best_t => best,
                _ => Some((t, edge)),
            };
        };
        if to.x > b.x1 && d.x > 0.0 {
            consider((b.x1 - from.x) / d.x, Vec2::new(1.0, 0.0));
        } else if to.x < b.x0 && d.x < 0.0 {
            consider((b.x0 - from.x) / d.x, Vec2::new(-1.0, 0.0));
        }
        if to.y > b.y1 && d.y > 0.0 {
            consider((b.y1 - from.y) / d.y, Vec2::new(0.0, 1.0));
        } else if to.y < b.y0 && d.y < 0.0 {
            consider((b.y0 - from.y) / d.y, Vec2::new(0.0, -1.0));
        }
        best.map(|(t, edge)| (t.clamp(0.0, 1.0), edge))
    }

    fn wrap_to(&mut self, target: Point, canvas: &mut dyn Canvas) {
        let b = self.bounds;
        let (w, h) = (b.width(), b.height());
        let mut from = self.position;
        let mut to = target;

        // A turtle that was left outside (say, by WINDOW mode) gets wrapped back in first.
        if !(b.x0..=b.x1).contains(&from.x) || !(b.y0..=b.y1).contains(&from.y) {
            let inside = self.wrapped(from);
            to += inside - from;
            from = inside;
        }

        // Past one full pass over the field the strokes only retrace it, so the pen stops
        // there and the final position comes from modular arithmetic instead.
        let d = to - from;
        let passes = (d.x.abs() / w).max(d.y.abs() / h);
        let mut end = None;
        if passes > 1.0 {
            end = Some(self.wrapped(to));
            to = from + d / passes;
        }

        while let Some((t, edge)) = self.exit(from, to) {
            let crossing = self.snap(from + (to - from) * t);
            self.stroke(from, crossing, canvas);
            let shift = Vec2::new(-edge.x * w, -edge.y * h);
            from = crossing + shift;
            to += shift;
        }
        self.stroke(from, to, canvas);
        self.position = end.unwrap_or(to);
    }

    /// The point inside the bounds that `p` lands on when each axis wraps around.
    fn wrapped(&self, p: Point) -> Point {
        let b = self.bounds;
        Point::new(
            (p.x - b.x0).rem_euclid(b.width()) + b.x0,
            (p.y - b.y0).rem_euclid(b.height()) + b.y0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turtle(mode: TurtleMode) -> Turtle {
        Turtle::new(150.0, 150.0, mode)
    }

    #[test]
    fn boundary_modes() {
        let mut c = NullCanvas;
        let mut t = turtle(TurtleMode::Wrap);
        t.move_to(Point::new(160.0, 160.0), &mut c);
        assert_eq!(t.position, Point::new(-140.0, -140.0));

        let mut t = turtle(TurtleMode::Fence);
        t.move_to(Point::new(160.0, 160.0), &mut c);
        assert_eq!(t.position, Point::new(150.0, 150.0));

        let mut t = turtle(TurtleMode::Window);
        t.move_to(Point::new(160.0, 160.0), &mut c);
        assert_eq!(t.position, Point::new(160.0, 160.0));
    }

    #[test]
    fn wrap_splits_segments() {
        let mut c = Recorder::default();
        let mut t = turtle(TurtleMode::Wrap);
        t.move_to(Point::new(0.0, 100.0), &mut c);
        t.forward(100.0, &mut c);
        assert_eq!(t.position, Point::new(0.0, -100.0));
        let segs: Vec<_> = c.segments().map(|(a, b, _)| (a, b)).collect();
        assert_eq!(
            segs,
            vec![
                (Point::new(0.0, 0.0), Point::new(0.0, 100.0)),
                (Point::new(0.0, 100.0), Point::new(0.0, 150.0)),
                (Point::new(0.0, -150.0), Point::new(0.0, -100.0)),
            ]
        );
    }

    #[test]
    fn wrap_many_times() {
        let mut c = NullCanvas;
        let mut t = turtle(TurtleMode::Wrap);
        t.set_heading(90.0, &mut c);
        t.forward(1000.0, &mut c);
        assert!((t.position.x - 100.0).abs() < 1e-9);
    }

    #[test]
    fn wrap_long_distances() {
        let mut c = Recorder::default();
        let mut t = turtle(TurtleMode::Wrap);
        t.set_heading(90.0, &mut c);
        t.forward(1e13, &mut c);
        assert!((t.position.x - 100.0).abs() < 1e-6);
        assert!(t.position.y.abs() < 1e-3);
        // One trip across the field, split where it crosses the edge.
        assert!(c.segments().count() <= 3);

        let mut t = turtle(TurtleMode::Wrap);
        t.move_to(Point::new(-3e12 - 40.0, 3e12 + 20.0), &mut c);
        assert!((t.position.x + 40.0).abs() < 1e-3);
        assert!((t.position.y - 20.0).abs() < 1e-3);
    }

    #[test]
    fn headings() {
        let mut c = NullCanvas;
        let mut t = turtle(TurtleMode::Window);
        t.turn(-45.0, &mut c);
        assert_eq!(t.heading, 315.0);
        t.turn(405.0, &mut c);
        assert_eq!(t.heading, 0.0);

        t.move_to(Point::new(-100.0, -100.0), &mut c);
        assert!((t.towards(Point::ORIGIN) - 45.0).abs() < 1e-9);
        assert_eq!(t.towards(Point::new(-100.0, -200.0)), 180.0);
    }

    #[test]
    fn pen_up_draws_nothing() {
        let mut c = Recorder::default();
        let mut t = turtle(TurtleMode::Wrap);
        t.set_pen_down(false, &mut c);
        t.forward(10.0, &mut c);
        t.arc(90.0, 10.0, &mut c);
        assert!(c.ops.is_empty());
    }

    #[test]
    fn arc_stays_put() {
        let mut c = Recorder::default();
        let mut t = turtle(TurtleMode::Wrap);
        t.arc(95.0, 10.0, &mut c);
        assert_eq!(t.position, Point::ORIGIN);
        assert_eq!(t.heading, 0.0);
        // 10 degree steps, plus the last 5 degrees.
        assert_eq!(c.segments().count(), 10);
        let (_, last, _) = c.segments().last().unwrap();
        let expected = Point::ORIGIN + direction(95.0) * 10.0;
        assert!((last - expected).hypot() < 1e-9);
    }

    #[test]
    fn colors() {
        assert_eq!(palette_color(0), "black");
        assert_eq!(palette_color(15), "gray");
        assert_eq!(rgb_color(0.0, 50.0, 99.0), "#0080ff");
    }
}
