use std::collections::VecDeque;
use tiny_skia::{
    Color, FillRule, Mask, Paint, Path, PathBuilder, Pixmap, Rect, Stroke, Transform,
};

use super::{RenderError, RenderFrame, RenderState};

pub const FIGURE_WIDTH: u32 = 800;
pub const FIGURE_HEIGHT: u32 = 600;

const HISTORY_LEN: usize = 300;
const DIAL_RADIUS: f32 = 110.0;
const ATTITUDE_CENTRE: (f32, f32) = (150.0, 150.0);
const COMPASS_CENTRE: (f32, f32) = (430.0, 150.0);
/// Pixels of horizon shift per degree of pitch.
const PITCH_SCALE: f32 = 2.5;
const ALTITUDE_TAPE_RANGE_FT: f64 = 1000.0;
const TRACK_TRACE_RANGE_DEG: f64 = 180.0;

const BACKGROUND: [u8; 3] = [24, 26, 32];
const SKY: [u8; 3] = [70, 130, 200];
const GROUND: [u8; 3] = [140, 95, 50];
const WHITE: [u8; 3] = [235, 235, 235];
const GREY: [u8; 3] = [90, 90, 100];
const TARGET: [u8; 3] = [250, 160, 30];
const ALTITUDE_TRACE: [u8; 3] = [90, 200, 120];
const TRACK_TRACE: [u8; 3] = [230, 90, 90];

/// Headless 2D flight display drawn into a `tiny-skia` pixmap.
///
/// Panels: attitude indicator, heading rose with the target needle, altitude
/// error tape, control positions and a trace of recent tracking errors.
pub struct FigureVisualiser {
    canvas: Pixmap,
    history: VecDeque<(f64, f64)>,
}

impl FigureVisualiser {
    pub fn new() -> Result<Self, RenderError> {
        let canvas = Pixmap::new(FIGURE_WIDTH, FIGURE_HEIGHT)
            .ok_or_else(|| RenderError::Canvas("zero-sized canvas".into()))?;
        Ok(Self {
            canvas,
            history: VecDeque::with_capacity(HISTORY_LEN),
        })
    }

    /// Forget the error traces, e.g. at the start of an episode.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Record `state` and redraw every panel.
    pub fn draw(&mut self, state: &RenderState) -> Result<RenderFrame, RenderError> {
        if self.history.len() == HISTORY_LEN {
            self.history.pop_front();
        }
        self.history
            .push_back((state.altitude_error_ft, state.track_error_deg));

        self.canvas.fill(color(BACKGROUND));
        self.draw_attitude(state)?;
        self.draw_compass(state)?;
        self.draw_altitude_tape(state)?;
        self.draw_controls(state)?;
        self.draw_history()?;

        Ok(self.frame())
    }

    /// The most recently drawn frame.
    pub fn frame(&self) -> RenderFrame {
        RenderFrame {
            width: self.canvas.width(),
            height: self.canvas.height(),
            rgba: self.canvas.data().to_vec(),
        }
    }

    pub fn save_png(&self, path: impl AsRef<std::path::Path>) -> Result<(), RenderError> {
        self.canvas
            .save_png(path)
            .map_err(|e| RenderError::Canvas(e.to_string()))
    }

    fn draw_attitude(&mut self, state: &RenderState) -> Result<(), RenderError> {
        let (cx, cy) = ATTITUDE_CENTRE;
        let dial = PathBuilder::from_circle(cx, cy, DIAL_RADIUS)
            .ok_or_else(|| RenderError::Canvas("attitude dial".into()))?;
        self.canvas.fill_path(
            &dial,
            &paint(SKY),
            FillRule::Winding,
            Transform::identity(),
            None,
        );

        let mut mask = Mask::new(FIGURE_WIDTH, FIGURE_HEIGHT)
            .ok_or_else(|| RenderError::Canvas("attitude mask".into()))?;
        mask.fill_path(&dial, FillRule::Winding, true, Transform::identity());

        // Ground half-plane in aircraft axes, then rolled about the dial centre.
        let offset =
            (state.pitch_deg as f32 * PITCH_SCALE).clamp(-2.0 * DIAL_RADIUS, 2.0 * DIAL_RADIUS);
        let span = 3.0 * DIAL_RADIUS;
        let ground = rect_path(cx - span, cy + offset, 2.0 * span, 2.0 * span)?;
        let roll = Transform::from_rotate_at(-state.roll_deg as f32, cx, cy);
        self.canvas
            .fill_path(&ground, &paint(GROUND), FillRule::Winding, roll, Some(&mask));

        // Fixed aircraft symbol.
        self.line(cx - 50.0, cy, cx - 15.0, cy, WHITE, 3.0)?;
        self.line(cx + 15.0, cy, cx + 50.0, cy, WHITE, 3.0)?;
        self.stroke_circle(cx, cy, DIAL_RADIUS, GREY, 2.0)
    }

    fn draw_compass(&mut self, state: &RenderState) -> Result<(), RenderError> {
        let (cx, cy) = COMPASS_CENTRE;
        self.stroke_circle(cx, cy, DIAL_RADIUS, GREY, 2.0)?;
        for tick in (0..360).step_by(30) {
            let (dx, dy) = bearing_vector(tick as f64);
            self.line(
                cx + dx * (DIAL_RADIUS - 12.0),
                cy + dy * (DIAL_RADIUS - 12.0),
                cx + dx * DIAL_RADIUS,
                cy + dy * DIAL_RADIUS,
                GREY,
                2.0,
            )?;
        }
        let (tx, ty) = bearing_vector(state.target_track_deg);
        let needle = DIAL_RADIUS - 5.0;
        self.line(cx, cy, cx + tx * needle, cy + ty * needle, TARGET, 3.0)?;
        let (hx, hy) = bearing_vector(state.heading_deg);
        let pointer = DIAL_RADIUS - 20.0;
        self.line(cx, cy, cx + hx * pointer, cy + hy * pointer, WHITE, 4.0)
    }

    fn draw_altitude_tape(&mut self, state: &RenderState) -> Result<(), RenderError> {
        let (x, top, width, height) = (620.0, 40.0, 40.0, 2.0 * DIAL_RADIUS);
        self.stroke_rect(x, top, width, height, GREY)?;
        let centre = top + height / 2.0;
        self.line(x - 8.0, centre, x + width + 8.0, centre, TARGET, 2.0)?;
        // Positive error means below target: the marker sits under the target line.
        let fraction = (state.altitude_error_ft / ALTITUDE_TAPE_RANGE_FT).clamp(-1.0, 1.0) as f32;
        let marker = centre + fraction * height / 2.0;
        self.line(x, marker, x + width, marker, WHITE, 4.0)
    }

    fn draw_controls(&mut self, state: &RenderState) -> Result<(), RenderError> {
        // Stick: aileron right, elevator up-is-pull.
        let (x, y, size) = (40.0, 330.0, 160.0);
        self.stroke_rect(x, y, size, size, GREY)?;
        let sx = x + size / 2.0 * (1.0 + state.aileron.clamp(-1.0, 1.0) as f32);
        let sy = y + size / 2.0 * (1.0 + state.elevator.clamp(-1.0, 1.0) as f32);
        let knob = PathBuilder::from_circle(sx, sy, 6.0)
            .ok_or_else(|| RenderError::Canvas("stick knob".into()))?;
        self.canvas
            .fill_path(&knob, &paint(WHITE), FillRule::Winding, Transform::identity(), None);

        // Rudder bar.
        let ry = y + size + 30.0;
        self.stroke_rect(x, ry, size, 14.0, GREY)?;
        let rx = x + size / 2.0 * (1.0 + state.rudder.clamp(-1.0, 1.0) as f32);
        self.line(rx, ry, rx, ry + 14.0, WHITE, 4.0)?;

        // Throttle.
        let tx = x + size + 20.0;
        self.stroke_rect(tx, y, 14.0, size, GREY)?;
        let level = state.throttle.clamp(0.0, 1.0) as f32 * size;
        if level > 0.0 {
            let filled = rect_path(tx, y + size - level, 14.0, level)?;
            self.canvas
                .fill_path(&filled, &paint(WHITE), FillRule::Winding, Transform::identity(), None);
        }
        Ok(())
    }

    fn draw_history(&mut self) -> Result<(), RenderError> {
        let (x, y, width, height) = (260.0, 330.0, 500.0, 230.0);
        self.stroke_rect(x, y, width, height, GREY)?;
        let mid = y + height / 2.0;
        self.line(x, mid, x + width, mid, GREY, 1.0)?;
        if self.history.len() < 2 {
            return Ok(());
        }

        let dx = width / (HISTORY_LEN - 1) as f32;
        let trace = |select: fn(&(f64, f64)) -> f64, range: f64| {
            let mut builder = PathBuilder::new();
            for (i, sample) in self.history.iter().enumerate() {
                let value = (select(sample) / range).clamp(-1.0, 1.0) as f32;
                let px = x + i as f32 * dx;
                let py = mid - value * height / 2.0;
                if i == 0 {
                    builder.move_to(px, py);
                } else {
                    builder.line_to(px, py);
                }
            }
            builder.finish()
        };

        let altitude = trace(|s| s.0, ALTITUDE_TAPE_RANGE_FT)
            .ok_or_else(|| RenderError::Canvas("altitude trace".into()))?;
        let track = trace(|s| s.1, TRACK_TRACE_RANGE_DEG)
            .ok_or_else(|| RenderError::Canvas("track trace".into()))?;
        self.stroke(&altitude, ALTITUDE_TRACE, 2.0);
        self.stroke(&track, TRACK_TRACE, 2.0);
        Ok(())
    }

    fn line(
        &mut self,
        x0: f32,
        y0: f32,
        x1: f32,
        y1: f32,
        rgb: [u8; 3],
        width: f32,
    ) -> Result<(), RenderError> {
        let mut builder = PathBuilder::new();
        builder.move_to(x0, y0);
        builder.line_to(x1, y1);
        let path = builder
            .finish()
            .ok_or_else(|| RenderError::Canvas("line".into()))?;
        self.stroke(&path, rgb, width);
        Ok(())
    }

    fn stroke_circle(
        &mut self,
        cx: f32,
        cy: f32,
        r: f32,
        rgb: [u8; 3],
        width: f32,
    ) -> Result<(), RenderError> {
        let path = PathBuilder::from_circle(cx, cy, r)
            .ok_or_else(|| RenderError::Canvas("circle".into()))?;
        self.stroke(&path, rgb, width);
        Ok(())
    }

    fn stroke_rect(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        rgb: [u8; 3],
    ) -> Result<(), RenderError> {
        let path = rect_path(x, y, w, h)?;
        self.stroke(&path, rgb, 2.0);
        Ok(())
    }

    fn stroke(&mut self, path: &Path, rgb: [u8; 3], width: f32) {
        let stroke = Stroke {
            width,
            ..Stroke::default()
        };
        self.canvas
            .stroke_path(path, &paint(rgb), &stroke, Transform::identity(), None);
    }
}

fn color([r, g, b]: [u8; 3]) -> Color {
    Color::from_rgba8(r, g, b, 255)
}

fn paint(rgb: [u8; 3]) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(color(rgb));
    paint.anti_alias = true;
    paint
}

fn rect_path(x: f32, y: f32, w: f32, h: f32) -> Result<Path, RenderError> {
    Rect::from_xywh(x, y, w, h)
        .map(PathBuilder::from_rect)
        .ok_or_else(|| RenderError::Canvas(format!("invalid rect {}x{} at ({}, {})", w, h, x, y)))
}

/// Screen direction of a compass bearing (clockwise from north, y down).
fn bearing_vector(bearing_deg: f64) -> (f32, f32) {
    let rad = bearing_deg.to_radians();
    (rad.sin() as f32, -rad.cos() as f32)
}
