//! Text feature synthesis: measurement, auto-fit support, and extruded
//! glyph solids from font outlines.

use std::fs;
use std::path::Path;

use rusttype::{point, Font, OutlineBuilder, Scale};
use tag_kernel::{Kernel, Profile, SolidHandle};
use tag_layout::{TextLine, TextMeasure};
use tag_types::Params;

use crate::types::{BuildError, TextError};

/// Segments per quadratic bezier when flattening outlines.
const QUAD_SEGMENTS: usize = 8;
/// Segments per cubic bezier.
const CUBIC_SEGMENTS: usize = 12;

/// Font-backed text measurement and glyph geometry.
///
/// Without a font file the system still measures (average-advance
/// heuristic) so layout can be solved, but glyph geometry is unavailable
/// and callers degrade per the external-tool policy.
#[derive(Debug)]
pub struct TextSystem {
    font: Option<Font<'static>>,
}

impl TextSystem {
    /// Load the configured font, or set up heuristic-only measurement when
    /// no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, TextError> {
        let Some(path) = path else {
            return Ok(Self { font: None });
        };
        let data = fs::read(path).map_err(|_| TextError::FontUnavailable {
            path: path.display().to_string(),
        })?;
        let font = Font::try_from_vec(data).ok_or_else(|| TextError::FontUnreadable {
            path: path.display().to_string(),
        })?;
        Ok(Self { font: Some(font) })
    }

    /// Measurement-only system with no glyph geometry.
    pub fn heuristic() -> Self {
        Self { font: None }
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Build one placed line as an extruded glyph solid.
    ///
    /// `base_z` and `height` follow the kernel's extrude convention; emboss
    /// and engrave callers choose them. Fails with `FontUnavailable` when no
    /// font was loaded.
    pub fn line_solid(
        &self,
        kernel: &mut dyn Kernel,
        line: &TextLine,
        base_z: f64,
        height: f64,
    ) -> Result<SolidHandle, BuildError> {
        let font = self.font.as_ref().ok_or(TextError::FontUnavailable {
            path: "(none configured)".to_string(),
        })?;

        let scale = Scale::uniform(line.size as f32);
        let v = font.v_metrics(scale);
        let width = self.line_width(&line.text, line.size);
        let start_x = line.region.cx - width / 2.0;
        let baseline_y = line.region.cy - f64::from(v.ascent + v.descent) / 2.0;

        let mut cursor = 0.0f32;
        let mut prev = None;
        let mut solid: Option<SolidHandle> = None;

        for ch in line.text.chars() {
            let glyph = font.glyph(ch);
            let id = glyph.id();
            if let Some(p) = prev {
                cursor += font.pair_kerning(scale, p, id);
            }
            prev = Some(id);

            let scaled = glyph.scaled(scale);
            let advance = scaled.h_metrics().advance_width;
            let positioned = scaled.positioned(point(cursor, 0.0));
            cursor += advance;

            let mut outline = ContourCollector::new(start_x, baseline_y);
            if !positioned.build_outline(&mut outline) {
                // Whitespace and empty glyphs contribute only advance.
                continue;
            }
            for (outer, holes) in assemble_polygons(outline.finish()) {
                let prism =
                    kernel.extrude(&Profile::Polygon { outer, holes }, base_z, height)?;
                solid = Some(match solid {
                    Some(acc) => kernel.union(&acc, &prism)?,
                    None => prism,
                });
            }
        }

        solid.ok_or(BuildError::Empty)
    }
}

impl TextMeasure for TextSystem {
    fn line_width(&self, text: &str, size: f64) -> f64 {
        match &self.font {
            Some(font) => {
                let scale = Scale::uniform(size as f32);
                let mut width = 0.0f32;
                let mut prev = None;
                for ch in text.chars() {
                    let glyph = font.glyph(ch);
                    let id = glyph.id();
                    if let Some(p) = prev {
                        width += font.pair_kerning(scale, p, id);
                    }
                    width += glyph.scaled(scale).h_metrics().advance_width;
                    prev = Some(id);
                }
                f64::from(width)
            }
            None => text.chars().count() as f64 * size * 0.6,
        }
    }
}

/// Engrave precondition: the cut must leave the minimum wall behind it.
/// Checked immediately before the cut, independent of parameter validation.
pub fn engrave_guard(p: &Params, depth: f64) -> Result<(), TextError> {
    let limit = p.thickness - p.min_wall;
    if depth > limit {
        return Err(TextError::EngraveTooDeep { depth, limit });
    }
    Ok(())
}

/// Collects flattened glyph contours in tag coordinates (mm, Y up).
struct ContourCollector {
    offset_x: f64,
    baseline_y: f64,
    contours: Vec<Vec<[f64; 2]>>,
    current: Vec<[f64; 2]>,
    last: (f32, f32),
}

impl ContourCollector {
    fn new(offset_x: f64, baseline_y: f64) -> Self {
        Self {
            offset_x,
            baseline_y,
            contours: Vec::new(),
            current: Vec::new(),
            last: (0.0, 0.0),
        }
    }

    fn map(&self, x: f32, y: f32) -> [f64; 2] {
        // rusttype outlines are Y-down relative to the baseline.
        [
            self.offset_x + f64::from(x),
            self.baseline_y - f64::from(y),
        ]
    }

    fn push(&mut self, x: f32, y: f32) {
        let p = self.map(x, y);
        if self.current.last() != Some(&p) {
            self.current.push(p);
        }
        self.last = (x, y);
    }

    fn flush(&mut self) {
        if self.current.len() >= 3 {
            let mut contour = std::mem::take(&mut self.current);
            if contour.first() == contour.last() {
                contour.pop();
            }
            if contour.len() >= 3 {
                self.contours.push(contour);
            }
        } else {
            self.current.clear();
        }
    }

    fn finish(mut self) -> Vec<Vec<[f64; 2]>> {
        self.flush();
        self.contours
    }
}

impl OutlineBuilder for ContourCollector {
    fn move_to(&mut self, x: f32, y: f32) {
        self.flush();
        self.push(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.push(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x0, y0) = self.last;
        for i in 1..=QUAD_SEGMENTS {
            let t = i as f32 / QUAD_SEGMENTS as f32;
            let mt = 1.0 - t;
            let qx = mt * mt * x0 + 2.0 * mt * t * x1 + t * t * x;
            let qy = mt * mt * y0 + 2.0 * mt * t * y1 + t * t * y;
            self.push(qx, qy);
        }
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x0, y0) = self.last;
        for i in 1..=CUBIC_SEGMENTS {
            let t = i as f32 / CUBIC_SEGMENTS as f32;
            let mt = 1.0 - t;
            let cx = mt * mt * mt * x0
                + 3.0 * mt * mt * t * x1
                + 3.0 * mt * t * t * x2
                + t * t * t * x;
            let cy = mt * mt * mt * y0
                + 3.0 * mt * mt * t * y1
                + 3.0 * mt * t * t * y2
                + t * t * t * y;
            self.push(cx, cy);
        }
    }

    fn close(&mut self) {
        self.flush();
    }
}

/// Group raw contours into (outer, holes) pairs by containment: a contour
/// whose first point lies inside another contour is that contour's hole.
/// One nesting level, which covers Latin glyphs.
fn assemble_polygons(contours: Vec<Vec<[f64; 2]>>) -> Vec<(Vec<[f64; 2]>, Vec<Vec<[f64; 2]>>)> {
    let n = contours.len();
    let mut container: Vec<Option<usize>> = vec![None; n];

    for i in 0..n {
        let probe = contours[i][0];
        let mut best: Option<(usize, f64)> = None;
        for j in 0..n {
            if i == j || !point_in_polygon(probe, &contours[j]) {
                continue;
            }
            let area = polygon_area_abs(&contours[j]);
            if best.map_or(true, |(_, a)| area < a) {
                best = Some((j, area));
            }
        }
        container[i] = best.map(|(j, _)| j);
    }

    let mut result: Vec<(Vec<[f64; 2]>, Vec<Vec<[f64; 2]>>)> = Vec::new();
    let mut outer_slot: Vec<Option<usize>> = vec![None; n];
    for (i, contour) in contours.iter().enumerate() {
        if container[i].is_none() {
            outer_slot[i] = Some(result.len());
            result.push((contour.clone(), Vec::new()));
        }
    }
    for (i, contour) in contours.into_iter().enumerate() {
        if let Some(parent) = container[i] {
            if let Some(slot) = outer_slot[parent] {
                result[slot].1.push(contour);
            } else {
                // Deeper nesting (a filled island inside a hole): treat as
                // its own outer ring.
                result.push((contour, Vec::new()));
            }
        }
    }
    result
}

fn polygon_area_abs(ring: &[[f64; 2]]) -> f64 {
    tag_kernel::profile::signed_area(ring).abs()
}

fn point_in_polygon(p: [f64; 2], ring: &[[f64; 2]]) -> bool {
    let mut inside = false;
    let n = ring.len();
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = (ring[i][0], ring[i][1]);
        let (xj, yj) = (ring[j][0], ring[j][1]);
        if ((yi > p[1]) != (yj > p[1]))
            && (p[0] < (xj - xi) * (p[1] - yi) / (yj - yi) + xi)
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}
