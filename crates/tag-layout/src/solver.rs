use tag_types::{CodeMode, Params, TextEdge};

use crate::region::Region;

/// Gap between the code column and the text column.
pub const GUTTER: f64 = 4.0;
/// Smallest readable glyph height; auto-fit never goes below it.
pub const MIN_TEXT_H: f64 = 2.5;
/// Clearance margin around placed text lines.
const TEXT_MARGIN: f64 = 0.5;
/// Clearance margin around the strap cavity.
const STRAP_MARGIN: f64 = 3.0;
/// How far the fallback candidate moves a line away from its edge anchor.
const FALLBACK_SHIFT: f64 = 8.0;

/// Measures rendered text width at a given glyph height.
pub trait TextMeasure {
    fn line_width(&self, text: &str, size: f64) -> f64;
}

/// Width heuristic used when no font metrics are available: average glyph
/// advance of 0.6 em.
pub struct CharCountMeasure;

impl TextMeasure for CharCountMeasure {
    fn line_width(&self, text: &str, size: f64) -> f64 {
        text.chars().count() as f64 * size * 0.6
    }
}

/// A text line with its placement and fitted glyph height.
#[derive(Debug, Clone)]
pub struct TextLine {
    pub text: String,
    pub size: f64,
    pub region: Region,
}

/// Solved placement of everything on the tag.
#[derive(Debug, Clone)]
pub struct Layout {
    pub plate_w: f64,
    pub plate_h: f64,
    /// Square code block in the left column.
    pub code: Region,
    /// Strap cavity footprint; sits above the content area by construction.
    pub strap: Region,
    /// Front-face prompt, zero or one line.
    pub front_lines: Vec<TextLine>,
    /// Back-face contact lines, top to bottom.
    pub back_lines: Vec<TextLine>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error("feature '{a}' overlaps feature '{b}'")]
    FeatureOverlap { a: String, b: String },

    #[error("feature '{name}' extends outside the content area")]
    OutOfBounds { name: String },

    #[error("text column too narrow: {width:.2}mm available")]
    ColumnTooNarrow { width: f64 },

    #[error("invalid layout config: {reason}")]
    BadConfig { reason: String },
}

/// Shrink a line to fit `max_w`, clamped to the minimum readable size.
/// Returns (size, width). Text is never truncated; a line that stays too
/// wide at minimum size is reported by the placement checks instead.
pub fn fit_line(
    text: &str,
    nominal: f64,
    max_w: f64,
    measure: &dyn TextMeasure,
) -> (f64, f64) {
    let width = measure.line_width(text, nominal);
    if width <= max_w || width <= 0.0 {
        return (nominal, width);
    }
    let scaled = (nominal * max_w / width).max(MIN_TEXT_H);
    (scaled, measure.line_width(text, scaled))
}

/// Compute non-overlapping placements for all configured content.
///
/// Greedy column partition: the left column holds the square code block,
/// the remainder (minus a gutter) is the text column. The strap anchor sits
/// at its fixed offset from the top edge and acts as an obstacle. Candidate
/// positions are tried in a fixed order, first valid wins.
pub fn solve(p: &Params, measure: &dyn TextMeasure) -> Result<Layout, LayoutError> {
    let plate_w = p.plate_w();
    let plate_h = p.plate_h();

    // Content area: the plate minus its border.
    let (cl, cr) = (-p.code_w / 2.0, p.code_w / 2.0);
    let (cb, ct) = (-p.code_h / 2.0, p.code_h / 2.0);

    let strap_w = if p.strap_is_slot() {
        p.strap_slot_w
    } else {
        p.strap_hole_d
    };
    let strap = Region::new(
        "strap_anchor",
        0.0,
        plate_h / 2.0 - p.min_wall - p.strap_extent() / 2.0,
        strap_w,
        p.strap_extent(),
        STRAP_MARGIN,
    );

    let code_side = p.code_w.min(p.code_h);
    let code = Region::new("code_block", cl + code_side / 2.0, 0.0, code_side, code_side, 0.0);
    if !code.inside(cl, cb, cr, ct) {
        return Err(LayoutError::OutOfBounds {
            name: code.name.clone(),
        });
    }

    let col_left = code.right() + GUTTER;
    let col_right = cr;
    let col_w = col_right - col_left;
    let col_cx = (col_left + col_right) / 2.0;
    let avail_w = col_w - 2.0 * TEXT_MARGIN;

    let mut front_lines = Vec::new();
    if !p.front_text.is_empty() {
        if avail_w <= 0.0 {
            return Err(LayoutError::ColumnTooNarrow { width: col_w });
        }
        let (size, width) = fit_line(&p.front_text, p.front_text_h, avail_w, measure);
        let primary = match p.front_edge {
            TextEdge::Bottom => cb + TEXT_MARGIN + size / 2.0,
            TextEdge::Top => ct - TEXT_MARGIN - size / 2.0,
        };
        let fallback = match p.front_edge {
            TextEdge::Bottom => primary + FALLBACK_SHIFT,
            TextEdge::Top => primary - FALLBACK_SHIFT,
        };
        let line = place_line(
            "front_prompt",
            &p.front_text,
            size,
            width,
            col_cx,
            &[primary, fallback],
            (cl, cb, cr, ct),
            &[&code, &strap],
        )?;
        front_lines.push(line);
    }

    let mut back_lines = Vec::new();
    let back_texts: Vec<(&str, &str)> = [
        ("back_name", p.back_name.as_str()),
        ("back_phone", p.back_phone.as_str()),
        ("back_address", p.back_address.as_str()),
    ]
    .into_iter()
    .filter(|(_, text)| !text.is_empty())
    .collect();

    if !back_texts.is_empty() {
        if avail_w <= 0.0 {
            return Err(LayoutError::ColumnTooNarrow { width: col_w });
        }
        let fitted: Vec<(&str, &str, f64, f64)> = back_texts
            .iter()
            .map(|(name, text)| {
                let (size, width) = fit_line(text, p.back_text_h, avail_w, measure);
                (*name, *text, size, width)
            })
            .collect();
        let total_h: f64 = fitted.iter().map(|(_, _, size, _)| *size).sum::<f64>()
            + p.back_line_gap * (fitted.len() as f64 - 1.0);

        // The dual-stack mode carries the code through to the back face, so
        // the block must clear it there too.
        let mut obstacles: Vec<&Region> = vec![&strap];
        if p.code_mode == CodeMode::DualMirrored {
            obstacles.push(&code);
        }

        // Candidate block tops: vertically centered, then dropped below the
        // strap clearance.
        let centered_top = total_h / 2.0;
        let lowered_top = strap.bottom() - TEXT_MARGIN;
        let mut last_err = None;
        for block_top in [centered_top, lowered_top] {
            let mut lines = Vec::new();
            let mut y = block_top;
            for (name, text, size, width) in &fitted {
                let region = Region::new(
                    *name,
                    col_cx,
                    y - size / 2.0,
                    *width,
                    *size,
                    TEXT_MARGIN,
                );
                y -= size + p.back_line_gap;
                lines.push(TextLine {
                    text: (*text).to_string(),
                    size: *size,
                    region,
                });
            }

            // Each line must clear the fixed obstacles and every line placed
            // above it.
            let mut all = obstacles.clone();
            let mut ok = true;
            for line in &lines {
                if let Err(e) = check_placed(&line.region, (cl, cb, cr, ct), &all) {
                    last_err = Some(e);
                    ok = false;
                    break;
                }
                all.push(&line.region);
            }
            if ok {
                back_lines = lines;
                last_err = None;
                break;
            }
        }
        if let Some(e) = last_err {
            return Err(e);
        }
    }

    Ok(Layout {
        plate_w,
        plate_h,
        code,
        strap,
        front_lines,
        back_lines,
    })
}

/// Try candidate y positions in order; the first that validates wins.
#[allow(clippy::too_many_arguments)]
fn place_line(
    name: &str,
    text: &str,
    size: f64,
    width: f64,
    cx: f64,
    candidates: &[f64],
    bounds: (f64, f64, f64, f64),
    obstacles: &[&Region],
) -> Result<TextLine, LayoutError> {
    let mut last_err = LayoutError::OutOfBounds {
        name: name.to_string(),
    };
    for &cy in candidates {
        let region = Region::new(name, cx, cy, width, size, TEXT_MARGIN);
        match check_placed(&region, bounds, obstacles) {
            Ok(()) => {
                return Ok(TextLine {
                    text: text.to_string(),
                    size,
                    region,
                })
            }
            Err(e) => last_err = e,
        }
    }
    Err(last_err)
}

fn check_placed(
    region: &Region,
    (cl, cb, cr, ct): (f64, f64, f64, f64),
    obstacles: &[&Region],
) -> Result<(), LayoutError> {
    if !region.inside(cl, cb, cr, ct) {
        return Err(LayoutError::OutOfBounds {
            name: region.name.clone(),
        });
    }
    for other in obstacles {
        if region.overlaps(other) {
            return Err(LayoutError::FeatureOverlap {
                a: region.name.clone(),
                b: other.name.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wide_params() -> Params {
        Params {
            code_w: 80.0,
            ..Params::default()
        }
    }

    #[test]
    fn defaults_without_text_solve() {
        let layout = solve(&Params::default(), &CharCountMeasure).unwrap();
        assert_eq!(layout.code.w, 30.0);
        assert_eq!(layout.code.h, 30.0);
        // Anchor clears the top edge by one wall thickness.
        assert!((layout.strap.cy - (18.0 - 1.5 - 2.5)).abs() < 1e-9);
        assert!(layout.front_lines.is_empty());
        assert!(layout.back_lines.is_empty());
    }

    #[test]
    fn back_lines_stack_downward_with_gap() {
        let p = Params {
            back_name: "ALEX PARKER".into(),
            back_phone: "+1-555-010-2030".into(),
            back_address: "12 HARBOR LANE".into(),
            ..wide_params()
        };
        let layout = solve(&p, &CharCountMeasure).unwrap();
        assert_eq!(layout.back_lines.len(), 3);
        for pair in layout.back_lines.windows(2) {
            let upper = &pair[0].region;
            let lower = &pair[1].region;
            assert!(upper.cy > lower.cy);
            let gap = (upper.cy - upper.h / 2.0) - (lower.cy + lower.h / 2.0);
            assert!((gap - p.back_line_gap).abs() < 1e-9);
        }
    }

    #[test]
    fn solver_is_deterministic() {
        let p = Params {
            front_text: "SCAN TO RETURN".into(),
            back_name: "ALEX PARKER".into(),
            ..wide_params()
        };
        let a = solve(&p, &CharCountMeasure).unwrap();
        let b = solve(&p, &CharCountMeasure).unwrap();
        assert_eq!(a.code, b.code);
        assert_eq!(a.front_lines[0].region, b.front_lines[0].region);
        assert_eq!(a.back_lines[0].region, b.back_lines[0].region);
    }

    #[test]
    fn long_line_autofits_but_is_never_truncated() {
        let p = Params {
            front_text: "IF FOUND PLEASE SCAN MY CODE".into(),
            ..wide_params()
        };
        let layout = solve(&p, &CharCountMeasure).unwrap();
        let line = &layout.front_lines[0];
        assert!(line.size < p.front_text_h);
        assert!(line.size >= MIN_TEXT_H);
        assert_eq!(line.text, p.front_text);
    }

    #[test]
    fn square_code_region_leaves_no_text_column() {
        let p = Params {
            code_w: 30.0,
            code_h: 30.0,
            front_text: "HELLO".into(),
            ..Params::default()
        };
        let err = solve(&p, &CharCountMeasure).unwrap_err();
        assert!(matches!(err, LayoutError::ColumnTooNarrow { .. }));
    }

    #[test]
    fn top_anchored_prompt_falls_back_below_the_strap() {
        let p = Params {
            front_text: "FOUND THIS TAG? SCAN ME!".into(),
            front_edge: TextEdge::Top,
            ..wide_params()
        };
        let layout = solve(&p, &CharCountMeasure).unwrap();
        let line = &layout.front_lines[0];
        let primary_cy = p.code_h / 2.0 - 0.5 - line.size / 2.0;
        assert!(line.region.cy < primary_cy - 1.0, "expected fallback position");
        assert!(!line.region.overlaps(&layout.strap));
    }

    #[test]
    fn overlap_error_names_both_features() {
        // Huge text in a column that cannot hold it lands on the code block.
        let p = Params {
            code_w: 60.0,
            back_name: "A VERY LONG CONTACT LINE THAT CANNOT POSSIBLY FIT".into(),
            back_text_h: 12.0,
            ..Params::default()
        };
        let err = solve(&p, &CharCountMeasure).unwrap_err();
        match err {
            LayoutError::FeatureOverlap { a, b } => {
                assert_eq!(a, "back_name");
                assert!(!b.is_empty());
            }
            LayoutError::OutOfBounds { name } => assert_eq!(name, "back_name"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
