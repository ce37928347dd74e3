//! Layered vector diagram importer.
//!
//! The browser layout tool exports an SVG whose layer groups carry exact
//! geometry: one outline rectangle, one rectangle per code module, one
//! measured rectangle per text line, and the strap slit. Importing it
//! bypasses the layout solver entirely; coordinates are converted from the
//! canvas's top-left Y-down frame to center-origin Y-up.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use tag_kernel::{Kernel, Profile, SolidHandle};
use tag_layout::{Region, TextLine};
use tag_modeling::body::CUT_EPS;
use tag_modeling::{BuildError, TextSystem};

use crate::error::PipelineError;

/// A rectangle already converted to center-origin coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagramRect {
    pub cx: f64,
    pub cy: f64,
    pub w: f64,
    pub h: f64,
    pub rx: f64,
}

/// A text line with its literal text and measured bounding box.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagramText {
    pub text: String,
    pub cx: f64,
    pub cy: f64,
    pub w: f64,
    pub h: f64,
}

/// Parsed layered diagram.
#[derive(Debug, Clone)]
pub struct Diagram {
    pub canvas_w: f64,
    pub canvas_h: f64,
    pub outline: DiagramRect,
    pub modules: Vec<DiagramRect>,
    pub texts: Vec<DiagramText>,
    pub slit: Option<DiagramRect>,
}

/// Parse a layered SVG document.
pub fn parse_svg_diagram(xml: &str) -> Result<Diagram, PipelineError> {
    let mut reader = Reader::from_str(xml);

    let mut canvas: Option<(f64, f64)> = None;
    let mut layer_stack: Vec<String> = Vec::new();
    let mut outline = None;
    let mut modules = Vec::new();
    let mut texts = Vec::new();
    let mut slit = None;

    loop {
        match reader.read_event().map_err(bad_xml)? {
            Event::Start(e) => match e.name().as_ref() {
                b"svg" => canvas = Some(read_canvas(&e)?),
                b"g" => layer_stack.push(attr(&e, "id")?.unwrap_or_default()),
                b"rect" => {
                    let (cw, ch) = canvas.ok_or_else(|| PipelineError::Diagram {
                        reason: "rect before svg dimensions".to_string(),
                    })?;
                    collect_rect(
                        &e,
                        layer_stack.last().map(String::as_str),
                        cw,
                        ch,
                        &mut outline,
                        &mut modules,
                        &mut texts,
                        &mut slit,
                    )?;
                }
                _ => {}
            },
            Event::Empty(e) => {
                if e.name().as_ref() == b"rect" {
                    let (cw, ch) = canvas.ok_or_else(|| PipelineError::Diagram {
                        reason: "rect before svg dimensions".to_string(),
                    })?;
                    collect_rect(
                        &e,
                        layer_stack.last().map(String::as_str),
                        cw,
                        ch,
                        &mut outline,
                        &mut modules,
                        &mut texts,
                        &mut slit,
                    )?;
                }
            }
            Event::End(e) => {
                if e.name().as_ref() == b"g" {
                    layer_stack.pop();
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let (canvas_w, canvas_h) = canvas.ok_or_else(|| PipelineError::Diagram {
        reason: "missing svg element".to_string(),
    })?;
    let outline = outline.ok_or_else(|| PipelineError::Diagram {
        reason: "no base-shape rectangle in base-outline layer".to_string(),
    })?;

    Ok(Diagram {
        canvas_w,
        canvas_h,
        outline,
        modules,
        texts,
        slit,
    })
}

/// Solids reconstructed from a diagram.
#[derive(Debug, Clone)]
pub struct DiagramBuild {
    /// Plate with slit and feature recesses already cut.
    pub base: SolidHandle,
    /// Combined dual-sided feature stacks, front mirrored.
    pub features: SolidHandle,
    pub module_count: usize,
}

/// Rebuild the dual-stack solids from exact diagram geometry.
///
/// Depth per side is `(thickness - web) / 2`, the front stack is mirrored
/// across the vertical symmetry plane before the union, and the slit is cut
/// through the plate. Text lines need a font; without one they are skipped
/// with a warning.
pub fn build_diagram_solids(
    kernel: &mut dyn Kernel,
    d: &Diagram,
    thickness: f64,
    web_thickness: f64,
    text_system: Option<&TextSystem>,
    warnings: &mut Vec<String>,
) -> Result<DiagramBuild, PipelineError> {
    let half = (thickness - web_thickness) / 2.0;
    let t2 = thickness / 2.0;

    let mut base = kernel
        .extrude(
            &Profile::RoundedRect {
                cx: d.outline.cx,
                cy: d.outline.cy,
                w: d.outline.w,
                h: d.outline.h,
                r: d.outline.rx,
            },
            -t2,
            thickness,
        )
        .map_err(BuildError::from)?;

    let mut front: Option<SolidHandle> = None;
    let mut back: Option<SolidHandle> = None;
    for m in &d.modules {
        let profile = Profile::Rect {
            cx: m.cx,
            cy: m.cy,
            w: m.w,
            h: m.h,
        };
        let f = kernel.extrude(&profile, -t2, half).map_err(BuildError::from)?;
        let b = kernel.extrude(&profile, t2 - half, half).map_err(BuildError::from)?;
        front = Some(match front {
            Some(acc) => kernel.union(&acc, &f).map_err(BuildError::from)?,
            None => f,
        });
        back = Some(match back {
            Some(acc) => kernel.union(&acc, &b).map_err(BuildError::from)?,
            None => b,
        });
    }

    if let Some(ts) = text_system {
        for text in &d.texts {
            let line = TextLine {
                text: text.text.clone(),
                // Glyph height from the measured box, as the layout tool
                // renders with line spacing included.
                size: text.h * 0.7,
                region: Region::new("diagram_text", text.cx, text.cy, text.w, text.h, 0.0),
            };
            let f = ts.line_solid(kernel, &line, -t2, half)?;
            let b = ts.line_solid(kernel, &line, t2 - half, half)?;
            front = Some(match front {
                Some(acc) => kernel.union(&acc, &f).map_err(BuildError::from)?,
                None => f,
            });
            back = Some(match back {
                Some(acc) => kernel.union(&acc, &b).map_err(BuildError::from)?,
                None => b,
            });
        }
    } else if !d.texts.is_empty() {
        warnings.push(format!(
            "diagram text skipped: no font loaded ({} lines)",
            d.texts.len()
        ));
    }

    let (front, back) = match (front, back) {
        (Some(f), Some(b)) => (f, b),
        _ => {
            return Err(PipelineError::Diagram {
                reason: "diagram has no feature geometry".to_string(),
            })
        }
    };

    // The load-bearing step: mirror the front stack before combining, so
    // the code reads correctly from the reverse face.
    let front = kernel.mirror_x(&front).map_err(BuildError::from)?;
    let features = kernel.union(&front, &back).map_err(BuildError::from)?;

    if let Some(slit) = &d.slit {
        let tool = kernel
            .extrude(
                &Profile::Slot {
                    cx: slit.cx,
                    cy: slit.cy,
                    w: slit.w,
                    l: slit.h,
                },
                -t2 - CUT_EPS,
                thickness + 2.0 * CUT_EPS,
            )
            .map_err(BuildError::from)?;
        base = kernel.subtract(&base, &tool).map_err(BuildError::from)?;
    }

    let base = kernel.subtract(&base, &features).map_err(BuildError::from)?;

    Ok(DiagramBuild {
        base,
        features,
        module_count: d.modules.len(),
    })
}

fn read_canvas(e: &BytesStart<'_>) -> Result<(f64, f64), PipelineError> {
    let w = num_attr(e, "width")?.ok_or_else(|| PipelineError::Diagram {
        reason: "svg missing width".to_string(),
    })?;
    let h = num_attr(e, "height")?.ok_or_else(|| PipelineError::Diagram {
        reason: "svg missing height".to_string(),
    })?;
    Ok((w, h))
}

#[allow(clippy::too_many_arguments)]
fn collect_rect(
    e: &BytesStart<'_>,
    layer: Option<&str>,
    canvas_w: f64,
    canvas_h: f64,
    outline: &mut Option<DiagramRect>,
    modules: &mut Vec<DiagramRect>,
    texts: &mut Vec<DiagramText>,
    slit: &mut Option<DiagramRect>,
) -> Result<(), PipelineError> {
    let Some(layer) = layer else {
        return Ok(());
    };

    let x = num_attr(e, "x")?.unwrap_or(0.0);
    let y = num_attr(e, "y")?.unwrap_or(0.0);
    let w = num_attr(e, "width")?.unwrap_or(0.0);
    let h = num_attr(e, "height")?.unwrap_or(0.0);
    let class = attr(e, "class")?.unwrap_or_default();

    // Top-left Y-down canvas frame to center-origin Y-up.
    let cx = x + w / 2.0 - canvas_w / 2.0;
    let cy = canvas_h / 2.0 - (y + h / 2.0);

    match layer {
        "base-outline" if class == "base-shape" => {
            *outline = Some(DiagramRect {
                cx,
                cy,
                w,
                h,
                rx: num_attr(e, "rx")?.unwrap_or(0.0),
            });
        }
        "qr-modules" if class == "qr-module" => {
            modules.push(DiagramRect {
                cx,
                cy,
                w,
                h,
                rx: 0.0,
            });
        }
        "text-features" => {
            if let Some(text) = attr(e, "data-text")? {
                texts.push(DiagramText { text, cx, cy, w, h });
            }
        }
        "slit-cutout" if class == "slit-cutout" => {
            *slit = Some(DiagramRect {
                cx,
                cy,
                w,
                h,
                rx: num_attr(e, "rx")?.unwrap_or(w / 2.0),
            });
        }
        _ => {}
    }
    Ok(())
}

fn attr(e: &BytesStart<'_>, name: &str) -> Result<Option<String>, PipelineError> {
    for a in e.attributes() {
        let a = a.map_err(|err| PipelineError::Diagram {
            reason: err.to_string(),
        })?;
        if a.key.as_ref() == name.as_bytes() {
            let value = a.unescape_value().map_err(bad_xml)?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn num_attr(e: &BytesStart<'_>, name: &str) -> Result<Option<f64>, PipelineError> {
    let Some(raw) = attr(e, name)? else {
        return Ok(None);
    };
    // Canvas dimensions may carry a unit suffix ("240mm").
    let trimmed = raw.trim_end_matches(|c: char| c.is_ascii_alphabetic());
    trimmed
        .parse::<f64>()
        .map(Some)
        .map_err(|_| PipelineError::Diagram {
            reason: format!("attribute {name}='{raw}' is not a number"),
        })
}

fn bad_xml(e: quick_xml::Error) -> PipelineError {
    PipelineError::Diagram {
        reason: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tag_kernel::MockKernel;

    const SAMPLE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="240" height="94">
      <g id="base-outline" data-description="plate">
        <rect class="base-shape" x="0" y="0" width="240" height="94" rx="4"/>
      </g>
      <g id="qr-modules" data-description="code">
        <rect class="qr-module" x="10" y="10" width="2" height="2"/>
        <rect class="qr-module" x="14" y="10" width="2" height="2"/>
        <rect class="qr-module" x="10" y="14" width="2" height="2"/>
      </g>
      <g id="text-features">
        <rect data-text="CALL ME" x="100" y="40" width="60" height="8"/>
      </g>
      <g id="slit-cutout">
        <rect class="slit-cutout" x="225" y="37" width="4.5" height="20" rx="2.25"/>
      </g>
    </svg>"#;

    #[test]
    fn layers_parse_with_converted_coordinates() {
        let d = parse_svg_diagram(SAMPLE).unwrap();
        assert_eq!(d.canvas_w, 240.0);
        assert_eq!(d.outline.w, 240.0);
        assert_eq!(d.modules.len(), 3);
        // x=10,w=2 -> cx = 11 - 120 = -109; y=10,h=2 -> cy = 47 - 11 = 36.
        assert!((d.modules[0].cx + 109.0).abs() < 1e-9);
        assert!((d.modules[0].cy - 36.0).abs() < 1e-9);
        assert_eq!(d.texts.len(), 1);
        assert_eq!(d.texts[0].text, "CALL ME");
        let slit = d.slit.as_ref().unwrap();
        assert!((slit.cx - 107.25).abs() < 1e-9);
        assert!((slit.cy - 0.0).abs() < 1e-9);
    }

    #[test]
    fn missing_outline_is_rejected() {
        let xml = r#"<svg width="10" height="10"><g id="qr-modules"></g></svg>"#;
        let err = parse_svg_diagram(xml).unwrap_err();
        assert!(matches!(err, PipelineError::Diagram { .. }));
    }

    #[test]
    fn diagram_build_mirrors_the_front_stack() {
        let d = parse_svg_diagram(SAMPLE).unwrap();
        let mut kernel = MockKernel::new();
        let mut warnings = Vec::new();
        let build =
            build_diagram_solids(&mut kernel, &d, 3.0, 0.4, None, &mut warnings).unwrap();

        assert_eq!(build.module_count, 3);
        // Text lines were skipped without a font, with a warning.
        assert_eq!(warnings.len(), 1);

        let boxes = kernel.boxes(&build.features).unwrap();
        // 3 mirrored front prisms then 3 back prisms.
        assert_eq!(boxes.len(), 6);
        let (front, back) = boxes.split_at(3);
        for (f, b) in front.iter().zip(back.iter()) {
            assert!((f.center()[0] + b.center()[0]).abs() < 1e-9, "mirrored x");
            assert!((f.center()[1] - b.center()[1]).abs() < 1e-9);
            assert!(f.max[2] < b.min[2], "front below web, back above");
        }
    }

    #[test]
    fn half_depth_leaves_the_web() {
        let d = parse_svg_diagram(SAMPLE).unwrap();
        let mut kernel = MockKernel::new();
        let mut warnings = Vec::new();
        let build =
            build_diagram_solids(&mut kernel, &d, 3.0, 0.4, None, &mut warnings).unwrap();
        let boxes = kernel.boxes(&build.features).unwrap();
        let front_top = boxes[0].max[2];
        let back_bottom = boxes[3].min[2];
        assert!((back_bottom - front_top - 0.4).abs() < 1e-9);
        assert!((boxes[0].size()[2] - 1.3).abs() < 1e-9);
    }
}
