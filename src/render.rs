use rusttype::{point, Font, PositionedGlyph, Scale};
use std::f64::consts::TAU;

use crate::config::{Color, WheelConfig};
use crate::error::{Result, WheelError};
use crate::model::{Sector, WheelGeometry};

// ============================================================================
// DRAWING SURFACE
// ============================================================================

/// RGBA8 frame wrapper; one pixel per four bytes, row-major.
pub struct Canvas<'a> {
    pub frame: &'a mut [u8],
    pub width: usize,
    pub height: usize,
}

impl<'a> Canvas<'a> {
    pub fn new(frame: &'a mut [u8], width: usize, height: usize) -> Self {
        Self {
            frame,
            width,
            height,
        }
    }

    fn clear(&mut self, color: (u8, u8, u8)) {
        for chunk in self.frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&[color.0, color.1, color.2, 0xff]);
        }
    }
}

// ============================================================================
// RETAINED MODE ABSTRACTIONS
// ============================================================================

#[derive(Clone, Debug)]
enum DrawCommand {
    Clear(Color),
    /// Annular wedge between two radii across `[start_angle, start_angle+span)`.
    /// A full ring is a wedge whose span is `2*pi`.
    Wedge {
        cx: i32,
        cy: i32,
        inner_radius: f64,
        outer_radius: f64,
        start_angle: f64,
        span: f64,
        color: Color,
    },
    Line {
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        thickness: f32,
        color: Color,
    },
    Circle {
        cx: i32,
        cy: i32,
        radius: i32,
        color: Color,
    },
    Triangle {
        points: [(i32, i32); 3],
        color: Color,
    },
    Text {
        x: i32,
        y: i32,
        text: String,
        font_size: f32,
        color: Color,
    },
}

struct Scene {
    commands: Vec<DrawCommand>,
}

impl Scene {
    fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    fn add_command(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    fn render(&self, canvas: &mut Canvas, config: &WheelConfig) {
        let font = config.font_data.as_ref().and_then(|bytes| {
            let font = Font::try_from_vec(bytes.clone());
            if font.is_none() {
                log::warn!("label font data is not a usable font; labels skipped");
            }
            font
        });

        for command in &self.commands {
            match command {
                DrawCommand::Clear(color) => canvas.clear(color.as_tuple()),
                DrawCommand::Wedge {
                    cx,
                    cy,
                    inner_radius,
                    outer_radius,
                    start_angle,
                    span,
                    color,
                } => render_wedge(
                    canvas,
                    *cx,
                    *cy,
                    *inner_radius,
                    *outer_radius,
                    *start_angle,
                    *span,
                    color.as_tuple(),
                ),
                DrawCommand::Line {
                    x0,
                    y0,
                    x1,
                    y1,
                    thickness,
                    color,
                } => draw_thick_line_aa(canvas, *x0, *y0, *x1, *y1, *thickness, color.as_tuple()),
                DrawCommand::Circle {
                    cx,
                    cy,
                    radius,
                    color,
                } => draw_circle(canvas, *cx, *cy, *radius, color.as_tuple()),
                DrawCommand::Triangle { points, color } => {
                    fill_triangle(canvas, *points, color.as_tuple())
                }
                DrawCommand::Text {
                    x,
                    y,
                    text,
                    font_size,
                    color,
                } => {
                    if let Some(font) = &font {
                        draw_text(
                            canvas,
                            *x,
                            *y,
                            text,
                            font,
                            Scale::uniform(*font_size),
                            color.as_tuple(),
                        );
                    }
                }
            }
        }
    }
}

// ============================================================================
// WHEEL SCENE
// ============================================================================

/// Draw the whole wheel at an absolute rotation angle.
///
/// Stateless: the same `(geometry, sectors, rotation, highlight)` always
/// produces the same pixels, so this serves both the animation loop and
/// one-off static redraws. The rotation is just "where the wheel is right
/// now"; no relationship to elapsed time is assumed. A wheel with zero
/// sectors is refused rather than drawn as a degenerate full-circle wedge.
pub fn draw(
    canvas: &mut Canvas,
    geometry: &WheelGeometry,
    sectors: &[Sector],
    config: &WheelConfig,
    rotation: f64,
    highlight: Option<usize>,
) -> Result<()> {
    if sectors.is_empty() {
        return Err(WheelError::EmptyWheel);
    }
    build_scene(geometry, sectors, config, rotation, highlight).render(canvas, config);
    Ok(())
}

fn build_scene(
    geometry: &WheelGeometry,
    sectors: &[Sector],
    config: &WheelConfig,
    rotation: f64,
    highlight: Option<usize>,
) -> Scene {
    let mut scene = Scene::new();
    scene.add_command(DrawCommand::Clear(config.background_color));

    let cx = geometry.center_x;
    let cy = geometry.center_y;
    let radius = geometry.radius as f64;
    let hub_radius = radius * config.hub_radius_factor;
    let count = sectors.len();
    let w = TAU / count as f64;
    let colors = category_colors(sectors, &config.palette);

    // Wedges
    for (i, color) in colors.iter().enumerate() {
        let color = if highlight == Some(i) {
            config.highlight_color
        } else {
            *color
        };
        scene.add_command(DrawCommand::Wedge {
            cx,
            cy,
            inner_radius: hub_radius,
            outer_radius: radius,
            start_angle: i as f64 * w + rotation,
            span: w,
            color,
        });
    }

    // Dividers along sector boundaries; skipped for a single sector, whose
    // "boundary" would be a lone spoke.
    if count > 1 {
        for i in 0..count {
            let angle = i as f64 * w + rotation;
            let (sin, cos) = (angle.sin(), angle.cos());
            scene.add_command(DrawCommand::Line {
                x0: cx + (cos * hub_radius) as i32,
                y0: cy + (sin * hub_radius) as i32,
                x1: cx + (cos * radius) as i32,
                y1: cy + (sin * radius) as i32,
                thickness: config.divider_thickness,
                color: config.rim_color,
            });
        }
    }

    // Rim ring
    scene.add_command(DrawCommand::Wedge {
        cx,
        cy,
        inner_radius: radius,
        outer_radius: radius + config.rim_thickness as f64,
        start_angle: 0.0,
        span: TAU,
        color: config.rim_color,
    });

    // Center hub: ring then fill
    scene.add_command(DrawCommand::Circle {
        cx,
        cy,
        radius: hub_radius as i32 + config.rim_thickness,
        color: config.rim_color,
    });
    scene.add_command(DrawCommand::Circle {
        cx,
        cy,
        radius: hub_radius as i32,
        color: config.hub_color,
    });

    // Labels at each wedge's mid-angle
    for (i, sector) in sectors.iter().enumerate() {
        let angle = (i as f64 + 0.5) * w + rotation;
        let label_radius = radius * config.label_radius_factor;
        scene.add_command(DrawCommand::Text {
            x: cx + (angle.cos() * label_radius) as i32,
            y: cy + (angle.sin() * label_radius) as i32,
            text: sector.label.clone(),
            font_size: config.label_font_size,
            color: config.text_color,
        });
    }

    // Pointer at angle 0 in the un-rotated frame, tip reaching into the rim
    let tip_x = cx + (radius * (1.0 - config.pointer_depth_factor)) as i32;
    let base_x = cx + geometry.radius + config.pointer_overhang;
    scene.add_command(DrawCommand::Triangle {
        points: [
            (tip_x, cy),
            (base_x, cy - config.pointer_half_width),
            (base_x, cy + config.pointer_half_width),
        ],
        color: config.pointer_color,
    });

    scene
}

/// Wedge fill color per sector: categories get palette entries in order of
/// first appearance, cycling when there are more categories than entries.
fn category_colors(sectors: &[Sector], palette: &[Color]) -> Vec<Color> {
    if palette.is_empty() {
        return vec![Color::new(0x2a, 0x2a, 0x2a); sectors.len()];
    }
    let mut seen: Vec<&str> = Vec::new();
    sectors
        .iter()
        .map(|sector| {
            let idx = match seen.iter().position(|c| *c == sector.category) {
                Some(i) => i,
                None => {
                    seen.push(&sector.category);
                    seen.len() - 1
                }
            };
            palette[idx % palette.len()]
        })
        .collect()
}

// ============================================================================
// DRAWING PRIMITIVES
// ============================================================================

fn set_pixel(canvas: &mut Canvas, x: i32, y: i32, color: (u8, u8, u8), alpha: f32) {
    if x < 0 || y < 0 || x as usize >= canvas.width {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    if y >= canvas.frame.len() / (canvas.width * 4) {
        return;
    }
    let idx = (y * canvas.width + x) * 4;
    let src = [color.0 as f32, color.1 as f32, color.2 as f32, 255.0 * alpha];
    let dst = [
        canvas.frame[idx] as f32,
        canvas.frame[idx + 1] as f32,
        canvas.frame[idx + 2] as f32,
        canvas.frame[idx + 3] as f32,
    ];
    let a = src[3] / 255.0;
    let out = [
        (src[0] * a + dst[0] * (1.0 - a)).round() as u8,
        (src[1] * a + dst[1] * (1.0 - a)).round() as u8,
        (src[2] * a + dst[2] * (1.0 - a)).round() as u8,
        0xff,
    ];
    canvas.frame[idx..idx + 4].copy_from_slice(&out);
}

fn render_wedge(
    canvas: &mut Canvas,
    cx: i32,
    cy: i32,
    inner_radius: f64,
    outer_radius: f64,
    start_angle: f64,
    span: f64,
    color: (u8, u8, u8),
) {
    let reach = outer_radius.ceil() as i32 + 1;
    let y_lo = (cy - reach).max(0);
    let y_hi = (cy + reach).min(canvas.height as i32 - 1);
    let x_lo = (cx - reach).max(0);
    let x_hi = (cx + reach).min(canvas.width as i32 - 1);

    let start = start_angle.rem_euclid(TAU);
    let end = start + span;

    for y in y_lo..=y_hi {
        for x in x_lo..=x_hi {
            let dx = (x - cx) as f64;
            let dy = (y - cy) as f64;
            let dist = (dx * dx + dy * dy).sqrt();
            if dist > outer_radius + 1.0 || dist < inner_radius - 1.0 {
                continue;
            }
            let mut angle = dy.atan2(dx);
            if angle < 0.0 {
                angle += TAU;
            }
            let in_span = if end < TAU {
                angle >= start && angle < end
            } else {
                angle >= start || angle < end - TAU
            };
            if !in_span {
                continue;
            }
            let aa_outer = if dist > outer_radius {
                1.0 - (dist - outer_radius).min(1.0)
            } else {
                1.0
            };
            let aa_inner = if dist < inner_radius {
                1.0 - (inner_radius - dist).min(1.0)
            } else {
                1.0
            };
            let aa = aa_outer.min(aa_inner);
            if aa > 0.01 {
                set_pixel(canvas, x, y, color, aa as f32);
            }
        }
    }
}

fn draw_thick_line_aa(
    canvas: &mut Canvas,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    thickness: f32,
    color: (u8, u8, u8),
) {
    let min_x = x0.min(x1) - thickness.ceil() as i32 - 1;
    let max_x = x0.max(x1) + thickness.ceil() as i32 + 1;
    let min_y = y0.min(y1) - thickness.ceil() as i32 - 1;
    let max_y = y0.max(y1) + thickness.ceil() as i32 + 1;
    let dx = (x1 - x0) as f32;
    let dy = (y1 - y0) as f32;
    let len_sq = dx * dx + dy * dy;
    if len_sq <= f32::EPSILON {
        return;
    }
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let px = x as f32 - x0 as f32;
            let py = y as f32 - y0 as f32;
            let t = ((px * dx + py * dy) / len_sq).clamp(0.0, 1.0);
            let lx = x0 as f32 + t * dx;
            let ly = y0 as f32 + t * dy;
            let dist = ((lx - x as f32).powi(2) + (ly - y as f32).powi(2)).sqrt();
            let aa = (1.0 - (dist - thickness / 2.0).clamp(0.0, 1.0)).clamp(0.0, 1.0);
            if aa > 0.01 {
                set_pixel(canvas, x, y, color, aa);
            }
        }
    }
}

fn draw_circle(canvas: &mut Canvas, cx: i32, cy: i32, radius: i32, color: (u8, u8, u8)) {
    for y in -radius..=radius {
        for x in -radius..=radius {
            let dist = ((x * x + y * y) as f64).sqrt();
            let aa = if dist > radius as f64 {
                1.0 - (dist - radius as f64).min(1.0)
            } else {
                1.0
            };
            if dist <= radius as f64 + 1.0 && aa > 0.0 {
                set_pixel(canvas, cx + x, cy + y, color, aa as f32);
            }
        }
    }
}

// Scanline fill, vertices sorted by y; long edge interpolated against the
// two short edges.
fn fill_triangle(canvas: &mut Canvas, mut points: [(i32, i32); 3], color: (u8, u8, u8)) {
    points.sort_by_key(|p| p.1);
    let [(x0, y0), (x1, y1), (x2, y2)] = points;
    let total_height = y2 - y0;
    if total_height == 0 {
        return;
    }
    for y in y0..=y2 {
        let second_half = y > y1 || y1 == y0;
        let segment_height = if second_half { y2 - y1 } else { y1 - y0 };
        if segment_height == 0 {
            continue;
        }
        let alpha = (y - y0) as f64 / total_height as f64;
        let beta = (y - if second_half { y1 } else { y0 }) as f64 / segment_height as f64;
        let ax = x0 as f64 + (x2 - x0) as f64 * alpha;
        let bx = if second_half {
            x1 as f64 + (x2 - x1) as f64 * beta
        } else {
            x0 as f64 + (x1 - x0) as f64 * beta
        };
        let (lo, hi) = if ax <= bx { (ax, bx) } else { (bx, ax) };
        for x in lo.round() as i32..=hi.round() as i32 {
            set_pixel(canvas, x, y, color, 1.0);
        }
    }
}

fn draw_text(
    canvas: &mut Canvas,
    x: i32,
    y: i32,
    text: &str,
    font: &Font,
    scale: Scale,
    color: (u8, u8, u8),
) {
    let v_metrics = font.v_metrics(scale);
    let glyphs: Vec<PositionedGlyph> = font
        .layout(text, scale, point(0.0, v_metrics.ascent))
        .collect();
    // Bounding box of the whole string, for centering on (x, y)
    let (min_x, max_x, min_y, max_y) = glyphs.iter().filter_map(|g| g.pixel_bounding_box()).fold(
        (i32::MAX, i32::MIN, i32::MAX, i32::MIN),
        |(min_x, max_x, min_y, max_y), bb| {
            (
                min_x.min(bb.min.x),
                max_x.max(bb.max.x),
                min_y.min(bb.min.y),
                max_y.max(bb.max.y),
            )
        },
    );
    let width_px = if min_x < max_x { max_x - min_x } else { 0 };
    let height_px = if min_y < max_y { max_y - min_y } else { 0 };
    let offset_x = x - width_px / 2;
    let offset_y = y - height_px / 2;
    for glyph in glyphs {
        if let Some(bb) = glyph.pixel_bounding_box() {
            glyph.draw(|gx, gy, v| {
                let px = offset_x + gx as i32 + bb.min.x - min_x;
                let py = offset_y + gy as i32 + bb.min.y - min_y;
                set_pixel(canvas, px, py, color, v);
            });
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
