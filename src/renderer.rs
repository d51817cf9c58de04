//! # Moon Phase Rendering
//!
//! This module turns the geometry of [`crate::terminator`] into pictures:
//! - **SVG** documents for the orbit view and the Earth view, the format the
//!   explorer's web shell displays
//! - **ASCII** output of the Earth view for terminals
//! - **Raster** output onto any `embedded-graphics` binary display, including
//!   the in-memory [`PixelCanvas`] behind the `raster` command
//!
//! Every renderer takes the angle and a [`ViewConfig`] explicitly; nothing here
//! reads global state.

use crate::config::ViewConfig;
use crate::terminator::{lit_outline, orbit_position, sunlit_hemisphere, LitOutline};
use crate::{MoonData, Point};
use embedded_graphics::{
    geometry::Point as PixelPoint,
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{Circle, PointsIter, PrimitiveStyle},
};
use std::fmt::Write as _;

const SPACE_COLOR: &str = "#1e293b";
const DARK_MOON: &str = "#334155";
const LIT_MOON: &str = "#fefce8";
const SUN_COLOR: &str = "#fbbf24";
const EARTH_COLOR: &str = "#3b82f6";
const ORBIT_COLOR: &str = "#334155";

/// Escape text for use inside SVG elements and attributes.
fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Size of a view whose content is centered on `center`.
fn view_size(center: Point) -> (f64, f64) {
    (2.0 * center.x, 2.0 * center.y)
}

/// Earth view body: dark disk, lit outline and the glow filter.
fn earth_view_body(angle: f64, view: &ViewConfig) -> String {
    let c = view.moon_center;
    let r = view.moon_radius;
    let outline = lit_outline(angle, r, c);

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r##"<defs><filter id="glow" x="-50%" y="-50%" width="200%" height="200%"><feGaussianBlur stdDeviation="2" result="coloredBlur"/><feMerge><feMergeNode in="coloredBlur"/><feMergeNode in="SourceGraphic"/></feMerge></filter></defs>"##
    );
    let _ = writeln!(
        svg,
        r##"<circle cx="{}" cy="{}" r="{}" fill="{DARK_MOON}"/>"##,
        c.x, c.y, r
    );
    if !outline.is_empty() {
        let _ = writeln!(
            svg,
            r##"<path d="{}" fill="{LIT_MOON}" filter="url(#glow)"/>"##,
            outline.to_svg_path()
        );
    }
    svg
}

/// Orbit view body: orbit, Earth, Sun marker, and the moon with its fixed lit half.
fn orbit_view_body(angle: f64, view: &ViewConfig) -> String {
    let c = view.orbit_center;
    let moon = orbit_position(c, view.orbit_radius, angle);
    let body = view.moon_body_radius;
    let lit_half = sunlit_hemisphere(Point::new(0.0, 0.0), body);
    let sun_x = c.x + view.orbit_radius + 10.0;

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r##"<circle cx="{}" cy="{}" r="{}" stroke="{ORBIT_COLOR}" stroke-width="2" fill="none" stroke-dasharray="5,5"/>"##,
        c.x, c.y, view.orbit_radius
    );
    let _ = writeln!(
        svg,
        r##"<circle cx="{}" cy="{}" r="{}" fill="{EARTH_COLOR}"/>"##,
        c.x,
        c.y,
        view.orbit_radius * 0.3
    );
    let _ = writeln!(
        svg,
        r##"<text x="{}" y="{}" dy="5" text-anchor="middle" fill="white" font-size="12">地球</text>"##,
        c.x, c.y
    );
    let _ = writeln!(
        svg,
        r##"<g transform="translate({sun_x:.1}, {:.1})"><circle r="12" fill="{SUN_COLOR}"/><text y="25" text-anchor="middle" fill="{SUN_COLOR}" font-size="10">太陽</text></g>"##,
        c.y
    );
    let _ = writeln!(
        svg,
        r##"<line x1="{}" y1="{}" x2="{:.3}" y2="{:.3}" stroke="#94a3b8" stroke-width="1" opacity="0.5"/>"##,
        c.x, c.y, moon.x, moon.y
    );
    let _ = writeln!(
        svg,
        r##"<g transform="translate({:.3}, {:.3})"><circle r="{body}" fill="#333"/><path d="{}" fill="{LIT_MOON}"/><text y="{}" text-anchor="middle" fill="white" font-size="12">月</text></g>"##,
        moon.x,
        moon.y,
        lit_half.to_svg_path(),
        -(body + 5.0)
    );
    svg
}

/// Standalone SVG document of the Earth view.
pub fn earth_view_svg(angle: f64, view: &ViewConfig) -> String {
    let (w, h) = view_size(view.moon_center);
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n{}</svg>\n",
        earth_view_body(angle, view)
    )
}

/// Standalone SVG document of the orbit view.
pub fn orbit_view_svg(angle: f64, view: &ViewConfig) -> String {
    let (w, h) = view_size(view.orbit_center);
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n{}</svg>\n",
        orbit_view_body(angle, view)
    )
}

/// Both views side by side with the phase name and angle underneath.
pub fn scene_svg(angle: f64, view: &ViewConfig) -> String {
    let data = MoonData::from_angle(angle);
    let (orbit_w, orbit_h) = view_size(view.orbit_center);
    let (moon_w, moon_h) = view_size(view.moon_center);
    let margin = 20.0;
    let caption = 60.0;
    let width = orbit_w + moon_w + 3.0 * margin;
    let height = orbit_h.max(moon_h + caption) + 2.0 * margin;
    let moon_x = orbit_w + 2.0 * margin;
    let text_x = moon_x + moon_w / 2.0;

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"##
    );
    let _ = writeln!(
        svg,
        r##"<rect width="100%" height="100%" fill="{SPACE_COLOR}"/>"##
    );
    let _ = writeln!(svg, r##"<g transform="translate({margin}, {margin})">"##);
    svg.push_str(&orbit_view_body(data.angle, view));
    let _ = writeln!(svg, "</g>");
    let _ = writeln!(svg, r##"<g transform="translate({moon_x}, {margin})">"##);
    svg.push_str(&earth_view_body(data.angle, view));
    let _ = writeln!(svg, "</g>");
    let _ = writeln!(
        svg,
        r##"<text x="{text_x}" y="{}" text-anchor="middle" fill="#fef9c3" font-size="22">{}</text>"##,
        margin + moon_h + 30.0,
        escape_xml(&data.japanese_name)
    );
    let _ = writeln!(
        svg,
        r##"<text x="{text_x}" y="{}" text-anchor="middle" fill="#cbd5e1" font-size="14">{} · {}°</text>"##,
        margin + moon_h + 52.0,
        escape_xml(&data.label),
        data.angle.round()
    );
    svg.push_str("</svg>\n");
    svg
}

/// Lit characters of the ASCII rendering, dark side and background.
const ASCII_LIT: char = '#';
const ASCII_DARK: char = '.';
const ASCII_SPACE: char = ' ';

/// Render an outline as text, two columns per row to keep the disk round.
///
/// Each cell is sampled at its center; cells inside the disk print as lit or
/// dark, cells outside as blanks.
pub fn ascii_moon(outline: &LitOutline, center: Point, radius: f64, rows: usize) -> Vec<String> {
    let rows = rows.max(1);
    let cols = rows * 2;
    let cell_h = 2.0 * radius / rows as f64;
    let cell_w = 2.0 * radius / cols as f64;

    (0..rows)
        .map(|row| {
            let y = center.y - radius + (row as f64 + 0.5) * cell_h;
            (0..cols)
                .map(|col| {
                    let x = center.x - radius + (col as f64 + 0.5) * cell_w;
                    let p = Point::new(x, y);
                    let (dx, dy) = p.relative_to(center);
                    if dx * dx + dy * dy > radius * radius {
                        ASCII_SPACE
                    } else if outline.contains(p) {
                        ASCII_LIT
                    } else {
                        ASCII_DARK
                    }
                })
                .collect::<String>()
                .trim_end()
                .to_string()
        })
        .collect()
}

/// Render the Earth view to the terminal.
pub fn draw_ascii(angle: f64, view: &ViewConfig) {
    let data = MoonData::from_angle(angle);
    let outline = lit_outline(data.angle, view.moon_radius, view.moon_center);

    for line in ascii_moon(&outline, view.moon_center, view.moon_radius, view.ascii_rows) {
        println!("{}", line);
    }
    println!();
    println!("{}  {}", data.japanese_name, data.label);
    println!(
        "angle {:.0}°  illuminated {:.0}%",
        data.angle,
        data.illumination * 100.0
    );
}

/// Rasterize the lit region onto a binary display.
///
/// Pixels whose centers fall inside `outline` are turned on; nothing else is
/// touched, so every pixel is drawn at most once.
pub fn draw_moon<D>(outline: &LitOutline, display: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    if outline.is_empty() {
        return Ok(());
    }
    let area = display.bounding_box();
    let lit: Vec<Pixel<BinaryColor>> = area
        .points()
        .filter(|p| outline.contains(Point::new(p.x as f64 + 0.5, p.y as f64 + 0.5)))
        .map(|p| Pixel(p, BinaryColor::On))
        .collect();
    display.draw_iter(lit)
}

/// In-memory binary display, one `bool` per pixel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelCanvas {
    size: Size,
    on: Vec<bool>,
}

impl PixelCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: Size::new(width, height),
            on: vec![false; (width as usize) * (height as usize)],
        }
    }

    pub fn is_on(&self, x: u32, y: u32) -> bool {
        x < self.size.width && y < self.size.height && self.on[(y * self.size.width + x) as usize]
    }

    pub fn lit_count(&self) -> usize {
        self.on.iter().filter(|&&b| b).count()
    }

    /// Text dump, two characters per pixel so the disk stays round.
    pub fn to_lines(&self) -> Vec<String> {
        (0..self.size.height)
            .map(|y| {
                (0..self.size.width)
                    .map(|x| if self.is_on(x, y) { "██" } else { "  " })
                    .collect::<String>()
                    .trim_end()
                    .to_string()
            })
            .collect()
    }
}

impl OriginDimensions for PixelCanvas {
    fn size(&self) -> Size {
        self.size
    }
}

impl DrawTarget for PixelCanvas {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, color) in pixels {
            if p.x >= 0
                && p.y >= 0
                && (p.x as u32) < self.size.width
                && (p.y as u32) < self.size.height
            {
                let idx = (p.y as u32 * self.size.width + p.x as u32) as usize;
                self.on[idx] = color.is_on();
            }
        }
        Ok(())
    }
}

/// Earth view rasterized onto a square canvas of `size` pixels: the lit region
/// plus the outline of the limb.
pub fn raster_moon(angle: f64, size: u32) -> PixelCanvas {
    let size = size.max(4);
    let mut canvas = PixelCanvas::new(size, size);
    let half = size as f64 / 2.0;
    let center = Point::new(half, half);
    let radius = half - 1.0;

    let outline = lit_outline(angle, radius, center);
    draw_moon(&outline, &mut canvas).unwrap_or_else(|e| match e {});
    draw_limb(center, radius, &mut canvas).unwrap_or_else(|e| match e {});
    canvas
}

/// Stroke the limb of the disk so the dark side stays visible on paper-like displays.
pub fn draw_limb<D>(center: Point, radius: f64, display: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let diameter = (2.0 * radius).round().max(1.0) as u32;
    let top_left = PixelPoint::new(
        (center.x - radius).round() as i32,
        (center.y - radius).round() as i32,
    );
    Circle::new(top_left, diameter)
        .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
        .draw(display)
}
