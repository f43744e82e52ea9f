use std::{fmt::Write as _, path::Path};

use geo::{BoundingRect, Coord, Intersects, LineString, Point, Polygon, Rect};
use image::{Pixel, Rgba, RgbaImage};
use log::debug;

use crate::{
    annotate::{Artist, Axes, Color, MapAxes, VAlign},
    errors::Result,
};

/// Maps data coordinates onto a `width` x `height` pixel canvas, y down.
struct Canvas {
    extent: Rect,
    width: f64,
    height: f64,
}

impl Canvas {
    fn new(extent: Rect, width: u32, height: u32) -> Self {
        Self {
            extent,
            width: width as f64,
            height: height as f64,
        }
    }

    fn to_pixel(&self, coord: Coord) -> Coord {
        Coord {
            x: (coord.x - self.extent.min().x) / self.extent.width() * self.width,
            y: (self.extent.max().y - coord.y) / self.extent.height() * self.height,
        }
    }

    fn rect(&self, rect: &Rect) -> Rect {
        Rect::new(self.to_pixel(rect.min()), self.to_pixel(rect.max()))
    }
}

fn polygon(points: Vec<Coord>) -> Polygon {
    Polygon::new(LineString::new(points), vec![])
}

/// Band of `width` pixels centred on the edge `from`-`to`.
fn stroke(from: Coord, to: Coord, width: f64) -> Option<Polygon> {
    let delta = to - from;
    let length = delta.x.hypot(delta.y);
    if length == 0. || width <= 0. {
        return None;
    }
    let normal = Coord {
        x: -delta.y / length * width / 2.,
        y: delta.x / length * width / 2.,
    };
    Some(polygon(vec![from + normal, to + normal, to - normal, from - normal]))
}

/// Outline of a filled arrow with a shaft of `width` and a triangular head.
fn arrow_outline(
    tail: Coord,
    head: Coord,
    width: f64,
    head_width: f64,
    head_length: f64,
) -> Option<Polygon> {
    let delta = head - tail;
    let length = delta.x.hypot(delta.y);
    if length == 0. {
        return None;
    }
    let direction = delta / length;
    let normal = Coord {
        x: -direction.y,
        y: direction.x,
    };
    let base = head - direction * head_length.min(length);
    Some(polygon(vec![
        tail + normal * (width / 2.),
        base + normal * (width / 2.),
        base + normal * (head_width / 2.),
        head,
        base - normal * (head_width / 2.),
        base - normal * (width / 2.),
        tail - normal * (width / 2.),
    ]))
}

/// Blend `color` into every pixel whose centre lies inside `shape` or on
/// its boundary.
fn fill(image: &mut RgbaImage, shape: &Polygon, color: Color) {
    let Some(bounds) = shape.bounding_rect() else {
        return;
    };
    let (width, height) = image.dimensions();
    let span = |min: f64, max: f64, limit: u32| {
        min.floor().max(0.) as u32..(max.ceil().max(0.) as u32).min(limit)
    };
    let cols = span(bounds.min().x, bounds.max().x, width);
    let rows = span(bounds.min().y, bounds.max().y, height);
    for row in rows {
        for col in cols.clone() {
            let centre = Point::new(col as f64 + 0.5, row as f64 + 0.5);
            if shape.intersects(&centre) {
                image.get_pixel_mut(col, row).blend(&color);
            }
        }
    }
}

/// `name="rgb(..)" name-opacity=".."` attributes for a paint.
fn paint(name: &str, color: &Color) -> String {
    let [r, g, b, a] = color.0;
    format!(
        "{name}=\"rgb({r},{g},{b})\" {name}-opacity=\"{:.3}\"",
        a as f64 / 255.
    )
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn points_attribute(shape: &Polygon) -> String {
    shape
        .exterior()
        .coords()
        .map(|coord| format!("{:.2},{:.2}", coord.x, coord.y))
        .collect::<Vec<_>>()
        .join(" ")
}

impl MapAxes {
    /// Rasterise the shapes onto a transparent image. Text is left to
    /// [MapAxes::to_svg].
    pub fn render_rgba(&self, width: u32, height: u32) -> RgbaImage {
        let canvas = Canvas::new(self.extent(), width, height);
        let mut image = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));
        for artist in self.artists() {
            match artist {
                Artist::Rectangle {
                    rect,
                    face,
                    edge,
                    line_width,
                } => {
                    let rect = canvas.rect(rect);
                    fill(&mut image, &rect.to_polygon(), *face);
                    if let Some(edge) = edge {
                        for line in rect.to_lines() {
                            if let Some(shape) = stroke(line.start, line.end, *line_width) {
                                fill(&mut image, &shape, *edge);
                            }
                        }
                    }
                }
                Artist::Arrow {
                    tail,
                    head,
                    width,
                    head_width,
                    head_length,
                    color,
                } => {
                    let (tail, head) = (canvas.to_pixel(*tail), canvas.to_pixel(*head));
                    if let Some(shape) = arrow_outline(tail, head, *width, *head_width, *head_length) {
                        fill(&mut image, &shape, *color);
                    }
                }
                Artist::Text { text, .. } => {
                    debug!("text {text:?} is only drawn in svg output");
                }
            }
        }
        image
    }

    /// SVG document of every artist on a `width` x `height` canvas.
    pub fn to_svg(&self, width: u32, height: u32) -> Result<String> {
        let canvas = Canvas::new(self.extent(), width, height);
        let mut svg = String::new();
        writeln!(
            svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">"
        )?;
        for artist in self.artists() {
            write_svg_element(&mut svg, &canvas, artist)?;
        }
        writeln!(svg, "</svg>")?;
        Ok(svg)
    }

    pub fn save_svg(&self, path: impl AsRef<Path>, width: u32, height: u32) -> Result<()> {
        std::fs::write(path.as_ref(), self.to_svg(width, height)?)?;
        debug!("wrote annotations to {:?}", path.as_ref());
        Ok(())
    }
}

fn write_svg_element(svg: &mut String, canvas: &Canvas, artist: &Artist) -> std::fmt::Result {
    match artist {
        Artist::Rectangle {
            rect,
            face,
            edge,
            line_width,
        } => {
            let rect = canvas.rect(rect);
            let edge = edge
                .map(|edge| format!(" {} stroke-width=\"{line_width}\"", paint("stroke", &edge)))
                .unwrap_or_default();
            writeln!(
                svg,
                "  <rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" {}{edge}/>",
                rect.min().x,
                rect.min().y,
                rect.width(),
                rect.height(),
                paint("fill", face)
            )
        }
        Artist::Arrow {
            tail,
            head,
            width,
            head_width,
            head_length,
            color,
        } => {
            let (tail, head) = (canvas.to_pixel(*tail), canvas.to_pixel(*head));
            match arrow_outline(tail, head, *width, *head_width, *head_length) {
                Some(shape) => writeln!(
                    svg,
                    "  <polygon points=\"{}\" {}/>",
                    points_attribute(&shape),
                    paint("fill", color)
                ),
                None => Ok(()),
            }
        }
        Artist::Text {
            position,
            text,
            font_size,
            color,
            valign,
        } => {
            let position = canvas.to_pixel(*position);
            let baseline = match valign {
                VAlign::Center => "central",
                VAlign::Bottom => "alphabetic",
            };
            writeln!(
                svg,
                "  <text x=\"{:.2}\" y=\"{:.2}\" font-size=\"{font_size}\" text-anchor=\"middle\" dominant-baseline=\"{baseline}\" {}>{}</text>",
                position.x,
                position.y,
                paint("fill", color),
                escape(text)
            )
        }
    }
}
