//! Map furniture drawn on an [Axes]: a [ScaleBar] and a [NorthArrow].
//!
//! Positions are given as axes fractions, `(0, 0)` the lower left and
//! `(1, 1)` the upper right of the visible extent. Line widths and font
//! sizes are in points, rendered one point to one pixel.

pub mod north_arrow;
pub mod render;
pub mod scale_bar;

pub use north_arrow::NorthArrow;
pub use scale_bar::ScaleBar;

use geo::{Coord, Rect};
use image::Rgba;
use serde::{Deserialize, Serialize};

use crate::components::GeoBounds;

pub type Color = Rgba<u8>;

pub const BLACK: Color = Rgba([0, 0, 0, 255]);
pub const WHITE: Color = Rgba([255, 255, 255, 255]);

/// Vertical anchor of a label. Labels are always centred horizontally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VAlign {
    #[default]
    Center,
    Bottom,
}

/// Drawable primitive in data coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum Artist {
    Rectangle {
        rect: Rect,
        face: Color,
        edge: Option<Color>,
        line_width: f64,
    },
    Text {
        position: Coord,
        text: String,
        font_size: f64,
        color: Color,
        valign: VAlign,
    },
    /// Filled arrow pointing from `tail` to `head`.
    Arrow {
        tail: Coord,
        head: Coord,
        width: f64,
        head_width: f64,
        head_length: f64,
        color: Color,
    },
}

/// Plot area that annotations are drawn on.
pub trait Axes {
    /// Visible area in data coordinates.
    fn extent(&self) -> Rect;

    fn add_artist(&mut self, artist: Artist);

    fn fraction_to_data(&self, fraction: Coord) -> Coord {
        let extent = self.extent();
        Coord {
            x: extent.min().x + fraction.x * extent.width(),
            y: extent.min().y + fraction.y * extent.height(),
        }
    }
}

/// Axes over a map extent that keep their artists for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct MapAxes {
    extent: Rect,
    artists: Vec<Artist>,
}

impl MapAxes {
    pub fn new(extent: Rect) -> Self {
        Self {
            extent,
            artists: Vec::new(),
        }
    }

    pub fn from_bounds(bounds: &GeoBounds) -> Self {
        Self::new(*bounds.rect())
    }

    pub fn artists(&self) -> &[Artist] {
        &self.artists
    }
}

impl Axes for MapAxes {
    fn extent(&self) -> Rect {
        self.extent
    }

    fn add_artist(&mut self, artist: Artist) {
        self.artists.push(artist);
    }
}
