use geo::{AffineTransform, Coord, Rect};
use shrinkwraprs::Shrinkwrap;

use crate::errors::{GeoprepError, Result};

/// Affine mapping from pixel space `(col, row)` to map space `(x, y)`.
///
/// Pixel `(0, 0)` is the top left corner of the top left pixel, so pixel
/// centres sit at `(col + 0.5, row + 0.5)`.
#[derive(Shrinkwrap, Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform(AffineTransform);

impl GeoTransform {
    pub fn new(a: f64, b: f64, xoff: f64, d: f64, e: f64, yoff: f64) -> Self {
        Self(AffineTransform::new(a, b, xoff, d, e, yoff))
    }

    /// North up grid with top left corner at `origin` and square pixels.
    pub fn north_up(origin: Coord, pixel_size: f64) -> Self {
        Self::new(pixel_size, 0., origin.x, 0., -pixel_size, origin.y)
    }

    pub fn from_gdal(gdal_transform: [f64; 6]) -> Self {
        Self::new(
            gdal_transform[1],
            gdal_transform[2],
            gdal_transform[0],
            gdal_transform[4],
            gdal_transform[5],
            gdal_transform[3],
        )
    }

    pub fn to_gdal(&self) -> [f64; 6] {
        [
            self.xoff(),
            self.a(),
            self.b(),
            self.yoff(),
            self.d(),
            self.e(),
        ]
    }

    pub fn pixel_to_map(&self, pixel: Coord) -> Coord {
        self.0.apply(pixel)
    }

    pub fn pixel_centre_to_map(&self, col: usize, row: usize) -> Coord {
        self.pixel_to_map(Coord {
            x: col as f64 + 0.5,
            y: row as f64 + 0.5,
        })
    }

    pub fn inverse(&self) -> Result<AffineTransform> {
        self.0.inverse().ok_or(GeoprepError::NonInvertibleTransform)
    }

    pub fn map_to_pixel(&self, coord: Coord) -> Result<Coord> {
        Ok(self.inverse()?.apply(coord))
    }

    /// Transform of a window whose top left pixel is `(col_off, row_off)`.
    pub fn shifted(&self, col_off: isize, row_off: isize) -> Self {
        let origin = self.pixel_to_map(Coord {
            x: col_off as f64,
            y: row_off as f64,
        });
        Self::new(
            self.a(),
            self.b(),
            origin.x,
            self.d(),
            self.e(),
            origin.y,
        )
    }

    /// (x, y) pixel size.
    pub fn resolution(&self) -> (f64, f64) {
        (
            self.a().hypot(self.d()),
            self.b().hypot(self.e()),
        )
    }

    /// Map space envelope of a `(width, height)` grid.
    pub fn bounds(&self, shape: (usize, usize)) -> Rect {
        let (width, height) = (shape.0 as f64, shape.1 as f64);
        let corners = [
            self.pixel_to_map(Coord { x: 0., y: 0. }),
            self.pixel_to_map(Coord { x: width, y: 0. }),
            self.pixel_to_map(Coord { x: 0., y: height }),
            self.pixel_to_map(Coord { x: width, y: height }),
        ];
        let (min, max) = corners.iter().skip(1).fold(
            (corners[0], corners[0]),
            |(min, max), corner| {
                (
                    Coord {
                        x: min.x.min(corner.x),
                        y: min.y.min(corner.y),
                    },
                    Coord {
                        x: max.x.max(corner.x),
                        y: max.y.max(corner.y),
                    },
                )
            },
        );
        Rect::new(min, max)
    }
}
