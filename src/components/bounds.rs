use geo::{Coord, Rect};
use log::debug;
use shrinkwraprs::Shrinkwrap;

use crate::{
    components::transforms::GeoTransform,
    crs_geo::{Crs, CrsGeometry},
    errors::{GeoprepError, Result},
    intersection::Intersection,
};

/// Points per edge used when projecting an envelope to another crs.
pub const DEFAULT_DENSIFY_POINTS: usize = 21;

/// Envelope in 'geospace', tagged with its crs.
#[derive(Shrinkwrap, Clone, Debug)]
pub struct GeoBounds(CrsGeometry<Rect>);

impl GeoBounds {
    pub fn new(crs: Crs, rect: Rect) -> Self {
        Self(CrsGeometry::new(crs, rect))
    }

    /// Envelope of a `(width, height)` pixel grid.
    pub fn from_grid(transform: &GeoTransform, shape: (usize, usize), crs: Crs) -> Self {
        Self::new(crs, transform.bounds(shape))
    }

    pub fn crs(&self) -> &Crs {
        self.0.crs()
    }

    pub fn rect(&self) -> &Rect {
        self.0.geometry()
    }

    /// `(min_x, min_y, max_x, max_y)`
    pub fn to_tuple(&self) -> (f64, f64, f64, f64) {
        let (min, max) = (self.rect().min(), self.rect().max());
        (min.x, min.y, max.x, max.y)
    }

    pub fn contains(&self, other: &GeoBounds) -> bool {
        let (lhs, rhs) = (self.rect(), other.rect());
        lhs.min().x <= rhs.min().x
            && lhs.min().y <= rhs.min().y
            && lhs.max().x >= rhs.max().x
            && lhs.max().y >= rhs.max().y
    }

    /// Envelope of these bounds in `crs`, with every edge densified by
    /// `densify_points` so curved edges stay inside the result.
    pub fn transform_to(&self, crs: &Crs, densify_points: usize) -> Result<GeoBounds> {
        if self.crs().same_as(crs)? {
            return Ok(GeoBounds::new(crs.clone(), *self.rect()));
        }
        let proj = self.crs().proj_to(crs)?;
        let (min_x, min_y, max_x, max_y) = self.to_tuple();
        let [left, bottom, right, top] =
            proj.transform_bounds(min_x, min_y, max_x, max_y, densify_points as i32)?;
        debug!(
            "bounds {:?} in {} -> {:?} in {}",
            self.to_tuple(),
            self.crs(),
            (left, bottom, right, top),
            crs
        );
        Ok(GeoBounds::new(
            crs.clone(),
            Rect::new((left, bottom), (right, top)),
        ))
    }
}

impl Intersection for GeoBounds {
    type Output = GeoBounds;
    fn intersection(&self, rhs: &Self) -> Result<Self::Output> {
        let rhs = rhs.transform_to(self.crs(), DEFAULT_DENSIFY_POINTS)?;
        let rect = self.rect().intersection(rhs.rect())?;
        Ok(GeoBounds::new(self.crs().clone(), rect))
    }
}

/// Pixel window of a raster.
///
/// Defined by:
///     - `offset`: (col, row) of the top left pixel of the window,
///         with origin at top left pixel of raster.
///     - `size`: (width, height) in pixels.
#[derive(Shrinkwrap, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelWindow(Rect<isize>);

impl PixelWindow {
    pub fn new(offset: (isize, isize), size: (usize, usize)) -> Self {
        let max = (offset.0 + size.0 as isize, offset.1 + size.1 as isize);
        Self(Rect::new(offset, max))
    }

    pub fn full(shape: (usize, usize)) -> Self {
        Self::new((0, 0), shape)
    }

    /// Smallest window covering `bounds`: top left floored, bottom right
    /// ceiled, in the pixel space of `transform`.
    pub fn covering(bounds: &Rect, transform: &GeoTransform) -> Result<Self> {
        let inverse = transform.inverse()?;
        let corners = [
            bounds.min(),
            bounds.max(),
            Coord {
                x: bounds.min().x,
                y: bounds.max().y,
            },
            Coord {
                x: bounds.max().x,
                y: bounds.min().y,
            },
        ]
        .map(|corner| inverse.apply(corner));
        let min_col = corners.iter().map(|c| c.x).fold(f64::INFINITY, f64::min);
        let min_row = corners.iter().map(|c| c.y).fold(f64::INFINITY, f64::min);
        let max_col = corners.iter().map(|c| c.x).fold(f64::NEG_INFINITY, f64::max);
        let max_row = corners.iter().map(|c| c.y).fold(f64::NEG_INFINITY, f64::max);
        if !(min_col.is_finite() && min_row.is_finite() && max_col.is_finite() && max_row.is_finite())
        {
            return Err(GeoprepError::Uncastable);
        }
        Ok(Self(Rect::new(
            (min_col.floor() as isize, min_row.floor() as isize),
            (max_col.ceil() as isize, max_row.ceil() as isize),
        )))
    }

    /// Clamp to a `(width, height)` grid, failing when nothing of the
    /// window is left.
    pub fn clamp_to(&self, shape: (usize, usize)) -> Result<Self> {
        let clamped = self.0.intersection(&PixelWindow::full(shape).0)?;
        if clamped.width() == 0 || clamped.height() == 0 {
            return Err(GeoprepError::NoIntersection);
        }
        Ok(Self(clamped))
    }

    /// (col, row)
    pub fn offset(&self) -> (isize, isize) {
        self.0.min().x_y()
    }

    /// (width, height)
    pub fn size(&self) -> (usize, usize) {
        (self.0.width() as usize, self.0.height() as usize)
    }

    pub fn len(&self) -> usize {
        let (width, height) = self.size();
        width * height
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
