use std::{fmt::Debug, path::Path};

use gdal::raster::GdalType;
use ndarray::{Array3, ArrayView2, Axis};
use num_traits::{Bounded, NumCast};

use crate::{
    components::{bounds::GeoBounds, file::gdal_backend, transforms::GeoTransform, Metadata},
    crs_geo::Crs,
    errors::{GeoprepError, Result},
};

/// Pixel types that can be read, resampled and written back.
pub trait DataType: GdalType + NumCast + Bounded + Copy + Send + Sync + Debug + 'static {
    fn from_f64(value: f64) -> Result<Self> {
        <Self as NumCast>::from(value).ok_or(GeoprepError::Uncastable)
    }

    /// Rounds for integer types and saturates at the type bounds.
    fn saturating_from_f64(value: f64) -> Result<Self> {
        let (min, max) = (
            Self::min_value().to_f64().unwrap_or(f64::MIN),
            Self::max_value().to_f64().unwrap_or(f64::MAX),
        );
        let value = if Self::is_integer() { value.round() } else { value };
        Self::from_f64(value.clamp(min, max))
    }

    fn is_integer() -> bool {
        <Self as NumCast>::from(0.5f64).and_then(|half| half.to_f64()) != Some(0.5)
    }
}

impl<T> DataType for T where T: GdalType + NumCast + Bounded + Copy + Send + Sync + Debug + 'static {}

/// Bands of one grid, held in memory as `(bands, rows, cols)`.
pub struct Raster<T: DataType> {
    data: Array3<T>,
    transform: GeoTransform,
    crs: Crs,
    nodata: Option<f64>,
    metadata: Metadata,
}

impl<T: DataType> Debug for Raster<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Raster")
            .field("shape", &self.data.dim())
            .field("transform", &self.transform.to_gdal())
            .field("crs", &self.crs.to_string())
            .field("nodata", &self.nodata)
            .finish()
    }
}

impl<T: DataType> Raster<T> {
    pub fn new(data: Array3<T>, transform: GeoTransform, crs: Crs) -> Self {
        Self {
            data,
            transform,
            crs,
            nodata: None,
            metadata: Metadata::new(),
        }
    }

    pub fn with_nodata(mut self, nodata: Option<f64>) -> Self {
        self.nodata = nodata;
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn data(&self) -> &Array3<T> {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut Array3<T> {
        &mut self.data
    }

    pub fn band(&self, index: usize) -> ArrayView2<'_, T> {
        self.data.index_axis(Axis(0), index)
    }

    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    pub fn crs(&self) -> &Crs {
        &self.crs
    }

    pub fn nodata(&self) -> Option<f64> {
        self.nodata
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn num_bands(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    /// (width, height)
    pub fn size(&self) -> (usize, usize) {
        let (_, rows, cols) = self.data.dim();
        (cols, rows)
    }

    pub fn bounds(&self) -> GeoBounds {
        GeoBounds::from_grid(&self.transform, self.size(), self.crs.clone())
    }

    pub fn write_geotiff(&self, path: impl AsRef<Path>) -> Result<()> {
        gdal_backend::write_geotiff(self, path)
    }
}
