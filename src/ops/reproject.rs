use std::path::Path;

use geo::Coord;
use itertools::Itertools;
use log::{debug, info};
use ndarray::{Array2, Array3, Axis, Zip};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    components::{
        bounds::DEFAULT_DENSIFY_POINTS, DataType, File, GdalFile, GeoBounds, GeoTransform, Raster,
    },
    crs_geo::Crs,
    errors::{GeoprepError, Result},
    ops::resample::{Resampling, Sampler},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReprojectOptions {
    pub resampling: Resampling,
    /// Fill for pixels without source data. Defaults to the source nodata,
    /// then 0.
    pub dst_nodata: Option<f64>,
    /// Target pixel size in target crs units, instead of the suggested one.
    pub resolution: Option<f64>,
    /// Points per edge when projecting the source outline.
    pub densify_points: usize,
}

impl Default for ReprojectOptions {
    fn default() -> Self {
        Self {
            resampling: Resampling::default(),
            dst_nodata: None,
            resolution: None,
            densify_points: DEFAULT_DENSIFY_POINTS,
        }
    }
}

/// Raster data resampled onto a grid in the target crs.
#[derive(Debug)]
pub struct Reprojected<T: DataType> {
    /// (bands, rows, cols)
    pub data: Array3<T>,
    pub transform: GeoTransform,
    pub bounds: GeoBounds,
    pub nodata: Option<f64>,
}

impl<T: DataType> Reprojected<T> {
    pub fn into_raster(self) -> Raster<T> {
        let crs = self.bounds.crs().clone();
        Raster::new(self.data, self.transform, crs).with_nodata(self.nodata)
    }

    pub fn write_geotiff(self, path: impl AsRef<Path>) -> Result<()> {
        self.into_raster().write_geotiff(path)
    }
}

/// Target grid chosen for a reprojection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    pub transform: GeoTransform,
    /// (width, height)
    pub size: (usize, usize),
}

/// Reproject every band of the raster at `path` to `target_crs`, cubic
/// resampling onto the suggested grid.
pub fn reproject_raster<T: DataType>(
    path: impl AsRef<Path>,
    target_crs: impl Into<Crs>,
) -> Result<Reprojected<T>> {
    reproject_raster_with(path, target_crs, &ReprojectOptions::default())
}

pub fn reproject_raster_with<T: DataType>(
    path: impl AsRef<Path>,
    target_crs: impl Into<Crs>,
    options: &ReprojectOptions,
) -> Result<Reprojected<T>> {
    let raster = GdalFile::open(path)?.read::<T>()?;
    reproject(&raster, &target_crs.into(), options)
}

/// Output grid the way GDAL suggests it: the envelope of the projected
/// source outline, with a square pixel that keeps the number of pixels
/// along the diagonal.
pub fn suggested_grid(
    transform: &GeoTransform,
    size: (usize, usize),
    src_crs: &Crs,
    dst_crs: &Crs,
    options: &ReprojectOptions,
) -> Result<Grid> {
    let (width, height) = (size.0 as f64, size.1 as f64);
    if size.0 == 0 || size.1 == 0 {
        return Err(GeoprepError::InvalidParameter {
            name: "size",
            reason: format!("empty source grid {size:?}"),
        });
    }
    let steps = options.densify_points.max(2);
    let outline = (0..steps).flat_map(|step| {
        let t = step as f64 / (steps - 1) as f64;
        [
            Coord { x: t * width, y: 0. },
            Coord { x: t * width, y: height },
            Coord { x: 0., y: t * height },
            Coord { x: width, y: t * height },
        ]
    });

    let proj = src_crs.proj_to(dst_crs)?;
    let mut projected = Vec::new();
    let mut first_error = None;
    for pixel in outline {
        match proj.convert(transform.pixel_to_map(pixel)) {
            Ok(coord) if coord.x.is_finite() && coord.y.is_finite() => projected.push(coord),
            Ok(_) => {}
            Err(error) => {
                first_error.get_or_insert(error);
            }
        }
    }
    let (Some((min_x, max_x)), Some((min_y, max_y))) = (
        projected.iter().map(|coord| coord.x).minmax().into_option(),
        projected.iter().map(|coord| coord.y).minmax().into_option(),
    ) else {
        return Err(match first_error {
            Some(error) => error.into(),
            None => GeoprepError::EmptyGeometry,
        });
    };
    let (min, max) = (Coord { x: min_x, y: min_y }, Coord { x: max_x, y: max_y });
    let extent = max - min;

    let pixel_size = match options.resolution {
        Some(resolution) if resolution > 0. => resolution,
        Some(resolution) => {
            return Err(GeoprepError::InvalidParameter {
                name: "resolution",
                reason: format!("{resolution} is not a positive pixel size"),
            })
        }
        None => extent.x.hypot(extent.y) / width.hypot(height),
    };
    if !(pixel_size.is_finite() && pixel_size > 0.) {
        return Err(GeoprepError::InvalidParameter {
            name: "target_crs",
            reason: "source outline collapses in the target crs".to_string(),
        });
    }

    let grid_size = (
        ((extent.x / pixel_size + 0.5) as usize).max(1),
        ((extent.y / pixel_size + 0.5) as usize).max(1),
    );
    let grid = Grid {
        transform: GeoTransform::north_up(Coord { x: min.x, y: max.y }, pixel_size),
        size: grid_size,
    };
    debug!("suggested grid {:?} of {:?}", grid.transform.to_gdal(), grid.size);
    Ok(grid)
}

/// Reproject an in memory raster onto the suggested grid in `target_crs`.
pub fn reproject<T: DataType>(
    raster: &Raster<T>,
    target_crs: &Crs,
    options: &ReprojectOptions,
) -> Result<Reprojected<T>> {
    let grid = suggested_grid(
        raster.transform(),
        raster.size(),
        raster.crs(),
        target_crs,
        options,
    )?;
    reproject_onto(raster, target_crs, &grid, options)
}

/// Resample `raster` onto an explicit `grid` in `target_crs`.
pub fn reproject_onto<T: DataType>(
    raster: &Raster<T>,
    target_crs: &Crs,
    grid: &Grid,
    options: &ReprojectOptions,
) -> Result<Reprojected<T>> {
    let nodata = options.dst_nodata.or(raster.nodata());
    let fill = T::saturating_from_f64(nodata.unwrap_or(0.))?;
    let source_pixels = source_pixel_map(raster, target_crs, grid)?;

    let (width, height) = grid.size;
    let mut data = Array3::from_elem((raster.num_bands(), height, width), fill);
    data.axis_iter_mut(Axis(0))
        .into_par_iter()
        .zip(raster.data().axis_iter(Axis(0)).into_par_iter())
        .for_each(|(mut dst_band, src_band)| {
            let sampler = Sampler::new(src_band, raster.nodata(), options.resampling);
            Zip::from(&mut dst_band)
                .and(&source_pixels)
                .par_for_each(|value, source| {
                    *value = destination_value(sampler.sample(source.x, source.y), fill);
                });
        });

    let bounds = GeoBounds::from_grid(&grid.transform, grid.size, target_crs.clone());
    info!(
        "reprojected {:?} from {} to {} as {:?}",
        raster.size(),
        raster.crs(),
        target_crs,
        bounds.to_tuple()
    );
    Ok(Reprojected {
        data,
        transform: grid.transform,
        bounds,
        nodata,
    })
}

/// Sample cast to the output band type. Missing samples, and NaN for
/// integer bands, take `fill`.
fn destination_value<T: DataType>(sample: Option<f64>, fill: T) -> T {
    match sample.map(T::saturating_from_f64) {
        Some(Ok(value)) => value,
        Some(Err(_)) | None => fill,
    }
}

/// Source pixel coordinates of every destination pixel centre, NaN where
/// the point can not be projected.
fn source_pixel_map<T: DataType>(
    raster: &Raster<T>,
    target_crs: &Crs,
    grid: &Grid,
) -> Result<Array2<Coord>> {
    let proj = target_crs.proj_to(raster.crs())?;
    let to_source_pixel = raster.transform().inverse()?;
    let unprojectable = Coord {
        x: f64::NAN,
        y: f64::NAN,
    };
    let (width, height) = grid.size;
    Ok(Array2::from_shape_fn((height, width), |(row, col)| {
        proj.convert(grid.transform.pixel_centre_to_map(col, row))
            .map(|coord| to_source_pixel.apply(coord))
            .unwrap_or(unprojectable)
    }))
}
