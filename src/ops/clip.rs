use std::path::Path;

use gdal::raster::GdalDataType;
use geo::{BoundingRect, Contains, Coord, Intersects, LineString, MultiPolygon, Point, Polygon};
use log::{debug, info, warn};
use ndarray::{Array2, Axis, Zip};
use serde::{Deserialize, Serialize};

use crate::{
    components::{DataType, File, GdalFile, GeoTransform, PixelWindow, Raster, VectorLayer},
    errors::{GeoprepError, Result},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipOptions {
    /// Shrink the output to the window covering the shapes.
    pub crop: bool,
    /// Keep every pixel the shapes touch instead of only those whose centre
    /// falls inside.
    pub all_touched: bool,
    /// Mask the inside of the shapes instead of the outside.
    pub invert: bool,
    /// Fill for masked pixels. Defaults to the raster nodata, then 0.
    pub nodata: Option<f64>,
}

impl Default for ClipOptions {
    fn default() -> Self {
        Self {
            crop: true,
            all_touched: false,
            invert: false,
            nodata: None,
        }
    }
}

/// Clip the raster at `raster_path` to the shapes of the vector file at
/// `aoi_path` and write the result as a GeoTIFF to `output_path`.
pub fn clip_raster_to_aoi(
    raster_path: impl AsRef<Path>,
    aoi_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
) -> Result<()> {
    clip_raster_to_aoi_with(raster_path, aoi_path, output_path, &ClipOptions::default())
}

pub fn clip_raster_to_aoi_with(
    raster_path: impl AsRef<Path>,
    aoi_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    options: &ClipOptions,
) -> Result<()> {
    let layer = VectorLayer::open(aoi_path)?;
    let file = GdalFile::open(raster_path)?;
    let raster_crs = file.crs()?;
    let shapes = layer
        .crs_polygons(&raster_crs)?
        .with_crs(&raster_crs)?
        .into_inner();

    let output_path = output_path.as_ref();
    match file.band_type()? {
        GdalDataType::UInt8 => clip::<_, u8>(&file, &shapes, options)?.write_geotiff(output_path),
        GdalDataType::Int8 => clip::<_, i8>(&file, &shapes, options)?.write_geotiff(output_path),
        GdalDataType::UInt16 => clip::<_, u16>(&file, &shapes, options)?.write_geotiff(output_path),
        GdalDataType::Int16 => clip::<_, i16>(&file, &shapes, options)?.write_geotiff(output_path),
        GdalDataType::UInt32 => clip::<_, u32>(&file, &shapes, options)?.write_geotiff(output_path),
        GdalDataType::Int32 => clip::<_, i32>(&file, &shapes, options)?.write_geotiff(output_path),
        GdalDataType::UInt64 => clip::<_, u64>(&file, &shapes, options)?.write_geotiff(output_path),
        GdalDataType::Int64 => clip::<_, i64>(&file, &shapes, options)?.write_geotiff(output_path),
        GdalDataType::Float32 => clip::<_, f32>(&file, &shapes, options)?.write_geotiff(output_path),
        GdalDataType::Float64 => clip::<_, f64>(&file, &shapes, options)?.write_geotiff(output_path),
        other => Err(GeoprepError::InvalidParameter {
            name: "raster_path",
            reason: format!("unsupported band type {other:?}"),
        }),
    }?;
    info!("Clipped raster saved to {}", output_path.display());
    Ok(())
}

/// Read the part of `file` covered by `shapes` (all of it without `crop`)
/// and fill every pixel outside the shapes with the nodata value.
///
/// Shapes that miss the raster fail with [GeoprepError::NoIntersection]
/// when cropping. Without `crop` the whole raster comes back masked.
///
/// `shapes` must be in the crs of `file`.
pub fn clip<F: File, T: DataType>(
    file: &F,
    shapes: &MultiPolygon,
    options: &ClipOptions,
) -> Result<Raster<T>> {
    let shapes_bounds = shapes.bounding_rect().ok_or(GeoprepError::EmptyGeometry)?;
    let covering = PixelWindow::covering(&shapes_bounds, &file.transform()?)
        .and_then(|window| window.clamp_to(file.size()));
    let window = if options.crop {
        covering?
    } else {
        match covering {
            Err(GeoprepError::NoIntersection) => {
                warn!("shapes do not overlap raster, every pixel is masked");
            }
            other => {
                other?;
            }
        }
        PixelWindow::full(file.size())
    };
    debug!("clipping to window {window:?}");

    let raster = file.read_window::<T>(&window)?;
    let nodata = options.nodata.or(raster.nodata());
    let fill = T::from_f64(nodata.unwrap_or(0.))?;
    let inside = shapes_mask(shapes, raster.transform(), raster.size(), options.all_touched);

    let mut raster = raster.with_nodata(nodata);
    for mut band in raster.data_mut().axis_iter_mut(Axis(0)) {
        Zip::from(&mut band).and(&inside).for_each(|value, inside| {
            if *inside == options.invert {
                *value = fill;
            }
        });
    }
    Ok(raster)
}

/// `true` for every pixel of a `(width, height)` grid that belongs to
/// `shapes`: its centre is inside, or with `all_touched` its cell
/// intersects them.
pub fn shapes_mask(
    shapes: &MultiPolygon,
    transform: &GeoTransform,
    size: (usize, usize),
    all_touched: bool,
) -> Array2<bool> {
    let (width, height) = size;
    let Some(shapes_bounds) = shapes.bounding_rect() else {
        return Array2::from_elem((height, width), false);
    };
    let mut mask = Array2::from_elem((height, width), false);
    Zip::indexed(&mut mask).par_for_each(|(row, col), inside| {
        *inside = if all_touched {
            let cell = pixel_cell(transform, col, row);
            shapes_bounds.intersects(&cell) && shapes.intersects(&cell)
        } else {
            let centre = Point::from(transform.pixel_centre_to_map(col, row));
            shapes_bounds.intersects(&centre) && shapes.contains(&centre)
        };
    });
    mask
}

fn pixel_cell(transform: &GeoTransform, col: usize, row: usize) -> Polygon {
    let (col, row) = (col as f64, row as f64);
    let corners: Vec<Coord> = [
        (col, row),
        (col + 1., row),
        (col + 1., row + 1.),
        (col, row + 1.),
        (col, row),
    ]
    .into_iter()
    .map(|(x, y)| transform.pixel_to_map(Coord { x, y }))
    .collect();
    Polygon::new(LineString::new(corners), vec![])
}
