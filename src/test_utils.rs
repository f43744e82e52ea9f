//! Synthetic rasters and vector layers written to temporary directories.

use std::path::{Path, PathBuf};

use gdal::{
    vector::{LayerAccess, LayerOptions, OGRwkbGeometryType, ToGdal},
    DriverManager,
};
use geo::{Coord, Geometry, Polygon, Rect};
use ndarray::Array3;

use crate::{
    components::{GeoTransform, Metadata, Raster},
    crs_geo::Crs,
};

pub const UTM_ORIGIN: Coord = Coord {
    x: 500_000.,
    y: 5_000_000.,
};

pub const WGS84_ORIGIN: Coord = Coord { x: 14., y: 46. };

pub const NODATA: f64 = -9999.;

/// Two band `f32` grid where band `b` holds `b * 1000 + row * width + col`.
pub fn synthetic_raster(
    shape: (usize, usize),
    transform: GeoTransform,
    crs: Crs,
) -> Raster<f32> {
    let (width, height) = shape;
    let data = Array3::from_shape_fn((2, height, width), |(band, row, col)| {
        (band * 1000 + row * width + col) as f32
    });
    let metadata = Metadata::from([("SOURCE".to_string(), "synthetic".to_string())]);
    Raster::new(data, transform, crs)
        .with_nodata(Some(NODATA))
        .with_metadata(metadata)
}

/// Synthetic grid in UTM zone 33N with its top left corner at [UTM_ORIGIN].
pub fn utm_raster(dir: &Path, name: &str, shape: (usize, usize), pixel_size: f64) -> PathBuf {
    let path = dir.join(name);
    synthetic_raster(
        shape,
        GeoTransform::north_up(UTM_ORIGIN, pixel_size),
        Crs::epsg(32633),
    )
    .write_geotiff(&path)
    .unwrap();
    path
}

/// Synthetic grid in WGS84 with its top left corner at [WGS84_ORIGIN].
pub fn wgs84_raster(dir: &Path, name: &str, shape: (usize, usize), pixel_size: f64) -> PathBuf {
    let path = dir.join(name);
    synthetic_raster(
        shape,
        GeoTransform::north_up(WGS84_ORIGIN, pixel_size),
        Crs::wgs84(),
    )
    .write_geotiff(&path)
    .unwrap();
    path
}

/// Axis aligned square with its lower left corner at `(x, y)`.
pub fn square(x: f64, y: f64, side: f64) -> Polygon {
    Rect::new((x, y), (x + side, y + side)).to_polygon()
}

/// Vector file with one feature per geometry, driver picked from the
/// extension (`.shp` or `.geojson`).
pub fn write_vector(
    dir: &Path,
    name: &str,
    geometries: Vec<Geometry>,
    crs: Option<&Crs>,
) -> PathBuf {
    let path = dir.join(name);
    let driver_name = match path.extension().and_then(|ext| ext.to_str()) {
        Some("shp") => "ESRI Shapefile",
        _ => "GeoJSON",
    };
    let geometry_type = if geometries
        .iter()
        .all(|geometry| matches!(geometry, Geometry::Polygon(_)))
    {
        OGRwkbGeometryType::wkbPolygon
    } else {
        OGRwkbGeometryType::wkbUnknown
    };
    let srs = crs.map(|crs| crs.spatial_ref().unwrap());

    let driver = DriverManager::get_driver_by_name(driver_name).unwrap();
    let mut dataset = driver.create_vector_only(&path).unwrap();
    let mut layer = dataset
        .create_layer(LayerOptions {
            name: "aoi",
            srs: srs.as_ref(),
            ty: geometry_type,
            ..Default::default()
        })
        .unwrap();
    for geometry in geometries {
        layer.create_feature(geometry.to_gdal().unwrap()).unwrap();
    }
    path
}
