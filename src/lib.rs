pub mod annotate;
pub mod components;
pub mod crs_geo;
mod errors;
mod intersection;
pub mod ops;
#[cfg(test)]
mod test_utils;

pub use annotate::{Axes, MapAxes, NorthArrow, ScaleBar};
pub use components::{File, GdalFile, GeoBounds, GeoTransform, Raster};
pub use crs_geo::{Crs, UtmZone};
pub use errors::{GeoprepError, Result};
pub use intersection::Intersection;
pub use ops::{
    clip_raster_to_aoi, clip_raster_to_aoi_with, raster_bounds_latlon, reproject_raster,
    reproject_raster_with, shapefile_centroid_latlon, shapefile_centroid_latlon_in, ClipOptions,
    ReprojectOptions, Reprojected, Resampling,
};
