pub mod bounds;
pub mod centroid;
pub mod clip;
pub mod reproject;
pub mod resample;

pub use bounds::raster_bounds_latlon;
pub use centroid::{shapefile_centroid_latlon, shapefile_centroid_latlon_in};
pub use clip::{clip_raster_to_aoi, clip_raster_to_aoi_with, ClipOptions};
pub use reproject::{reproject_raster, reproject_raster_with, ReprojectOptions, Reprojected};
pub use resample::Resampling;
