use std::path::Path;

use log::debug;

use crate::{
    components::{bounds::DEFAULT_DENSIFY_POINTS, File, GdalFile, GeoBounds},
    crs_geo::Crs,
    errors::Result,
};

/// `(lon_min, lat_min, lon_max, lat_max)` of the raster at `path`.
pub fn raster_bounds_latlon(path: impl AsRef<Path>) -> Result<(f64, f64, f64, f64)> {
    let file = GdalFile::open(path)?;
    Ok(bounds_latlon(&file.geo_bounds()?)?.to_tuple())
}

/// `bounds` in WGS84, untouched when they are in WGS84 already.
pub fn bounds_latlon(bounds: &GeoBounds) -> Result<GeoBounds> {
    if bounds.crs().is_wgs84()? {
        return Ok(bounds.clone());
    }
    let latlon = bounds.transform_to(&Crs::wgs84(), DEFAULT_DENSIFY_POINTS)?;
    debug!("{:?} in {} is {:?}", bounds.rect(), bounds.crs(), latlon.rect());
    Ok(latlon)
}
