use std::path::Path;

use geo::{BooleanOps, Centroid, Coord, MultiPolygon, Point};
use log::{debug, info};

use crate::{
    components::VectorLayer,
    crs_geo::{Crs, CrsGeometry, UtmZone},
    errors::{GeoprepError, Result},
};

/// `(latitude, longitude)` of the centroid of everything in the vector file
/// at `path`, whose coordinates are in the northern UTM zone `utm_zone`.
pub fn shapefile_centroid_latlon(path: impl AsRef<Path>, utm_zone: u8) -> Result<(f64, f64)> {
    shapefile_centroid_latlon_in(path, UtmZone::try_from(utm_zone)?)
}

/// As [shapefile_centroid_latlon], for any hemisphere.
///
/// A layer with its own crs is projected into `zone` first; one without is
/// taken to be in `zone` already.
pub fn shapefile_centroid_latlon_in(path: impl AsRef<Path>, zone: UtmZone) -> Result<(f64, f64)> {
    let layer = VectorLayer::open(path.as_ref())?;
    let centroid = layer_centroid(&layer, &zone.crs())?;
    debug!("centroid of {:?} in {}: {centroid:?}", path.as_ref(), zone.crs());
    let (lat, lon) = utm_to_latlon(zone, centroid.into())?;
    info!("centroid of {:?} at lat {lat}, lon {lon}", path.as_ref());
    Ok((lat, lon))
}

/// Centroid of the union of the layer polygons, or of all its geometries
/// when it has no polygons, in `crs`.
pub fn layer_centroid(layer: &VectorLayer, crs: &Crs) -> Result<Point> {
    if layer.is_empty() {
        return Err(GeoprepError::EmptyGeometry);
    }
    let layer_crs = layer.crs().cloned().unwrap_or_else(|| crs.clone());
    let polygons = layer.polygons();
    let centroid = if polygons.0.is_empty() {
        CrsGeometry::new(layer_crs, layer.collection())
            .with_crs(crs)?
            .centroid()
    } else {
        let polygons = CrsGeometry::new(layer_crs, polygons)
            .with_crs(crs)?
            .into_inner();
        union(&polygons).centroid()
    };
    centroid.ok_or(GeoprepError::EmptyGeometry)
}

fn union(polygons: &MultiPolygon) -> MultiPolygon {
    polygons
        .iter()
        .fold(MultiPolygon::new(vec![]), |union, polygon| {
            union.union(&MultiPolygon::new(vec![polygon.clone()]))
        })
}

/// `(latitude, longitude)` of a point in `zone`.
pub fn utm_to_latlon(zone: UtmZone, coord: Coord) -> Result<(f64, f64)> {
    let lon_lat = zone.crs().proj_to(&Crs::wgs84())?.convert(coord)?;
    Ok((lon_lat.y, lon_lat.x))
}

pub fn latlon_to_utm(zone: UtmZone, lat: f64, lon: f64) -> Result<Coord> {
    Ok(Crs::wgs84()
        .proj_to(&zone.crs())?
        .convert(Coord { x: lon, y: lat })?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{square, write_vector, UTM_ORIGIN};
    use geo::{point, Geometry};
    use rstest::rstest;

    const ZONE: u8 = 33;

    /// Two overlapping 100 m squares and a third one inside the first.
    /// Their union is a 150 x 100 m rectangle centred 75 m east and 50 m
    /// north of [UTM_ORIGIN].
    fn overlapping_squares() -> Vec<Geometry> {
        let (x, y) = (UTM_ORIGIN.x, UTM_ORIGIN.y);
        vec![
            square(x, y, 100.).into(),
            square(x + 50., y, 100.).into(),
            square(x, y, 50.).into(),
        ]
    }

    fn union_centre() -> Coord {
        UTM_ORIGIN + Coord { x: 75., y: 50. }
    }

    #[test_log::test]
    fn centroid_of_union() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_vector(
            dir.path(),
            "aoi.shp",
            overlapping_squares(),
            Some(&UtmZone::north(ZONE).unwrap().crs()),
        );
        let layer = VectorLayer::open(&path).unwrap();
        let centroid = layer_centroid(&layer, &Crs::epsg(32633)).unwrap();
        assert!((centroid.x() - union_centre().x).abs() < 1e-6);
        assert!((centroid.y() - union_centre().y).abs() < 1e-6);

        let (lat, lon) = shapefile_centroid_latlon(&path, ZONE).unwrap();
        assert!((lon - 15.).abs() < 0.01);
        assert!((44.5..45.5).contains(&lat));
    }

    #[rstest]
    fn latlon_round_trips_to_utm() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_vector(dir.path(), "aoi.shp", overlapping_squares(), None);
        let (lat, lon) = shapefile_centroid_latlon(&path, ZONE).unwrap();
        let back = latlon_to_utm(UtmZone::north(ZONE).unwrap(), lat, lon).unwrap();
        let distance = ((back.x - union_centre().x).powi(2)
            + (back.y - union_centre().y).powi(2))
        .sqrt();
        assert!(distance < 1e-3, "round trip off by {distance} m");
    }

    #[rstest]
    fn southern_hemisphere() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_vector(dir.path(), "aoi.shp", overlapping_squares(), None);
        let zone = UtmZone::south(ZONE).unwrap();
        let (lat, lon) = shapefile_centroid_latlon_in(&path, zone).unwrap();
        assert!(lat < 0.);
        assert!((lon - 15.).abs() < 0.01);
        let back = latlon_to_utm(zone, lat, lon).unwrap();
        assert!((back.x - union_centre().x).abs() < 1e-3);
        assert!((back.y - union_centre().y).abs() < 1e-3);
    }

    #[rstest]
    fn layer_in_other_crs_is_projected() {
        let dir = tempfile::tempdir().unwrap();
        let zone = UtmZone::north(ZONE).unwrap();
        let lon_lat = CrsGeometry::new(zone.crs(), square(UTM_ORIGIN.x, UTM_ORIGIN.y, 100.))
            .with_crs(&Crs::wgs84())
            .unwrap()
            .into_inner();
        let path = write_vector(
            dir.path(),
            "aoi.geojson",
            vec![lon_lat.into()],
            Some(&Crs::wgs84()),
        );
        let (lat, lon) = shapefile_centroid_latlon(&path, ZONE).unwrap();
        let back = latlon_to_utm(zone, lat, lon).unwrap();
        let centre = UTM_ORIGIN + Coord { x: 50., y: 50. };
        assert!((back.x - centre.x).abs() < 0.01);
        assert!((back.y - centre.y).abs() < 0.01);
    }

    #[rstest]
    fn points_only_layer() {
        let dir = tempfile::tempdir().unwrap();
        let (x, y) = (UTM_ORIGIN.x, UTM_ORIGIN.y);
        let path = write_vector(
            dir.path(),
            "points.shp",
            vec![
                point!(x: x, y: y).into(),
                point!(x: x + 200., y: y + 100.).into(),
            ],
            None,
        );
        let layer = VectorLayer::open(&path).unwrap();
        let centroid = layer_centroid(&layer, &Crs::epsg(32633)).unwrap();
        assert!((centroid.x() - (x + 100.)).abs() < 1e-6);
        assert!((centroid.y() - (y + 50.)).abs() < 1e-6);
    }

    #[rstest]
    fn empty_layer() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_vector(dir.path(), "empty.shp", vec![], None);
        assert!(matches!(
            shapefile_centroid_latlon(&path, ZONE),
            Err(GeoprepError::EmptyGeometry)
        ));
    }

    #[rstest]
    #[case(0)]
    #[case(61)]
    fn zone_out_of_range(#[case] zone: u8) {
        let dir = tempfile::tempdir().unwrap();
        let path = write_vector(dir.path(), "aoi.shp", overlapping_squares(), None);
        assert!(matches!(
            shapefile_centroid_latlon(&path, zone),
            Err(GeoprepError::InvalidUtmZone(number)) if number == zone
        ));
    }
}
