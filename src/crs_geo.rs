use std::{fmt::Display, sync::Arc};

use gdal::spatial_ref::SpatialRef;
use geo::{BoundingRect, CoordNum, MapCoords, Rect};
use proj::Proj;
use serde::{Deserialize, Serialize};
use shrinkwraprs::Shrinkwrap;

use crate::errors::{GeoprepError, Result};

const WGS84_EPSG: u32 = 4326;

/// Coordinate reference system, kept as whatever definition PROJ and GDAL
/// accept (`EPSG:NNNN`, WKT, PROJ strings).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Crs(Arc<str>);

impl Crs {
    pub fn new(definition: impl AsRef<str>) -> Self {
        Self(Arc::from(definition.as_ref()))
    }

    pub fn epsg(code: u32) -> Self {
        Self::new(format!("EPSG:{code}"))
    }

    pub fn wgs84() -> Self {
        Self::epsg(WGS84_EPSG)
    }

    pub fn definition(&self) -> &str {
        self.0.as_ref()
    }

    pub fn spatial_ref(&self) -> Result<SpatialRef> {
        Ok(SpatialRef::from_definition(self.definition())?)
    }

    /// True when both definitions describe the same CRS, even if spelled
    /// differently (e.g. `EPSG:4326` and its WKT).
    pub fn same_as(&self, other: &Crs) -> Result<bool> {
        if self.eq(other) {
            return Ok(true);
        }
        Ok(self.spatial_ref()? == other.spatial_ref()?)
    }

    pub fn is_wgs84(&self) -> Result<bool> {
        let srs = self.spatial_ref()?;
        let is_epsg = srs.auth_name().map(|name| name.eq("EPSG")).unwrap_or(false);
        Ok(is_epsg && srs.auth_code().ok() == Some(WGS84_EPSG as i32))
    }

    /// PROJ transformation from `self` into `target`, with lon/lat axis order
    /// for geographic systems.
    pub fn proj_to(&self, target: &Crs) -> Result<Proj> {
        Ok(Proj::new_known_crs(
            self.definition(),
            target.definition(),
            None,
        )?)
    }
}

impl Display for Crs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let definition = self.definition();
        match definition.char_indices().nth(48) {
            Some((idx, _)) => write!(f, "{}...", &definition[..idx]),
            None => f.write_str(definition),
        }
    }
}

impl From<&str> for Crs {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Crs {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&Crs> for Crs {
    fn from(value: &Crs) -> Self {
        value.clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hemisphere {
    North,
    South,
}

/// WGS84 / UTM zone, `EPSG:326NN` in the north and `EPSG:327NN` in the south.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UtmZone {
    number: u8,
    hemisphere: Hemisphere,
}

impl UtmZone {
    pub fn new(number: u8, hemisphere: Hemisphere) -> Result<Self> {
        if !(1..=60).contains(&number) {
            return Err(GeoprepError::InvalidUtmZone(number));
        }
        Ok(Self { number, hemisphere })
    }

    pub fn north(number: u8) -> Result<Self> {
        Self::new(number, Hemisphere::North)
    }

    pub fn south(number: u8) -> Result<Self> {
        Self::new(number, Hemisphere::South)
    }

    pub fn number(&self) -> u8 {
        self.number
    }

    pub fn hemisphere(&self) -> Hemisphere {
        self.hemisphere
    }

    pub fn epsg(&self) -> u32 {
        let base = match self.hemisphere {
            Hemisphere::North => 32600,
            Hemisphere::South => 32700,
        };
        base + self.number as u32
    }

    pub fn crs(&self) -> Crs {
        Crs::epsg(self.epsg())
    }
}

impl TryFrom<u8> for UtmZone {
    type Error = GeoprepError;
    fn try_from(value: u8) -> Result<Self> {
        Self::north(value)
    }
}

/// Geometry tagged with the CRS its coordinates are expressed in.
#[derive(Shrinkwrap, Debug, Clone)]
pub struct CrsGeometry<G> {
    crs: Crs,
    #[shrinkwrap(main_field)]
    geometry: G,
}

impl<G> CrsGeometry<G> {
    pub fn new(crs: Crs, geometry: G) -> Self {
        Self { crs, geometry }
    }

    pub fn crs(&self) -> &Crs {
        &self.crs
    }

    pub fn geometry(&self) -> &G {
        &self.geometry
    }

    pub fn into_inner(self) -> G {
        self.geometry
    }
}

impl<G: MapCoords<f64, f64, Output = G> + Clone> CrsGeometry<G> {
    pub fn with_crs(self, crs: &Crs) -> Result<Self> {
        let geometry = self.projected_geometry(crs)?;
        Ok(Self {
            crs: crs.clone(),
            geometry,
        })
    }

    /// Clones if crs is same.
    pub fn projected_geometry(&self, crs: &Crs) -> Result<G> {
        if self.crs.same_as(crs)? {
            Ok(self.geometry.clone())
        } else {
            let proj = self.crs.proj_to(crs)?;
            Ok(self
                .geometry
                .try_map_coords(|coord| proj.convert(coord))?)
        }
    }
}

impl<G: BoundingRect<f64>> CrsGeometry<G>
where
    G::Output: Into<Option<Rect<f64>>>,
{
    pub fn bounding_rect(&self) -> Option<CrsGeometry<Rect<f64>>> {
        let geometry = self.geometry.bounding_rect().into()?;
        Some(CrsGeometry {
            crs: self.crs.clone(),
            geometry,
        })
    }
}

impl<T: CoordNum> CrsGeometry<Rect<T>> {
    pub fn width(&self) -> T {
        self.geometry.width()
    }

    pub fn height(&self) -> T {
        self.geometry.height()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, Centroid};
    use rstest::rstest;

    #[rstest]
    #[case(33, Hemisphere::North, 32633)]
    #[case(1, Hemisphere::South, 32701)]
    #[case(60, Hemisphere::North, 32660)]
    fn utm_zone_epsg(#[case] number: u8, #[case] hemisphere: Hemisphere, #[case] epsg: u32) {
        let zone = UtmZone::new(number, hemisphere).unwrap();
        assert_eq!(zone.epsg(), epsg);
        assert_eq!(zone.crs(), Crs::epsg(epsg));
    }

    #[rstest]
    #[case(0)]
    #[case(61)]
    fn utm_zone_out_of_range(#[case] number: u8) {
        assert!(matches!(
            UtmZone::try_from(number),
            Err(GeoprepError::InvalidUtmZone(n)) if n == number
        ));
    }

    #[rstest]
    fn same_crs_different_spelling() {
        let wkt = Crs::wgs84().spatial_ref().unwrap().to_wkt().unwrap();
        assert!(Crs::wgs84().same_as(&Crs::new(wkt)).unwrap());
        assert!(!Crs::wgs84().same_as(&Crs::epsg(32633)).unwrap());
    }

    #[rstest]
    fn wgs84_detection() {
        assert!(Crs::wgs84().is_wgs84().unwrap());
        assert!(!Crs::epsg(32633).is_wgs84().unwrap());
    }

    #[rstest]
    fn projected_geometry_same_crs_is_identity() {
        let square = polygon![(x: 0., y: 0.), (x: 10., y: 0.), (x: 10., y: 10.), (x: 0., y: 10.)];
        let geometry = CrsGeometry::new(Crs::epsg(32633), square.clone());
        assert_eq!(geometry.projected_geometry(&Crs::epsg(32633)).unwrap(), square);
    }

    #[rstest]
    fn with_crs_moves_to_lon_lat() {
        // central meridian of zone 33 is 15E
        let square = polygon![
            (x: 499_000., y: 5_000_000.),
            (x: 501_000., y: 5_000_000.),
            (x: 501_000., y: 5_002_000.),
            (x: 499_000., y: 5_002_000.),
        ];
        let geographic = CrsGeometry::new(Crs::epsg(32633), square)
            .with_crs(&Crs::wgs84())
            .unwrap();
        assert_eq!(geographic.crs(), &Crs::wgs84());
        let centroid = geographic.centroid().unwrap();
        assert!((centroid.x() - 15.0).abs() < 1e-6);
        assert!((centroid.y() - 45.15).abs() < 0.1);
        let rect = geographic.bounding_rect().unwrap();
        assert!(rect.width() > 0.0 && rect.height() > 0.0);
        assert!(rect.min().x < 15.0 && rect.max().x > 15.0);
    }
}
