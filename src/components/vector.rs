use std::path::Path;

use gdal::{errors::Result as GdalResult, vector::LayerAccess, Dataset as GdalDataset};
use geo::{Geometry, GeometryCollection, MultiPolygon, Polygon};
use log::{debug, warn};

use crate::{
    crs_geo::{Crs, CrsGeometry},
    errors::{GeoprepError, Result},
};

/// Geometries of the first layer of a vector file.
#[derive(Debug, Clone)]
pub struct VectorLayer {
    crs: Option<Crs>,
    geometries: Vec<Geometry>,
}

impl VectorLayer {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let dataset = GdalDataset::open(path.as_ref())?;
        let mut layer = dataset.layer(0)?;
        let crs = layer
            .spatial_ref()
            .map(|srs| srs.to_wkt())
            .transpose()?
            .map(Crs::new);
        let geometries = layer
            .features()
            .filter_map(|feature| feature.geometry().map(|geometry| geometry.to_geo()))
            .collect::<GdalResult<Vec<_>>>()?;
        debug!(
            "read {} geometries from {:?}",
            geometries.len(),
            path.as_ref()
        );
        Ok(Self { crs, geometries })
    }

    pub fn crs(&self) -> Option<&Crs> {
        self.crs.as_ref()
    }

    pub fn geometries(&self) -> &[Geometry] {
        &self.geometries
    }

    pub fn is_empty(&self) -> bool {
        self.geometries.is_empty()
    }

    pub fn collection(&self) -> GeometryCollection {
        GeometryCollection::new_from(self.geometries.clone())
    }

    /// Every polygonal part of the layer, nested collections included.
    /// Non polygonal geometries are skipped.
    pub fn polygons(&self) -> MultiPolygon {
        let mut polygons = Vec::new();
        for geometry in &self.geometries {
            collect_polygons(geometry, &mut polygons);
        }
        MultiPolygon::new(polygons)
    }

    /// Layer polygons in the layer crs, or in `fallback` when the file
    /// has none.
    pub fn crs_polygons(&self, fallback: &Crs) -> Result<CrsGeometry<MultiPolygon>> {
        let polygons = self.polygons();
        if polygons.0.is_empty() {
            return Err(GeoprepError::EmptyGeometry);
        }
        let crs = match &self.crs {
            Some(crs) => crs.clone(),
            None => {
                warn!("vector layer has no crs, assuming {fallback}");
                fallback.clone()
            }
        };
        Ok(CrsGeometry::new(crs, polygons))
    }
}

fn collect_polygons(geometry: &Geometry, polygons: &mut Vec<Polygon>) {
    match geometry {
        Geometry::Polygon(polygon) => polygons.push(polygon.clone()),
        Geometry::MultiPolygon(multi_polygon) => polygons.extend(multi_polygon.iter().cloned()),
        Geometry::Rect(rect) => polygons.push(rect.to_polygon()),
        Geometry::Triangle(triangle) => polygons.push(triangle.to_polygon()),
        Geometry::GeometryCollection(collection) => collection
            .iter()
            .for_each(|geometry| collect_polygons(geometry, polygons)),
        other => warn!("skipping non polygonal geometry {other:?}"),
    }
}
