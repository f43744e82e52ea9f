use std::{fmt::Debug, path::Path};

use crate::{
    components::{
        bounds::{GeoBounds, PixelWindow},
        raster::{DataType, Raster},
        transforms::GeoTransform,
        Metadata,
    },
    crs_geo::Crs,
    errors::Result,
};

/// Raster dataset on disk.
pub trait File: Debug + Sized {
    fn open<P: AsRef<Path>>(path: P) -> Result<Self>;
    /// (width, height)
    fn size(&self) -> (usize, usize);
    fn crs(&self) -> Result<Crs>;
    fn transform(&self) -> Result<GeoTransform>;
    fn num_bands(&self) -> usize;
    /// Nodata of the first band, applied to all bands.
    fn nodata(&self) -> Result<Option<f64>>;
    fn metadata(&self) -> Metadata;
    /// Every band, cut to `window`, with the transform moved to the window origin.
    fn read_window<T: DataType>(&self, window: &PixelWindow) -> Result<Raster<T>>;

    fn geo_bounds(&self) -> Result<GeoBounds> {
        Ok(GeoBounds::from_grid(
            &self.transform()?,
            self.size(),
            self.crs()?,
        ))
    }

    fn read<T: DataType>(&self) -> Result<Raster<T>> {
        self.read_window(&PixelWindow::full(self.size()))
    }
}

/// Implementations for gdal
pub mod gdal_backend {
    use super::*;
    use crate::errors::GeoprepError;
    use gdal::{
        raster::{Buffer, GdalDataType}, Dataset as GdalDataset, DriverManager, Metadata as GdalMetadata,
        MetadataEntry as GdalMetadataEntry,
    };
    use log::debug;
    use ndarray::{Array3, Axis};
    use std::path::PathBuf;

    pub(crate) const GEOTIFF_DRIVER: &str = "GTiff";

    fn filter_metadata_gdal(metadata: &impl GdalMetadata) -> Metadata {
        GdalMetadata::metadata(metadata)
            .filter_map(|GdalMetadataEntry { domain, key, value }| {
                if domain.eq("") {
                    Some((key, value))
                } else {
                    None
                }
            })
            .collect()
    }

    #[derive(Debug)]
    pub struct GdalFile {
        path: PathBuf,
        dataset: GdalDataset,
    }

    impl GdalFile {
        /// Storage type of the first band.
        pub fn band_type(&self) -> Result<GdalDataType> {
            Ok(self.dataset.rasterband(1)?.band_type())
        }
    }

    impl File for GdalFile {
        fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
            Ok(GdalFile {
                path: path.as_ref().to_path_buf(),
                dataset: GdalDataset::open(&path)?,
            })
        }
        fn size(&self) -> (usize, usize) {
            self.dataset.raster_size()
        }
        fn crs(&self) -> Result<Crs> {
            let projection = self.dataset.projection();
            if projection.is_empty() {
                return Err(GeoprepError::MissingCrs);
            }
            Ok(Crs::new(projection))
        }
        fn transform(&self) -> Result<GeoTransform> {
            Ok(GeoTransform::from_gdal(self.dataset.geo_transform()?))
        }
        fn num_bands(&self) -> usize {
            self.dataset.raster_count()
        }
        fn nodata(&self) -> Result<Option<f64>> {
            Ok(self.dataset.rasterband(1)?.no_data_value())
        }
        fn metadata(&self) -> Metadata {
            filter_metadata_gdal(&self.dataset)
        }
        fn read_window<T: DataType>(&self, window: &PixelWindow) -> Result<Raster<T>> {
            let size = window.size();
            let num_bands = self.num_bands();
            debug!(
                "reading {num_bands} bands of {:?} at {:?} size {:?}",
                self.path,
                window.offset(),
                size
            );
            let mut data = Vec::with_capacity(num_bands * window.len());
            for band_index in 1..=num_bands {
                let buffer = self
                    .dataset
                    .rasterband(band_index)?
                    .read_as::<T>(window.offset(), size, size, None)?;
                data.extend_from_slice(buffer.data());
            }
            let data = Array3::from_shape_vec((num_bands, size.1, size.0), data)?;
            let (col_off, row_off) = window.offset();
            Ok(
                Raster::new(data, self.transform()?.shifted(col_off, row_off), self.crs()?)
                    .with_nodata(self.nodata()?)
                    .with_metadata(self.metadata()),
            )
        }
    }

    /// Write every band of `raster` to a new GeoTIFF at `path`, with its
    /// transform, crs, nodata and dataset metadata.
    pub fn write_geotiff<T: DataType>(raster: &Raster<T>, path: impl AsRef<Path>) -> Result<()> {
        let driver = DriverManager::get_driver_by_name(GEOTIFF_DRIVER)?;
        let (width, height) = raster.size();
        let mut dataset = driver.create_with_band_type::<T, _>(
            path.as_ref(),
            width,
            height,
            raster.num_bands(),
        )?;
        dataset.set_geo_transform(&raster.transform().to_gdal())?;
        dataset.set_spatial_ref(&raster.crs().spatial_ref()?)?;
        for (key, value) in raster.metadata() {
            dataset.set_metadata_item(key, value, "")?;
        }

        for (band_index, band) in raster.data().axis_iter(Axis(0)).enumerate() {
            let mut rasterband = dataset.rasterband(band_index + 1)?;
            let mut buffer = Buffer::new((width, height), band.iter().copied().collect());
            rasterband.write((0, 0), (width, height), &mut buffer)?;
            if let Some(nodata) = raster.nodata() {
                rasterband.set_no_data_value(Some(nodata))?;
            }
        }
        dataset.flush_cache()?;
        debug!("wrote {raster:?} to {:?}", path.as_ref());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{gdal_backend::GdalFile, *};
    use crate::test_utils::{utm_raster, UTM_ORIGIN};
    use geo::Coord;
    use rstest::rstest;

    #[rstest]
    fn write_then_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = utm_raster(dir.path(), "grid.tif", (30, 20), 10.);
        let file = GdalFile::open(&path).unwrap();
        assert_eq!(file.size(), (30, 20));
        assert_eq!(file.num_bands(), 2);
        assert_eq!(file.nodata().unwrap(), Some(-9999.));
        assert_eq!(file.transform().unwrap().xoff(), UTM_ORIGIN.x);
        assert!(file.crs().unwrap().same_as(&Crs::epsg(32633)).unwrap());
        assert_eq!(file.metadata().get("SOURCE").map(String::as_str), Some("synthetic"));
        assert_eq!(
            file.geo_bounds().unwrap().to_tuple(),
            (UTM_ORIGIN.x, UTM_ORIGIN.y - 200., UTM_ORIGIN.x + 300., UTM_ORIGIN.y)
        );
    }

    #[rstest]
    fn read_window_moves_origin() {
        let dir = tempfile::tempdir().unwrap();
        let path = utm_raster(dir.path(), "grid.tif", (30, 20), 10.);
        let file = GdalFile::open(&path).unwrap();
        let raster = file
            .read_window::<f32>(&PixelWindow::new((5, 2), (4, 3)))
            .unwrap();
        assert_eq!(raster.data().dim(), (2, 3, 4));
        assert_eq!(
            raster.transform().pixel_to_map(Coord { x: 0., y: 0. }),
            Coord {
                x: UTM_ORIGIN.x + 50.,
                y: UTM_ORIGIN.y - 20.
            }
        );
        // synthetic values are row * width + col, second band offset by 1000
        assert_eq!(raster.data()[[0, 0, 0]], (2 * 30 + 5) as f32);
        assert_eq!(raster.data()[[1, 2, 3]], (1000 + 4 * 30 + 8) as f32);
    }

    #[rstest]
    fn missing_file_propagates_gdal_error() {
        assert!(matches!(
            GdalFile::open("/definitely/not/here.tif"),
            Err(crate::errors::GeoprepError::GdalError(_))
        ));
    }
}
