pub mod bounds;
pub mod file;
pub mod raster;
pub mod transforms;
pub mod vector;

pub use bounds::{GeoBounds, PixelWindow};
pub use file::{gdal_backend::GdalFile, File};
pub use raster::{DataType, Raster};
pub use transforms::GeoTransform;
pub use vector::VectorLayer;

use std::collections::HashMap;
pub type Metadata = HashMap<String, String>;
