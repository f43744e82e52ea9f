pub type Result<T> = std::result::Result<T, GeoprepError>;

#[derive(thiserror::Error, Debug)]
pub enum GeoprepError {
    #[error(transparent)]
    ProjError(#[from] proj::ProjError),
    #[error(transparent)]
    ProjCreateError(#[from] proj::ProjCreateError),
    #[error(transparent)]
    GdalError(#[from] gdal::errors::GdalError),
    #[error(transparent)]
    NdarrayError(#[from] ndarray::ShapeError),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error(transparent)]
    FmtError(#[from] std::fmt::Error),
    #[error("Input shapes do not overlap raster")]
    NoIntersection,
    #[error("No geometry to operate on")]
    EmptyGeometry,
    #[error("Dataset has no coordinate reference system")]
    MissingCrs,
    #[error("UTM zone {0} is outside 1..=60")]
    InvalidUtmZone(u8),
    #[error("Affine transform is not invertible")]
    NonInvertibleTransform,
    #[error("Value could not be cast")]
    Uncastable,
    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}
