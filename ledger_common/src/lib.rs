mod points;

pub mod helpers;
pub mod op;

pub use points::{Points, PointsConversionError, HUNDREDTHS_PER_POINT};
