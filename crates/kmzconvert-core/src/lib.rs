pub mod batch;
pub mod error;
pub mod geom;
pub mod logging;
pub mod metrics;
pub mod model;
pub mod report;
pub mod source;

pub use error::{ConvertError, ErrorKind};
