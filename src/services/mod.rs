pub mod measurement_service;
pub mod query_service;
pub mod sensor_service;
pub mod series_service;
pub mod validation;

pub use measurement_service::*;
pub use query_service::*;
pub use sensor_service::*;
pub use series_service::*;
pub use validation::*;
