pub mod error;
pub mod response;
pub mod validation;

pub use error::{AppError, AppResult};
pub use validation::ValidationErrors;
