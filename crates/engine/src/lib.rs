//! Pure, synchronous stages of the polling cycle: payload validation,
//! status translation and failure-alert deduplication.

pub mod catalog;
pub mod gate;
pub mod translator;
pub mod validator;

pub use catalog::StatusCatalog;
pub use gate::NotificationGate;
pub use translator::StatusTranslator;
pub use validator::{ResponseValidator, ValidatedResponse};
