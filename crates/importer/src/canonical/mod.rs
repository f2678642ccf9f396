pub mod models;
pub mod transformer;
pub mod validator;

pub use models::{FORMAT_VERSION, ParticipantEntry, PredictionsFile};
pub use transformer::{ImportSummary, PredictionsTransformer};
pub use validator::{PredictionsValidator, ValidationReport};
