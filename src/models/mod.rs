mod prediction;
mod title;

pub use prediction::{PredictRequest, PredictResponse, TitleFeatures};
pub use title::{CatalogRow, Recommendation};
