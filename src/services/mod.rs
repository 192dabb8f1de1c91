pub mod artifacts;
pub mod classifier;
pub mod recommendations;
pub mod vectorizer;

pub use artifacts::{ArtifactError, ModelArtifacts};
pub use classifier::{Classifier, TreeEnsemble};
pub use recommendations::{MatchPath, Recommendations, Recommender, SimilarityMatrix};
pub use vectorizer::TfidfVectorizer;
