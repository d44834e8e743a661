//! Win-rate modelling: feature encoding, the three sub-classifiers, the
//! trained bundle that holds them, and the weighted ensemble on top.

pub mod bundle;
pub mod classifier;
pub mod encoder;
pub mod ensemble;
pub mod persist;
pub mod scaler;
pub mod schema;
pub mod vectorizer;

pub use bundle::ModelBundle;
pub use classifier::{LogisticModel, TrainParams};
pub use ensemble::{evaluate, evaluate_breakdown, WinBreakdown, WinRateModel, NEUTRAL_PRIOR};
pub use persist::{load_artifact, save_artifact, ArtifactFormat};
pub use schema::FeatureSchema;
