//! Screenshot recognition: remote classification and OCR clients, label
//! resolution, and the pick-screen / loading-screen passes built on them.

pub mod classifier;
pub mod credentials;
pub mod http;
pub mod inspect;
pub mod ocr;
pub mod recognize;
pub mod resolver;

pub use classifier::{
    classify, parse_prediction, Classification, EndpointCache, EndpointKey, RetryPolicy,
    TileClassifier, VertexEndpoint,
};
pub use credentials::{Credential, CredentialSource};
pub use inspect::export_layout;
pub use ocr::{preprocess_for_ocr, TextDetector, VisionOcrClient};
pub use recognize::{
    recognize_loading_screen, recognize_pick_screen, split_teams, PickScreen, PORTRAIT_THRESHOLD,
    RUNE_THRESHOLD,
};
pub use resolver::EntityResolver;
