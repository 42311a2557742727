pub mod engine;
pub mod extract;
pub mod preprocess;
pub mod session;
pub mod setup;

pub use extract::clean_product_number;
pub use preprocess::{crop_selection, grayscale_contrast};
pub use session::{OcrSession, RecognitionOutcome};
