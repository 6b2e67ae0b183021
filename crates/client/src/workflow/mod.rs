//! View models: state plus the actions a screen offers, without rendering.

pub mod dialog;
pub mod photos;
pub mod review;
pub mod upload;

pub use dialog::{DialogOutcome, EntityDialog};
pub use photos::{PhotoGallery, ReorderFailure};
pub use review::{ActionOutcome, PaymentReview, ProjectReviewBoard, Refresh, ReviewSnapshot};
pub use upload::{UploadConfirmation, UploadDialog};
