pub mod error;
pub mod http;
pub mod services;
pub mod workflow;

pub use error::{ApiError, ClientError};
pub use http::{
    ApiClient, HttpRequest, HttpResponse, HttpTransport, Method, ReqwestTransport,
    ScriptedResponse, ScriptedTransport, TransportError,
};
pub use services::{Credentials, Download, ReportFormat};
pub use workflow::{
    EntityDialog, PaymentReview, PhotoGallery, ProjectReviewBoard, UploadDialog,
};
