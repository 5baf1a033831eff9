//! Job-post and application lifecycle: status vocabulary, repository
//! ports and the three services built on them.

pub mod applications;
pub mod error;
pub mod jobs;
pub mod moderation;
pub mod ports;
pub mod status;

pub use applications::ApplicationLifecycle;
pub use error::{DeletionReport, LifecycleError};
pub use jobs::JobLifecycle;
pub use moderation::{AdminModeration, Rejection};
