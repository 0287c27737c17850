mod flow;
mod local_file;
mod session;
mod types;

pub use flow::{SettlePolicy, UploadFlow};
pub use local_file::LocalFile;
pub use session::{SubmitRequest, UploadSession};
pub use types::{Confirmation, TargetState, UploadError, UploadStage};
