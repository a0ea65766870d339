pub mod generation;
pub mod post;
pub mod quota;
pub mod window;

pub use generation::GenerationResult;
pub use post::BlogPost;
pub use quota::{ModelQuota, QuotaCategory};
pub use window::{Granularity, UsageWindow};
