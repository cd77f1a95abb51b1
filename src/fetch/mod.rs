mod error;
mod retry;

pub use error::FetchError;
pub use retry::{fetch_with_retry, RetryPolicy};
