pub mod browser_transport;
pub mod http_transport;
pub mod js_executor;
pub mod rate_limiter;
pub mod session_pool;
pub mod transport;

pub use browser_transport::{BrowserMode, BrowserProvider};
pub use http_transport::HttpProvider;
pub use js_executor::JsExecutor;
pub use rate_limiter::SlidingWindowRateLimiter;
pub use session_pool::{SessionPermit, SessionPool};
pub use transport::{FieldHandle, Transport, TransportProvider};
