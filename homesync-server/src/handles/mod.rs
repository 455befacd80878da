mod auth_handle;
mod dashboard_handle;
mod device_handle;
mod sse_handle;

pub use auth_handle::*;
pub use dashboard_handle::*;
pub use device_handle::*;
pub use sse_handle::*;
