mod error;
#[allow(clippy::module_inception)]
mod proxy;

pub use error::ProxyError;
pub use proxy::{Proxy, ProxyStatus};
