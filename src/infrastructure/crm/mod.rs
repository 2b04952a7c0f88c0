//! CRM sync infrastructure

mod dispatcher;
mod http;
mod noop;

pub use dispatcher::CrmSyncDispatcher;
pub use http::{HttpCrmConfig, HttpCrmSync};
pub use noop::NoopCrmSync;
