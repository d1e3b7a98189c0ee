pub(crate) mod http;
pub(crate) mod runtime;

pub use runtime::MaybeSend;
