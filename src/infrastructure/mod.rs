//! 基础设施层
//!
//! 持有稀缺资源（HTTP 连接池），只暴露"发送一次请求"的能力

pub mod transport;

pub use transport::{Endpoint, HttpTransport, RawResponse, Transport, TransportError};
