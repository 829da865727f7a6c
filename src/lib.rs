mod client;
mod config;
mod error;
mod notify;
mod pager;
mod session;
mod sse;
mod upload;
pub mod types;

pub use self::client::Client;
pub use self::config::{Config, DEFAULT_API_BASE};
pub use self::error::{Error, RedirectTarget};
pub use self::notify::{LogNotifier, Notifier};
pub use self::pager::PageLoader;
pub use self::session::{Credential, MemorySession, SessionProvider};
pub use self::sse::{SseDecoder, SseEvent, SseStream, StreamResponse};
pub use self::upload::{ProgressHandler, UploadFile};
