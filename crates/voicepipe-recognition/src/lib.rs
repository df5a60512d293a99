pub mod session;
pub mod transport;
pub mod ws;

pub use session::RecognitionSession;
pub use transport::{RecognizerTransport, SessionOptions, WireEvent};
pub use ws::WsTransport;
