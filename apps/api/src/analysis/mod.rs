// CV analysis: request validation, prompt rendering, bounded engine calls,
// response decoding, source extraction and the request lifecycle.
// Engine calls go through engine_client only.

pub mod cancellation;
pub mod decoder;
pub mod error;
pub mod handlers;
pub mod lifecycle;
pub mod pipeline;
pub mod prompts;
pub mod request;
pub mod session;
pub mod sources;
pub mod transport;
