//! Chat model provider implementations

mod http_client;
mod openai;

pub use http_client::{HttpClient, HttpClientTrait, HttpError};
pub use openai::OpenAiProvider;

#[cfg(test)]
pub use http_client::mock::MockHttpClient;
