pub mod api_connection;
pub mod cli;
pub mod extractor;
pub mod normalizer;
pub mod pipeline;
pub mod prompt;
