pub mod daily_fetcher;
pub mod downloader;
pub mod error;
pub mod http_client;
pub mod transport;

#[cfg(test)]
pub(crate) mod mock_transport;
