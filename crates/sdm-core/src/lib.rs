pub mod config;
pub mod error;
pub mod logging;

pub mod control;
pub mod downloader;
pub mod fetch_head;
pub mod http;
pub mod job;
pub mod pipeline;
pub mod segmenter;
pub mod storage;

pub use error::{DownloadError, Result};
pub use job::Job;
pub use pipeline::{download, download_async, DownloadReport};
