pub mod client;

pub use client::{verify_sha1, DownloadEntry, Downloader, Source};
