mod client;
mod parse;

pub use client::{
    CloudClient, CloudConfig, DEFAULT_CONNECT_TIMEOUT, DEFAULT_ENDPOINT, DEFAULT_JPEG_QUALITY,
    DEFAULT_MIN_SCORE, DEFAULT_READ_TIMEOUT, DEFAULT_WRITE_TIMEOUT,
};
pub use parse::{parse_annotations, FALLBACK_LABEL};
