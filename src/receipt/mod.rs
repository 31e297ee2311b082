//! Receipt rendering - the one-page PDF attached to every voucher.
//!
//! - `layout` - fixed-position page layout
//! - `signature` - data-URL signature decoding

pub mod layout;
pub mod signature;

pub use layout::ReceiptRenderer;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReceiptError {
    #[error("failed to build PDF: {0}")]
    Pdf(String),
    #[error("invalid signature image: {0}")]
    Signature(String),
    #[error("failed to write receipt file: {0}")]
    Write(#[source] std::io::Error),
    #[error("rendering task failed: {0}")]
    Task(String),
}
