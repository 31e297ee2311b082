//! Voucher module - numbering, suggestions and the submission flow
//!
//! - `allocator` - next voucher number per category
//! - `suggestions` - payee suggestions from recorded rows
//! - `submission` - tab setup, receipt, upload, row append, notification
//! - `handlers` - HTTP endpoints
//! - `form_parser` - multipart bodies for `/submit`

pub mod allocator;
pub mod form_parser;
pub mod handlers;
pub mod models;
pub mod profile;
pub mod submission;
pub mod suggestions;
