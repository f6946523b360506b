//! Host integration surface
//!
//! The masked numeric entry surface consumes this crate and nothing else:
//! it observes session state as `OtpFieldView` values and renders them. It
//! never talks to the native listener or the permission bridge directly.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod models;
pub mod streams;

pub use models::OtpFieldView;
pub use streams::{current_view, view_stream};
