//! Report rendering for assessforge attempts.

pub mod html;

pub use html::{generate_html, write_html_report};
