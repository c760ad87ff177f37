//! Reports for FreshMart.
//!
//! - **CSV**: product, order and user exports honoring listing filters
//! - **Invoice**: a one-order PDF rendered by a small built-in PDF writer
//!
//! [`Reports`] fetches the data and returns ready-to-send [`Document`]s.

pub mod csv;
mod error;
pub mod invoice;
pub mod pdf;
mod service;

pub use error::ReportError;
pub use invoice::InvoiceData;
pub use service::Reports;

use serde::Serialize;

/// A rendered file ready for download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    pub filename: String,
    pub content_type: &'static str,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl Document {
    pub const CSV: &'static str = "text/csv; charset=utf-8";
    pub const PDF: &'static str = "application/pdf";

    pub fn csv(filename: impl Into<String>, body: String) -> Self {
        Self {
            filename: filename.into(),
            content_type: Self::CSV,
            bytes: body.into_bytes(),
        }
    }

    pub fn pdf(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content_type: Self::PDF,
            bytes,
        }
    }

    /// `Content-Disposition` header value.
    pub fn disposition(&self) -> String {
        format!("attachment; filename={}", self.filename)
    }
}
