// Text layout support for the PDF exporter: font metrics and page geometry.

pub mod font_metrics;
pub mod page;

// Re-export the public API consumed by the exporters.
pub use font_metrics::{get_metrics, Face};
pub use page::{PageConfig, A4};
