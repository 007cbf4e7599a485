//! Output generation: template rendering, file export and run reports

pub mod exporter;
pub mod report;
pub mod template;

pub use exporter::{DocumentExporter, ExportedDocument, PandocConverter, PdfConverter, PdfEngine};
pub use report::{ApplicationReport, RunWarning};
pub use template::{TemplateRenderer, TemplateStore};
