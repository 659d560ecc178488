pub mod report;
pub mod writer;

pub use report::RunReport;
pub use writer::TraceExporter;
