// External collaborators: dataset files in, report file out
pub mod dataset;
pub mod report;

pub use dataset::{filter_country, load_hotels, load_restaurants, DatasetError};
pub use report::{write_report, ReportError};
