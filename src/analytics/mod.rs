pub mod report;
pub mod trend;
