pub mod chart;
pub mod history;
pub mod today;
