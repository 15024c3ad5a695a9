pub(crate) mod config;
pub(crate) mod maintenance;
pub(crate) mod records;
pub(crate) mod report;
