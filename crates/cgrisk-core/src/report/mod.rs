pub mod explain;
pub mod format;
pub mod model;
pub mod remediation;
pub mod render;
