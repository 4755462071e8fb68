pub mod ops_analyze;
pub mod ops_why;
pub mod render;
