pub mod model;
pub mod parse;
pub mod read;
pub mod rule_map;
