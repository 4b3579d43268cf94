pub mod apply;
pub mod parse;
