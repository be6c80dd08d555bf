pub mod line_item;
pub mod scenario;
