mod area_resize;
pub mod coordinates;
pub mod options;
pub mod region;
pub mod saliency;
pub mod search;
pub mod summed_area_table;
pub mod target;
