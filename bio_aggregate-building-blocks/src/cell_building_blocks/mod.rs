/// Collection of physical interactions between cells.
pub mod interaction;
