pub mod features;
pub mod filters;
pub mod places;
