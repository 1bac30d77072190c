pub mod features;
pub mod prepare;
