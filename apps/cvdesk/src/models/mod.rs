pub mod record;

pub use record::{ApplicationRecord, Experience, ImageSlot};
