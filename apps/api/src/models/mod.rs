pub mod assembly;
pub mod constraint;
pub mod item;
