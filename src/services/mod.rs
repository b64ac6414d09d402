pub mod assistant;
pub mod motivator;
pub mod schedule;
pub mod slots;
pub mod tracker;
pub mod weekly;
