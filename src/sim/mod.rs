pub mod dispatch;
pub mod event;
pub mod generator;
pub mod grid;
pub mod round;
pub mod selection;
pub mod step;
pub mod terminal;
