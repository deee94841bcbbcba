pub mod gamepad;
pub mod input;
pub mod presenter;
pub mod renderer;
pub mod templates;
pub mod typer;
