pub mod dictionary;
pub mod rules;
pub mod symbol;
