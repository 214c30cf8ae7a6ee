pub mod check;
pub mod manifest_check;
pub mod rules;
