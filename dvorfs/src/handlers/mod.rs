pub mod actions;
pub mod pages;
