pub mod actions;
pub mod check;
pub mod demo;
pub mod dispatch;
pub mod render;
