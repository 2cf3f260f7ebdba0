//! 应用层：执行 kernel 产生的 effect，并为展示层提供选择器模型。

pub mod controller;
pub mod picker;

pub use controller::SearchController;
pub use picker::{Picker, PickerExit};
