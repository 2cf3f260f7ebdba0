//! rgpick - 基于 rg 的增量搜索选择器
//!
//! 模块结构：
//! - kernel: 查询归一化、会话 gate（纯状态机）、服务端口与适配器
//! - app: 执行 effect 的搜索控制器，以及选择器模型

pub mod app;
pub mod kernel;
