// ==========================================
// 动态资源分配系统 - 事件层
// ==========================================
// 职责: 扰动事件的定义、排队与派发处理
// ==========================================

pub mod event;
pub mod processor;
pub mod queue;

// 重导出核心类型
pub use event::{Event, EventPayload, EventPriority};
pub use processor::{EventProcessor, EventStats};
pub use queue::EventQueue;
