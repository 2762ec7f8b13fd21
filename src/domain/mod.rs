// ==========================================
// 动态资源分配系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体与状态类型
// 红线: 不含目录访问逻辑,不含引擎逻辑
// ==========================================

pub mod machine;
pub mod material;
pub mod operator;
pub mod types;
pub mod work_order;

// 重导出核心类型
pub use machine::Machine;
pub use material::{Material, MaterialRequirement};
pub use operator::Operator;
pub use types::{MachineStatus, OperatorStatus, WorkOrderStatus};
pub use work_order::WorkOrder;
