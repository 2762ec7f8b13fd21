// ==========================================
// 动态资源分配系统 - 核心库
// ==========================================
// 系统定位: 车间级资源实时分配与扰动响应引擎
// 算法: 贪心逐工单匹配 + 事件驱动重分配
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 资源目录 - 内存存储与快照
pub mod catalog;

// 引擎层 - 业务规则
pub mod engine;

// 事件层 - 队列与处理器
pub mod events;

// 配置层 - 策略参数
pub mod config;

// 日志系统
pub mod logging;

// 错误类型
pub mod error;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    Machine, MachineStatus, Material, MaterialRequirement, Operator, OperatorStatus, WorkOrder,
    WorkOrderStatus,
};

// 目录与快照
pub use catalog::{CatalogSummary, ResourceCatalog};

// 引擎
pub use engine::{
    AllocationEngine, AllocationScorer, AllocationStats, BestMatch, ConstraintChecker,
    ConstraintViolation, LocationDistanceProvider, ZoneDistanceProvider,
};

// 事件
pub use events::{Event, EventPayload, EventPriority, EventProcessor, EventQueue, EventStats};

// 配置与错误
pub use config::{AllocationConfig, ScoreWeights};
pub use error::{AllocResult, AllocationError};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "动态资源分配系统";
