// ==========================================
// 动态资源分配系统 - 引擎层
// ==========================================
// 职责: 实现分配业务规则
// 红线: 所有规则必须输出 reason
// ==========================================

pub mod allocation;
pub mod constraints;
pub mod distance;
pub mod scoring;

// 重导出核心引擎
pub use allocation::{AllocationEngine, AllocationStats, BestMatch};
pub use constraints::{ConstraintChecker, ConstraintViolation};
pub use distance::{LocationDistanceProvider, ZoneDistanceProvider};
pub use scoring::{AllocationScorer, ScoreBreakdown};
