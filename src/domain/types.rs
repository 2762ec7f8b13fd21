// ==========================================
// 动态资源分配系统 - 领域类型定义
// ==========================================
// 红线: 状态用封闭枚举表达,非法状态不可表示
// 序列化格式: SCREAMING_SNAKE_CASE
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 操作工状态 (Operator Status)
// ==========================================
// 不变式: current_work_order 有值 当且仅当 状态为 ASSIGNED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperatorStatus {
    Available,   // 空闲可分配
    Assigned,    // 已分配工单
    Break,       // 工间休息
    Unavailable, // 不可用(请假/离岗)
}

impl fmt::Display for OperatorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperatorStatus::Available => write!(f, "AVAILABLE"),
            OperatorStatus::Assigned => write!(f, "ASSIGNED"),
            OperatorStatus::Break => write!(f, "BREAK"),
            OperatorStatus::Unavailable => write!(f, "UNAVAILABLE"),
        }
    }
}

// ==========================================
// 机台状态 (Machine Status)
// ==========================================
// 不变式: current_work_order 有值 当且仅当 状态为 RUNNING
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MachineStatus {
    Idle,        // 空闲
    Running,     // 运行中
    Maintenance, // 保养中
    Breakdown,   // 故障停机
}

impl fmt::Display for MachineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MachineStatus::Idle => write!(f, "IDLE"),
            MachineStatus::Running => write!(f, "RUNNING"),
            MachineStatus::Maintenance => write!(f, "MAINTENANCE"),
            MachineStatus::Breakdown => write!(f, "BREAKDOWN"),
        }
    }
}

// ==========================================
// 工单状态 (Work Order Status)
// ==========================================
// 合法迁移: PENDING → IN_PROGRESS → COMPLETED
//           IN_PROGRESS → BLOCKED → PENDING
//           PENDING → BLOCKED (分配失败)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkOrderStatus {
    Pending,    // 待分配
    InProgress, // 执行中
    Completed,  // 已完成
    Blocked,    // 受阻
}

impl fmt::Display for WorkOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkOrderStatus::Pending => write!(f, "PENDING"),
            WorkOrderStatus::InProgress => write!(f, "IN_PROGRESS"),
            WorkOrderStatus::Completed => write!(f, "COMPLETED"),
            WorkOrderStatus::Blocked => write!(f, "BLOCKED"),
        }
    }
}
