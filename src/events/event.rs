// ==========================================
// 动态资源分配系统 - 扰动事件定义
// ==========================================
// 职责: 定义事件类型、优先级与载荷
// 说明: 载荷为带 type 标签的封闭枚举,外部可直接提交 JSON
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;

// ==========================================
// 事件优先级 (数值越小越紧急)
// ==========================================
pub struct EventPriority;

impl EventPriority {
    pub const CRITICAL: u8 = 1;
    pub const MATERIAL_SHORTAGE: u8 = 2;
    pub const OPERATOR_CHANGE: u8 = 3;
    pub const ROUTINE: u8 = 4;
}

// ==========================================
// EventPayload - 事件载荷
// ==========================================
// 序列化: {"type": "machine_breakdown", "machine_id": "..."}
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    /// 机台故障
    MachineBreakdown { machine_id: String },
    /// 机台保养
    MachineMaintenance {
        machine_id: String,
        #[serde(default = "default_maintenance_minutes")]
        duration_minutes: u32,
    },
    /// 操作工恢复可用
    OperatorAvailable { operator_id: String },
    /// 工单完工
    WorkOrderComplete { work_order_id: String },
    /// 物料短缺
    MaterialShortage { material_id: String },
    /// 物料到货
    MaterialDelivered { material_id: String, quantity: f64 },
}

fn default_maintenance_minutes() -> u32 {
    60
}

impl EventPayload {
    /// 事件类型标识
    pub fn kind(&self) -> &'static str {
        match self {
            EventPayload::MachineBreakdown { .. } => "machine_breakdown",
            EventPayload::MachineMaintenance { .. } => "machine_maintenance",
            EventPayload::OperatorAvailable { .. } => "operator_available",
            EventPayload::WorkOrderComplete { .. } => "work_order_complete",
            EventPayload::MaterialShortage { .. } => "material_shortage",
            EventPayload::MaterialDelivered { .. } => "material_delivered",
        }
    }
}

// ==========================================
// Event - 队列事件
// ==========================================
// 排序: 仅按 (priority, seq) 比较;seq 为入队序号,
//       保证同优先级事件按到达顺序出队 (确定可测)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub event_id: Uuid,
    pub priority: u8,
    pub seq: u64,
    pub enqueued_at: DateTime<Utc>,
    pub payload: EventPayload,
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl Eq for Event {}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}
