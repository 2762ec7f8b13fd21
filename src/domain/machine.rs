// ==========================================
// 动态资源分配系统 - 机台领域模型
// ==========================================

use crate::domain::types::MachineStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Machine - 机台
// ==========================================
// 不变式: current_work_order 有值 当且仅当 status == RUNNING
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Machine {
    // ===== 主键 =====
    pub machine_id: String, // 机台唯一标识

    // ===== 基础信息 =====
    pub name: String,
    pub capabilities: Vec<String>, // 加工能力名集合

    // ===== 状态与分配 =====
    pub status: MachineStatus,
    pub current_work_order: Option<String>, // 当前工单 (RUNNING 时有值)

    // ===== 工艺参数 =====
    pub cycle_time_minutes: Option<u32>, // 节拍时间(分钟), None=未申报

    // ===== 保养信息 =====
    pub maintenance_schedule: Option<DateTime<Utc>>, // 计划保养时间
    pub last_maintenance: Option<DateTime<Utc>>,     // 上次保养时间

    // ===== 位置与成本 =====
    pub location: String,
    pub operating_cost_per_hour: f64, // 小时运行成本
}

impl Machine {
    /// 是否可参与分配
    pub fn is_idle(&self) -> bool {
        self.status == MachineStatus::Idle
    }

    /// 具备指定加工能力
    pub fn has_capability(&self, capability: &str) -> bool {
        self.capabilities.iter().any(|c| c == capability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_capability() {
        let machine = Machine {
            machine_id: "MC-001".to_string(),
            name: "焊接机1号".to_string(),
            capabilities: vec!["welding".to_string()],
            status: MachineStatus::Idle,
            current_work_order: None,
            cycle_time_minutes: Some(30),
            maintenance_schedule: None,
            last_maintenance: None,
            location: "zone_a".to_string(),
            operating_cost_per_hour: 20.0,
        };

        assert!(machine.has_capability("welding"));
        assert!(!machine.has_capability("cutting"));
        assert!(machine.is_idle());
    }
}
