// ==========================================
// 动态资源分配系统 - 工单领域模型
// ==========================================
// 生命周期: PENDING → IN_PROGRESS → COMPLETED
//           IN_PROGRESS/PENDING → BLOCKED → PENDING
// ==========================================

use crate::domain::material::MaterialRequirement;
use crate::domain::types::WorkOrderStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// WorkOrder - 工单
// ==========================================
// 关联: 同一时刻至多引用一个操作工和一个机台
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkOrder {
    // ===== 主键 =====
    pub work_order_id: String, // 工单唯一标识

    // ===== 调度属性 =====
    pub priority: u8,                // 优先级 (1-10, 10 最高)
    pub deadline: DateTime<Utc>,     // 交付期限
    pub estimated_duration_minutes: u32, // 预计工时(分钟)

    // ===== 资源需求 =====
    pub required_skills: Vec<String>,             // 所需技能集合
    pub required_machine_capability: String,      // 所需机台能力(单值)
    pub required_materials: Vec<MaterialRequirement>, // 物料需求清单

    // ===== 状态与分配 =====
    pub status: WorkOrderStatus,
    pub assigned_operator: Option<String>, // 已分配操作工
    pub assigned_machine: Option<String>,  // 已分配机台

    // ===== 执行记录 =====
    pub start_time: Option<DateTime<Utc>>,      // 开工时间
    pub completion_time: Option<DateTime<Utc>>, // 完工时间
    pub progress: f64,                          // 完成进度 (0-100)

    // ===== 位置 =====
    pub location: String,
}

impl WorkOrder {
    /// 是否待分配
    pub fn is_pending(&self) -> bool {
        self.status == WorkOrderStatus::Pending
    }

    /// 是否引用指定物料
    pub fn requires_material(&self, material_id: &str) -> bool {
        self.required_materials
            .iter()
            .any(|req| req.material_id == material_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_material() {
        let wo = WorkOrder {
            work_order_id: "WO-001".to_string(),
            priority: 8,
            deadline: Utc::now(),
            estimated_duration_minutes: 120,
            required_skills: vec!["welding".to_string()],
            required_machine_capability: "welding".to_string(),
            required_materials: vec![MaterialRequirement {
                material_id: "MAT-001".to_string(),
                quantity: 50.0,
            }],
            status: WorkOrderStatus::Pending,
            assigned_operator: None,
            assigned_machine: None,
            start_time: None,
            completion_time: None,
            progress: 0.0,
            location: "zone_a".to_string(),
        };

        assert!(wo.requires_material("MAT-001"));
        assert!(!wo.requires_material("MAT-999"));
        assert!(wo.is_pending());
    }
}
