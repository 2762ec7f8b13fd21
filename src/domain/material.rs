// ==========================================
// 动态资源分配系统 - 物料领域模型
// ==========================================
// 红线: 0 ≤ quantity_reserved ≤ quantity_available 全程成立
// 红线: 超量预留必须在修改前拒绝,不得静默截断
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Material - 物料库存
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Material {
    // ===== 主键 =====
    pub material_id: String, // 物料唯一标识

    // ===== 基础信息 =====
    pub name: String,
    pub unit_of_measure: String, // 计量单位

    // ===== 库存数量 =====
    pub quantity_available: f64, // 在库数量
    pub quantity_reserved: f64,  // 已预留数量

    // ===== 补货信息 =====
    pub reorder_point: f64,                        // 再订货点
    pub expected_delivery: Option<DateTime<Utc>>, // 预计到货时间

    // ===== 位置与成本 =====
    pub location: String,
    pub cost_per_unit: f64,
}

impl Material {
    /// 未预留的可用数量
    pub fn quantity_free(&self) -> f64 {
        self.quantity_available - self.quantity_reserved
    }

    /// 是否低于再订货点
    pub fn below_reorder_point(&self) -> bool {
        self.quantity_available < self.reorder_point
    }
}

// ==========================================
// MaterialRequirement - 工单物料需求
// ==========================================
// 说明: 挂在工单上,工单创建后不再修改
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialRequirement {
    pub material_id: String,
    pub quantity: f64,
}
