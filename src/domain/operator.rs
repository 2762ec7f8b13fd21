// ==========================================
// 动态资源分配系统 - 操作工领域模型
// ==========================================
// 用途: 装载层写入,引擎层通过状态迁移方法修改
// ==========================================

use crate::domain::types::OperatorStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ==========================================
// Operator - 操作工
// ==========================================
// 不变式: current_work_order 有值 当且仅当 status == ASSIGNED
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operator {
    // ===== 主键 =====
    pub operator_id: String, // 操作工唯一标识

    // ===== 基础信息 =====
    pub name: String,

    // ===== 技能维度 =====
    pub skills: Vec<String>,               // 持有技能名集合
    pub skill_levels: HashMap<String, u8>, // 技能 → 熟练度 (1-5)

    // ===== 状态与分配 =====
    pub status: OperatorStatus,
    pub current_work_order: Option<String>, // 当前工单 (ASSIGNED 时有值)

    // ===== 班次信息 =====
    pub shift_start: Option<DateTime<Utc>>,
    pub shift_end: Option<DateTime<Utc>>,

    // ===== 位置与成本 =====
    pub location: String,
    pub hourly_cost: f64, // 小时人工成本
}

impl Operator {
    /// 是否可参与分配
    pub fn is_available(&self) -> bool {
        self.status == OperatorStatus::Available
    }

    /// 持有指定技能
    pub fn has_skill(&self, skill: &str) -> bool {
        self.skills.iter().any(|s| s == skill)
    }

    /// 查询技能熟练度
    ///
    /// 未登记熟练度的技能按 0 处理
    pub fn skill_level(&self, skill: &str) -> u8 {
        self.skill_levels.get(skill).copied().unwrap_or(0)
    }
}
