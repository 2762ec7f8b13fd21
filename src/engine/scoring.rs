// ==========================================
// 动态资源分配系统 - 分配评分引擎
// ==========================================
// 职责: 对通过硬约束的三元组计算加权质量得分
// 权重: 技能匹配 0.4 / 邻近度 0.3 / 机台效率 0.2 / 成本 0.1 (可配置)
// 说明: 各分项先截断到 [0,1] 再加权,权重为凸组合时总分落在 [0,1]
// ==========================================

use crate::config::AllocationConfig;
use crate::domain::{Machine, Operator, WorkOrder};
use crate::engine::distance::LocationDistanceProvider;
use serde::Serialize;

// ==========================================
// ScoreBreakdown - 评分分解
// ==========================================
// 用途: 可解释性输出,供日志与调参参考
#[derive(Debug, Clone, Serialize)]
pub struct ScoreBreakdown {
    pub skill_match: f64,
    pub proximity: f64,
    pub machine_efficiency: f64,
    pub cost: f64,
    pub total: f64,
}

// ==========================================
// AllocationScorer - 评分引擎
// ==========================================
pub struct AllocationScorer;

impl AllocationScorer {
    /// 计算分配得分 (越高越优)
    pub fn score(
        config: &AllocationConfig,
        distance: &dyn LocationDistanceProvider,
        work_order: &WorkOrder,
        operator: &Operator,
        machine: &Machine,
    ) -> f64 {
        Self::score_with_breakdown(config, distance, work_order, operator, machine).total
    }

    /// 计算分配得分并返回分项
    pub fn score_with_breakdown(
        config: &AllocationConfig,
        distance: &dyn LocationDistanceProvider,
        work_order: &WorkOrder,
        operator: &Operator,
        machine: &Machine,
    ) -> ScoreBreakdown {
        let skill_match = Self::skill_match_quality(work_order, operator);
        let proximity = Self::proximity_factor(config, distance, work_order, operator, machine);
        let machine_efficiency = Self::machine_efficiency(config, machine);
        let cost = Self::cost_optimization(config, operator, machine);

        let w = &config.score_weights;
        let total = w.skill_match * skill_match
            + w.proximity * proximity
            + w.machine_efficiency * machine_efficiency
            + w.cost * cost;

        ScoreBreakdown {
            skill_match,
            proximity,
            machine_efficiency,
            cost,
            total,
        }
    }

    /// 技能匹配质量
    ///
    /// 规则: 所需技能熟练度均值 / 5
    /// - 未登记熟练度按 0 (硬约束通过后通常不会出现,公式仍按此定义)
    /// - 所需技能为空 → 0
    fn skill_match_quality(work_order: &WorkOrder, operator: &Operator) -> f64 {
        if work_order.required_skills.is_empty() {
            return 0.0;
        }

        let total: u32 = work_order
            .required_skills
            .iter()
            .map(|skill| operator.skill_level(skill) as u32)
            .sum();

        let mean = total as f64 / work_order.required_skills.len() as f64;
        (mean / 5.0).clamp(0.0, 1.0)
    }

    /// 邻近度
    ///
    /// 规则: 1 - min(平均距离 / max_distance, 1)
    /// 平均距离 = (操作工→机台 + 机台→工单) / 2
    fn proximity_factor(
        config: &AllocationConfig,
        distance: &dyn LocationDistanceProvider,
        work_order: &WorkOrder,
        operator: &Operator,
        machine: &Machine,
    ) -> f64 {
        let op_machine = distance.distance(&operator.location, &machine.location);
        let machine_wo = distance.distance(&machine.location, &work_order.location);
        let avg_distance = (op_machine + machine_wo) / 2.0;

        (1.0 - (avg_distance / config.max_distance).min(1.0)).clamp(0.0, 1.0)
    }

    /// 机台效率
    ///
    /// 规则: clamp(1 - cycle_time / max_cycle_time, 0, 1)
    /// 未申报节拍时间 → 中性值 0.5
    fn machine_efficiency(config: &AllocationConfig, machine: &Machine) -> f64 {
        match machine.cycle_time_minutes {
            Some(cycle_time) => {
                (1.0 - cycle_time as f64 / config.max_cycle_time_minutes).clamp(0.0, 1.0)
            }
            None => 0.5,
        }
    }

    /// 成本优化
    ///
    /// 规则: 1 - min((人工成本 + 机台成本) / max_cost, 1)
    fn cost_optimization(config: &AllocationConfig, operator: &Operator, machine: &Machine) -> f64 {
        let total_cost = operator.hourly_cost + machine.operating_cost_per_hour;
        (1.0 - (total_cost / config.max_hourly_cost).min(1.0)).clamp(0.0, 1.0)
    }
}
