// ==========================================
// 动态资源分配系统 - 配置层
// ==========================================
// 职责: 分配策略参数的加载、校验与默认值
// 说明: 权重与上限全部可调,不得硬编码进引擎
// ==========================================

use crate::error::{AllocResult, AllocationError};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ==========================================
// ScoreWeights - 评分权重向量
// ==========================================
// 约束: 四项权重之和应为 1.0 (凸组合,保证得分落在 [0,1])
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub skill_match: f64,        // 技能匹配质量
    pub proximity: f64,          // 位置邻近度
    pub machine_efficiency: f64, // 机台效率
    pub cost: f64,               // 成本优化
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            skill_match: 0.4,
            proximity: 0.3,
            machine_efficiency: 0.2,
            cost: 0.1,
        }
    }
}

impl ScoreWeights {
    pub fn sum(&self) -> f64 {
        self.skill_match + self.proximity + self.machine_efficiency + self.cost
    }
}

// ==========================================
// AllocationConfig - 分配策略配置
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocationConfig {
    // ===== 评分参数 =====
    pub score_weights: ScoreWeights,
    pub max_distance: f64,           // 邻近度归一化上限(距离单位)
    pub max_cycle_time_minutes: f64, // 机台效率归一化上限(分钟)
    pub max_hourly_cost: f64,        // 成本归一化上限(每小时)

    // ===== 重分配稳定策略 =====
    pub stability_buffer_minutes: i64,   // 两次重分配的最小间隔
    pub max_reallocation_progress: f64,  // 超过该进度不再重分配 (%)
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            score_weights: ScoreWeights::default(),
            max_distance: 100.0,
            max_cycle_time_minutes: 120.0,
            max_hourly_cost: 100.0,
            stability_buffer_minutes: 15,
            max_reallocation_progress: 50.0,
        }
    }
}

impl AllocationConfig {
    /// 校验配置合法性
    ///
    /// # 规则
    /// - 权重非负且和为 1.0 (容差 1e-6)
    /// - 各归一化上限为正数
    /// - 稳定缓冲非负
    pub fn validate(&self) -> AllocResult<()> {
        let w = &self.score_weights;
        if w.skill_match < 0.0 || w.proximity < 0.0 || w.machine_efficiency < 0.0 || w.cost < 0.0 {
            return Err(AllocationError::InvalidConfig(
                "评分权重不得为负".to_string(),
            ));
        }
        if (w.sum() - 1.0).abs() > 1e-6 {
            return Err(AllocationError::InvalidConfig(format!(
                "评分权重之和应为 1.0, 实际为 {}",
                w.sum()
            )));
        }
        if self.max_distance <= 0.0 {
            return Err(AllocationError::InvalidConfig(
                "max_distance 必须为正数".to_string(),
            ));
        }
        if self.max_cycle_time_minutes <= 0.0 {
            return Err(AllocationError::InvalidConfig(
                "max_cycle_time_minutes 必须为正数".to_string(),
            ));
        }
        if self.max_hourly_cost <= 0.0 {
            return Err(AllocationError::InvalidConfig(
                "max_hourly_cost 必须为正数".to_string(),
            ));
        }
        if self.stability_buffer_minutes < 0 {
            return Err(AllocationError::InvalidConfig(
                "stability_buffer_minutes 不得为负".to_string(),
            ));
        }
        Ok(())
    }

    /// 从 JSON 文件加载配置
    ///
    /// 缺省字段取默认值,加载后立即校验
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: AllocationConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AllocationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.score_weights.skill_match, 0.4);
        assert_eq!(config.stability_buffer_minutes, 15);
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let mut config = AllocationConfig::default();
        config.score_weights.cost = 0.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_negative_weight_rejected() {
        let mut config = AllocationConfig::default();
        config.score_weights.skill_match = -0.1;
        config.score_weights.cost = 0.6;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: AllocationConfig =
            serde_json::from_str(r#"{"stability_buffer_minutes": 30}"#).unwrap();
        assert_eq!(config.stability_buffer_minutes, 30);
        assert_eq!(config.max_distance, 100.0);
        assert!(config.validate().is_ok());
    }
}
