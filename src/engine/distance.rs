// ==========================================
// 动态资源分配系统 - 位置距离提供者
// ==========================================
// 说明: Engine 层定义 trait,厂区布局/坐标系统实现适配器
// 默认实现: 分区定距 (同区为 0,跨区固定距离)
// ==========================================

/// 位置距离提供者 Trait
///
/// Engine 层定义,外部布局系统实现
/// 距离以抽象距离单位计,仅用于邻近度评分归一化
pub trait LocationDistanceProvider: Send + Sync {
    /// 计算两个位置标识之间的距离
    ///
    /// 约定: 相同位置返回 0.0
    fn distance(&self, from: &str, to: &str) -> f64;
}

// ==========================================
// ZoneDistanceProvider - 分区定距实现
// ==========================================
// 用途: 未接入真实厂区布局时的缺省策略
#[derive(Debug, Clone)]
pub struct ZoneDistanceProvider {
    cross_zone_distance: f64,
}

impl ZoneDistanceProvider {
    pub fn new(cross_zone_distance: f64) -> Self {
        Self { cross_zone_distance }
    }
}

impl Default for ZoneDistanceProvider {
    fn default() -> Self {
        Self::new(10.0)
    }
}

impl LocationDistanceProvider for ZoneDistanceProvider {
    fn distance(&self, from: &str, to: &str) -> f64 {
        if from == to {
            0.0
        } else {
            self.cross_zone_distance
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_zone_is_zero() {
        let provider = ZoneDistanceProvider::default();
        assert_eq!(provider.distance("zone_a", "zone_a"), 0.0);
    }

    #[test]
    fn test_cross_zone_fixed_distance() {
        let provider = ZoneDistanceProvider::default();
        assert_eq!(provider.distance("zone_a", "zone_b"), 10.0);

        let wide = ZoneDistanceProvider::new(50.0);
        assert_eq!(wide.distance("zone_a", "zone_b"), 50.0);
    }
}
