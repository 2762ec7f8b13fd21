// ==========================================
// 动态资源分配系统 - 统一错误类型
// ==========================================
// 工具: thiserror 派生宏
// 传播策略: 全部在检测组件内就地处理,正常运行下不终止进程
// ==========================================

use thiserror::Error;

/// 分配系统错误类型
#[derive(Error, Debug)]
pub enum AllocationError {
    // ===== 目录查找错误 =====
    #[error("记录未找到: {entity} with id={id}")]
    NotFound { entity: String, id: String },

    // ===== 不变式保护错误 =====
    #[error("物料预留超量: material_id={material_id}, 申请={requested}, 可用={available}")]
    ReservationOverflow {
        material_id: String,
        requested: f64,
        available: f64,
    },

    #[error("物料消耗越界: material_id={material_id}, 消耗={requested}, 已预留={reserved}")]
    ConsumptionUnderflow {
        material_id: String,
        requested: f64,
        reserved: f64,
    },

    #[error("无效的状态转换: {entity} {id}: from={from} to={to}")]
    InvalidTransition {
        entity: String,
        id: String,
        from: String,
        to: String,
    },

    // ===== 事件错误 =====
    #[error("未知事件类型: {0}")]
    UnknownEventType(String),

    // ===== 配置错误 =====
    #[error("配置校验失败: {0}")]
    InvalidConfig(String),

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result 类型别名
pub type AllocResult<T> = Result<T, AllocationError>;
