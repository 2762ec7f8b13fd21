// ==========================================
// 动态资源分配系统 - 硬约束检查
// ==========================================
// 职责: (工单, 操作工, 机台) 三元组的准入判定
// 红线: 纯函数,无副作用;每个候选对都重新判定,结果不跨调用缓存
// 红线: 所有规则必须输出 reason
// ==========================================

use crate::catalog::ResourceCatalog;
use crate::domain::{Machine, MachineStatus, Operator, OperatorStatus, WorkOrder};
use thiserror::Error;

// ==========================================
// ConstraintViolation - 约束不满足原因
// ==========================================
// 说明: 这是匹配搜索的正常结果,不是故障;
//       命中后候选对被淘汰,工单最终可能转 BLOCKED
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConstraintViolation {
    #[error("操作工缺少所需技能: {skill}")]
    MissingSkill { skill: String },

    #[error("机台缺少所需能力: {capability}")]
    MissingCapability { capability: String },

    #[error("物料不存在: {material_id}")]
    MaterialNotFound { material_id: String },

    #[error("物料数量不足: {material_id} (需要 {required}, 可用 {available})")]
    InsufficientMaterial {
        material_id: String,
        required: f64,
        available: f64,
    },

    #[error("操作工不可用 (状态: {status})")]
    OperatorNotAvailable { status: String },

    #[error("机台非空闲 (状态: {status})")]
    MachineNotIdle { status: String },
}

// ==========================================
// ConstraintChecker - 硬约束检查器
// ==========================================
pub struct ConstraintChecker;

impl ConstraintChecker {
    /// 检查三元组是否满足全部硬约束
    ///
    /// 依次检查,首个不满足即短路返回:
    /// 1) 操作工技能集覆盖工单所需技能
    /// 2) 机台具备工单所需能力(单值)
    /// 3) 每项物料需求: 物料存在 且 可用-已预留 ≥ 需求量
    /// 4) 操作工 AVAILABLE 且 机台 IDLE
    ///
    /// # 返回
    /// - `Ok(())`: 全部约束满足
    /// - `Err(ConstraintViolation)`: 首个不满足的约束及原因
    pub fn check(
        catalog: &ResourceCatalog,
        work_order: &WorkOrder,
        operator: &Operator,
        machine: &Machine,
    ) -> Result<(), ConstraintViolation> {
        // 1. 技能匹配: 操作工必须持有全部所需技能
        for skill in &work_order.required_skills {
            if !operator.has_skill(skill) {
                return Err(ConstraintViolation::MissingSkill {
                    skill: skill.clone(),
                });
            }
        }

        // 2. 机台能力
        if !machine.has_capability(&work_order.required_machine_capability) {
            return Err(ConstraintViolation::MissingCapability {
                capability: work_order.required_machine_capability.clone(),
            });
        }

        // 3. 物料可用性: 物料缺失与数量不足是两种不同的不满足
        for req in &work_order.required_materials {
            let material = match catalog.material(&req.material_id) {
                Some(m) => m,
                None => {
                    return Err(ConstraintViolation::MaterialNotFound {
                        material_id: req.material_id.clone(),
                    })
                }
            };

            let free = material.quantity_free();
            if free < req.quantity {
                return Err(ConstraintViolation::InsufficientMaterial {
                    material_id: req.material_id.clone(),
                    required: req.quantity,
                    available: free,
                });
            }
        }

        // 4. 资源可用性
        if operator.status != OperatorStatus::Available {
            return Err(ConstraintViolation::OperatorNotAvailable {
                status: operator.status.to_string(),
            });
        }

        if machine.status != MachineStatus::Idle {
            return Err(ConstraintViolation::MachineNotIdle {
                status: machine.status.to_string(),
            });
        }

        Ok(())
    }
}
