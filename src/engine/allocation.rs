// ==========================================
// 动态资源分配系统 - 分配引擎
// ==========================================
// 职责: 工单优先级排序、最优匹配搜索、分配提交/释放、批量分配
// 策略: 贪心,逐工单求局部最优,不保证全局最优
// 红线: 提交对三元组状态是原子的,不可观测到部分生效
// ==========================================

use crate::catalog::ResourceCatalog;
use crate::config::AllocationConfig;
use crate::domain::{MachineStatus, OperatorStatus, WorkOrderStatus};
use crate::engine::constraints::ConstraintChecker;
use crate::engine::distance::{LocationDistanceProvider, ZoneDistanceProvider};
use crate::engine::scoring::AllocationScorer;
use crate::error::{AllocResult, AllocationError};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info, warn};

// ==========================================
// BestMatch - 最优匹配结果
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct BestMatch {
    pub operator_id: String,
    pub machine_id: String,
    pub score: f64,
}

// ==========================================
// AllocationStats - 批量分配统计
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AllocationStats {
    pub allocated: usize,
    pub blocked: usize,
    pub total: usize,
}

// ==========================================
// AllocationEngine - 分配引擎
// ==========================================
// 所有权: 引擎独占资源目录,目录的全部修改经由引擎与事件处理器
pub struct AllocationEngine {
    catalog: ResourceCatalog,
    config: AllocationConfig,
    distance: Box<dyn LocationDistanceProvider>,

    // 稳定策略输入: 工单 → 最近一次分配时间
    last_allocation_time: HashMap<String, DateTime<Utc>>,
}

impl AllocationEngine {
    /// 创建分配引擎 (使用缺省分区定距)
    pub fn new(catalog: ResourceCatalog, config: AllocationConfig) -> AllocResult<Self> {
        Self::with_distance_provider(catalog, config, Box::new(ZoneDistanceProvider::default()))
    }

    /// 创建分配引擎并注入距离提供者
    pub fn with_distance_provider(
        catalog: ResourceCatalog,
        config: AllocationConfig,
        distance: Box<dyn LocationDistanceProvider>,
    ) -> AllocResult<Self> {
        config.validate()?;
        Ok(Self {
            catalog,
            config,
            distance,
            last_allocation_time: HashMap::new(),
        })
    }

    pub fn catalog(&self) -> &ResourceCatalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut ResourceCatalog {
        &mut self.catalog
    }

    pub fn config(&self) -> &AllocationConfig {
        &self.config
    }

    // ==========================================
    // 优先级排序
    // ==========================================

    /// 待分配工单的优先级排序
    ///
    /// 排序键: 优先级降序 → 期限升序 → 预计工时升序
    /// 全键相同时保留插入顺序 (稳定排序)
    ///
    /// # 返回
    /// 排序后的工单 ID 列表
    pub fn prioritize_work_orders(&self) -> Vec<String> {
        let mut pending: Vec<_> = self
            .catalog
            .work_orders()
            .filter(|wo| wo.status == WorkOrderStatus::Pending)
            .map(|wo| {
                (
                    wo.work_order_id.clone(),
                    wo.priority,
                    wo.deadline,
                    wo.estimated_duration_minutes,
                )
            })
            .collect();

        pending.sort_by(|a, b| {
            b.1.cmp(&a.1)
                .then_with(|| a.2.cmp(&b.2))
                .then_with(|| a.3.cmp(&b.3))
        });

        pending.into_iter().map(|(id, _, _, _)| id).collect()
    }

    // ==========================================
    // 最优匹配搜索
    // ==========================================

    /// 为单个工单搜索最优 (操作工, 机台) 组合
    ///
    /// 扫描 AVAILABLE 操作工 × IDLE 机台的全交叉积 (插入顺序),
    /// 淘汰硬约束不满足的组合,其余评分取严格最高分;
    /// 同分时先遇到的组合获胜。
    ///
    /// # 返回
    /// - `Some(BestMatch)`: 最优组合
    /// - `None`: 无可行组合
    pub fn find_best_allocation(&self, work_order_id: &str) -> Option<BestMatch> {
        let work_order = self.catalog.work_order(work_order_id)?;

        let mut best: Option<BestMatch> = None;

        for operator in self.catalog.operators() {
            if operator.status != OperatorStatus::Available {
                continue;
            }

            for machine in self.catalog.machines() {
                if machine.status != MachineStatus::Idle {
                    continue;
                }

                // 每个候选对都重新判定,不缓存
                if let Err(violation) =
                    ConstraintChecker::check(&self.catalog, work_order, operator, machine)
                {
                    debug!(
                        work_order_id = %work_order.work_order_id,
                        operator_id = %operator.operator_id,
                        machine_id = %machine.machine_id,
                        reason = %violation,
                        "候选组合被硬约束淘汰"
                    );
                    continue;
                }

                let score = AllocationScorer::score(
                    &self.config,
                    self.distance.as_ref(),
                    work_order,
                    operator,
                    machine,
                );

                let is_better = match &best {
                    Some(current) => score > current.score,
                    None => true,
                };
                if is_better {
                    best = Some(BestMatch {
                        operator_id: operator.operator_id.clone(),
                        machine_id: machine.machine_id.clone(),
                        score,
                    });
                }
            }
        }

        best
    }

    // ==========================================
    // 分配提交
    // ==========================================

    /// 提交分配 (搜索成功后调用)
    ///
    /// 效果 (对三元组原子生效):
    /// 1) 每项物料需求预留全量 (不支持部分预留)
    /// 2) 工单 → IN_PROGRESS,记录分配引用与开工时间
    /// 3) 操作工 → ASSIGNED,机台 → RUNNING,回指工单
    /// 4) 记录分配时间 (稳定策略输入)
    ///
    /// 提交前对全部物料需求再做一次守门校验,
    /// 任何一项超量则整体拒绝,不产生任何修改。
    pub fn commit_allocation(
        &mut self,
        work_order_id: &str,
        operator_id: &str,
        machine_id: &str,
    ) -> AllocResult<()> {
        let requirements = {
            let work_order =
                self.catalog
                    .work_order(work_order_id)
                    .ok_or_else(|| AllocationError::NotFound {
                        entity: "WorkOrder".to_string(),
                        id: work_order_id.to_string(),
                    })?;
            work_order.required_materials.clone()
        };

        // 守门校验: 全部物料可预留才允许任何修改
        for req in &requirements {
            let material =
                self.catalog
                    .material(&req.material_id)
                    .ok_or_else(|| AllocationError::NotFound {
                        entity: "Material".to_string(),
                        id: req.material_id.clone(),
                    })?;
            if material.quantity_free() < req.quantity {
                return Err(AllocationError::ReservationOverflow {
                    material_id: req.material_id.clone(),
                    requested: req.quantity,
                    available: material.quantity_free(),
                });
            }
        }

        let now = Utc::now();

        // 物料预留
        for req in &requirements {
            if let Some(material) = self.catalog.material_mut(&req.material_id) {
                material.quantity_reserved += req.quantity;
            }
        }

        // 工单状态迁移
        if let Some(work_order) = self.catalog.work_order_mut(work_order_id) {
            work_order.assigned_operator = Some(operator_id.to_string());
            work_order.assigned_machine = Some(machine_id.to_string());
            work_order.status = WorkOrderStatus::InProgress;
            work_order.start_time = Some(now);
        }

        // 操作工状态迁移
        if let Some(operator) = self.catalog.operator_mut(operator_id) {
            operator.status = OperatorStatus::Assigned;
            operator.current_work_order = Some(work_order_id.to_string());
        }

        // 机台状态迁移
        if let Some(machine) = self.catalog.machine_mut(machine_id) {
            machine.status = MachineStatus::Running;
            machine.current_work_order = Some(work_order_id.to_string());
        }

        self.last_allocation_time
            .insert(work_order_id.to_string(), now);

        Ok(())
    }

    /// 为指定工单执行 搜索 + 提交
    ///
    /// # 返回
    /// - `true`: 分配成功
    /// - `false`: 工单不存在 / 无可行组合 (工单转 BLOCKED) / 提交被拒
    pub fn allocate_work_order(&mut self, work_order_id: &str) -> bool {
        if self.catalog.work_order(work_order_id).is_none() {
            warn!(work_order_id, "工单不存在,跳过分配");
            return false;
        }

        let Some(best) = self.find_best_allocation(work_order_id) else {
            if let Some(work_order) = self.catalog.work_order_mut(work_order_id) {
                work_order.status = WorkOrderStatus::Blocked;
            }
            info!(work_order_id, "无可行组合,工单转 BLOCKED");
            return false;
        };

        match self.commit_allocation(work_order_id, &best.operator_id, &best.machine_id) {
            Ok(()) => {
                info!(
                    work_order_id,
                    operator_id = %best.operator_id,
                    machine_id = %best.machine_id,
                    score = format!("{:.3}", best.score).as_str(),
                    "分配成功"
                );
                true
            }
            Err(err) => {
                // 搜索已校验过,正常不会走到;就地处理,不上抛
                warn!(work_order_id, error = %err, "分配提交被拒");
                if let Some(work_order) = self.catalog.work_order_mut(work_order_id) {
                    work_order.status = WorkOrderStatus::Blocked;
                }
                false
            }
        }
    }

    // ==========================================
    // 批量分配
    // ==========================================

    /// 对全部待分配工单执行一轮批量分配
    ///
    /// 每次都从头对当前全部 PENDING 工单重新求解,无增量复用
    pub fn process_allocations(&mut self) -> AllocationStats {
        let prioritized = self.prioritize_work_orders();
        let total = prioritized.len();

        info!(total, "开始批量分配");

        let mut allocated = 0;
        let mut blocked = 0;
        for work_order_id in &prioritized {
            if self.allocate_work_order(work_order_id) {
                allocated += 1;
            } else {
                blocked += 1;
            }
        }

        let stats = AllocationStats {
            allocated,
            blocked,
            total,
        };
        info!(?stats, "批量分配完成");
        stats
    }

    // ==========================================
    // 重分配稳定策略
    // ==========================================

    /// 工单是否允许重分配
    ///
    /// 防抖规则:
    /// - 进度超过 max_reallocation_progress (默认 50%) → 不允许
    /// - 距上次分配不足 stability_buffer_minutes (默认 15 分钟) → 不允许
    pub fn can_reallocate(&self, work_order_id: &str) -> bool {
        let Some(work_order) = self.catalog.work_order(work_order_id) else {
            return false;
        };

        if work_order.progress > self.config.max_reallocation_progress {
            return false;
        }

        if let Some(last) = self.last_allocation_time.get(work_order_id) {
            let elapsed = Utc::now().signed_duration_since(*last);
            if elapsed < Duration::minutes(self.config.stability_buffer_minutes) {
                return false;
            }
        }

        true
    }

    /// 手动重分配入口
    ///
    /// 先过稳定策略守门,再寻找严格优于当前组合的新组合;
    /// 找到则释放当前分配并提交新组合,否则保持不变。
    /// 事件处理器的灾备路径不经过此守门 (见 DESIGN.md 决策 1)。
    pub fn try_reallocate(&mut self, work_order_id: &str) -> bool {
        if !self.can_reallocate(work_order_id) {
            debug!(work_order_id, "稳定策略拒绝重分配");
            return false;
        }

        let Some(work_order) = self.catalog.work_order(work_order_id) else {
            return false;
        };
        if work_order.status != WorkOrderStatus::InProgress {
            return false;
        }

        let current_score = match (
            work_order.assigned_operator.as_deref(),
            work_order.assigned_machine.as_deref(),
        ) {
            (Some(op_id), Some(mc_id)) => {
                match (self.catalog.operator(op_id), self.catalog.machine(mc_id)) {
                    (Some(operator), Some(machine)) => AllocationScorer::score(
                        &self.config,
                        self.distance.as_ref(),
                        work_order,
                        operator,
                        machine,
                    ),
                    _ => return false,
                }
            }
            _ => return false,
        };

        let Some(candidate) = self.find_best_allocation(work_order_id) else {
            return false;
        };
        if candidate.score <= current_score {
            debug!(
                work_order_id,
                current = format!("{:.3}", current_score).as_str(),
                candidate = format!("{:.3}", candidate.score).as_str(),
                "候选组合无改善,保持现状"
            );
            return false;
        }

        // 释放当前分配后提交新组合
        self.release_assignment(work_order_id);
        if let Some(work_order) = self.catalog.work_order_mut(work_order_id) {
            work_order.status = WorkOrderStatus::Pending;
        }

        info!(
            work_order_id,
            operator_id = %candidate.operator_id,
            machine_id = %candidate.machine_id,
            "手动重分配生效"
        );
        self.allocate_work_order(work_order_id)
    }

    // ==========================================
    // 释放与阻断 (供事件处理器复用)
    // ==========================================

    /// 阻断工单
    ///
    /// IN_PROGRESS 工单被阻断时同时释放物料预留并解除双向引用,
    /// 保证物料不变式与 IN_PROGRESS 回指不变式
    pub fn block_work_order(&mut self, work_order_id: &str, reason: &str) {
        let Some(work_order) = self.catalog.work_order(work_order_id) else {
            return;
        };

        if work_order.status == WorkOrderStatus::InProgress {
            self.release_reservations(work_order_id);
        }

        if let Some(work_order) = self.catalog.work_order_mut(work_order_id) {
            work_order.assigned_operator = None;
            work_order.assigned_machine = None;
            work_order.start_time = None;
            work_order.status = WorkOrderStatus::Blocked;
        }

        info!(work_order_id, reason, "工单转 BLOCKED");
    }

    /// 释放操作工 → AVAILABLE,清除工单回指
    pub fn free_operator(&mut self, operator_id: &str) {
        if let Some(operator) = self.catalog.operator_mut(operator_id) {
            operator.status = OperatorStatus::Available;
            operator.current_work_order = None;
            info!(operator_id, "操作工已释放");
        }
    }

    /// 释放机台 → IDLE,清除工单回指
    pub fn free_machine(&mut self, machine_id: &str) {
        if let Some(machine) = self.catalog.machine_mut(machine_id) {
            machine.status = MachineStatus::Idle;
            machine.current_work_order = None;
            info!(machine_id, "机台已释放");
        }
    }

    /// 释放工单的全部物料预留
    fn release_reservations(&mut self, work_order_id: &str) {
        let requirements = match self.catalog.work_order(work_order_id) {
            Some(wo) => wo.required_materials.clone(),
            None => return,
        };

        for req in &requirements {
            if let Some(material) = self.catalog.material_mut(&req.material_id) {
                if material.quantity_reserved < req.quantity {
                    warn!(
                        material_id = %req.material_id,
                        reserved = material.quantity_reserved,
                        release = req.quantity,
                        "释放量超过已预留量,预留清零"
                    );
                    material.quantity_reserved = 0.0;
                } else {
                    material.quantity_reserved -= req.quantity;
                }
            }
        }
    }

    /// 释放工单当前占用的操作工与机台 (不改工单状态)
    fn release_assignment(&mut self, work_order_id: &str) {
        let (operator_id, machine_id) = match self.catalog.work_order(work_order_id) {
            Some(wo) => (wo.assigned_operator.clone(), wo.assigned_machine.clone()),
            None => return,
        };

        if let Some(op_id) = operator_id {
            self.free_operator(&op_id);
        }
        if let Some(mc_id) = machine_id {
            self.free_machine(&mc_id);
        }
        self.release_reservations(work_order_id);
        if let Some(work_order) = self.catalog.work_order_mut(work_order_id) {
            work_order.assigned_operator = None;
            work_order.assigned_machine = None;
            work_order.start_time = None;
        }
    }

    /// 完工物料消耗: 预留与在库同时扣减需求量
    ///
    /// 任何一项扣减会导致负值则整体拒绝,不产生任何修改
    pub fn consume_materials(&mut self, work_order_id: &str) -> AllocResult<()> {
        let requirements = {
            let work_order =
                self.catalog
                    .work_order(work_order_id)
                    .ok_or_else(|| AllocationError::NotFound {
                        entity: "WorkOrder".to_string(),
                        id: work_order_id.to_string(),
                    })?;
            work_order.required_materials.clone()
        };

        // 守门校验
        for req in &requirements {
            let material =
                self.catalog
                    .material(&req.material_id)
                    .ok_or_else(|| AllocationError::NotFound {
                        entity: "Material".to_string(),
                        id: req.material_id.clone(),
                    })?;
            if material.quantity_reserved < req.quantity
                || material.quantity_available < req.quantity
            {
                return Err(AllocationError::ConsumptionUnderflow {
                    material_id: req.material_id.clone(),
                    requested: req.quantity,
                    reserved: material.quantity_reserved,
                });
            }
        }

        for req in &requirements {
            if let Some(material) = self.catalog.material_mut(&req.material_id) {
                material.quantity_reserved -= req.quantity;
                material.quantity_available -= req.quantity;
            }
        }

        Ok(())
    }

    /// 记录分配时间 (测试注入用)
    #[cfg(test)]
    pub(crate) fn set_last_allocation_time(&mut self, work_order_id: &str, at: DateTime<Utc>) {
        self.last_allocation_time
            .insert(work_order_id.to_string(), at);
    }
}
