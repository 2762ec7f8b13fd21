// ==========================================
// 动态资源分配系统 - 事件处理器
// ==========================================
// 职责: 排空事件队列,按类型派发处理,必要时级联批量重分配
// 并发模型: 单线程串行处理;前一事件 (含其级联的批量分配)
//           完整结束前,下一事件不得开始
// 错误策略: 引用对象缺失等问题就地告警并跳过,不终止处理
// ==========================================

use crate::domain::{MachineStatus, WorkOrderStatus};
use crate::engine::AllocationEngine;
use crate::error::AllocationError;
use crate::events::event::{Event, EventPayload};
use crate::events::queue::EventQueue;
use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

// ==========================================
// EventStats - 事件处理统计快照
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct EventStats {
    pub total_processed: usize,
    pub by_type: HashMap<String, usize>,
    pub pending: usize,
}

// ==========================================
// EventProcessor - 事件处理器
// ==========================================
// 所有权: 处理器独占引擎 (引擎独占目录);
//         队列经 Arc 共享给事件生产者
pub struct EventProcessor {
    engine: AllocationEngine,
    queue: Arc<EventQueue>,
    processed_by_type: HashMap<String, usize>,
    total_processed: usize,
}

impl EventProcessor {
    pub fn new(engine: AllocationEngine) -> Self {
        Self {
            engine,
            queue: Arc::new(EventQueue::new()),
            processed_by_type: HashMap::new(),
            total_processed: 0,
        }
    }

    /// 事件队列句柄 (供扰动源并发提交)
    pub fn queue(&self) -> Arc<EventQueue> {
        Arc::clone(&self.queue)
    }

    pub fn engine(&self) -> &AllocationEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut AllocationEngine {
        &mut self.engine
    }

    /// 事件处理统计快照
    pub fn event_stats(&self) -> EventStats {
        EventStats {
            total_processed: self.total_processed,
            by_type: self.processed_by_type.clone(),
            pending: self.queue.len(),
        }
    }

    // ==========================================
    // 主循环
    // ==========================================

    /// 排空事件队列
    ///
    /// 按 (优先级, 到达顺序) 逐个处理,处理期间新入队的
    /// 事件同样会在本次调用内被消费完
    ///
    /// # 返回
    /// 本次处理的事件数量
    pub fn process_events(&mut self) -> usize {
        info!(pending = self.queue.len(), "开始处理事件队列");

        let mut processed = 0;
        while let Some(event) = self.queue.pop() {
            self.dispatch(event);
            processed += 1;
        }

        info!(processed, "事件队列已排空");
        processed
    }

    fn dispatch(&mut self, event: Event) {
        let kind = event.payload.kind();
        debug!(
            event_id = %event.event_id,
            priority = event.priority,
            kind,
            "派发事件"
        );

        *self.processed_by_type.entry(kind.to_string()).or_insert(0) += 1;
        self.total_processed += 1;

        match event.payload {
            EventPayload::MachineBreakdown { machine_id } => {
                self.handle_machine_breakdown(&machine_id)
            }
            EventPayload::MachineMaintenance {
                machine_id,
                duration_minutes,
            } => self.handle_machine_maintenance(&machine_id, duration_minutes),
            EventPayload::OperatorAvailable { operator_id } => {
                self.handle_operator_available(&operator_id)
            }
            EventPayload::WorkOrderComplete { work_order_id } => {
                self.handle_work_order_complete(&work_order_id)
            }
            EventPayload::MaterialShortage { material_id } => {
                self.handle_material_shortage(&material_id)
            }
            EventPayload::MaterialDelivered {
                material_id,
                quantity,
            } => self.handle_material_delivered(&material_id, quantity),
        }
    }

    // ==========================================
    // 机台故障
    // ==========================================

    /// 处理机台故障
    ///
    /// 1) 机台 → BREAKDOWN,解除工单回指
    /// 2) 受影响工单 → BLOCKED (释放物料预留)
    /// 3) 搜索替代机台: 找到则释放旧操作工并提交新组合;
    ///    找不到则释放操作工并级联批量重分配
    fn handle_machine_breakdown(&mut self, machine_id: &str) {
        let catalog = self.engine.catalog_mut();
        let Some(machine) = catalog.machine_mut(machine_id) else {
            warn!(machine_id, "机台不存在,忽略故障事件");
            return;
        };

        info!(machine_id, "机台故障");
        machine.status = MachineStatus::Breakdown;
        let displaced = machine.current_work_order.take();

        if let Some(work_order_id) = displaced {
            self.recover_displaced_work_order(&work_order_id, "machine_breakdown");
        }
    }

    /// 机台保养
    ///
    /// 机台 → MAINTENANCE 并记录保养时间;
    /// 若保养到来时机台仍在运行,其工单按故障同等处置
    /// (见 DESIGN.md 决策 2)
    fn handle_machine_maintenance(&mut self, machine_id: &str, duration_minutes: u32) {
        let catalog = self.engine.catalog_mut();
        let Some(machine) = catalog.machine_mut(machine_id) else {
            warn!(machine_id, "机台不存在,忽略保养事件");
            return;
        };

        info!(machine_id, duration_minutes, "机台进入保养");
        machine.status = MachineStatus::Maintenance;
        machine.last_maintenance = Some(Utc::now());
        let displaced = machine.current_work_order.take();

        if let Some(work_order_id) = displaced {
            self.recover_displaced_work_order(&work_order_id, "machine_maintenance");
        }
    }

    /// 机台失守后的工单善后
    ///
    /// 前置: 机台已标记故障/保养并清除回指
    fn recover_displaced_work_order(&mut self, work_order_id: &str, reason: &str) {
        let old_operator = self
            .engine
            .catalog()
            .work_order(work_order_id)
            .and_then(|wo| wo.assigned_operator.clone());

        self.engine.block_work_order(work_order_id, reason);

        // 旧操作工此刻仍为 ASSIGNED,搜索只覆盖 AVAILABLE 操作工,
        // 因此命中的新组合必然携带不同的操作工
        if let Some(best) = self.engine.find_best_allocation(work_order_id) {
            info!(
                work_order_id,
                machine_id = %best.machine_id,
                "找到替代机台"
            );

            if let Some(old_id) = &old_operator {
                if *old_id != best.operator_id {
                    self.engine.free_operator(old_id);
                }
            }

            if let Err(err) =
                self.engine
                    .commit_allocation(work_order_id, &best.operator_id, &best.machine_id)
            {
                warn!(work_order_id, error = %err, "替代分配提交被拒");
            }
        } else {
            info!(work_order_id, "无替代机台,工单保持 BLOCKED");
            if let Some(old_id) = &old_operator {
                self.engine.free_operator(old_id);
            }
            // 释放出的操作工可能救活其他待分配工单
            self.engine.process_allocations();
        }
    }

    // ==========================================
    // 操作工恢复可用
    // ==========================================

    /// 处理操作工恢复可用
    ///
    /// 若操作工仍占用着执行中的工单,先按短缺同等方式解除该工单
    /// (见 DESIGN.md 决策 4),再释放操作工;
    /// 存在待分配工单时级联批量重分配
    fn handle_operator_available(&mut self, operator_id: &str) {
        let Some(operator) = self.engine.catalog().operator(operator_id) else {
            warn!(operator_id, "操作工不存在,忽略事件");
            return;
        };

        info!(operator_id, "操作工恢复可用");
        let held_order = operator.current_work_order.clone();

        if let Some(work_order_id) = held_order {
            let in_progress = self
                .engine
                .catalog()
                .work_order(&work_order_id)
                .map(|wo| wo.status == WorkOrderStatus::InProgress)
                .unwrap_or(false);

            if in_progress {
                let machine_id = self
                    .engine
                    .catalog()
                    .work_order(&work_order_id)
                    .and_then(|wo| wo.assigned_machine.clone());

                self.engine
                    .block_work_order(&work_order_id, "operator_withdrawn");
                if let Some(mc_id) = machine_id {
                    self.engine.free_machine(&mc_id);
                }
            }
        }

        self.engine.free_operator(operator_id);

        if self.engine.catalog().has_pending_work_orders() {
            self.engine.process_allocations();
        }
    }

    // ==========================================
    // 工单完工
    // ==========================================

    /// 处理工单完工
    ///
    /// 仅接受 IN_PROGRESS 工单;效果:
    /// 1) 物料消耗 (预留与在库同时扣减,守门校验)
    /// 2) 工单 → COMPLETED,记录完工时间与进度 100
    /// 3) 先释放机台再释放操作工,使级联批量分配能同时用上两者
    fn handle_work_order_complete(&mut self, work_order_id: &str) {
        let Some(work_order) = self.engine.catalog().work_order(work_order_id) else {
            warn!(work_order_id, "工单不存在,忽略完工事件");
            return;
        };

        if work_order.status != WorkOrderStatus::InProgress {
            warn!(
                work_order_id,
                error = %AllocationError::InvalidTransition {
                    entity: "WorkOrder".to_string(),
                    id: work_order_id.to_string(),
                    from: work_order.status.to_string(),
                    to: WorkOrderStatus::Completed.to_string(),
                },
                "完工事件被拒"
            );
            return;
        }

        let operator_id = work_order.assigned_operator.clone();
        let machine_id = work_order.assigned_machine.clone();
        let start_time = work_order.start_time;
        let estimated = work_order.estimated_duration_minutes;
        let deadline = work_order.deadline;

        // 消耗先于状态迁移,守门失败则整个事件不生效
        if let Err(err) = self.engine.consume_materials(work_order_id) {
            warn!(work_order_id, error = %err, "物料消耗被拒,完工事件不生效");
            return;
        }

        let now = Utc::now();
        if let Some(work_order) = self.engine.catalog_mut().work_order_mut(work_order_id) {
            work_order.status = WorkOrderStatus::Completed;
            work_order.completion_time = Some(now);
            work_order.progress = 100.0;
        }

        // 执行效率回顾 (仅日志,不参与调度)
        if let Some(start) = start_time {
            let actual_minutes = (now - start).num_minutes().max(0);
            info!(
                work_order_id,
                actual_minutes,
                estimated_minutes = estimated,
                on_time = now <= deadline,
                "工单完工"
            );
        } else {
            info!(work_order_id, "工单完工");
        }

        if let Some(mc_id) = machine_id {
            self.engine.free_machine(&mc_id);
        }
        if let Some(op_id) = operator_id {
            self.handle_operator_available(&op_id);
        }
    }

    // ==========================================
    // 物料短缺
    // ==========================================

    /// 处理物料短缺
    ///
    /// 所有需要该物料且执行中的工单 → BLOCKED,
    /// 释放其操作工与机台;待分配/已完成工单不受影响
    fn handle_material_shortage(&mut self, material_id: &str) {
        if self.engine.catalog().material(material_id).is_none() {
            warn!(material_id, "物料不存在,忽略短缺事件");
            return;
        }

        let affected: Vec<(String, Option<String>, Option<String>)> = self
            .engine
            .catalog()
            .work_orders()
            .filter(|wo| {
                wo.status == WorkOrderStatus::InProgress && wo.requires_material(material_id)
            })
            .map(|wo| {
                (
                    wo.work_order_id.clone(),
                    wo.assigned_operator.clone(),
                    wo.assigned_machine.clone(),
                )
            })
            .collect();

        info!(material_id, affected = affected.len(), "物料短缺");

        for (work_order_id, operator_id, machine_id) in affected {
            self.engine
                .block_work_order(&work_order_id, "material_shortage");
            if let Some(op_id) = operator_id {
                self.engine.free_operator(&op_id);
            }
            if let Some(mc_id) = machine_id {
                self.engine.free_machine(&mc_id);
            }
        }
    }

    // ==========================================
    // 物料到货
    // ==========================================

    /// 处理物料到货
    ///
    /// 在库数量增加;所有需要该物料的 BLOCKED 工单回到 PENDING;
    /// 有工单解除阻断时级联批量重分配
    fn handle_material_delivered(&mut self, material_id: &str, quantity: f64) {
        {
            let catalog = self.engine.catalog_mut();
            let Some(material) = catalog.material_mut(material_id) else {
                warn!(material_id, "物料不存在,忽略到货事件");
                return;
            };

            material.quantity_available += quantity;
            info!(
                material_id,
                quantity,
                new_available = material.quantity_available,
                "物料到货"
            );
        }

        let unblocked: Vec<String> = self
            .engine
            .catalog()
            .work_orders()
            .filter(|wo| {
                wo.status == WorkOrderStatus::Blocked && wo.requires_material(material_id)
            })
            .map(|wo| wo.work_order_id.clone())
            .collect();

        for work_order_id in &unblocked {
            if let Some(work_order) = self.engine.catalog_mut().work_order_mut(work_order_id) {
                work_order.status = WorkOrderStatus::Pending;
            }
        }

        if !unblocked.is_empty() {
            info!(count = unblocked.len(), "工单解除阻断,触发批量重分配");
            self.engine.process_allocations();
        }
    }
}
