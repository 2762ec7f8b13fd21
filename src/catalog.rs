// ==========================================
// 动态资源分配系统 - 资源目录
// ==========================================
// 职责: 操作工/机台/物料/工单的内存存储与查找
// 红线: 只做存储和查找,不含业务规则
// 说明: 维护插入顺序索引,遍历顺序确定可测
//       (最优匹配的平分裁决与排序稳定性依赖该顺序)
// ==========================================

use crate::domain::{
    Machine, MachineStatus, Material, Operator, OperatorStatus, WorkOrder, WorkOrderStatus,
};
use serde::Serialize;
use std::collections::HashMap;

// ==========================================
// ResourceCatalog - 资源目录
// ==========================================
// 生命周期: 运行开始时构建,运行结束时销毁;无全局可变状态
#[derive(Debug, Default)]
pub struct ResourceCatalog {
    operators: HashMap<String, Operator>,
    machines: HashMap<String, Machine>,
    materials: HashMap<String, Material>,
    work_orders: HashMap<String, WorkOrder>,

    // 插入顺序索引
    operator_order: Vec<String>,
    machine_order: Vec<String>,
    material_order: Vec<String>,
    work_order_order: Vec<String>,
}

impl ResourceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    // ==========================================
    // 装载接口 (运行前由外部装载器调用)
    // ==========================================

    /// 登记操作工 (同 ID 覆盖,插入顺序保留首次位置)
    pub fn insert_operator(&mut self, operator: Operator) {
        if !self.operators.contains_key(&operator.operator_id) {
            self.operator_order.push(operator.operator_id.clone());
        }
        self.operators.insert(operator.operator_id.clone(), operator);
    }

    /// 登记机台
    pub fn insert_machine(&mut self, machine: Machine) {
        if !self.machines.contains_key(&machine.machine_id) {
            self.machine_order.push(machine.machine_id.clone());
        }
        self.machines.insert(machine.machine_id.clone(), machine);
    }

    /// 登记物料
    pub fn insert_material(&mut self, material: Material) {
        if !self.materials.contains_key(&material.material_id) {
            self.material_order.push(material.material_id.clone());
        }
        self.materials.insert(material.material_id.clone(), material);
    }

    /// 登记工单
    pub fn insert_work_order(&mut self, work_order: WorkOrder) {
        if !self.work_orders.contains_key(&work_order.work_order_id) {
            self.work_order_order.push(work_order.work_order_id.clone());
        }
        self.work_orders
            .insert(work_order.work_order_id.clone(), work_order);
    }

    // ==========================================
    // 查找接口
    // ==========================================

    pub fn operator(&self, id: &str) -> Option<&Operator> {
        self.operators.get(id)
    }

    pub fn operator_mut(&mut self, id: &str) -> Option<&mut Operator> {
        self.operators.get_mut(id)
    }

    pub fn machine(&self, id: &str) -> Option<&Machine> {
        self.machines.get(id)
    }

    pub fn machine_mut(&mut self, id: &str) -> Option<&mut Machine> {
        self.machines.get_mut(id)
    }

    pub fn material(&self, id: &str) -> Option<&Material> {
        self.materials.get(id)
    }

    pub fn material_mut(&mut self, id: &str) -> Option<&mut Material> {
        self.materials.get_mut(id)
    }

    pub fn work_order(&self, id: &str) -> Option<&WorkOrder> {
        self.work_orders.get(id)
    }

    pub fn work_order_mut(&mut self, id: &str) -> Option<&mut WorkOrder> {
        self.work_orders.get_mut(id)
    }

    // ==========================================
    // 遍历接口 (插入顺序)
    // ==========================================

    pub fn operators(&self) -> impl Iterator<Item = &Operator> {
        self.operator_order.iter().filter_map(|id| self.operators.get(id))
    }

    pub fn machines(&self) -> impl Iterator<Item = &Machine> {
        self.machine_order.iter().filter_map(|id| self.machines.get(id))
    }

    pub fn materials(&self) -> impl Iterator<Item = &Material> {
        self.material_order.iter().filter_map(|id| self.materials.get(id))
    }

    pub fn work_orders(&self) -> impl Iterator<Item = &WorkOrder> {
        self.work_order_order
            .iter()
            .filter_map(|id| self.work_orders.get(id))
    }

    /// 工单 ID 列表 (插入顺序快照,供遍历中修改工单使用)
    pub fn work_order_ids(&self) -> Vec<String> {
        self.work_order_order.clone()
    }

    /// 是否存在待分配工单
    pub fn has_pending_work_orders(&self) -> bool {
        self.work_orders()
            .any(|wo| wo.status == WorkOrderStatus::Pending)
    }

    // ==========================================
    // 快照接口 (供 KPI/看板等外部协作方只读消费)
    // ==========================================

    /// 资源状态汇总
    pub fn summary(&self) -> CatalogSummary {
        CatalogSummary {
            operators: OperatorCounts {
                total: self.operators.len(),
                available: self.count_operators(OperatorStatus::Available),
                assigned: self.count_operators(OperatorStatus::Assigned),
            },
            machines: MachineCounts {
                total: self.machines.len(),
                idle: self.count_machines(MachineStatus::Idle),
                running: self.count_machines(MachineStatus::Running),
            },
            work_orders: WorkOrderCounts {
                total: self.work_orders.len(),
                pending: self.count_work_orders(WorkOrderStatus::Pending),
                in_progress: self.count_work_orders(WorkOrderStatus::InProgress),
                completed: self.count_work_orders(WorkOrderStatus::Completed),
                blocked: self.count_work_orders(WorkOrderStatus::Blocked),
            },
        }
    }

    fn count_operators(&self, status: OperatorStatus) -> usize {
        self.operators.values().filter(|o| o.status == status).count()
    }

    fn count_machines(&self, status: MachineStatus) -> usize {
        self.machines.values().filter(|m| m.status == status).count()
    }

    fn count_work_orders(&self, status: WorkOrderStatus) -> usize {
        self.work_orders.values().filter(|w| w.status == status).count()
    }
}

// ==========================================
// CatalogSummary - 目录状态快照
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct CatalogSummary {
    pub operators: OperatorCounts,
    pub machines: MachineCounts,
    pub work_orders: WorkOrderCounts,
}

#[derive(Debug, Clone, Serialize)]
pub struct OperatorCounts {
    pub total: usize,
    pub available: usize,
    pub assigned: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MachineCounts {
    pub total: usize,
    pub idle: usize,
    pub running: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkOrderCounts {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub blocked: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::HashMap;

    fn operator(id: &str) -> Operator {
        Operator {
            operator_id: id.to_string(),
            name: format!("操作工{}", id),
            skills: vec![],
            skill_levels: HashMap::new(),
            status: OperatorStatus::Available,
            current_work_order: None,
            shift_start: None,
            shift_end: None,
            location: "zone_a".to_string(),
            hourly_cost: 30.0,
        }
    }

    fn work_order(id: &str, status: WorkOrderStatus) -> WorkOrder {
        WorkOrder {
            work_order_id: id.to_string(),
            priority: 5,
            deadline: Utc::now(),
            estimated_duration_minutes: 60,
            required_skills: vec![],
            required_machine_capability: "welding".to_string(),
            required_materials: vec![],
            status,
            assigned_operator: None,
            assigned_machine: None,
            start_time: None,
            completion_time: None,
            progress: 0.0,
            location: "zone_a".to_string(),
        }
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut catalog = ResourceCatalog::new();
        for id in ["OP-3", "OP-1", "OP-2"] {
            catalog.insert_operator(operator(id));
        }

        let ids: Vec<_> = catalog.operators().map(|o| o.operator_id.as_str()).collect();
        assert_eq!(ids, vec!["OP-3", "OP-1", "OP-2"]);
    }

    #[test]
    fn test_reinsert_keeps_first_position() {
        let mut catalog = ResourceCatalog::new();
        catalog.insert_operator(operator("OP-1"));
        catalog.insert_operator(operator("OP-2"));

        // 覆盖已有记录,位置不变
        let mut updated = operator("OP-1");
        updated.hourly_cost = 99.0;
        catalog.insert_operator(updated);

        let ids: Vec<_> = catalog.operators().map(|o| o.operator_id.as_str()).collect();
        assert_eq!(ids, vec!["OP-1", "OP-2"]);
        assert_eq!(catalog.operator("OP-1").unwrap().hourly_cost, 99.0);
    }

    #[test]
    fn test_summary_counts() {
        let mut catalog = ResourceCatalog::new();
        catalog.insert_work_order(work_order("WO-1", WorkOrderStatus::Pending));
        catalog.insert_work_order(work_order("WO-2", WorkOrderStatus::Blocked));
        catalog.insert_work_order(work_order("WO-3", WorkOrderStatus::Pending));

        let summary = catalog.summary();
        assert_eq!(summary.work_orders.total, 3);
        assert_eq!(summary.work_orders.pending, 2);
        assert_eq!(summary.work_orders.blocked, 1);
        assert_eq!(summary.work_orders.completed, 0);
        assert!(catalog.has_pending_work_orders());
    }
}
