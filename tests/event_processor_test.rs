// ==========================================
// 事件处理器集成测试
// ==========================================
// 职责: 验证扰动事件的状态迁移与级联重分配
// 场景: 机台故障 / 物料短缺→到货 / 工单完工 / 保养抢占
// ==========================================

use chrono::{Duration, Utc};
use resource_alloc::events::EventPriority;
use resource_alloc::{
    AllocationConfig, AllocationEngine, EventPayload, EventProcessor, Machine, MachineStatus,
    Material, MaterialRequirement, Operator, OperatorStatus, ResourceCatalog, WorkOrder,
    WorkOrderStatus,
};
use std::collections::HashMap;

// ==========================================
// 测试辅助函数
// ==========================================

fn create_test_operator(operator_id: &str, skills: &[(&str, u8)], location: &str) -> Operator {
    Operator {
        operator_id: operator_id.to_string(),
        name: format!("操作工{}", operator_id),
        skills: skills.iter().map(|(s, _)| s.to_string()).collect(),
        skill_levels: skills
            .iter()
            .map(|(s, l)| (s.to_string(), *l))
            .collect::<HashMap<_, _>>(),
        status: OperatorStatus::Available,
        current_work_order: None,
        shift_start: None,
        shift_end: None,
        location: location.to_string(),
        hourly_cost: 30.0,
    }
}

fn create_test_machine(machine_id: &str, capability: &str, location: &str) -> Machine {
    Machine {
        machine_id: machine_id.to_string(),
        name: format!("机台{}", machine_id),
        capabilities: vec![capability.to_string()],
        status: MachineStatus::Idle,
        current_work_order: None,
        cycle_time_minutes: Some(30),
        maintenance_schedule: None,
        last_maintenance: None,
        location: location.to_string(),
        operating_cost_per_hour: 20.0,
    }
}

fn create_test_material(material_id: &str, available: f64) -> Material {
    Material {
        material_id: material_id.to_string(),
        name: format!("物料{}", material_id),
        unit_of_measure: "kg".to_string(),
        quantity_available: available,
        quantity_reserved: 0.0,
        reorder_point: 50.0,
        expected_delivery: None,
        location: "warehouse".to_string(),
        cost_per_unit: 5.0,
    }
}

fn create_test_work_order(
    work_order_id: &str,
    priority: u8,
    capability: &str,
    materials: &[(&str, f64)],
) -> WorkOrder {
    WorkOrder {
        work_order_id: work_order_id.to_string(),
        priority,
        deadline: Utc::now() + Duration::hours(8),
        estimated_duration_minutes: 90,
        required_skills: vec!["welding".to_string()],
        required_machine_capability: capability.to_string(),
        required_materials: materials
            .iter()
            .map(|(m, q)| MaterialRequirement {
                material_id: m.to_string(),
                quantity: *q,
            })
            .collect(),
        status: WorkOrderStatus::Pending,
        assigned_operator: None,
        assigned_machine: None,
        start_time: None,
        completion_time: None,
        progress: 0.0,
        location: "zone_a".to_string(),
    }
}

/// 构建单工单已分配完成的处理器
fn processor_with_allocated_order(extra_machine: bool) -> EventProcessor {
    let mut catalog = ResourceCatalog::new();
    catalog.insert_operator(create_test_operator("OP-001", &[("welding", 5)], "zone_a"));
    catalog.insert_operator(create_test_operator("OP-002", &[("welding", 4)], "zone_a"));
    catalog.insert_machine(create_test_machine("MC-001", "welding", "zone_a"));
    if extra_machine {
        catalog.insert_machine(create_test_machine("MC-002", "welding", "zone_a"));
    }
    catalog.insert_material(create_test_material("MAT-001", 1000.0));
    catalog.insert_work_order(create_test_work_order(
        "WO-001",
        8,
        "welding",
        &[("MAT-001", 50.0)],
    ));

    let mut engine = AllocationEngine::new(catalog, AllocationConfig::default()).unwrap();
    assert!(engine.allocate_work_order("WO-001"));
    EventProcessor::new(engine)
}

// ==========================================
// 测试1: 机台故障且无替代机台
// ==========================================
#[test]
fn test_breakdown_without_substitute_blocks_and_frees_operator() {
    let mut processor = processor_with_allocated_order(false);
    let allocated_machine = processor
        .engine()
        .catalog()
        .work_order("WO-001")
        .unwrap()
        .assigned_machine
        .clone()
        .unwrap();

    processor.queue().submit(
        EventPriority::CRITICAL,
        EventPayload::MachineBreakdown {
            machine_id: allocated_machine.clone(),
        },
    );
    assert_eq!(processor.process_events(), 1);

    let catalog = processor.engine().catalog();
    assert_eq!(
        catalog.machine(&allocated_machine).unwrap().status,
        MachineStatus::Breakdown
    );
    assert_eq!(
        catalog.work_order("WO-001").unwrap().status,
        WorkOrderStatus::Blocked
    );
    assert!(catalog.work_order("WO-001").unwrap().assigned_machine.is_none());
    // 操作工全部回到可用
    assert_eq!(
        catalog.operator("OP-001").unwrap().status,
        OperatorStatus::Available
    );
    // 阻断释放物料预留
    assert_eq!(catalog.material("MAT-001").unwrap().quantity_reserved, 0.0);
}

// ==========================================
// 测试2: 机台故障且存在替代机台
// ==========================================
#[test]
fn test_breakdown_with_substitute_reallocates() {
    let mut processor = processor_with_allocated_order(true);
    let first_machine = processor
        .engine()
        .catalog()
        .work_order("WO-001")
        .unwrap()
        .assigned_machine
        .clone()
        .unwrap();
    let first_operator = processor
        .engine()
        .catalog()
        .work_order("WO-001")
        .unwrap()
        .assigned_operator
        .clone()
        .unwrap();

    processor.queue().submit(
        EventPriority::CRITICAL,
        EventPayload::MachineBreakdown {
            machine_id: first_machine.clone(),
        },
    );
    processor.process_events();

    let catalog = processor.engine().catalog();
    let wo = catalog.work_order("WO-001").unwrap();

    // 工单迁移到替代机台并继续执行
    assert_eq!(wo.status, WorkOrderStatus::InProgress);
    let new_machine = wo.assigned_machine.clone().unwrap();
    assert_ne!(new_machine, first_machine);
    assert_eq!(
        catalog.machine(&new_machine).unwrap().status,
        MachineStatus::Running
    );

    // 搜索期间旧操作工仍被占用,新组合必然换人,旧操作工被释放
    let new_operator = wo.assigned_operator.clone().unwrap();
    assert_ne!(new_operator, first_operator);
    assert_eq!(
        catalog.operator(&first_operator).unwrap().status,
        OperatorStatus::Available
    );

    // 预留先释放后重新建立,净值不变
    assert_eq!(catalog.material("MAT-001").unwrap().quantity_reserved, 50.0);
}

// ==========================================
// 测试3: 物料短缺 → 到货 → 重新分配 (往返场景)
// ==========================================
#[test]
fn test_shortage_then_delivery_round_trip() {
    let mut processor = processor_with_allocated_order(false);

    // 短缺: 执行中工单被阻断,资源全释放
    processor.queue().submit(
        EventPriority::MATERIAL_SHORTAGE,
        EventPayload::MaterialShortage {
            material_id: "MAT-001".to_string(),
        },
    );
    processor.process_events();

    {
        let catalog = processor.engine().catalog();
        assert_eq!(
            catalog.work_order("WO-001").unwrap().status,
            WorkOrderStatus::Blocked
        );
        assert_eq!(
            catalog.operator("OP-001").unwrap().status,
            OperatorStatus::Available
        );
        assert_eq!(catalog.machine("MC-001").unwrap().status, MachineStatus::Idle);
        assert_eq!(catalog.material("MAT-001").unwrap().quantity_reserved, 0.0);
    }

    // 到货: 工单回到 PENDING 并被级联批量分配救活
    processor.queue().submit(
        EventPriority::ROUTINE,
        EventPayload::MaterialDelivered {
            material_id: "MAT-001".to_string(),
            quantity: 500.0,
        },
    );
    processor.process_events();

    let catalog = processor.engine().catalog();
    assert_eq!(
        catalog.work_order("WO-001").unwrap().status,
        WorkOrderStatus::InProgress
    );
    assert_eq!(
        catalog.material("MAT-001").unwrap().quantity_available,
        1500.0
    );
    assert_eq!(catalog.material("MAT-001").unwrap().quantity_reserved, 50.0);
}

// ==========================================
// 测试4: 短缺只影响执行中工单
// ==========================================
#[test]
fn test_shortage_leaves_pending_orders_untouched() {
    let mut catalog = ResourceCatalog::new();
    catalog.insert_material(create_test_material("MAT-001", 10.0));
    // 待分配工单引用同一物料
    catalog.insert_work_order(create_test_work_order(
        "WO-PENDING",
        5,
        "welding",
        &[("MAT-001", 5.0)],
    ));

    let engine = AllocationEngine::new(catalog, AllocationConfig::default()).unwrap();
    let mut processor = EventProcessor::new(engine);

    processor.queue().submit(
        EventPriority::MATERIAL_SHORTAGE,
        EventPayload::MaterialShortage {
            material_id: "MAT-001".to_string(),
        },
    );
    processor.process_events();

    assert_eq!(
        processor
            .engine()
            .catalog()
            .work_order("WO-PENDING")
            .unwrap()
            .status,
        WorkOrderStatus::Pending
    );
}

// ==========================================
// 测试5: 完工往返 - 消耗等于需求量,预留归零
// ==========================================
#[test]
fn test_completion_consumes_materials_and_frees_resources() {
    let mut processor = processor_with_allocated_order(false);

    processor.queue().submit(
        EventPriority::ROUTINE,
        EventPayload::WorkOrderComplete {
            work_order_id: "WO-001".to_string(),
        },
    );
    processor.process_events();

    let catalog = processor.engine().catalog();
    let wo = catalog.work_order("WO-001").unwrap();
    assert_eq!(wo.status, WorkOrderStatus::Completed);
    assert_eq!(wo.progress, 100.0);
    assert!(wo.completion_time.is_some());

    // 在库减少恰为需求量之和,预留净归零
    let material = catalog.material("MAT-001").unwrap();
    assert_eq!(material.quantity_available, 950.0);
    assert_eq!(material.quantity_reserved, 0.0);

    assert_eq!(
        catalog.operator("OP-001").unwrap().status,
        OperatorStatus::Available
    );
    assert_eq!(catalog.machine("MC-001").unwrap().status, MachineStatus::Idle);
}

// ==========================================
// 测试6: 完工级联 - 释放的资源立即救活后续工单
// ==========================================
#[test]
fn test_completion_cascade_allocates_next_order() {
    let mut catalog = ResourceCatalog::new();
    catalog.insert_operator(create_test_operator("OP-001", &[("welding", 5)], "zone_a"));
    catalog.insert_machine(create_test_machine("MC-001", "welding", "zone_a"));
    catalog.insert_material(create_test_material("MAT-001", 1000.0));
    catalog.insert_work_order(create_test_work_order(
        "WO-001",
        9,
        "welding",
        &[("MAT-001", 50.0)],
    ));
    catalog.insert_work_order(create_test_work_order(
        "WO-002",
        5,
        "welding",
        &[("MAT-001", 30.0)],
    ));

    let mut engine = AllocationEngine::new(catalog, AllocationConfig::default()).unwrap();
    let stats = engine.process_allocations();
    assert_eq!(stats.allocated, 1); // 资源只够一单

    let mut processor = EventProcessor::new(engine);
    // WO-002 被阻断,需要先回到待分配才能参与级联
    processor
        .engine_mut()
        .catalog_mut()
        .work_order_mut("WO-002")
        .unwrap()
        .status = WorkOrderStatus::Pending;

    processor.queue().submit(
        EventPriority::ROUTINE,
        EventPayload::WorkOrderComplete {
            work_order_id: "WO-001".to_string(),
        },
    );
    processor.process_events();

    // 完工释放的机台与操作工在同一事件内被 WO-002 复用
    let catalog = processor.engine().catalog();
    assert_eq!(
        catalog.work_order("WO-002").unwrap().status,
        WorkOrderStatus::InProgress
    );
    assert_eq!(
        catalog.material("MAT-001").unwrap().quantity_reserved,
        30.0
    );
}

// ==========================================
// 测试7: 非执行中工单的完工事件被拒
// ==========================================
#[test]
fn test_completion_rejected_for_pending_order() {
    let mut catalog = ResourceCatalog::new();
    catalog.insert_material(create_test_material("MAT-001", 100.0));
    catalog.insert_work_order(create_test_work_order(
        "WO-001",
        5,
        "welding",
        &[("MAT-001", 50.0)],
    ));

    let engine = AllocationEngine::new(catalog, AllocationConfig::default()).unwrap();
    let mut processor = EventProcessor::new(engine);

    processor.queue().submit(
        EventPriority::ROUTINE,
        EventPayload::WorkOrderComplete {
            work_order_id: "WO-001".to_string(),
        },
    );
    processor.process_events();

    // 状态与物料均不变
    let catalog = processor.engine().catalog();
    assert_eq!(
        catalog.work_order("WO-001").unwrap().status,
        WorkOrderStatus::Pending
    );
    assert_eq!(catalog.material("MAT-001").unwrap().quantity_available, 100.0);
    assert_eq!(catalog.material("MAT-001").unwrap().quantity_reserved, 0.0);
}

// ==========================================
// 测试8: 保养抢占运行中的机台
// ==========================================
#[test]
fn test_maintenance_displaces_running_work_order() {
    let mut processor = processor_with_allocated_order(false);

    processor.queue().submit(
        EventPriority::ROUTINE,
        EventPayload::MachineMaintenance {
            machine_id: "MC-001".to_string(),
            duration_minutes: 120,
        },
    );
    processor.process_events();

    let catalog = processor.engine().catalog();
    let machine = catalog.machine("MC-001").unwrap();
    assert_eq!(machine.status, MachineStatus::Maintenance);
    assert!(machine.last_maintenance.is_some());
    assert!(machine.current_work_order.is_none());

    // 无替代机台 → 工单阻断,操作工释放
    assert_eq!(
        catalog.work_order("WO-001").unwrap().status,
        WorkOrderStatus::Blocked
    );
    assert_eq!(
        catalog.operator("OP-001").unwrap().status,
        OperatorStatus::Available
    );
}

// ==========================================
// 测试9: 操作工恢复可用触发级联分配
// ==========================================
#[test]
fn test_operator_available_triggers_bulk_pass() {
    let mut catalog = ResourceCatalog::new();
    let mut operator = create_test_operator("OP-001", &[("welding", 5)], "zone_a");
    operator.status = OperatorStatus::Break;
    catalog.insert_operator(operator);
    catalog.insert_machine(create_test_machine("MC-001", "welding", "zone_a"));
    catalog.insert_work_order(create_test_work_order("WO-001", 8, "welding", &[]));

    let engine = AllocationEngine::new(catalog, AllocationConfig::default()).unwrap();
    let mut processor = EventProcessor::new(engine);

    processor.queue().submit(
        EventPriority::OPERATOR_CHANGE,
        EventPayload::OperatorAvailable {
            operator_id: "OP-001".to_string(),
        },
    );
    processor.process_events();

    assert_eq!(
        processor
            .engine()
            .catalog()
            .work_order("WO-001")
            .unwrap()
            .status,
        WorkOrderStatus::InProgress
    );
}

// ==========================================
// 测试10: 不存在的引用只告警不中断
// ==========================================
#[test]
fn test_missing_references_are_non_fatal() {
    let mut processor = processor_with_allocated_order(false);

    let queue = processor.queue();
    queue.submit(
        EventPriority::CRITICAL,
        EventPayload::MachineBreakdown {
            machine_id: "MC-GHOST".to_string(),
        },
    );
    queue.submit(
        EventPriority::ROUTINE,
        EventPayload::OperatorAvailable {
            operator_id: "OP-GHOST".to_string(),
        },
    );
    queue.submit(
        EventPriority::ROUTINE,
        EventPayload::MaterialDelivered {
            material_id: "MAT-GHOST".to_string(),
            quantity: 10.0,
        },
    );

    // 三个事件全部被消费,状态不变
    assert_eq!(processor.process_events(), 3);
    assert_eq!(
        processor
            .engine()
            .catalog()
            .work_order("WO-001")
            .unwrap()
            .status,
        WorkOrderStatus::InProgress
    );
}

// ==========================================
// 测试11: 未知事件类型经 JSON 提交被拒,不影响后续
// ==========================================
#[test]
fn test_unknown_json_event_rejected_as_warning() {
    let mut processor = processor_with_allocated_order(false);
    let queue = processor.queue();

    let rejected = queue.submit_json(
        EventPriority::ROUTINE,
        serde_json::json!({"type": "solar_flare", "intensity": 9}),
    );
    assert!(rejected.is_err());

    let accepted = queue.submit_json(
        EventPriority::ROUTINE,
        serde_json::json!({
            "type": "work_order_complete",
            "work_order_id": "WO-001"
        }),
    );
    assert!(accepted.is_ok());

    assert_eq!(processor.process_events(), 1);
    assert_eq!(
        processor
            .engine()
            .catalog()
            .work_order("WO-001")
            .unwrap()
            .status,
        WorkOrderStatus::Completed
    );

    let stats = processor.event_stats();
    assert_eq!(stats.total_processed, 1);
    assert_eq!(stats.by_type.get("work_order_complete"), Some(&1));
    assert_eq!(stats.pending, 0);
}
