// ==========================================
// 动态资源分配系统 - 演示入口
// ==========================================
// 用途: 构造一个小型车间场景,演示批量分配与扰动事件处理
// 说明: 示例数据仅存在于本入口,核心库不含样例构造
// ==========================================

use anyhow::Result;
use chrono::{Duration, Utc};
use resource_alloc::events::EventPriority;
use resource_alloc::{
    AllocationConfig, AllocationEngine, EventPayload, EventProcessor, Machine, MachineStatus,
    Material, MaterialRequirement, Operator, OperatorStatus, ResourceCatalog, WorkOrder,
    WorkOrderStatus,
};
use std::collections::HashMap;

fn main() -> Result<()> {
    resource_alloc::logging::init();

    tracing::info!("==================================================");
    tracing::info!("{} - 实时调度引擎", resource_alloc::APP_NAME);
    tracing::info!("系统版本: {}", resource_alloc::VERSION);
    tracing::info!("==================================================");

    // 构建演示目录
    let catalog = build_demo_catalog();
    let engine = AllocationEngine::new(catalog, AllocationConfig::default())?;
    let mut processor = EventProcessor::new(engine);

    // 第一轮: 批量分配全部待分配工单
    let stats = processor.engine_mut().process_allocations();
    tracing::info!(?stats, "初始批量分配");

    // 扰动: 机台故障 + 物料短缺 + 完工 + 物料到货
    let queue = processor.queue();
    queue.submit(
        EventPriority::CRITICAL,
        EventPayload::MachineBreakdown {
            machine_id: "MC-001".to_string(),
        },
    );
    queue.submit(
        EventPriority::MATERIAL_SHORTAGE,
        EventPayload::MaterialShortage {
            material_id: "MAT-002".to_string(),
        },
    );
    queue.submit(
        EventPriority::ROUTINE,
        EventPayload::WorkOrderComplete {
            work_order_id: "WO-003".to_string(),
        },
    );
    queue.submit(
        EventPriority::ROUTINE,
        EventPayload::MaterialDelivered {
            material_id: "MAT-002".to_string(),
            quantity: 500.0,
        },
    );

    let processed = processor.process_events();
    tracing::info!(processed, "扰动事件处理完成");

    // 快照输出 (KPI/看板协作方的消费形式)
    let summary = processor.engine().catalog().summary();
    tracing::info!(
        summary = %serde_json::to_string_pretty(&summary)?,
        "资源状态快照"
    );
    let event_stats = processor.event_stats();
    tracing::info!(
        stats = %serde_json::to_string(&event_stats)?,
        "事件处理统计"
    );

    Ok(())
}

fn build_demo_catalog() -> ResourceCatalog {
    let now = Utc::now();
    let mut catalog = ResourceCatalog::new();

    let operators = [
        ("OP-001", "张伟", vec![("welding", 5), ("assembly", 4)], "zone_a", 35.0),
        ("OP-002", "李娜", vec![("machining", 4), ("inspection", 5)], "zone_b", 40.0),
        ("OP-003", "王强", vec![("welding", 3), ("machining", 3)], "zone_a", 28.0),
        ("OP-004", "刘洋", vec![("assembly", 5), ("packaging", 4)], "zone_c", 30.0),
    ];
    for (id, name, skills, location, cost) in operators {
        catalog.insert_operator(Operator {
            operator_id: id.to_string(),
            name: name.to_string(),
            skills: skills.iter().map(|(s, _)| s.to_string()).collect(),
            skill_levels: skills
                .iter()
                .map(|(s, l)| (s.to_string(), *l as u8))
                .collect::<HashMap<_, _>>(),
            status: OperatorStatus::Available,
            current_work_order: None,
            shift_start: Some(now - Duration::hours(2)),
            shift_end: Some(now + Duration::hours(6)),
            location: location.to_string(),
            hourly_cost: cost,
        });
    }

    let machines = [
        ("MC-001", "焊接机1号", "welding", 30, "zone_a", 20.0),
        ("MC-002", "焊接机2号", "welding", 45, "zone_b", 18.0),
        ("MC-003", "加工中心", "machining", 60, "zone_b", 35.0),
        ("MC-004", "装配线", "assembly", 20, "zone_c", 15.0),
    ];
    for (id, name, capability, cycle, location, cost) in machines {
        catalog.insert_machine(Machine {
            machine_id: id.to_string(),
            name: name.to_string(),
            capabilities: vec![capability.to_string()],
            status: MachineStatus::Idle,
            current_work_order: None,
            cycle_time_minutes: Some(cycle),
            maintenance_schedule: None,
            last_maintenance: Some(now - Duration::days(10)),
            location: location.to_string(),
            operating_cost_per_hour: cost,
        });
    }

    let materials = [
        ("MAT-001", "钢板", 1000.0, "kg", 200.0, "zone_a"),
        ("MAT-002", "铝型材", 150.0, "kg", 100.0, "zone_b"),
        ("MAT-003", "紧固件", 5000.0, "pcs", 1000.0, "zone_c"),
    ];
    for (id, name, available, unit, reorder, location) in materials {
        catalog.insert_material(Material {
            material_id: id.to_string(),
            name: name.to_string(),
            unit_of_measure: unit.to_string(),
            quantity_available: available,
            quantity_reserved: 0.0,
            reorder_point: reorder,
            expected_delivery: None,
            location: location.to_string(),
            cost_per_unit: 5.0,
        });
    }

    let work_orders = [
        ("WO-001", 9, vec!["welding"], "welding", vec![("MAT-001", 50.0)], 120, 4, "zone_a"),
        ("WO-002", 7, vec!["machining"], "machining", vec![("MAT-002", 80.0)], 180, 8, "zone_b"),
        ("WO-003", 8, vec!["assembly"], "assembly", vec![("MAT-003", 200.0)], 90, 6, "zone_c"),
        ("WO-004", 5, vec!["welding"], "welding", vec![("MAT-001", 30.0)], 60, 12, "zone_a"),
    ];
    for (id, priority, skills, capability, materials, duration, deadline_hours, location) in
        work_orders
    {
        catalog.insert_work_order(WorkOrder {
            work_order_id: id.to_string(),
            priority,
            deadline: now + Duration::hours(deadline_hours),
            estimated_duration_minutes: duration,
            required_skills: skills.iter().map(|s| s.to_string()).collect(),
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
            location: location.to_string(),
        });
    }

    catalog
}
