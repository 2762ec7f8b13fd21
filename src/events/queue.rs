// ==========================================
// 动态资源分配系统 - 事件优先队列
// ==========================================
// 职责: 扰动事件的优先级缓冲
// 并发模型: 生产者侧可多方并发提交 (锁保护的最小堆),
//           消费者侧单线程串行出队
// 排序: (priority, 到达序号) 最小者先出,确定可测
// ==========================================

use crate::error::{AllocResult, AllocationError};
use crate::events::event::{Event, EventPayload};
use chrono::Utc;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

// ==========================================
// EventQueue - 事件队列
// ==========================================
#[derive(Debug, Default)]
pub struct EventQueue {
    heap: Mutex<BinaryHeap<Reverse<Event>>>,
    next_seq: AtomicU64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// 提交事件
    ///
    /// # 参数
    /// - priority: 数值越小越紧急
    /// - payload: 类型化事件载荷
    ///
    /// # 返回
    /// 事件 ID
    pub fn submit(&self, priority: u8, payload: EventPayload) -> Uuid {
        let event = Event {
            event_id: Uuid::new_v4(),
            priority,
            seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
            enqueued_at: Utc::now(),
            payload,
        };
        let event_id = event.event_id;

        debug!(
            event_id = %event_id,
            priority,
            kind = event.payload.kind(),
            "事件入队"
        );

        // Mutex 中毒视为运行失败,此处 panic 合理
        self.heap
            .lock()
            .expect("事件队列锁中毒")
            .push(Reverse(event));

        event_id
    }

    /// 提交 JSON 形式的事件
    ///
    /// 未知 type 标签按警告处理并拒绝该事件,不影响队列继续工作
    pub fn submit_json(&self, priority: u8, value: serde_json::Value) -> AllocResult<Uuid> {
        match serde_json::from_value::<EventPayload>(value.clone()) {
            Ok(payload) => Ok(self.submit(priority, payload)),
            Err(err) => {
                let kind = value
                    .get("type")
                    .and_then(|t| t.as_str())
                    .unwrap_or("<missing>")
                    .to_string();
                warn!(kind, error = %err, "未知或非法事件,已拒绝");
                Err(AllocationError::UnknownEventType(kind))
            }
        }
    }

    /// 出队当前最紧急的事件
    pub fn pop(&self) -> Option<Event> {
        self.heap
            .lock()
            .expect("事件队列锁中毒")
            .pop()
            .map(|Reverse(event)| event)
    }

    pub fn len(&self) -> usize {
        self.heap.lock().expect("事件队列锁中毒").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
