//! 대기 큐
//!
//! 우선순위가 가장 낮은 엔트리를 먼저 꺼내고, 같은 우선순위는 넣은 순서를 유지한다.
//! 같은 (장치, 종류, 인자) 요청이 이미 대기 중이면 새 요청은 합치지 않고 버린다.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::chunk::QueueEntry;
use crate::request::{LogicalRequest, Priority};

/// 큐 삽입 결과
#[derive(Debug)]
pub enum Enqueue<C> {
    Queued,

    /// 중복으로 버려진 엔트리 (호출측이 처리)
    Coalesced(QueueEntry<C>),
}

struct Slot<C> {
    priority: Priority,
    seq: u64,
    entry: QueueEntry<C>,
}

impl<C> PartialEq for Slot<C> {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl<C> Eq for Slot<C> {}

impl<C> PartialOrd for Slot<C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<C> Ord for Slot<C> {
    // BinaryHeap은 최대 힙이므로 (priority, seq)가 작을수록 크게 취급
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// 대기 큐
pub struct PendingQueue<C> {
    heap: BinaryHeap<Slot<C>>,
    next_seq: u64,
}

impl<C> PendingQueue<C> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// 중복 검사 후 삽입
    pub fn push(&mut self, entry: QueueEntry<C>) -> Enqueue<C> {
        if self.contains(&entry.request) {
            return Enqueue::Coalesced(entry);
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Slot {
            priority: entry.priority,
            seq,
            entry,
        });
        Enqueue::Queued
    }

    /// 다음 전송 대상 꺼내기
    pub fn pop(&mut self) -> Option<QueueEntry<C>> {
        self.heap.pop().map(|slot| slot.entry)
    }

    /// 구조적으로 같은 요청이 대기 중인지
    pub fn contains(&self, request: &LogicalRequest) -> bool {
        self.heap.iter().any(|slot| slot.entry.request == *request)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

impl<C> Default for PendingQueue<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::plan;
    use crate::function::FunctionKind;
    use crate::request::Payload;
    use crate::Config;

    fn entry(address: u16, priority: Priority, tag: u32) -> QueueEntry<u32> {
        let request = LogicalRequest::new(
            1,
            FunctionKind::ReadInputRegisters,
            address,
            Payload::Quantity(2),
        )
        .unwrap();
        plan(request, priority, tag, &Config::default())
    }

    fn drain(queue: &mut PendingQueue<u32>) -> Vec<u32> {
        std::iter::from_fn(|| queue.pop().map(|e| e.completion)).collect()
    }

    #[test]
    fn test_priority_order() {
        let mut queue = PendingQueue::new();
        queue.push(entry(0, 3, 30));
        queue.push(entry(10, 1, 10));
        queue.push(entry(20, 2, 20));

        assert_eq!(drain(&mut queue), vec![10, 20, 30]);
    }

    #[test]
    fn test_equal_priority_is_fifo() {
        let mut queue = PendingQueue::new();
        for (i, address) in [50u16, 10, 40, 20, 30].into_iter().enumerate() {
            queue.push(entry(address, 1, i as u32));
        }
        queue.push(entry(60, 0, 99));

        assert_eq!(drain(&mut queue), vec![99, 0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_structural_duplicate_coalesced() {
        let mut queue = PendingQueue::new();
        assert!(matches!(queue.push(entry(5, 1, 1)), Enqueue::Queued));

        // 우선순위가 달라도 (장치, 종류, 인자)가 같으면 중복
        match queue.push(entry(5, 0, 2)) {
            Enqueue::Coalesced(dropped) => assert_eq!(dropped.completion, 2),
            Enqueue::Queued => panic!("중복이 큐에 들어감"),
        }
        assert_eq!(queue.len(), 1);

        // 꺼낸 뒤에는 다시 들어갈 수 있음
        queue.pop();
        assert!(matches!(queue.push(entry(5, 1, 3)), Enqueue::Queued));
    }

    #[test]
    fn test_different_device_not_duplicate() {
        let mut queue = PendingQueue::new();
        let mut other = entry(5, 1, 2);
        other.request.device = 2;

        queue.push(entry(5, 1, 1));
        assert!(matches!(queue.push(other), Enqueue::Queued));
        assert_eq!(queue.len(), 2);
    }
}
