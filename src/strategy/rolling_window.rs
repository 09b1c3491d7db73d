use crate::models::PriceSample;
use std::collections::VecDeque;

/// 固定容量的价格窗口，超出容量时淘汰最旧的样本
#[derive(Debug, Clone)]
pub struct RollingWindow {
    samples: VecDeque<PriceSample>,
    capacity: usize,
}

impl RollingWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn push(&mut self, sample: PriceSample) {
        self.samples.push_back(sample);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    /// 当前窗口，最新样本在最后
    pub fn as_sequence(&self) -> &VecDeque<PriceSample> {
        &self.samples
    }

    /// 窗口中的价格序列
    pub fn prices(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.value).collect()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
