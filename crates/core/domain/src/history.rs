//! 车辆历史环：最新样本在下标 0，超出上限时按位置淘汰最旧样本。

use crate::vehicle::HistorySample;
use std::collections::HashSet;

/// 默认历史上限。
pub const HISTORY_CAP: usize = 500;

/// 头插一条样本并截断到上限。
pub fn prepend_capped(history: &mut Vec<HistorySample>, sample: HistorySample, cap: usize) {
    history.insert(0, sample);
    history.truncate(cap);
}

/// 合并补数样本：按 timestamp 去重，按 ts_ms 倒序排列后截断。
///
/// 返回新插入（去重后、截断前）的样本数。
pub fn merge_capped(
    history: &mut Vec<HistorySample>,
    incoming: Vec<HistorySample>,
    cap: usize,
) -> usize {
    let mut seen: HashSet<String> = history.iter().map(|item| item.timestamp.clone()).collect();
    let mut added = 0;
    for sample in incoming {
        if seen.insert(sample.timestamp.clone()) {
            history.push(sample);
            added += 1;
        }
    }
    if added > 0 {
        history.sort_by(|a, b| b.ts_ms.cmp(&a.ts_ms));
    }
    history.truncate(cap);
    added
}
