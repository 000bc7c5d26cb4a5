//! 选中集合管理 - 业务能力层
//!
//! 选中集合始终是当前已加载结果的子集；重新加载结果列表时必须清空。

use crate::models::ResultRecord;
use std::collections::HashSet;

/// 当前选中的结果 ID 集合
#[derive(Debug, Clone, Default)]
pub struct SelectionSet {
    /// 已加载结果的 ID，保持加载顺序
    loaded: Vec<String>,
    selected: HashSet<String>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以新加载的结果重置可选范围，并清空选中
    pub fn reload(&mut self, records: &[ResultRecord]) {
        self.loaded = records
            .iter()
            .filter_map(|record| record.result_id.clone())
            .collect();
        self.selected.clear();
    }

    /// 选中若干结果，未加载的 ID 被忽略
    pub fn select<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for id in ids {
            let id = id.as_ref();
            if self.is_loaded(id) {
                self.selected.insert(id.to_string());
            }
        }
    }

    /// 取消选中若干结果
    pub fn deselect<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for id in ids {
            self.selected.remove(id.as_ref());
        }
    }

    /// 全选 / 全不选
    ///
    /// 只看 `all_ids` 中已加载的部分：这些全部已选中（或一个都没有）时清空，否则全部选中。
    pub fn toggle_select_all<S: AsRef<str>>(&mut self, all_ids: &[S]) {
        let all_selected = all_ids
            .iter()
            .map(|id| id.as_ref())
            .filter(|id| self.is_loaded(id))
            .all(|id| self.selected.contains(id));

        if all_selected {
            self.clear();
        } else {
            self.select(all_ids);
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// 当前加载的全部 ID
    pub fn loaded_ids(&self) -> &[String] {
        &self.loaded
    }

    /// 选中的 ID，按加载顺序返回
    pub fn selected_ids(&self) -> Vec<String> {
        self.loaded
            .iter()
            .filter(|id| self.selected.contains(*id))
            .cloned()
            .collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn is_all_selected(&self) -> bool {
        !self.loaded.is_empty() && self.selected.len() == self.loaded.len()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    fn is_loaded(&self, id: &str) -> bool {
        self.loaded.iter().any(|loaded| loaded == id)
    }
}
