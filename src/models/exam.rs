/// 检查状态（本模块只观察这两个状态）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExamStatus {
    /// 进行中，接受修改
    #[default]
    InProgress,
    /// 已完成，终态
    Completed,
}

impl ExamStatus {
    pub fn accepts_edits(self) -> bool {
        self == ExamStatus::InProgress
    }
}
