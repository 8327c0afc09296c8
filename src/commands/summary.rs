use crate::buffer::Buffer;

/// paste / delete の実行結果の集計。保存はせず表示にだけ使う。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferSummary {
    pub files_total: usize,
    pub dirs_total: usize,
    pub files_done: usize,
    pub dirs_done: usize,
    pub skipped: usize,
}

impl TransferSummary {
    /// 処理開始時点のバッファ件数を母数として記録する。
    pub fn for_buffer(buffer: &Buffer) -> Self {
        Self {
            files_total: buffer.files().len(),
            dirs_total: buffer.dirs().len(),
            ..Self::default()
        }
    }

    pub fn done(&self) -> usize {
        self.files_done + self.dirs_done
    }

    /// "1/2 files, 0/0 dirs copied, 1 skipped"
    pub fn copied_line(&self) -> String {
        format!(
            "{}/{} files, {}/{} dirs copied, {} skipped",
            self.files_done, self.files_total, self.dirs_done, self.dirs_total, self.skipped
        )
    }

    /// "2 files 1 dirs deleted"
    pub fn deleted_line(&self) -> String {
        format!("{} files {} dirs deleted", self.files_done, self.dirs_done)
    }
}
