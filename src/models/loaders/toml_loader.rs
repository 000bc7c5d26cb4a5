use crate::error::{AppError, AppResult, FileError};
use crate::models::sheet::ResultSheet;
use std::path::{Path, PathBuf};
use tokio::fs;

/// 从 TOML 文件加载结果单
pub async fn load_sheet(toml_file_path: &Path) -> AppResult<ResultSheet> {
    let path_str = toml_file_path.display().to_string();

    let content = fs::read_to_string(toml_file_path)
        .await
        .map_err(|e| AppError::file_read_failed(&path_str, e))?;

    let sheet: ResultSheet = toml::from_str(&content).map_err(|e| {
        AppError::File(FileError::TomlParseFailed {
            path: path_str.clone(),
            source: Box::new(e),
        })
    })?;

    Ok(sheet.with_file_path(path_str))
}

/// 从文件夹中加载所有结果单，按文件名排序
///
/// 单个文件解析失败只记录警告，不影响其他文件。
pub async fn load_all_sheets(folder_path: &str) -> AppResult<Vec<ResultSheet>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        return Err(FileError::DirectoryNotFound {
            path: folder_path.to_string(),
        }
        .into());
    }

    let mut toml_files = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .map_err(|e| AppError::file_read_failed(folder_path, e))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml_files.push(path);
        }
    }
    toml_files.sort();

    let mut sheets = Vec::with_capacity(toml_files.len());
    for path in toml_files {
        tracing::info!(
            "正在加载: {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        );

        match load_sheet(&path).await {
            Ok(sheet) => {
                tracing::info!("成功加载 {} 个参数值", sheet.values.len());
                sheets.push(sheet);
            }
            Err(e) => {
                tracing::warn!("加载文件失败 {}: {}", path.display(), e);
            }
        }
    }

    Ok(sheets)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "lab_result_entry_{}_{}",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn test_load_all_sheets_skips_invalid_files() {
        let dir = temp_dir("loader");
        std::fs::write(
            dir.join("b.toml"),
            r#"
            exam_id = "EX-2"
            template_id = "T-1"
            complete = true

            [[values]]
            parameter = "Hemoglobina"
            value = "13.5"
            reference_range = "12-16"
            "#,
        )
        .unwrap();
        std::fs::write(dir.join("a.toml"), "exam_id = \"EX-1\"\ndelete = [\"Urea\"]\n").unwrap();
        std::fs::write(dir.join("broken.toml"), "exam_id = ").unwrap();
        std::fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let sheets = load_all_sheets(dir.to_str().unwrap()).await.unwrap();

        assert_eq!(sheets.len(), 2);
        assert_eq!(sheets[0].exam_id, "EX-1");
        assert_eq!(sheets[0].delete, vec!["Urea".to_string()]);
        assert!(!sheets[0].complete);
        assert_eq!(sheets[1].values[0].reference_range.as_deref(), Some("12-16"));
        assert!(sheets[1].complete);
        assert_eq!(sheets[1].display_name(), "b.toml");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_missing_folder_is_error() {
        let result = load_all_sheets("/definitely/not/here").await;
        assert!(matches!(
            result,
            Err(AppError::File(FileError::DirectoryNotFound { .. }))
        ));
    }
}
