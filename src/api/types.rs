use serde::{Deserialize, Deserializer, Serialize};

/// One uploaded file as listed by the backend.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    #[serde(default)]
    pub file_key: String,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub file_type: Option<String>,
    #[serde(default, deserialize_with = "u64_from_number_or_string")]
    pub file_size: u64,
    #[serde(default)]
    pub created_at: String,
}

/// A rendered page of a file. `page_number` is 1-based.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilePage {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub page_number: u32,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    #[serde(default)]
    pub page_number: u32,
    #[serde(default)]
    pub page_size: u32,
    #[serde(default)]
    pub total_items: u64,
    #[serde(default)]
    pub has_next_page: bool,
}

/// A page of a remote collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: PaginationMeta,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FilesResponse {
    #[serde(default)]
    pub files: Vec<FileRecord>,
    #[serde(default)]
    pub pagination: PaginationMeta,
}

impl From<FilesResponse> for Page<FileRecord> {
    fn from(response: FilesResponse) -> Self {
        Page {
            items: response
                .files
                .into_iter()
                .filter(|file| !file.file_key.is_empty())
                .collect(),
            pagination: response.pagination,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FilePagesResponse {
    #[serde(default)]
    pub pages: Vec<FilePage>,
    #[serde(default)]
    pub pagination: PaginationMeta,
}

impl From<FilePagesResponse> for Page<FilePage> {
    fn from(response: FilePagesResponse) -> Self {
        Page {
            items: response.pages,
            pagination: response.pagination,
        }
    }
}

/// A pre-authorized destination for a direct upload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadTarget {
    pub upload_url: String,
    pub file_key: String,
    #[serde(default)]
    pub bucket_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmUpload {
    pub file_name: String,
    pub file_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket_name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DeleteFilesRequest<'a> {
    pub file_keys: &'a [String],
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FileUrlResponse {
    #[serde(default)]
    pub file_url: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PageContent {
    #[serde(default)]
    pub content: String,
}

/// proto3 JSON encodes int64 as a string; accept both shapes.
fn u64_from_number_or_string<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) if s.trim().is_empty() => Ok(0),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_file_size_accepts_string_and_number() {
        let from_string: FileRecord =
            serde_json::from_value(json!({"fileKey": "a", "fileSize": "2097152"})).unwrap();
        let from_number: FileRecord =
            serde_json::from_value(json!({"fileKey": "a", "fileSize": 2097152})).unwrap();
        assert_eq!(from_string.file_size, 2_097_152);
        assert_eq!(from_number.file_size, 2_097_152);
    }

    #[test]
    fn test_omitted_fields_default() {
        let response: FilesResponse = serde_json::from_value(json!({})).unwrap();
        let page: Page<FileRecord> = response.into();
        assert!(page.items.is_empty());
        assert_eq!(page.pagination, PaginationMeta::default());
    }

    #[test]
    fn test_files_without_key_are_dropped() {
        let response: FilesResponse = serde_json::from_value(json!({
            "files": [
                {"fileKey": "01J", "fileName": "scan.pdf", "createdAt": "2024-05-01T10:00:00Z"},
                {"fileName": "orphan.pdf"}
            ],
            "pagination": {"pageNumber": 1, "pageSize": 10, "totalItems": 2, "hasNextPage": false}
        }))
        .unwrap();
        let page: Page<FileRecord> = response.into();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].file_key, "01J");
        assert_eq!(page.pagination.total_items, 2);
    }

    #[test]
    fn test_confirm_omits_missing_bucket() {
        let body = ConfirmUpload {
            file_name: "scan.pdf".into(),
            file_key: "01J".into(),
            bucket_name: None,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"fileName": "scan.pdf", "fileKey": "01J"})
        );
    }

    #[test]
    fn test_upload_target_bucket_is_optional() {
        let target: UploadTarget = serde_json::from_value(json!({
            "uploadUrl": "http://s3.local/files/01J?sig=x",
            "fileKey": "01J"
        }))
        .unwrap();
        assert_eq!(target.bucket_name, None);
    }
}
