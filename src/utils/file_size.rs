pub struct FileSizeUtils;

impl FileSizeUtils {
    /// `0 B` for zero, otherwise two decimals in 1024-based units.
    pub fn format_size(size: u64) -> String {
        const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
        if size == 0 {
            return "0 B".to_string();
        }

        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        format!("{:.2} {}", size, UNITS[unit_index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(FileSizeUtils::format_size(0), "0 B");
        assert_eq!(FileSizeUtils::format_size(512), "512.00 B");
        assert_eq!(FileSizeUtils::format_size(1536), "1.50 KB");
        assert_eq!(FileSizeUtils::format_size(2 * 1024 * 1024), "2.00 MB");
        assert_eq!(FileSizeUtils::format_size(5 * 1024u64.pow(5)), "5120.00 TB");
    }
}
