/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Mask a password for display, capping the mask width so field length
/// is not leaked to shoulder surfers
pub fn mask_password(password: &str, max_width: usize) -> String {
    "*".repeat(password.chars().count().min(max_width))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
    }

    #[test]
    fn test_mask_password() {
        assert_eq!(mask_password("abc", 16), "***");
        assert_eq!(mask_password("", 16), "");
        // Long passwords mask at the cap
        assert_eq!(mask_password("abcdefghijklmnopqrstuvwxyz", 16).len(), 16);
    }
}
