//! Identifier normalization
//!
//! AWS identifiers are long paths (queue URLs, ARNs). The report shows the
//! trailing short name next to, or instead of, the full identifier.

/// Trailing short name of an ARN, URL, or path.
///
/// Takes the last `/` segment when there is one, so ECS task definitions keep
/// their `family:revision`. Plain ARNs without a path fall back to the last
/// `:` segment.
pub fn short_name(id: &str) -> &str {
    let trimmed = id.trim_end_matches('/');
    if let Some((_, tail)) = trimmed.rsplit_once('/') {
        return tail;
    }
    if trimmed.starts_with("arn:") {
        if let Some((_, tail)) = trimmed.rsplit_once(':') {
            return tail;
        }
    }
    trimmed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_url() {
        assert_eq!(
            short_name("https://sqs.us-east-1.amazonaws.com/123456789012/orders-dlq"),
            "orders-dlq"
        );
    }

    #[test]
    fn test_plain_arn() {
        assert_eq!(
            short_name("arn:aws:sns:us-east-1:123456789012:alerts"),
            "alerts"
        );
    }

    #[test]
    fn test_path_arn_keeps_revision() {
        assert_eq!(
            short_name("arn:aws:ecs:us-east-1:123456789012:task-definition/web:42"),
            "web:42"
        );
        assert_eq!(
            short_name("arn:aws:ecs:us-east-1:123456789012:cluster/prod"),
            "prod"
        );
    }

    #[test]
    fn test_passthrough() {
        assert_eq!(short_name("already-short"), "already-short");
        assert_eq!(short_name("trailing/"), "trailing");
        assert_eq!(short_name(""), "");
    }
}
