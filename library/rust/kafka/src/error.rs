/// KafkaError は Kafka クラスタ操作に関するエラーを表す。
#[derive(Debug, thiserror::Error)]
pub enum KafkaError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("configuration error: {0}")]
    ConfigurationError(String),

    #[error("timeout: {0}")]
    Timeout(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            KafkaError::ConnectionFailed("broker down".to_string()).to_string(),
            "connection failed: broker down"
        );
        assert!(KafkaError::Timeout("metadata".to_string())
            .to_string()
            .starts_with("timeout"));
    }
}
