/// Alert stage configuration
#[derive(Debug, Clone)]
pub struct AlertConfig {
    /// Recipients the notification is addressed to. Empty means
    /// log-only operation with no addressees.
    pub recipients: Vec<String>,
    /// Notification body.
    pub message: String,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            recipients: Vec::new(),
            message: "ALERT: A Gunshot Has Been Detected".to_string(),
        }
    }
}
