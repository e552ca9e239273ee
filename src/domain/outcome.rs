#[derive(serde::Serialize, Debug, PartialEq)]
pub struct SubscriptionOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
}

impl SubscriptionOutcome {
    pub fn subscribed() -> Self {
        Self {
            success: true,
            message: Some("Successfully subscribed"),
            error: None,
        }
    }
    pub fn failure(error: &'static str) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error),
        }
    }
}
