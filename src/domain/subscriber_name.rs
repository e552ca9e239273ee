#[derive(Debug, Clone)]
pub struct SubscriberName(String);

impl SubscriberName {
    pub fn parse(s: String) -> Result<SubscriberName, String> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            Err(format!("{:?} is not a valid subscriber name.", s))
        } else {
            Ok(Self(trimmed.to_owned()))
        }
    }
}

impl AsRef<str> for SubscriberName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
