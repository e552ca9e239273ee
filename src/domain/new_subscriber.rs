use crate::domain::SubscriberEmail;
use crate::domain::SubscriberName;

#[derive(Debug)]
pub struct NewSubscriber {
    pub email: SubscriberEmail,
    pub name: SubscriberName,
    pub gdpr_consent: bool,
}

impl NewSubscriber {
    pub fn subscribe_flag(&self) -> &'static str {
        if self.gdpr_consent {
            "1"
        } else {
            "0"
        }
    }
}
