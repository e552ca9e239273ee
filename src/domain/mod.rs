mod new_subscriber;
mod outcome;
mod subscriber_email;
mod subscriber_name;

pub use new_subscriber::NewSubscriber;
pub use outcome::SubscriptionOutcome;
pub use subscriber_email::SubscriberEmail;
pub use subscriber_name::SubscriberName;
