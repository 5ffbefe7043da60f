//! Wire payload posted to incoming webhooks.

use serde::Serialize;

/// JSON body understood by Mattermost and Slack compatible webhooks.
///
/// Optional fields are omitted from the serialised body rather than sent as
/// `null`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WebhookPayload<'a> {
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_emoji: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<&'a str>,
}

impl<'a> WebhookPayload<'a> {
    pub fn new(text: &'a str, icon_emoji: Option<&'a str>, channel: Option<&'a str>) -> Self {
        Self {
            text,
            icon_emoji,
            channel,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
