use reqwest::{Client, StatusCode};
use serde_json::{json, Value as JsonValue};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::config::WhatsAppConfig;
use crate::services::review_message_service::OutboundTemplate;

/// Delay between a failed attempt and its single retry. The scheduler's
/// polling loop is the coarser backstop for anything longer than a blip.
const RETRY_DELAY: Duration = Duration::from_secs(2);
const MAX_ATTEMPTS: u32 = 2;

/// Sends text and template messages through the external WhatsApp HTTP API.
/// Delivery failures are logged and reported as `false`; they never surface
/// as errors to callers.
#[derive(Clone)]
pub struct WhatsAppService {
    client: Client,
    config: WhatsAppConfig,
}

impl WhatsAppService {
    pub fn new(config: WhatsAppConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client for WhatsApp service");
        Self { client, config }
    }

    /// Sends a plain text message. Single attempt; returns false when the
    /// API credentials are unconfigured (deliberate no-op, not an error).
    pub async fn send_text(&self, phone_number: &str, text: &str) -> bool {
        if !self.config.is_configured() {
            warn!(
                "WhatsApp API credentials not configured. Skipping text message to {}",
                phone_number
            );
            return false;
        }

        let payload = json!({
            "messaging_product": "whatsapp",
            "recipient_type": "individual",
            "to": phone_number,
            "type": "text",
            "text": { "body": text }
        });

        info!("Sending WhatsApp text message to {}", phone_number);
        match self.post_message(&payload).await {
            Ok(resp) => {
                let status = resp.status();
                let body = resp.text().await.unwrap_or_default();
                if status.is_success() {
                    info!("WhatsApp text message sent successfully to {}", phone_number);
                    true
                } else {
                    warn!(
                        "WhatsApp API returned {} for text message: {}",
                        status.as_u16(),
                        body
                    );
                    false
                }
            }
            Err(err) => {
                error!("Failed to send WhatsApp text message to {}: {}", phone_number, err);
                false
            }
        }
    }

    /// Sends a template message with up to one retry. Retries only on
    /// transient HTTP statuses (429/500/503/504) and connection errors;
    /// timeouts and other rejections fail immediately.
    pub async fn send_template(&self, phone_number: &str, message: &OutboundTemplate) -> bool {
        if !self.config.is_configured() {
            warn!(
                "WhatsApp API credentials not configured. Skipping template '{}' to {}",
                message.template_name, phone_number
            );
            return false;
        }

        let payload = build_template_payload(phone_number, message, &self.config.language_code);

        info!(
            "Sending WhatsApp template '{}' to {}",
            message.template_name, phone_number
        );
        debug!("WhatsApp API payload: {}", payload);

        for attempt in 1..=MAX_ATTEMPTS {
            match self.post_message(&payload).await {
                Ok(resp) => {
                    let status = resp.status();
                    let body = resp.text().await.unwrap_or_default();

                    if status.is_success() {
                        info!(
                            "WhatsApp message sent successfully to {} (template: {})",
                            phone_number, message.template_name
                        );
                        return true;
                    }

                    warn!(
                        "WhatsApp API error. StatusCode={} Attempt={}. Full response: {}",
                        status.as_u16(),
                        attempt,
                        body
                    );

                    if attempt < MAX_ATTEMPTS && is_transient_error(status) {
                        tokio::time::sleep(RETRY_DELAY).await;
                        continue;
                    }
                    return false;
                }
                Err(err) if err.is_timeout() => {
                    error!(
                        "Timeout sending WhatsApp message on attempt {} to {}: {}",
                        attempt, phone_number, err
                    );
                    return false;
                }
                Err(err) => {
                    error!(
                        "HTTP error sending WhatsApp message on attempt {} to {}: {}",
                        attempt, phone_number, err
                    );
                    if attempt < MAX_ATTEMPTS {
                        tokio::time::sleep(RETRY_DELAY).await;
                        continue;
                    }
                    return false;
                }
            }
        }

        false
    }

    async fn post_message(&self, payload: &JsonValue) -> reqwest::Result<reqwest::Response> {
        let url = format!(
            "{}/{}/messages",
            self.config.base_url.trim_end_matches('/'),
            self.config.phone_number_id
        );
        self.client
            .post(url)
            .bearer_auth(&self.config.api_key)
            .json(payload)
            .send()
            .await
    }
}

fn is_transient_error(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    )
}

/// Builds the template request body. Component order is fixed by the API:
/// header (if any image) -> body (always present, possibly empty) -> url
/// button at index 0 (if a suffix is given). A configured media id takes
/// precedence over a link for the header image.
fn build_template_payload(
    phone_number: &str,
    message: &OutboundTemplate,
    default_language: &str,
) -> JsonValue {
    let mut components = Vec::new();

    if message.header_image_id.is_some() || message.header_image_link.is_some() {
        let image = match (&message.header_image_id, &message.header_image_link) {
            (Some(id), _) => json!({ "id": id.trim() }),
            (None, Some(link)) => json!({ "link": link.trim() }),
            (None, None) => unreachable!(),
        };
        components.push(json!({
            "type": "header",
            "parameters": [{ "type": "image", "image": image }]
        }));
    }

    // Some templates declare a body with no parameters; the component must
    // still be present with an empty parameter list.
    let body_params: Vec<JsonValue> = message
        .body_params
        .iter()
        .map(|p| json!({ "type": "text", "text": p }))
        .collect();
    components.push(json!({
        "type": "body",
        "parameters": body_params
    }));

    if let Some(suffix) = &message.button_suffix {
        components.push(json!({
            "type": "button",
            "sub_type": "url",
            "index": "0",
            "parameters": [{ "type": "text", "text": suffix }]
        }));
    }

    let language = message
        .language_code
        .as_deref()
        .unwrap_or(default_language);

    json!({
        "messaging_product": "whatsapp",
        "recipient_type": "individual",
        "to": phone_number,
        "type": "template",
        "template": {
            "name": message.template_name,
            "language": { "code": language },
            "components": components
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> OutboundTemplate {
        OutboundTemplate {
            template_name: "review_reminder_day1".into(),
            language_code: None,
            body_params: vec!["Acme Solar".into(), "https://g.co/x".into()],
            button_suffix: Some("42".into()),
            header_image_link: None,
            header_image_id: None,
        }
    }

    #[test]
    fn transient_statuses() {
        assert!(is_transient_error(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_transient_error(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(is_transient_error(StatusCode::SERVICE_UNAVAILABLE));
        assert!(is_transient_error(StatusCode::GATEWAY_TIMEOUT));
        assert!(!is_transient_error(StatusCode::BAD_REQUEST));
        assert!(!is_transient_error(StatusCode::UNAUTHORIZED));
        assert!(!is_transient_error(StatusCode::BAD_GATEWAY));
    }

    #[test]
    fn payload_orders_body_then_button() {
        let payload = build_template_payload("919876543210", &template(), "en");
        assert_eq!(payload["to"], "919876543210");
        assert_eq!(payload["type"], "template");
        assert_eq!(payload["template"]["name"], "review_reminder_day1");
        assert_eq!(payload["template"]["language"]["code"], "en");

        let components = payload["template"]["components"].as_array().unwrap();
        assert_eq!(components.len(), 2);
        assert_eq!(components[0]["type"], "body");
        assert_eq!(components[0]["parameters"][0]["text"], "Acme Solar");
        assert_eq!(components[0]["parameters"][1]["text"], "https://g.co/x");
        assert_eq!(components[1]["type"], "button");
        assert_eq!(components[1]["sub_type"], "url");
        assert_eq!(components[1]["index"], "0");
        assert_eq!(components[1]["parameters"][0]["text"], "42");
    }

    #[test]
    fn payload_header_comes_first_and_id_wins_over_link() {
        let mut msg = template();
        msg.body_params.clear();
        msg.button_suffix = None;
        msg.header_image_link = Some("https://cdn.example/img.png".into());
        msg.header_image_id = Some("media-7".into());

        let payload = build_template_payload("919876543210", &msg, "en");
        let components = payload["template"]["components"].as_array().unwrap();
        assert_eq!(components.len(), 2);
        assert_eq!(components[0]["type"], "header");
        assert_eq!(components[0]["parameters"][0]["image"]["id"], "media-7");
        assert!(components[0]["parameters"][0]["image"].get("link").is_none());

        // Body stays present even with zero parameters.
        assert_eq!(components[1]["type"], "body");
        assert_eq!(components[1]["parameters"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn per_template_language_overrides_default() {
        let mut msg = template();
        msg.language_code = Some("mr".into());
        let payload = build_template_payload("919876543210", &msg, "en");
        assert_eq!(payload["template"]["language"]["code"], "mr");
    }
}
