use crate::config::WhatsAppConfig;

/// A composed template message, rebuilt from the customer record and company
/// on every delivery attempt. When both header image fields are set the
/// media id wins over the link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundTemplate {
    pub template_name: String,
    pub language_code: Option<String>,
    pub body_params: Vec<String>,
    pub button_suffix: Option<String>,
    pub header_image_link: Option<String>,
    pub header_image_id: Option<String>,
}

/// Builds the per-stage WhatsApp template payloads. Pure: no I/O, never
/// fails for valid input. Callers validate the review link before composing.
#[derive(Clone)]
pub struct ReviewMessageService {
    config: WhatsAppConfig,
}

impl ReviewMessageService {
    pub fn new(config: WhatsAppConfig) -> Self {
        Self { config }
    }

    /// Day 0 (immediate). Two template variants exist: with a configured
    /// header image the body stays empty and there is no button; without
    /// one the body carries company name + review link and the button the
    /// customer id for the /r/{id} redirect.
    pub fn day0_message(
        &self,
        customer_id: i32,
        company_name: &str,
        review_link: &str,
    ) -> OutboundTemplate {
        let has_header_image = self.config.day0_header_image_id.is_some()
            || self.config.day0_header_image_link.is_some();

        let (body_params, button_suffix) = if has_header_image {
            (Vec::new(), None)
        } else {
            (
                vec![company_name.to_string(), review_link.to_string()],
                Some(customer_id.to_string()),
            )
        };

        OutboundTemplate {
            template_name: self.config.day0_template_name.clone(),
            language_code: self.config.day0_language_code.clone(),
            body_params,
            button_suffix,
            header_image_link: self.config.day0_header_image_link.clone(),
            header_image_id: self.config.day0_header_image_id.clone(),
        }
    }

    /// Day 1 follow-up: gentle reminder.
    pub fn day1_message(
        &self,
        customer_id: i32,
        company_name: &str,
        review_link: &str,
    ) -> OutboundTemplate {
        self.reminder(&self.config.day1_template_name, customer_id, company_name, review_link)
    }

    /// Day 3 final nudge.
    pub fn day3_message(
        &self,
        customer_id: i32,
        company_name: &str,
        review_link: &str,
    ) -> OutboundTemplate {
        self.reminder(&self.config.day3_template_name, customer_id, company_name, review_link)
    }

    fn reminder(
        &self,
        template_name: &str,
        customer_id: i32,
        company_name: &str,
        review_link: &str,
    ) -> OutboundTemplate {
        OutboundTemplate {
            template_name: template_name.to_string(),
            language_code: None,
            body_params: vec![company_name.to_string(), review_link.to_string()],
            button_suffix: Some(customer_id.to_string()),
            header_image_link: None,
            header_image_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WhatsAppConfig;

    fn config() -> WhatsAppConfig {
        WhatsAppConfig {
            base_url: "https://alots.io/v20.0".into(),
            phone_number_id: "123".into(),
            api_key: "key".into(),
            language_code: "en".into(),
            day0_template_name: "review_request_day0".into(),
            day1_template_name: "review_reminder_day1".into(),
            day3_template_name: "review_reminder_day3".into(),
            day0_language_code: None,
            day0_header_image_link: None,
            day0_header_image_id: None,
            send_hi_before_template: false,
        }
    }

    #[test]
    fn day0_text_variant_carries_company_link_and_button() {
        let svc = ReviewMessageService::new(config());
        let msg = svc.day0_message(42, "Acme Solar", "https://g.co/x");
        assert_eq!(msg.template_name, "review_request_day0");
        assert_eq!(msg.body_params, vec!["Acme Solar", "https://g.co/x"]);
        assert_eq!(msg.button_suffix.as_deref(), Some("42"));
        assert!(msg.header_image_link.is_none());
        assert!(msg.header_image_id.is_none());
        assert!(msg.language_code.is_none());
    }

    #[test]
    fn day0_image_variant_has_empty_body_and_no_button() {
        let mut cfg = config();
        cfg.day0_header_image_id = Some("media-1".into());
        cfg.day0_language_code = Some("mr".into());
        let svc = ReviewMessageService::new(cfg);
        let msg = svc.day0_message(42, "Acme Solar", "https://g.co/x");
        assert!(msg.body_params.is_empty());
        assert!(msg.button_suffix.is_none());
        assert_eq!(msg.header_image_id.as_deref(), Some("media-1"));
        assert_eq!(msg.language_code.as_deref(), Some("mr"));
    }

    #[test]
    fn reminders_use_their_templates_and_customer_id_button() {
        let svc = ReviewMessageService::new(config());
        let day1 = svc.day1_message(7, "Acme Solar", "https://g.co/x");
        assert_eq!(day1.template_name, "review_reminder_day1");
        assert_eq!(day1.body_params, vec!["Acme Solar", "https://g.co/x"]);
        assert_eq!(day1.button_suffix.as_deref(), Some("7"));

        let day3 = svc.day3_message(7, "Acme Solar", "https://g.co/x");
        assert_eq!(day3.template_name, "review_reminder_day3");
        assert_eq!(day3.button_suffix.as_deref(), Some("7"));
    }
}
