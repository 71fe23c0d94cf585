use chrono::{Duration as ChronoDuration, Utc};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::{ScheduleConfig, WhatsAppConfig};
use crate::error::Result;
use crate::models::review_customer::PendingCustomer;
use crate::services::review_customer_service::ReviewCustomerService;
use crate::services::review_message_service::ReviewMessageService;
use crate::services::whatsapp_service::WhatsAppService;

/// Background loop that drives the three-message review sequence. Each tick
/// re-reads the due-sets from the store, sends what is due and raises the
/// per-stage flag only after a confirmed delivery, so a crashed or failed
/// tick simply leaves the work for the next one.
///
/// Known race: an enrollment request's inline day-0 send and a concurrent
/// tick can both observe day0_sent = false and each deliver once. This is
/// accepted (a rare duplicate WhatsApp message) rather than adding locking.
pub struct ReviewScheduler {
    customers: ReviewCustomerService,
    whatsapp: WhatsAppService,
    messages: ReviewMessageService,
    schedule: ScheduleConfig,
    whatsapp_config: WhatsAppConfig,
}

impl ReviewScheduler {
    pub fn new(
        customers: ReviewCustomerService,
        whatsapp: WhatsAppService,
        messages: ReviewMessageService,
        schedule: ScheduleConfig,
        whatsapp_config: WhatsAppConfig,
    ) -> Self {
        Self {
            customers,
            whatsapp,
            messages,
            schedule,
            whatsapp_config,
        }
    }

    /// Runs until `shutdown` is cancelled. A failed tick is logged and the
    /// loop continues; in-flight sends complete before the task exits.
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            "Review scheduler started. Polling every {}s. Day 1 delay: {}min, Day 3 delay: {}min",
            self.schedule.polling_interval_seconds,
            self.schedule.day1_delay_minutes,
            self.schedule.day3_delay_minutes
        );

        let interval = Duration::from_secs(self.schedule.polling_interval_seconds);
        loop {
            debug!("Review scheduler: polling cycle started");
            if let Err(e) = self.tick(&shutdown).await {
                error!(error = ?e, "Error in review scheduler polling cycle");
            }

            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = shutdown.cancelled() => {
                    info!("Review scheduler stopping");
                    return;
                }
            }
        }
    }

    /// One polling cycle: day-0 retries, then due day-1, then due day-3.
    /// A single customer's failure never blocks the rest of the due-set.
    pub async fn tick(&self, shutdown: &CancellationToken) -> Result<()> {
        let now = Utc::now();

        self.process_day0(shutdown).await?;

        let day1_cutoff = now - ChronoDuration::minutes(self.schedule.day1_delay_minutes);
        let pending_day1 = self.customers.pending_day1(day1_cutoff).await?;
        if !pending_day1.is_empty() {
            info!(
                "Found {} customers pending Day 1 message (cutoff: {})",
                pending_day1.len(),
                day1_cutoff
            );
        }
        for customer in pending_day1 {
            if shutdown.is_cancelled() {
                break;
            }
            self.send_day1(&customer).await;
        }

        let day3_cutoff = now - ChronoDuration::minutes(self.schedule.day3_delay_minutes);
        let pending_day3 = self.customers.pending_day3(day3_cutoff).await?;
        if !pending_day3.is_empty() {
            info!(
                "Found {} customers pending Day 3 message (cutoff: {})",
                pending_day3.len(),
                day3_cutoff
            );
        }
        for customer in pending_day3 {
            if shutdown.is_cancelled() {
                break;
            }
            self.send_day3(&customer).await;
        }

        Ok(())
    }

    async fn process_day0(&self, shutdown: &CancellationToken) -> Result<()> {
        let pending = self.customers.pending_day0().await?;
        if pending.is_empty() {
            debug!("Day 0: no pending customers");
            return Ok(());
        }
        info!("Found {} customers pending Day 0 message (will send now)", pending.len());

        for customer in pending {
            if shutdown.is_cancelled() {
                break;
            }

            let Some(review_link) = customer.review_link().map(str::to_string) else {
                warn!(
                    "Skipping customer {} ({}): company review link missing",
                    customer.id, customer.phone_number
                );
                continue;
            };

            // Opening an unsolicited template conversation can be rejected by
            // some gateways; an optional bare "Hi" first works around that.
            if self.whatsapp_config.send_hi_before_template {
                self.whatsapp.send_text(&customer.phone_number, "Hi").await;
                tokio::time::sleep(Duration::from_secs(2)).await;
            }

            let message =
                self.messages
                    .day0_message(customer.id, &customer.company_name, &review_link);
            if self.whatsapp.send_template(&customer.phone_number, &message).await {
                if let Err(e) = self.customers.mark_day0_sent(customer.id).await {
                    error!(error = ?e, "Failed to mark Day 0 sent for customer {}", customer.id);
                    continue;
                }
                info!(
                    "Day 0 retry: message sent to customer {} ({})",
                    customer.id, customer.phone_number
                );
            }
        }

        Ok(())
    }

    async fn send_day1(&self, customer: &PendingCustomer) {
        let Some(review_link) = customer.review_link().map(str::to_string) else {
            warn!(
                "Skipping customer {} ({}): company review link missing",
                customer.id, customer.phone_number
            );
            return;
        };

        let message = self
            .messages
            .day1_message(customer.id, &customer.company_name, &review_link);
        if self.whatsapp.send_template(&customer.phone_number, &message).await {
            match self.customers.mark_day1_sent(customer.id).await {
                Ok(()) => info!(
                    "Day 1 message sent to customer {} ({})",
                    customer.id, customer.phone_number
                ),
                Err(e) => error!(error = ?e, "Failed to mark Day 1 sent for customer {}", customer.id),
            }
        } else {
            warn!(
                "Failed to send Day 1 message to customer {} ({}). Will retry next cycle.",
                customer.id, customer.phone_number
            );
        }
    }

    async fn send_day3(&self, customer: &PendingCustomer) {
        let Some(review_link) = customer.review_link().map(str::to_string) else {
            warn!(
                "Skipping customer {} ({}): company review link missing",
                customer.id, customer.phone_number
            );
            return;
        };

        let message = self
            .messages
            .day3_message(customer.id, &customer.company_name, &review_link);
        if self.whatsapp.send_template(&customer.phone_number, &message).await {
            match self.customers.mark_day3_sent(customer.id).await {
                Ok(()) => info!(
                    "Day 3 message sent to customer {} ({})",
                    customer.id, customer.phone_number
                ),
                Err(e) => error!(error = ?e, "Failed to mark Day 3 sent for customer {}", customer.id),
            }
        } else {
            warn!(
                "Failed to send Day 3 message to customer {} ({}). Will retry next cycle.",
                customer.id, customer.phone_number
            );
        }
    }
}
