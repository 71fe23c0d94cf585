pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::services::{
    company_service::CompanyService, review_customer_service::ReviewCustomerService,
    review_message_service::ReviewMessageService, whatsapp_service::WhatsAppService,
};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub company_service: CompanyService,
    pub review_customer_service: ReviewCustomerService,
    pub review_message_service: ReviewMessageService,
    pub whatsapp_service: WhatsAppService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let config = crate::config::get_config();

        let company_service = CompanyService::new(pool.clone());
        let review_customer_service = ReviewCustomerService::new(pool.clone());
        let review_message_service = ReviewMessageService::new(config.whatsapp.clone());
        let whatsapp_service = WhatsAppService::new(config.whatsapp.clone());

        Self {
            pool,
            company_service,
            review_customer_service,
            review_message_service,
            whatsapp_service,
        }
    }
}
