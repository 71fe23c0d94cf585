pub mod company_service;
pub mod review_customer_service;
pub mod review_message_service;
pub mod review_scheduler;
pub mod whatsapp_service;
