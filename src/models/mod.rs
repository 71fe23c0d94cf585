pub mod company;
pub mod review_customer;
