pub mod company;
pub mod health;
pub mod redirect;
pub mod review;
