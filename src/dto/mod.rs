pub mod company_dto;
pub mod review_dto;
