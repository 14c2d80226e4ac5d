pub mod companies_house;

pub use companies_house::{AdvancedPage, CompaniesHouseClient, KeywordPage, RegistryClient};
