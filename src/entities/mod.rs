pub mod company_cache;
pub mod officer_cache;
pub mod search_snapshot;

pub mod prelude {
    pub use super::company_cache::Entity as CompanyCache;
    pub use super::officer_cache::Entity as OfficerCache;
    pub use super::search_snapshot::Entity as SearchSnapshot;
}
