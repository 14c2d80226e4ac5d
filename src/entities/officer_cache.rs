use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "officer_cache")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub company_number: String,
    #[sea_orm(column_type = "Text")]
    pub officers_json: String,
    pub total_results: i64,
    pub active_count: i64,
    pub resigned_count: i64,
    pub fetched_at: String,
    pub expires_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
