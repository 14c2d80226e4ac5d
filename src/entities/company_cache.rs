use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "company_cache")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub company_number: String,
    #[sea_orm(column_type = "Text")]
    pub record_json: String,
    pub fetched_at: String, // ISO8601; SQLite stores these as text
    pub expires_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
