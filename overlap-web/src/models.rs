use crate::schema::{index_constituents, indices, name_mappings, stocks};
use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde_derive::*;

#[derive(Debug, Clone, PartialEq, Queryable, Identifiable, Serialize, Deserialize)]
#[diesel(table_name = indices)]
pub struct Index {
    pub id: i32,
    pub name: String,
    pub display_name: String,
    pub category: String,
    pub original_filename: String,
    pub upload_date: NaiveDateTime,
    pub file_size_kb: f64,
    pub record_count: i32,
}

#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = indices)]
pub struct NewIndex<'a> {
    pub name: &'a str,
    pub display_name: &'a str,
    pub category: &'a str,
    pub original_filename: &'a str,
    pub upload_date: NaiveDateTime,
    pub file_size_kb: f64,
    pub record_count: i32,
}

#[allow(dead_code)]
#[derive(Debug, Queryable, Identifiable)]
#[diesel(table_name = stocks)]
pub struct Stock {
    pub id: i32,
    pub ticker: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = index_constituents)]
pub struct NewConstituent {
    pub index_id: i32,
    pub stock_id: i32,
}

#[derive(Debug, Clone, PartialEq, Queryable, Identifiable, Serialize, Deserialize)]
#[diesel(table_name = name_mappings)]
pub struct NameMapping {
    pub id: i32,
    pub source_name: String,
    pub index_id: i32,
    pub inferred: bool,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = name_mappings)]
pub struct NewNameMapping<'a> {
    pub source_name: &'a str,
    pub index_id: i32,
    pub inferred: bool,
    pub updated_at: NaiveDateTime,
}
