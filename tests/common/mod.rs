#![allow(dead_code)]

use chrono::{DateTime, Utc};
use filterable::{Filterable, RequestParams, column_sort, contains_filter, eq_filter};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ConnectionTrait, Database, DatabaseConnection, DbErr,
    Schema, Select,
};

pub mod order_entity;

use order_entity::Column;

pub type OrderQuery = Select<order_entity::Entity>;
pub type OrderFilters = Filterable<OrderQuery, RequestParams>;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// `status` filter, `name` and `created_at` sorts, default `created_at`
pub fn order_filters() -> OrderFilters {
    let filters = OrderFilters::new();
    filters
        .add_filter("status", eq_filter("status", Column::Status))
        .expect("register status filter");
    filters
        .add_sort("name", column_sort(Column::Name))
        .expect("register name sort");
    filters
        .add_sort("created_at", column_sort(Column::CreatedAt))
        .expect("register created_at sort");
    filters
        .set_default_sort("created_at")
        .expect("created_at is registered");
    filters
}

/// Same as [`order_filters`] plus a `q` substring search on the name
pub fn order_filters_with_search() -> OrderFilters {
    let filters = order_filters();
    filters
        .add_filter("q", contains_filter("q", Column::Name))
        .expect("register search filter");
    filters
}

pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    init_tracing();
    let db = Database::connect("sqlite::memory:").await?;

    let backend = db.get_database_backend();
    let schema = Schema::new(backend);
    db.execute(backend.build(&schema.create_table_from_entity(order_entity::Entity)))
        .await?;

    Ok(db)
}

fn day(offset: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(1_704_067_200 + offset * 86_400, 0).expect("valid timestamp")
}

/// Four orders, created one day apart in the listed order
pub async fn seed_orders(db: &DatabaseConnection) -> Result<(), DbErr> {
    let orders = [
        ("Charlie", "active"),
        ("Alice", "archived"),
        ("Bob", "active"),
        ("Dave", "pending"),
    ];

    for (offset, (name, status)) in (0_i64..).zip(orders) {
        order_entity::ActiveModel {
            name: Set(name.to_string()),
            status: Set(status.to_string()),
            created_at: Set(day(offset)),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }
    Ok(())
}
