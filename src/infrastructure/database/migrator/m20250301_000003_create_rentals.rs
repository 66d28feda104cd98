//! Create rentals table
//!
//! One row per battery hand-out; `return_date` stays NULL while the battery
//! is out.

use sea_orm_migration::prelude::*;

use super::m20250301_000001_create_batteries::Batteries;
use super::m20250301_000002_create_customers::Customers;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Rentals::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Rentals::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Rentals::BatteryId).string().not_null())
                    .col(ColumnDef::new(Rentals::CustomerId).string().not_null())
                    .col(
                        ColumnDef::new(Rentals::RentDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Rentals::ReturnDate).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Rentals::RentalPrice)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Rentals::IsPaid)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Rentals::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Rentals::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rentals_battery")
                            .from(Rentals::Table, Rentals::BatteryId)
                            .to(Batteries::Table, Batteries::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rentals_customer")
                            .from(Rentals::Table, Rentals::CustomerId)
                            .to(Customers::Table, Customers::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_rentals_battery")
                    .table(Rentals::Table)
                    .col(Rentals::BatteryId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_rentals_customer")
                    .table(Rentals::Table)
                    .col(Rentals::CustomerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_rentals_return_date")
                    .table(Rentals::Table)
                    .col(Rentals::ReturnDate)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Rentals::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Rentals {
    Table,
    Id,
    BatteryId,
    CustomerId,
    RentDate,
    ReturnDate,
    RentalPrice,
    IsPaid,
    CreatedAt,
    UpdatedAt,
}
