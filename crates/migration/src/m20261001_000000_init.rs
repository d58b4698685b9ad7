//! Initial schema.
//!
//! - `users`: accounts allowed to call the API
//! - `suppliers`: vendors owning catalog items
//! - `items`: catalog with authoritative price and stock
//! - `purchasings`: purchase transaction headers
//! - `purchasing_details`: line items of a purchasing
//!
//! Money columns are integer cents (`*_minor`).

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Username,
    PasswordHash,
    Role,
}

#[derive(Iden)]
enum Suppliers {
    Table,
    Id,
    Name,
    Email,
    Address,
}

#[derive(Iden)]
enum Items {
    Table,
    Id,
    Name,
    Stock,
    PriceMinor,
    SupplierId,
}

#[derive(Iden)]
enum Purchasings {
    Table,
    Id,
    Date,
    SupplierId,
    UserId,
    GrandTotalMinor,
}

#[derive(Iden)]
enum PurchasingDetails {
    Table,
    Id,
    PurchasingId,
    ItemId,
    Qty,
    SubTotalMinor,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Username)
                            .string_len(50)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::Role).string_len(20).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Suppliers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Suppliers::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Suppliers::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Suppliers::Email).string_len(100).not_null())
                    .col(ColumnDef::new(Suppliers::Address).text())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Items::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Items::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Items::Name).string_len(100).not_null())
                    .col(
                        ColumnDef::new(Items::Stock)
                            .big_integer()
                            .not_null()
                            .default(0)
                            .check(Expr::col(Items::Stock).gte(0)),
                    )
                    .col(
                        ColumnDef::new(Items::PriceMinor)
                            .big_integer()
                            .not_null()
                            .check(Expr::col(Items::PriceMinor).gte(0)),
                    )
                    .col(ColumnDef::new(Items::SupplierId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-items-supplier_id")
                            .from(Items::Table, Items::SupplierId)
                            .to(Suppliers::Table, Suppliers::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-items-supplier_id")
                    .table(Items::Table)
                    .col(Items::SupplierId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Purchasings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Purchasings::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Purchasings::Date).timestamp().not_null())
                    .col(ColumnDef::new(Purchasings::SupplierId).integer().not_null())
                    .col(ColumnDef::new(Purchasings::UserId).integer().not_null())
                    .col(
                        ColumnDef::new(Purchasings::GrandTotalMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-purchasings-supplier_id")
                            .from(Purchasings::Table, Purchasings::SupplierId)
                            .to(Suppliers::Table, Suppliers::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-purchasings-user_id")
                            .from(Purchasings::Table, Purchasings::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-purchasings-supplier_id")
                    .table(Purchasings::Table)
                    .col(Purchasings::SupplierId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-purchasings-user_id")
                    .table(Purchasings::Table)
                    .col(Purchasings::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PurchasingDetails::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PurchasingDetails::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PurchasingDetails::PurchasingId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PurchasingDetails::ItemId).integer().not_null())
                    .col(
                        ColumnDef::new(PurchasingDetails::Qty)
                            .big_integer()
                            .not_null()
                            .check(Expr::col(PurchasingDetails::Qty).gt(0)),
                    )
                    .col(
                        ColumnDef::new(PurchasingDetails::SubTotalMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-purchasing_details-purchasing_id")
                            .from(PurchasingDetails::Table, PurchasingDetails::PurchasingId)
                            .to(Purchasings::Table, Purchasings::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-purchasing_details-item_id")
                            .from(PurchasingDetails::Table, PurchasingDetails::ItemId)
                            .to(Items::Table, Items::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-purchasing_details-purchasing_id")
                    .table(PurchasingDetails::Table)
                    .col(PurchasingDetails::PurchasingId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-purchasing_details-item_id")
                    .table(PurchasingDetails::Table)
                    .col(PurchasingDetails::ItemId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PurchasingDetails::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Purchasings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Items::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Suppliers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
