use crate::entities::{leads, login_tokens, prelude::*, testimonials, vehicles};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name("idx_vehicles_status")
                    .table(Vehicles)
                    .col(vehicles::Column::Status)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_vehicles_featured")
                    .table(Vehicles)
                    .col(vehicles::Column::Featured)
                    .col(vehicles::Column::FeaturedPosition)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_leads_status_created_at")
                    .table(Leads)
                    .col(leads::Column::Status)
                    .col(leads::Column::CreatedAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_testimonials_active_sort")
                    .table(Testimonials)
                    .col(testimonials::Column::Active)
                    .col(testimonials::Column::SortOrder)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // Housekeeping deletes by expiry
        manager
            .create_index(
                Index::create()
                    .name("idx_login_tokens_expires_at")
                    .table(LoginTokens)
                    .col(login_tokens::Column::ExpiresAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_login_tokens_expires_at").table(LoginTokens).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_testimonials_active_sort").table(Testimonials).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_leads_status_created_at").table(Leads).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_vehicles_featured").table(Vehicles).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_vehicles_status").table(Vehicles).to_owned())
            .await
    }
}
