use crate::db::now_timestamp;
use crate::entities::{prelude::*, testimonials};
use crate::models::testimonial::{Testimonial, TestimonialInput};
use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

pub struct TestimonialRepository {
    conn: DatabaseConnection,
}

impl TestimonialRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_model(model: testimonials::Model) -> Testimonial {
        Testimonial {
            id: model.id,
            name: model.name,
            role: model.role,
            rating: model.rating,
            content: model.content,
            featured: model.featured,
            sort_order: model.sort_order,
            active: model.active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }

    pub async fn list_active(&self) -> Result<Vec<Testimonial>> {
        let models = Testimonials::find()
            .filter(testimonials::Column::Active.eq(true))
            .order_by_desc(testimonials::Column::Featured)
            .order_by_asc(testimonials::Column::SortOrder)
            .order_by_asc(testimonials::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to query testimonials")?;
        Ok(models.into_iter().map(Self::map_model).collect())
    }

    pub async fn list_all(&self) -> Result<Vec<Testimonial>> {
        let models = Testimonials::find()
            .order_by_asc(testimonials::Column::SortOrder)
            .order_by_asc(testimonials::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to query testimonials")?;
        Ok(models.into_iter().map(Self::map_model).collect())
    }

    pub async fn get(&self, id: i32) -> Result<Option<Testimonial>> {
        let model = Testimonials::find_by_id(id).one(&self.conn).await?;
        Ok(model.map(Self::map_model))
    }

    async fn next_sort_order(&self) -> Result<i32> {
        let max: Option<Option<i32>> = Testimonials::find()
            .select_only()
            .column_as(testimonials::Column::SortOrder.max(), "max_sort")
            .into_tuple()
            .one(&self.conn)
            .await?;
        match max.flatten() {
            None => Ok(0),
            Some(m) => m
                .checked_add(1)
                .context("Testimonial sort order is out of range"),
        }
    }

    pub async fn create(&self, input: &TestimonialInput) -> Result<Testimonial> {
        let sort_order = match input.sort_order {
            Some(order) => order,
            None => self.next_sort_order().await?,
        };
        let now = now_timestamp();

        let active = testimonials::ActiveModel {
            name: Set(input.name.clone()),
            role: Set(input.role.clone()),
            rating: Set(input.rating),
            content: Set(input.content.clone()),
            featured: Set(input.featured),
            sort_order: Set(sort_order),
            active: Set(input.active),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert testimonial")?;
        Ok(Self::map_model(model))
    }

    pub async fn update(&self, id: i32, input: &TestimonialInput) -> Result<Option<Testimonial>> {
        let Some(model) = Testimonials::find_by_id(id).one(&self.conn).await? else {
            return Ok(None);
        };

        let mut active: testimonials::ActiveModel = model.into();
        active.name = Set(input.name.clone());
        active.role = Set(input.role.clone());
        active.rating = Set(input.rating);
        active.content = Set(input.content.clone());
        active.featured = Set(input.featured);
        active.active = Set(input.active);
        if let Some(order) = input.sort_order {
            active.sort_order = Set(order);
        }
        active.updated_at = Set(now_timestamp());

        let model = active.update(&self.conn).await?;
        Ok(Some(Self::map_model(model)))
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Testimonials::delete_by_id(id).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }

    /// Ids that do not exist, in request order.
    pub async fn missing_ids(&self, ids: &[i32]) -> Result<Vec<i32>> {
        let existing: Vec<i32> = Testimonials::find()
            .select_only()
            .column(testimonials::Column::Id)
            .filter(testimonials::Column::Id.is_in(ids.iter().copied()))
            .into_tuple()
            .all(&self.conn)
            .await?;
        Ok(ids
            .iter()
            .copied()
            .filter(|id| !existing.contains(id))
            .collect())
    }

    /// Sets each testimonial's `sort_order` to its index in `ids`, in one transaction.
    pub async fn reorder(&self, ids: &[i32]) -> Result<()> {
        let txn = self.conn.begin().await?;
        let now = now_timestamp();

        for (index, id) in ids.iter().enumerate() {
            let order = i32::try_from(index).context("Too many testimonials to reorder")?;
            Testimonials::update_many()
                .col_expr(testimonials::Column::SortOrder, order.into())
                .col_expr(testimonials::Column::UpdatedAt, now.clone().into())
                .filter(testimonials::Column::Id.eq(*id))
                .exec(&txn)
                .await?;
        }

        txn.commit().await.context("Failed to commit reorder")?;
        Ok(())
    }
}
