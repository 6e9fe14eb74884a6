use crate::db::Store;
use crate::models::testimonial::{Testimonial, TestimonialInput};
use crate::services::testimonial_service::{TestimonialError, TestimonialService};
use async_trait::async_trait;
use std::collections::HashSet;
use tracing::info;

pub struct SeaOrmTestimonialService {
    store: Store,
}

impl SeaOrmTestimonialService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl TestimonialService for SeaOrmTestimonialService {
    async fn list_public(&self) -> Result<Vec<Testimonial>, TestimonialError> {
        Ok(self.store.testimonials().list_active().await?)
    }

    async fn list_all(&self) -> Result<Vec<Testimonial>, TestimonialError> {
        Ok(self.store.testimonials().list_all().await?)
    }

    async fn get(&self, id: i32) -> Result<Testimonial, TestimonialError> {
        self.store
            .testimonials()
            .get(id)
            .await?
            .ok_or(TestimonialError::NotFound(id))
    }

    async fn create(&self, input: TestimonialInput) -> Result<Testimonial, TestimonialError> {
        let input = input.prepare().map_err(TestimonialError::Validation)?;
        let testimonial = self.store.testimonials().create(&input).await?;
        info!(event = "testimonial_created", testimonial_id = testimonial.id);
        Ok(testimonial)
    }

    async fn update(
        &self,
        id: i32,
        input: TestimonialInput,
    ) -> Result<Testimonial, TestimonialError> {
        let input = input.prepare().map_err(TestimonialError::Validation)?;
        let testimonial = self
            .store
            .testimonials()
            .update(id, &input)
            .await?
            .ok_or(TestimonialError::NotFound(id))?;
        info!(event = "testimonial_updated", testimonial_id = id);
        Ok(testimonial)
    }

    async fn delete(&self, id: i32) -> Result<(), TestimonialError> {
        if !self.store.testimonials().delete(id).await? {
            return Err(TestimonialError::NotFound(id));
        }
        info!(event = "testimonial_deleted", testimonial_id = id);
        Ok(())
    }

    async fn reorder(&self, ids: Vec<i32>) -> Result<Vec<Testimonial>, TestimonialError> {
        if ids.is_empty() {
            return Err(TestimonialError::Validation("ids cannot be empty".to_string()));
        }

        let mut seen = HashSet::new();
        if let Some(dup) = ids.iter().find(|id| !seen.insert(**id)) {
            return Err(TestimonialError::Validation(format!(
                "testimonial {dup} appears more than once"
            )));
        }

        let repo = self.store.testimonials();
        let missing = repo.missing_ids(&ids).await?;
        if !missing.is_empty() {
            let list: Vec<String> = missing.iter().map(ToString::to_string).collect();
            return Err(TestimonialError::Validation(format!(
                "unknown testimonial ids: {}",
                list.join(", ")
            )));
        }

        repo.reorder(&ids).await?;
        info!(event = "testimonials_reordered", count = ids.len());
        Ok(repo.list_all().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str) -> TestimonialInput {
        TestimonialInput {
            name: name.to_string(),
            role: None,
            rating: 5,
            content: "Smooth from start to finish.".to_string(),
            featured: false,
            active: true,
            sort_order: None,
        }
    }

    async fn service() -> SeaOrmTestimonialService {
        SeaOrmTestimonialService::new(Store::in_memory().await.unwrap())
    }

    #[tokio::test]
    async fn test_new_testimonials_append() {
        let service = service().await;
        let a = service.create(input("A")).await.unwrap();
        let b = service.create(input("B")).await.unwrap();
        assert_eq!(a.sort_order, 0);
        assert_eq!(b.sort_order, 1);
    }

    #[tokio::test]
    async fn test_public_order_and_visibility() {
        let service = service().await;
        let a = service.create(input("A")).await.unwrap();
        let mut hidden = input("Hidden");
        hidden.active = false;
        service.create(hidden).await.unwrap();
        let mut featured = input("Featured");
        featured.featured = true;
        service.create(featured).await.unwrap();

        let names: Vec<String> = service
            .list_public()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["Featured".to_string(), "A".to_string()]);
        assert_eq!(service.list_all().await.unwrap().len(), 3);
        assert_eq!(service.get(a.id).await.unwrap().name, "A");
    }

    #[tokio::test]
    async fn test_reorder_is_all_or_nothing() {
        let service = service().await;
        let a = service.create(input("A")).await.unwrap();
        let b = service.create(input("B")).await.unwrap();

        let err = service.reorder(vec![b.id, 999]).await.unwrap_err();
        assert!(matches!(err, TestimonialError::Validation(_)));
        assert_eq!(service.get(b.id).await.unwrap().sort_order, 1);

        assert!(service.reorder(vec![a.id, a.id]).await.is_err());

        let reordered = service.reorder(vec![b.id, a.id]).await.unwrap();
        let names: Vec<&str> = reordered.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
    }
}
