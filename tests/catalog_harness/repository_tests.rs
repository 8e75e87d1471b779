//! Contract tests every `Repository` implementation must pass
//!
//! The macro takes an expression producing an `Arc<dyn Repository<Publisher>>`
//! backed by an empty store.
//!
//! ```rust,ignore
//! repository_contract_tests!(memory, {
//!     let db = MemoryDatabase::new(catalog_schema());
//!     Arc::new(db.repository::<Publisher>()) as Arc<dyn Repository<Publisher>>
//! });
//! ```

#[macro_export]
macro_rules! repository_contract_tests {
    ($name:ident, $factory:expr) => {
        mod $name {
            use super::*;
            use catalog::prelude::*;
            use std::sync::Arc;

            fn repository() -> Arc<dyn Repository<Publisher>> {
                $factory
            }

            fn publisher(name: &str) -> Publisher {
                Publisher::new(name, 73282932000074, "+33612345678")
            }

            #[tokio::test]
            async fn test_insert_then_find_one() {
                let repo = repository();
                let inserted = repo.insert(publisher("Ubisoft")).await.unwrap();

                let found = repo
                    .find_one(&inserted.id, &JoinPlan::none())
                    .await
                    .unwrap();
                assert_eq!(found, Some(inserted));
            }

            #[tokio::test]
            async fn test_insert_duplicate_id_fails() {
                let repo = repository();
                let inserted = repo.insert(publisher("Ubisoft")).await.unwrap();
                assert!(repo.insert(inserted).await.is_err());
            }

            #[tokio::test]
            async fn test_find_one_missing_is_none() {
                let repo = repository();
                let found = repo
                    .find_one(&Uuid::new_v4(), &JoinPlan::none())
                    .await
                    .unwrap();
                assert!(found.is_none());
            }

            #[tokio::test]
            async fn test_exists() {
                let repo = repository();
                let inserted = repo.insert(publisher("Ubisoft")).await.unwrap();
                assert!(repo.exists(&inserted.id).await.unwrap());
                assert!(!repo.exists(&Uuid::new_v4()).await.unwrap());
            }

            #[tokio::test]
            async fn test_find_with_conditions() {
                let repo = repository();
                repo.insert(publisher("Ubisoft")).await.unwrap();
                repo.insert(publisher("Capcom")).await.unwrap();

                let all = repo.find(&[]).await.unwrap();
                assert_eq!(all.len(), 2);

                let capcom = repo.find(&[Condition::eq("name", "Capcom")]).await.unwrap();
                assert_eq!(capcom.len(), 1);
                assert_eq!(capcom[0].name, "Capcom");
            }

            #[tokio::test]
            async fn test_find_one_by_field() {
                let repo = repository();
                repo.insert(publisher("Ubisoft")).await.unwrap();
                let capcom = repo.insert(publisher("Capcom")).await.unwrap();

                let found = repo.find_one_by("name", "Capcom".into()).await.unwrap();
                assert_eq!(found.map(|p| p.id), Some(capcom.id));

                let missing = repo.find_one_by("name", "Sega".into()).await.unwrap();
                assert!(missing.is_none());
            }

            #[tokio::test]
            async fn test_save_replaces_row() {
                let repo = repository();
                let mut inserted = repo.insert(publisher("Ubisoft")).await.unwrap();
                inserted.phone = "+33700000000".to_string();
                repo.save(inserted.clone()).await.unwrap();

                let found = repo
                    .find_one(&inserted.id, &JoinPlan::none())
                    .await
                    .unwrap()
                    .unwrap();
                assert_eq!(found.phone, "+33700000000");
            }

            #[tokio::test]
            async fn test_update_many_patches_only_listed_rows() {
                let repo = repository();
                let a = repo.insert(publisher("Ubisoft")).await.unwrap();
                let b = repo.insert(publisher("Capcom")).await.unwrap();

                let touched = repo
                    .update_many(&[a.id], json!({ "phone": "+33799999999" }))
                    .await
                    .unwrap();
                assert_eq!(touched, 1);

                let a = repo.find_one(&a.id, &JoinPlan::none()).await.unwrap().unwrap();
                let b_after = repo.find_one(&b.id, &JoinPlan::none()).await.unwrap().unwrap();
                assert_eq!(a.phone, "+33799999999");
                assert_eq!(b_after, b);
            }

            #[tokio::test]
            async fn test_delete_and_delete_many() {
                let repo = repository();
                let a = repo.insert(publisher("Ubisoft")).await.unwrap();
                let b = repo.insert(publisher("Capcom")).await.unwrap();
                let c = repo.insert(publisher("Sega")).await.unwrap();

                repo.delete(&a.id).await.unwrap();
                assert!(!repo.exists(&a.id).await.unwrap());

                let removed = repo.delete_many(&[b.id, c.id]).await.unwrap();
                assert_eq!(removed, 2);
                assert!(repo.find(&[]).await.unwrap().is_empty());
            }
        }
    };
}
