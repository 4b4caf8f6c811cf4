use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Query, State};

use crate::api::envelope::{ApiResult, Envelope};
use crate::catalog::ClubQuery;
use crate::db::catalog::Club;
use crate::db::repository::Repository;
use crate::error::AppError;

pub async fn process_filtered_clubs(
    repo: &dyn Repository<Club>,
    query: &ClubQuery,
) -> Result<Vec<Club>, AppError> {
    let all = repo.find_all().await?;
    Ok(query.apply(all))
}

/// Axum handler for `GET /api/shop/clubs/get?experience_type=..&sortBy=..`.
pub async fn filtered_clubs_handler(
    State(repo): State<Arc<dyn Repository<Club>>>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Vec<Club>> {
    let query = ClubQuery::from_params(&params);
    tracing::debug!(filters = ?query.filters, sort = %query.sort, "club listing");
    let clubs = process_filtered_clubs(repo.as_ref(), &query).await?;
    Ok(axum::Json(Envelope::data(clubs)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SortOption;
    use crate::db::catalog::NewClub;
    use crate::db::memory::InMemoryRepository;
    use crate::db::models::Draft;
    use chrono::Utc;

    #[tokio::test]
    async fn test_filtered_listing() {
        let clubs = ["tasting", "workshop", "tasting"]
            .iter()
            .enumerate()
            .map(|(i, kind)| {
                NewClub {
                    title: Some(format!("Club {i}")),
                    description: Some("d".into()),
                    experience_type: Some(kind.to_string()),
                    price: Some(10.0 * (3 - i) as f64),
                    ..Default::default()
                }
                .into_entity(Utc::now())
                .unwrap()
            })
            .collect();
        let repo = InMemoryRepository::with_records(clubs);

        let mut query = ClubQuery::default();
        query
            .filters
            .insert("experience_type".into(), vec!["tasting".into()]);
        query.sort = SortOption::PriceHighToLow;

        let result = process_filtered_clubs(&repo, &query).await.unwrap();
        let titles: Vec<&str> = result.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Club 0", "Club 2"]);
    }
}
