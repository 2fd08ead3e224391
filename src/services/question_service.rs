//! Builds multiple-choice questions: one random target city, distinct distractors and a
//! shuffled subset of the target's clues.

use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};
use tracing::debug;

use crate::{
    dao::models::DestinationEntity,
    dto::question::QuestionResponse,
    error::ServiceError,
    services::catalog::{Catalog, CatalogError},
    state::SharedState,
};

/// One round's payload, derived fresh for every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub clues: Vec<String>,
    pub options: Vec<String>,
    pub correct_country: String,
}

/// Draw the next question using the store and question shape configured on `state`.
pub async fn next_question(state: &SharedState) -> Result<QuestionResponse, ServiceError> {
    let store = state.require_store().await?;
    let catalog = Catalog::new(store);
    let config = state.config();
    let mut rng = StdRng::from_rng(&mut rand::rng());

    let question =
        select_question(&catalog, config.clue_count, config.option_count, &mut rng).await?;
    Ok(question.into())
}

/// Select a target uniformly, sample `option_count - 1` distractors and assemble the question.
pub async fn select_question<R>(
    catalog: &Catalog,
    clue_count: usize,
    option_count: usize,
    rng: &mut R,
) -> Result<Question, CatalogError>
where
    R: Rng + Send,
{
    let required = option_count as u64;
    let available = catalog.size().await?;
    if available == 0 {
        return Err(CatalogError::Empty);
    }
    if available < required {
        return Err(CatalogError::Insufficient {
            available,
            required,
        });
    }

    let target = catalog.pick(available, rng).await?;
    let distractors = catalog
        .sample_distractors(&target.city, option_count - 1)
        .await?;
    debug!(city = %target.city, distractors = distractors.len(), "selected question target");

    assemble_question(&target, &distractors, clue_count, option_count, rng)
}

/// Combine a target and its distractors into a question with shuffled options and clues.
pub fn assemble_question<R>(
    target: &DestinationEntity,
    distractors: &[DestinationEntity],
    clue_count: usize,
    option_count: usize,
    rng: &mut R,
) -> Result<Question, CatalogError>
where
    R: Rng + ?Sized,
{
    let mut options = Vec::with_capacity(option_count);
    options.push(target.city.clone());
    for distractor in distractors {
        if options.len() == option_count {
            break;
        }
        if !options.contains(&distractor.city) {
            options.push(distractor.city.clone());
        }
    }
    if options.len() < option_count {
        return Err(CatalogError::Insufficient {
            available: options.len() as u64,
            required: option_count as u64,
        });
    }
    options.shuffle(rng);

    Ok(Question {
        clues: shuffled_prefix(&target.clues, clue_count, rng),
        options,
        correct_country: target.country.clone(),
    })
}

/// Fisher-Yates shuffle of a copy of `items`, truncated to `count`.
pub fn shuffled_prefix<R>(items: &[String], count: usize, rng: &mut R) -> Vec<String>
where
    R: Rng + ?Sized,
{
    let mut shuffled = items.to_vec();
    shuffled.shuffle(rng);
    shuffled.truncate(count);
    shuffled
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, sync::Arc};

    use super::*;
    use crate::{
        dao::trivia_store::memory::MemoryStore,
        services::catalog::tests::{destination, four_cities},
    };

    async fn catalog_with(destinations: Vec<DestinationEntity>) -> Catalog {
        Catalog::new(Arc::new(MemoryStore::with_destinations(destinations).await))
    }

    #[tokio::test]
    async fn question_has_four_distinct_options_including_answer() {
        let catalog = catalog_with(four_cities()).await;
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..200 {
            let question = select_question(&catalog, 3, 4, &mut rng).await.unwrap();
            let mut sorted = question.options.clone();
            sorted.sort_unstable();
            assert_eq!(sorted, vec!["Cairo", "Paris", "Rome", "Tokyo"]);
            assert_eq!(question.clues.len(), 3);

            let city = question.clues[0].split(" clue").next().unwrap().to_owned();
            let expected_country = four_cities()
                .into_iter()
                .find(|d| d.city == city)
                .unwrap()
                .country;
            assert_eq!(question.correct_country, expected_country);
            assert!(question.clues.iter().all(|clue| clue.starts_with(&city)));
        }
    }

    #[tokio::test]
    async fn catalog_smaller_than_option_count_is_insufficient() {
        let catalog = catalog_with(vec![
            destination("Paris", "France"),
            destination("Rome", "Italy"),
            destination("Tokyo", "Japan"),
        ])
        .await;
        let mut rng = StdRng::seed_from_u64(3);
        let err = select_question(&catalog, 3, 4, &mut rng).await.unwrap_err();
        assert!(matches!(
            err,
            CatalogError::Insufficient {
                available: 3,
                required: 4
            }
        ));
    }

    #[tokio::test]
    async fn empty_catalog_is_not_found() {
        let catalog = catalog_with(Vec::new()).await;
        let mut rng = StdRng::seed_from_u64(3);
        let err = select_question(&catalog, 3, 4, &mut rng).await.unwrap_err();
        assert!(matches!(err, CatalogError::Empty));
    }

    #[test]
    fn paris_question_offers_the_four_cities() {
        let cities = four_cities();
        let mut rng = StdRng::seed_from_u64(5);
        let question = assemble_question(&cities[0], &cities[1..], 3, 4, &mut rng).unwrap();

        let mut sorted = question.options.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec!["Cairo", "Paris", "Rome", "Tokyo"]);
        assert_eq!(question.correct_country, "France");
    }

    #[test]
    fn duplicate_distractor_names_are_rejected() {
        let paris = destination("Paris", "France");
        let duplicates = vec![
            destination("Rome", "Italy"),
            destination("Rome", "Italy"),
            destination("Paris", "France"),
        ];
        let mut rng = StdRng::seed_from_u64(5);
        let err = assemble_question(&paris, &duplicates, 3, 4, &mut rng).unwrap_err();
        assert!(matches!(err, CatalogError::Insufficient { available: 2, .. }));
    }

    #[test]
    fn clue_prefix_is_capped_by_available_clues() {
        let clues = vec!["a".to_owned(), "b".to_owned()];
        let mut rng = StdRng::seed_from_u64(9);
        let prefix = shuffled_prefix(&clues, 3, &mut rng);
        assert_eq!(prefix.len(), 2);
    }

    #[test]
    fn option_order_is_uniform_over_permutations() {
        let cities = four_cities();
        let mut rng = StdRng::seed_from_u64(2024);
        let mut permutations: HashMap<Vec<String>, u32> = HashMap::new();
        let rounds = 24_000;

        for _ in 0..rounds {
            let question = assemble_question(&cities[0], &cities[1..], 3, 4, &mut rng).unwrap();
            *permutations.entry(question.options).or_default() += 1;
        }

        // 4! orderings, each expected ~1000 times.
        assert_eq!(permutations.len(), 24);
        for (order, count) in permutations {
            assert!((850..=1_150).contains(&count), "{order:?} seen {count} times");
        }
    }

    #[test]
    fn clue_positions_are_uniform() {
        let clues: Vec<String> = (0..5).map(|n| n.to_string()).collect();
        let mut rng = StdRng::seed_from_u64(99);
        let mut first_slot: HashMap<String, u32> = HashMap::new();

        for _ in 0..10_000 {
            let prefix = shuffled_prefix(&clues, 3, &mut rng);
            *first_slot.entry(prefix[0].clone()).or_default() += 1;
        }

        assert_eq!(first_slot.len(), 5);
        for (clue, count) in first_slot {
            assert!((1_800..=2_200).contains(&count), "clue {clue} led {count} times");
        }
    }
}
