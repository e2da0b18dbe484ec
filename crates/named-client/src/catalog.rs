//! The name catalog: the built-in sample list, seeding, and sorted reads.

use named_core::{
  name::{BabyName, Gender},
  store::NamesStore,
};

use crate::{Error, Result};

/// `(name, gender, origin)` for every name written by [`seed_if_empty`].
pub const SAMPLE_NAMES: &[(&str, Gender, Option<&str>)] = &[
  ("Ava", Gender::Female, Some("Latin")),
  ("Leo", Gender::Male, Some("Latin")),
  ("Olivia", Gender::Female, Some("Latin")),
  ("Noah", Gender::Male, Some("Hebrew")),
  ("Emma", Gender::Female, Some("German")),
  ("Liam", Gender::Male, Some("Irish")),
  ("Amelia", Gender::Female, Some("German")),
  ("Oliver", Gender::Male, Some("Latin")),
  ("Sophia", Gender::Female, Some("Greek")),
  ("Elijah", Gender::Male, Some("Hebrew")),
  ("Isla", Gender::Female, Some("Scottish")),
  ("Theo", Gender::Male, Some("Greek")),
  ("Mia", Gender::Female, Some("Italian")),
  ("Lucas", Gender::Male, Some("Latin")),
  ("Freya", Gender::Female, Some("Norse")),
  ("Arlo", Gender::Male, Some("English")),
  ("Aurora", Gender::Female, Some("Latin")),
  ("Felix", Gender::Male, Some("Latin")),
  ("Hazel", Gender::Female, Some("English")),
  ("Jasper", Gender::Male, Some("Persian")),
  ("Nora", Gender::Female, Some("Irish")),
  ("Hugo", Gender::Male, Some("German")),
  ("Ivy", Gender::Female, Some("English")),
  ("Ezra", Gender::Male, Some("Hebrew")),
  ("Maya", Gender::Female, Some("Sanskrit")),
  ("Kai", Gender::Neutral, Some("Hawaiian")),
  ("Avery", Gender::Neutral, Some("English")),
  ("Riley", Gender::Neutral, Some("Irish")),
  ("Rowan", Gender::Neutral, Some("Gaelic")),
  ("Sage", Gender::Neutral, Some("Latin")),
  ("Quinn", Gender::Neutral, Some("Irish")),
  ("River", Gender::Neutral, Some("English")),
  ("Eden", Gender::Neutral, Some("Hebrew")),
  ("Remy", Gender::Neutral, Some("French")),
  ("Jude", Gender::Neutral, Some("Hebrew")),
  ("Alex", Gender::Neutral, None),
];

/// The deterministic document id of the `index`-th sample name.
pub fn sample_name_id(index: usize) -> String { format!("name_{index:03}") }

/// The built-in catalog as documents.
pub fn sample_catalog() -> Vec<BabyName> {
  SAMPLE_NAMES
    .iter()
    .enumerate()
    .map(|(i, (name, gender, origin))| BabyName {
      id:     sample_name_id(i),
      name:   (*name).to_owned(),
      gender: *gender,
      origin: origin.map(str::to_owned),
    })
    .collect()
}

/// Write the built-in catalog if the names collection is empty.
///
/// Returns the number of names written (`0` when the catalog already had
/// data). Two clients racing on an empty catalog may both write; the ids are
/// deterministic, so the second write overwrites the first.
pub async fn seed_if_empty<S: NamesStore>(store: &S) -> Result<usize> {
  let existing = store.list_names().await.map_err(Error::store)?;
  if !existing.is_empty() {
    tracing::debug!(count = existing.len(), "names already seeded");
    return Ok(0);
  }

  let catalog = sample_catalog();
  let count = catalog.len();
  for name in catalog {
    store.put_name(name).await.map_err(Error::store)?;
  }
  tracing::info!(count, "seeded names catalog");
  Ok(count)
}

/// The full catalog sorted by name, ignoring case.
pub async fn load_catalog<S: NamesStore>(store: &S) -> Result<Vec<BabyName>> {
  let mut names = store.list_names().await.map_err(Error::store)?;
  names.sort_by(|a, b| {
    a.name
      .to_lowercase()
      .cmp(&b.name.to_lowercase())
      .then_with(|| a.id.cmp(&b.id))
  });
  Ok(names)
}
