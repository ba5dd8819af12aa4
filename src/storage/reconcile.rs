use crate::coverage::{Artist, CoverageRecord};
use crate::storage::traits::{Storage, StorageResult};

/// Row changes made by one [`reconcile`] call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// Coverage rows deleted before inserting the new set
    pub removed: usize,
    pub inserted: usize,
}

/// Makes the stored state of one artist match a fresh extraction
///
/// Upserts the artist row, replaces its coverage counts, deletes every
/// coverage row the artist had and inserts `coverage`. All of it happens in
/// one transaction: if any step fails the transaction is rolled back and the
/// previously stored state is left untouched.
///
/// Reconciling the same artist twice with identical inputs leaves identical
/// stored state.
pub fn reconcile(
    storage: &mut dyn Storage,
    artist: &Artist,
    coverage: &[CoverageRecord],
) -> StorageResult<ReconcileOutcome> {
    storage.begin()?;

    let result = apply(storage, artist, coverage).and_then(|outcome| {
        storage.commit()?;
        Ok(outcome)
    });

    // A failed COMMIT leaves the transaction open as well
    if result.is_err() {
        if let Err(rollback_err) = storage.rollback() {
            tracing::error!(
                url = %artist.url,
                kind = "store",
                "Rollback failed: {}",
                rollback_err
            );
        }
    }
    result
}

fn apply(
    storage: &mut dyn Storage,
    artist: &Artist,
    coverage: &[CoverageRecord],
) -> StorageResult<ReconcileOutcome> {
    storage.upsert_artist(artist)?;
    storage.replace_coverage_counts(artist.id, &artist.coverage_counts)?;

    let removed = storage.delete_coverage(artist.id)?;
    for record in coverage {
        storage.insert_coverage(artist.id, record)?;
    }

    Ok(ReconcileOutcome {
        removed,
        inserted: coverage.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteStorage;
    use std::collections::BTreeMap;

    fn artist(name: Option<&str>, counts: &[(&str, u32)]) -> Artist {
        Artist {
            id: 30707,
            slug: "30707-todolo".to_string(),
            url: "https://example.com/artists/30707-todolo/".to_string(),
            name: name.map(str::to_string),
            coverage_counts: counts
                .iter()
                .map(|(label, count)| (label.to_string(), *count))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    fn review(n: u32) -> CoverageRecord {
        CoverageRecord {
            kind: "review".to_string(),
            label: "Album Reviews".to_string(),
            url: format!("https://example.com/reviews/albums/{}/", n),
            title: format!("Todolo: Album {}", n),
            author: Some("A. Writer".to_string()),
            image: Some(format!("https://example.com/i/{}.jpg", n)),
        }
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let artist = artist(Some("Todolo"), &[("Album Reviews", 2)]);
        let coverage = vec![review(1), review(2)];

        let first = reconcile(&mut storage, &artist, &coverage).unwrap();
        let after_first = (
            storage.get_artist(artist.id).unwrap(),
            storage.get_coverage(artist.id).unwrap(),
        );

        let second = reconcile(&mut storage, &artist, &coverage).unwrap();
        let after_second = (
            storage.get_artist(artist.id).unwrap(),
            storage.get_coverage(artist.id).unwrap(),
        );

        assert_eq!(first, ReconcileOutcome { removed: 0, inserted: 2 });
        assert_eq!(second, ReconcileOutcome { removed: 2, inserted: 2 });
        assert_eq!(after_first.1, after_second.1);
        assert_eq!(after_first.0.unwrap().coverage_counts, after_second.0.unwrap().coverage_counts);
        assert_eq!(storage.count_artists().unwrap(), 1);
        assert_eq!(storage.count_coverage().unwrap(), 2);
    }

    #[test]
    fn test_reconcile_replaces_stale_coverage() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let first = artist(Some("Todolo"), &[("Album Reviews", 2), ("News", 0)]);
        reconcile(&mut storage, &first, &[review(1), review(2)]).unwrap();

        let second = artist(Some("Todolo"), &[("Album Reviews", 1)]);
        reconcile(&mut storage, &second, &[review(3)]).unwrap();

        let stored = storage.get_coverage(second.id).unwrap();
        assert_eq!(stored, vec![review(3)]);

        let counts = storage.get_artist(second.id).unwrap().unwrap().coverage_counts;
        assert_eq!(counts.len(), 1);
        assert_eq!(counts["Album Reviews"], 1);
    }

    #[test]
    fn test_reconcile_with_no_coverage() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let artist = artist(None, &[]);

        let outcome = reconcile(&mut storage, &artist, &[]).unwrap();
        assert_eq!(outcome.inserted, 0);
        assert!(storage.get_artist(artist.id).unwrap().is_some());
        assert!(storage.get_coverage(artist.id).unwrap().is_empty());
    }

    #[test]
    fn test_failed_reconcile_rolls_back() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let original = artist(Some("Todolo"), &[("Album Reviews", 2)]);
        reconcile(&mut storage, &original, &[review(1), review(2)]).unwrap();

        let mut broken = review(3);
        broken.url = String::new();
        let update = artist(Some("Renamed"), &[("Album Reviews", 2)]);
        let result = reconcile(&mut storage, &update, &[review(3), broken]);
        assert!(result.is_err());

        let stored = storage.get_artist(original.id).unwrap().unwrap();
        assert_eq!(stored.name.as_deref(), Some("Todolo"));
        assert_eq!(storage.get_coverage(original.id).unwrap(), vec![review(1), review(2)]);

        // The connection is usable again after the rollback
        assert!(reconcile(&mut storage, &update, &[review(3)]).is_ok());
    }

    #[test]
    fn test_failed_commit_rolls_back() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let original = artist(Some("Todolo"), &[("Album Reviews", 1)]);
        reconcile(&mut storage, &original, &[review(1)]).unwrap();

        // Deleting the pinned coverage row only fails once COMMIT checks deferred keys
        storage
            .connection()
            .execute_batch(
                "CREATE TABLE pins (
                     coverage_id INTEGER REFERENCES coverage(id) DEFERRABLE INITIALLY DEFERRED
                 );
                 INSERT INTO pins SELECT id FROM coverage;",
            )
            .unwrap();

        let result = reconcile(&mut storage, &original, &[review(2)]);
        assert!(result.is_err());
        assert_eq!(storage.get_coverage(original.id).unwrap(), vec![review(1)]);

        storage.connection().execute_batch("DROP TABLE pins").unwrap();
        assert!(reconcile(&mut storage, &original, &[review(2)]).is_ok());
        assert_eq!(storage.get_coverage(original.id).unwrap(), vec![review(2)]);
    }
}
