//! Placeholder extraction records
//!
//! Stands in for a real extraction pipeline: each record only carries a label
//! and a page to jump to.

use rand::Rng;

/// Records produced per document open
pub const EXTRACTION_COUNT: usize = 4;

/// Page range used until the renderer has reported a page count
pub const DEFAULT_PAGE_RANGE: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRecord {
    pub label: String,
    /// 1-based page number
    pub page: usize,
}

/// Generate records for a document with `total_pages` pages.
/// `None` or `Some(0)` means the page count is not known yet.
pub fn generate(total_pages: Option<usize>) -> Vec<ExtractionRecord> {
    generate_with_rng(total_pages, &mut rand::thread_rng())
}

pub fn generate_with_rng<R: Rng + ?Sized>(
    total_pages: Option<usize>,
    rng: &mut R,
) -> Vec<ExtractionRecord> {
    let upper = match total_pages {
        Some(pages) if pages > 0 => pages,
        _ => DEFAULT_PAGE_RANGE,
    };
    (1..=EXTRACTION_COUNT)
        .map(|i| ExtractionRecord {
            label: format!("Extraction {i}"),
            page: rng.gen_range(1..=upper),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn pages_stay_within_document() {
        for total in [1, 10, 500] {
            for _ in 0..200 {
                let records = generate(Some(total));
                assert_eq!(records.len(), EXTRACTION_COUNT);
                assert!(
                    records.iter().all(|r| (1..=total).contains(&r.page)),
                    "page out of [1, {total}]: {records:?}"
                );
            }
        }
    }

    #[test]
    fn single_page_document_always_points_at_page_one() {
        let records = generate(Some(1));
        assert!(records.iter().all(|r| r.page == 1));
    }

    #[test]
    fn unknown_page_count_uses_default_range() {
        for total in [None, Some(0)] {
            let records = generate(total);
            assert!(records.iter().all(|r| (1..=DEFAULT_PAGE_RANGE).contains(&r.page)));
        }
    }

    #[test]
    fn labels_are_numbered_from_one() {
        let mut rng = StdRng::seed_from_u64(7);
        let labels: Vec<_> = generate_with_rng(Some(3), &mut rng)
            .into_iter()
            .map(|r| r.label)
            .collect();
        assert_eq!(
            labels,
            vec!["Extraction 1", "Extraction 2", "Extraction 3", "Extraction 4"]
        );
    }
}
