//! Turns fetched collections into what the public site renders.

use crate::admin::ListState;
use crate::models::Record;

/// Deterministic pick from a fallback pool: the sum of the id's UTF-16 code
/// units, modulo the pool size. The same id always gets the same image.
pub fn fallback_image<'a, S: AsRef<str>>(id: &str, pool: &'a [S]) -> Option<&'a str> {
    if pool.is_empty() {
        return None;
    }
    let sum = id.encode_utf16().fold(0usize, |acc, unit| acc.wrapping_add(unit as usize));
    Some(pool[sum % pool.len()].as_ref())
}

/// An explicit, non-blank image reference wins; otherwise the fallback.
pub fn resolve_image<'a, S: AsRef<str>>(
    image_ref: Option<&'a str>,
    id: &str,
    pool: &'a [S],
) -> Option<&'a str> {
    match image_ref.map(str::trim) {
        Some(image) if !image.is_empty() => Some(image),
        _ => fallback_image(id, pool),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Card<'a, R> {
    pub record: &'a R,
    pub image: Option<&'a str>,
}

/// A public section of the site.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionView<'a, R> {
    Loading,
    /// Nothing to show: the load failed or the collection is empty.
    Hidden,
    Cards(Vec<Card<'a, R>>),
}

impl<'a, R: Record> SectionView<'a, R> {
    pub fn from_state<S: AsRef<str>>(state: &'a ListState<R>, pool: &'a [S]) -> Self {
        match state {
            ListState::Idle | ListState::Fetching => SectionView::Loading,
            ListState::Error(_) => SectionView::Hidden,
            ListState::Ready(items) if items.is_empty() => SectionView::Hidden,
            ListState::Ready(items) => SectionView::Cards(
                items
                    .iter()
                    .map(|record| Card {
                        record,
                        image: resolve_image(record.image_ref(), record.id(), pool),
                    })
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PortfolioDraft, PortfolioItem};
    use chrono::Utc;

    const POOL: [&str; 3] = ["/img/a.jpg", "/img/b.jpg", "/img/c.jpg"];

    fn project(id: &str, image: Option<&str>) -> PortfolioItem {
        PortfolioItem::from_draft(
            id.to_string(),
            0,
            Utc::now(),
            PortfolioDraft {
                title: id.to_string(),
                description: "desc".into(),
                image_url: image.map(str::to_string),
                ..PortfolioDraft::default()
            },
        )
    }

    #[test]
    fn test_fallback_is_code_unit_sum_mod_pool() {
        // '1' = 49, '2' = 50, '3' = 51
        assert_eq!(fallback_image("1", &POOL), Some(POOL[1]));
        assert_eq!(fallback_image("2", &POOL), Some(POOL[2]));
        assert_eq!(fallback_image("3", &POOL), Some(POOL[0]));
        // 49 + 50 = 99
        assert_eq!(fallback_image("12", &POOL), Some(POOL[0]));
    }

    #[test]
    fn test_fallback_counts_utf16_units() {
        // U+1F600 is the surrogate pair D83D DE00: 55357 + 56832 = 112189.
        assert_eq!(fallback_image("\u{1F600}", &POOL), Some(POOL[112189 % 3]));
    }

    #[test]
    fn test_fallback_is_stable_and_empty_pool_is_none() {
        let id = "7d5c2b0e-1f5e-4b9a-9a53-0c1e0e2e3b41";
        assert_eq!(fallback_image(id, &POOL), fallback_image(id, &POOL));
        let empty: [&str; 0] = [];
        assert_eq!(fallback_image(id, &empty), None);
    }

    #[test]
    fn test_explicit_image_wins_over_fallback() {
        assert_eq!(resolve_image(Some("/up/x.png"), "1", &POOL), Some("/up/x.png"));
        assert_eq!(resolve_image(Some("   "), "1", &POOL), Some(POOL[1]));
        assert_eq!(resolve_image(None, "1", &POOL), Some(POOL[1]));
    }

    #[test]
    fn test_section_view_states() {
        let loading: ListState<PortfolioItem> = ListState::Fetching;
        assert_eq!(SectionView::from_state(&loading, &POOL), SectionView::Loading);

        let failed: ListState<PortfolioItem> = ListState::Error("offline".into());
        assert_eq!(SectionView::from_state(&failed, &POOL), SectionView::Hidden);

        let empty: ListState<PortfolioItem> = ListState::Ready(vec![]);
        assert_eq!(SectionView::from_state(&empty, &POOL), SectionView::Hidden);
    }

    #[test]
    fn test_cards_keep_server_order() {
        let state = ListState::Ready(vec![project("2", None), project("1", Some("/up/one.png"))]);
        let SectionView::Cards(cards) = SectionView::from_state(&state, &POOL) else {
            panic!("expected cards");
        };
        let ids: Vec<&str> = cards.iter().map(|c| c.record.id()).collect();
        assert_eq!(ids, vec!["2", "1"]);
        assert_eq!(cards[0].image, Some(POOL[2]));
        assert_eq!(cards[1].image, Some("/up/one.png"));
    }
}
