use std::future::Future;

use tracing::debug;

use crate::error::{VectorError, VectorResult};
use crate::models::KeyPage;

/// Walk a token-paginated listing until the backend stops returning a token.
///
/// `fetch_page` is called with `None` first and then with each `next_token`.
/// Every page is handed to `on_page`, whose counts are summed and returned.
/// An empty token is treated as the end of the listing. A backend that hands
/// back the token it was just given would loop forever, so that is an error.
///
/// # Example
/// ```ignore
/// let total = paginate(
///     |token| store.list_keys(token),
///     |page| async move { Ok(page.keys.len() as u64) },
/// )
/// .await?;
/// ```
pub async fn paginate<F, Fut, G, GFut>(mut fetch_page: F, mut on_page: G) -> VectorResult<u64>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = VectorResult<KeyPage>>,
    G: FnMut(KeyPage) -> GFut,
    GFut: Future<Output = VectorResult<u64>>,
{
    let mut token: Option<String> = None;
    let mut total = 0u64;
    let mut pages = 0u32;

    loop {
        let page = fetch_page(token.clone()).await?;
        pages += 1;

        let next = page.next_token.clone().filter(|t| !t.is_empty());
        if next.is_some() && next == token {
            return Err(VectorError::Pagination(format!(
                "continuation token repeated on page {}",
                pages
            )));
        }

        total += on_page(page).await?;

        match next {
            Some(next) => token = Some(next),
            None => break,
        }
    }

    debug!(pages, total, "pagination exhausted");
    Ok(total)
}
