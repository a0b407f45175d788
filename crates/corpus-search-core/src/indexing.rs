//! Write side of the keyword index.
//!
//! Normalizes the searchable text of a [`NewContent`] and hands the item
//! together with every token occurrence to the [`Store`], which replaces
//! whatever was previously stored at the same path in one atomic unit.

use anyhow::Result;

use crate::models::{ContentId, NewContent};
use crate::normalize::Normalizer;
use crate::store::Store;

/// Index one content item, returning its new identifier.
///
/// Every surviving token occurrence becomes one keyword row with
/// frequency 1 and its position in the raw token sequence.
pub async fn index_content<S: Store + ?Sized>(store: &S, content: &NewContent) -> Result<ContentId> {
    let occurrences = Normalizer::shared().normalize_with_positions(&content.searchable_text());
    let id = store.replace_content(content, &occurrences).await?;
    tracing::debug!(
        kind = %content.kind(),
        path = %content.path,
        id,
        keywords = occurrences.len(),
        "indexed content"
    );
    Ok(id)
}
