use super::error::AssemblyError;
use crate::core::canon::{CanonicalizationError, Canonicalizer, FragmentGraph};
use crate::core::models::ids::FragmentId;
use crate::core::models::system::MolecularSystem;
use tracing::{debug, instrument};

/// Reorders a fragment's atoms into canonical order.
///
/// The fragment keeps its identity; only its atom order is replaced. Bonds leaving the
/// fragment are invisible to the canonicalizer.
///
/// # Return
///
/// The structural fingerprint reported by the canonicalizer.
#[instrument(skip_all, name = "canonicalize_fragment")]
pub fn canonicalize_fragment<C: Canonicalizer + ?Sized>(
    system: &mut MolecularSystem,
    fragment_id: FragmentId,
    canonicalizer: &C,
) -> Result<String, AssemblyError> {
    let fragment_name = system
        .fragment(fragment_id)
        .ok_or(AssemblyError::FragmentNotFound(fragment_id))?
        .name
        .clone();
    let wrap = |source: CanonicalizationError| AssemblyError::Canonicalization {
        fragment: fragment_name.clone(),
        source,
    };

    let graph = FragmentGraph::from_fragment(system, fragment_id)
        .ok_or(AssemblyError::FragmentNotFound(fragment_id))?;
    if graph.is_empty() {
        return Err(wrap(CanonicalizationError::EmptyGraph));
    }

    let form = canonicalizer.canonicalize(&graph).map_err(wrap)?;
    let order = form.canonical_order(&graph).map_err(wrap)?;
    system
        .reorder_fragment(fragment_id, order)
        .ok_or(AssemblyError::FragmentNotFound(fragment_id))?;

    debug!(fragment = %fragment_name, key = %form.key, "Fragment canonicalized.");
    Ok(form.key)
}
