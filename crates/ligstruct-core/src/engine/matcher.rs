use super::error::{AssemblyError, Warning};
use crate::core::models::ids::FragmentId;
use crate::core::models::system::MolecularSystem;
use crate::core::templates::{CoordinateTemplate, TemplateSource};
use tracing::{debug, instrument, warn};

/// Copies stored coordinates onto a canonically ordered fragment.
///
/// A missing or wrongly sized template leaves the fragment untouched and is reported as
/// a [`Warning`] rather than an error.
#[instrument(skip_all, name = "match_template")]
pub fn match_fragment<S: TemplateSource<CoordinateTemplate> + ?Sized>(
    system: &mut MolecularSystem,
    fragment_id: FragmentId,
    key: &str,
    templates: &S,
) -> Result<Option<Warning>, AssemblyError> {
    let fragment = system
        .fragment(fragment_id)
        .ok_or(AssemblyError::FragmentNotFound(fragment_id))?;
    let fragment_name = fragment.name.clone();
    let size = fragment.len();

    let Some(template) = templates.lookup(key) else {
        let warning = Warning::MissingTemplate {
            fragment: fragment_name,
            key: key.to_string(),
        };
        warn!("{}", warning);
        return Ok(Some(warning));
    };

    if template.len() != size {
        let warning = Warning::TemplateSizeMismatch {
            fragment: fragment_name,
            key: key.to_string(),
            expected: size,
            found: template.len(),
        };
        warn!("{}", warning);
        return Ok(Some(warning));
    }

    template
        .transfer_coordinates(system, fragment_id)
        .ok_or(AssemblyError::FragmentNotFound(fragment_id))?;
    debug!(fragment = %fragment_name, key, "Coordinates taken from template.");
    Ok(None)
}
