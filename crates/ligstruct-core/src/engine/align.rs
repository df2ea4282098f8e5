use super::config::AlignmentConfig;
use super::error::ConnectionError;
use super::site::{ConnectionSite, neighbor_tag};
use crate::core::models::system::MolecularSystem;
use crate::core::utils::geometry::{RigidTransform, match_points};
use itertools::Itertools;
use nalgebra::Point3;
use tracing::{debug, instrument, trace};

const COINCIDENCE_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignmentStrategy {
    /// The site is the central atom alone.
    Translation,
    /// Central atom plus one neighbor, anchored by the origin.
    TwoPoint,
    /// Two neighbors with unique tags fix the correspondence.
    UniqueTags,
    /// Third correspondence found by trying template positions in order.
    Exhaustive { trials: usize },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Alignment {
    pub transform: RigidTransform,
    pub strategy: AlignmentStrategy,
}

/// Superposes a connection site onto junction template positions.
///
/// `template[i]` is the nominal counterpart of `site.atoms[i]`; both share the central
/// atom at index 0 and the tag order of the neighbors. Where equal tags leave the
/// correspondence open, candidate assignments are verified by requiring every
/// transformed site atom to lie within `coverage_epsilon` of some template atom.
#[instrument(skip_all, name = "align_site", fields(key = %site.key))]
pub fn align_site(
    system: &MolecularSystem,
    site: &ConnectionSite,
    template: &[Point3<f64>],
    config: &AlignmentConfig,
) -> Result<Alignment, ConnectionError> {
    let n = site.len();
    if n == 0 || template.len() != n {
        return Err(ConnectionError::TemplateMismatch {
            key: site.key.clone(),
            expected: n,
            found: template.len(),
        });
    }

    let points = site
        .atoms
        .iter()
        .map(|&id| {
            system
                .atom(id)
                .map(|atom| atom.position)
                .ok_or(ConnectionError::AtomNotFound(id))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let origin = Point3::origin();

    if n == 1 {
        return Ok(Alignment {
            transform: RigidTransform::from_translation(template[0] - points[0]),
            strategy: AlignmentStrategy::Translation,
        });
    }
    if n == 2 {
        return Ok(Alignment {
            transform: match_points(
                [&points[0], &points[1], &origin],
                [&template[0], &template[1], &origin],
            ),
            strategy: AlignmentStrategy::TwoPoint,
        });
    }

    let center = site.center();
    let tags = site.atoms[1..]
        .iter()
        .map(|&id| neighbor_tag(system, center, id).ok_or(ConnectionError::AtomNotFound(id)))
        .collect::<Result<Vec<_>, _>>()?;
    let counts = tags.iter().counts();
    let unique: Vec<usize> = (1..n).filter(|&i| counts[&tags[i - 1]] == 1).collect();

    if let &[second, third, ..] = unique.as_slice() {
        return Ok(Alignment {
            transform: match_points(
                [&points[0], &points[second], &points[third]],
                [&template[0], &template[second], &template[third]],
            ),
            strategy: AlignmentStrategy::UniqueTags,
        });
    }

    let second = unique.first().copied().unwrap_or(1);
    if unique.is_empty() && counts.len() > 1 {
        debug!("Mixed neighbor tags without a unique one; anchoring on the first neighbor.");
    }
    exhaustive_search(&site.key, &points, template, second, config.coverage_epsilon)
}

fn exhaustive_search(
    key: &str,
    points: &[Point3<f64>],
    template: &[Point3<f64>],
    second: usize,
    epsilon: f64,
) -> Result<Alignment, ConnectionError> {
    let n = points.len();
    let third = (1..n).find(|&i| i != second).unwrap_or(second);
    let mut trials = 0;

    for candidate in 1..n {
        if candidate == second
            || (template[candidate] - template[second]).norm() < COINCIDENCE_TOLERANCE
        {
            continue;
        }
        trials += 1;
        let transform = match_points(
            [&points[0], &points[second], &points[third]],
            [&template[0], &template[second], &template[candidate]],
        );
        if covers(&transform, points, template, epsilon) {
            trace!(candidate, trials, "Coverage satisfied.");
            return Ok(Alignment {
                transform,
                strategy: AlignmentStrategy::Exhaustive { trials },
            });
        }
    }

    Err(ConnectionError::FatalAlignment {
        key: key.to_string(),
        trials,
    })
}

fn covers(
    transform: &RigidTransform,
    points: &[Point3<f64>],
    template: &[Point3<f64>],
    epsilon: f64,
) -> bool {
    points.iter().all(|point| {
        let moved = transform.apply(point);
        template.iter().any(|target| (moved - target).norm() < epsilon)
    })
}
