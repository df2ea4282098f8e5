use crate::core::canon::Canonicalizer;
use crate::core::models::ids::{AtomId, FragmentId};
use crate::core::models::system::MolecularSystem;
use crate::core::tables::bond_lengths::BondLengthTable;
use crate::core::tables::vdw::VdwRadii;
use crate::core::templates::{CoordinateTemplate, JunctionTemplate, TemplateSource};
use crate::engine::canonicalize::canonicalize_fragment;
use crate::engine::clash::detector::ClashDetector;
use crate::engine::clash::resolver::{ClashResolver, ConnectionClashResolver};
use crate::engine::config::AssemblyConfig;
use crate::engine::connect::{Bridge, FragmentConnector};
use crate::engine::error::{AssemblyError, Warning};
use crate::engine::matcher::match_fragment;
use crate::engine::progress::{Progress, ProgressReporter};
use tracing::{debug, info, instrument, warn};

/// Reference data consulted during assembly.
#[derive(Clone, Copy)]
pub struct AssemblyLibraries<'a> {
    pub coordinates: &'a dyn TemplateSource<CoordinateTemplate>,
    pub junctions: &'a dyn TemplateSource<JunctionTemplate>,
    pub bond_lengths: &'a BondLengthTable,
    pub vdw_radii: &'a VdwRadii,
}

#[derive(Debug, Clone)]
pub struct AssemblyResult {
    pub system: MolecularSystem,
    /// The fragment holding every atom once assembly is done.
    pub molecule: FragmentId,
    /// Bonds formed between fragments, in connection order.
    pub bridges: Vec<Bridge>,
    pub warnings: Vec<Warning>,
    /// Clashes left at the generic tolerance.
    pub residual_clashes: usize,
}

/// Assembles the fragments of `system` into a single molecule.
///
/// `connections` lists the inter-fragment bonds in the order they are formed. Each pair
/// must join two atoms that are still in different fragments when its turn comes.
/// Recoverable problems are collected in [`AssemblyResult::warnings`]; a connection that
/// cannot be formed aborts the run.
#[instrument(skip_all, name = "assembly_workflow")]
pub fn run<C: Canonicalizer + ?Sized>(
    mut system: MolecularSystem,
    connections: &[(AtomId, AtomId)],
    libraries: &AssemblyLibraries,
    canonicalizer: &C,
    config: &AssemblyConfig,
    reporter: &ProgressReporter,
) -> Result<AssemblyResult, AssemblyError> {
    config.validate()?;

    let input_fragments = system.fragment_ids();
    info!(
        fragments = input_fragments.len(),
        connections = connections.len(),
        "Starting assembly."
    );
    let mut warnings = Vec::new();

    // === Phase 1: Canonical ordering and coordinate templates ===
    reporter.report(Progress::PhaseStart {
        name: "Template Matching",
    });
    for &fragment_id in &input_fragments {
        let key = canonicalize_fragment(&mut system, fragment_id, canonicalizer)?;
        // Inter-fragment bonds come only from the connection list.
        let cleared = system
            .clear_external_bonds(fragment_id)
            .ok_or(AssemblyError::FragmentNotFound(fragment_id))?;
        if cleared > 0 {
            debug!(fragment = ?fragment_id, cleared, "Dropped bonds leaving the fragment.");
        }
        if let Some(warning) =
            match_fragment(&mut system, fragment_id, &key, libraries.coordinates)?
        {
            warnings.push(warning);
        }
    }
    reporter.report(Progress::PhaseFinish);

    // Captured before connection so that only the caller's flags count.
    let input_rotors: Vec<(AtomId, AtomId)> = system
        .bonds()
        .iter()
        .filter(|bond| bond.rotatable)
        .map(|bond| (bond.atom1_id, bond.atom2_id))
        .collect();

    // === Phase 2: Fragment connection ===
    reporter.report(Progress::PhaseStart {
        name: "Fragment Connection",
    });
    let molecule = system.add_fragment("molecule");
    let connector = FragmentConnector::new(
        libraries.junctions,
        libraries.bond_lengths,
        &config.alignment,
    );
    let bridges = connector.connect_all(&mut system, molecule, connections, reporter)?;
    absorb_leftovers(&mut system, molecule, input_fragments.len(), &mut warnings)?;
    reporter.report(Progress::PhaseFinish);

    let atoms = system
        .fragment(molecule)
        .ok_or(AssemblyError::FragmentNotFound(molecule))?
        .atoms()
        .to_vec();
    let detector = ClashDetector::new(&system, libraries.vdw_radii, config.clash.tolerance)?;

    // === Phase 3: Clash resolution ===
    if config.resolve_clashes {
        reporter.report(Progress::PhaseStart {
            name: "Clash Resolution",
        });
        if config.clash.resolve_connections {
            let resolver = ConnectionClashResolver::new(&detector, &config.clash);
            for (index, bridge) in bridges.iter().enumerate() {
                let resolution = resolver.resolve(&mut system, bridge);
                reporter.report(Progress::BridgeResolved {
                    index,
                    clashes_before: resolution.clashes_before,
                    clashes_after: resolution.clashes_after,
                });
            }
        }

        let rotor_bonds: Vec<(AtomId, AtomId)> = bridges
            .iter()
            .map(|bridge| (bridge.atom1, bridge.atom2))
            .chain(input_rotors)
            .collect();
        reporter.report(Progress::Message(format!(
            "Resolving molecule-wide clashes over {} rotatable bonds...",
            rotor_bonds.len()
        )));
        let resolution =
            ClashResolver::new(&detector, &config.clash).resolve(&mut system, &atoms, &rotor_bonds);
        debug!(
            before = resolution.clashes_before,
            after = resolution.clashes_after,
            nodes = resolution.nodes,
            "Molecule-wide clash resolution finished."
        );
        reporter.report(Progress::PhaseFinish);
    }

    let residual_clashes = detector.count_within(&system, &atoms);
    if residual_clashes > 0 {
        let warning = Warning::ResidualClash {
            count: residual_clashes,
        };
        warn!("{}", warning);
        warnings.push(warning);
    }

    info!(
        atoms = atoms.len(),
        bridges = bridges.len(),
        warnings = warnings.len(),
        "Assembly complete."
    );
    Ok(AssemblyResult {
        system,
        molecule,
        bridges,
        warnings,
        residual_clashes,
    })
}

/// Moves fragments that no connection reached into `molecule`.
///
/// A lone input fragment is the whole molecule and is not reported.
fn absorb_leftovers(
    system: &mut MolecularSystem,
    molecule: FragmentId,
    input_count: usize,
    warnings: &mut Vec<Warning>,
) -> Result<(), AssemblyError> {
    let leftovers: Vec<FragmentId> = system
        .fragment_ids()
        .into_iter()
        .filter(|&id| id != molecule)
        .collect();

    for fragment_id in leftovers {
        let name = system
            .fragment(fragment_id)
            .ok_or(AssemblyError::FragmentNotFound(fragment_id))?
            .name
            .clone();
        system
            .transfer_atoms(fragment_id, molecule)
            .ok_or(AssemblyError::FragmentNotFound(fragment_id))?;
        if input_count > 1 {
            let warning = Warning::DisconnectedFragment { fragment: name };
            warn!("{}", warning);
            warnings.push(warning);
        }
    }
    Ok(())
}
