use super::align::align_site;
use super::config::AlignmentConfig;
use super::error::{AssemblyError, ConnectionError};
use super::progress::{Progress, ProgressReporter};
use super::site::{ConnectionSite, locate_site};
use crate::core::models::ids::{AtomId, FragmentId};
use crate::core::models::system::MolecularSystem;
use crate::core::models::topology::BondOrder;
use crate::core::tables::bond_lengths::BondLengthTable;
use crate::core::templates::{JunctionTemplate, TemplateAtom, TemplateSource};
use crate::core::utils::geometry::match_points;
use nalgebra::{Point3, Vector3};
use tracing::{debug, info, instrument};

const DEGENERACY_EPSILON: f64 = 1e-12;

/// A bond formed by the assembler between two formerly separate fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bridge {
    pub atom1: AtomId,
    pub atom2: AtomId,
}

/// Two junction templates fused at their placeholders.
///
/// Each half keeps its central atom at index 0, so the combined site anchors sit at
/// indices `0` and `first.len()`.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedJunction {
    pub first: JunctionTemplate,
    pub second: JunctionTemplate,
}

impl MergedJunction {
    pub fn len(&self) -> usize {
        self.first.len() + self.second.len()
    }

    pub fn is_empty(&self) -> bool {
        self.first.is_empty() && self.second.is_empty()
    }

    pub fn second_anchor_index(&self) -> usize {
        self.first.len()
    }

    pub fn atoms(&self) -> impl Iterator<Item = &TemplateAtom> {
        self.first.atoms().iter().chain(self.second.atoms())
    }

    pub fn anchor_distance(&self) -> Option<f64> {
        Some((self.first.position(0)? - self.second.position(0)?).norm())
    }
}

/// Fuses two junction templates into one bonded geometry.
///
/// The frame of `templ2` (its placeholder at `pos2` and its central atom) is laid onto
/// the frame of `templ1` (its central atom and its placeholder at `pos1`), then `templ2`
/// slides along the anchor axis until the anchors sit at the tabulated bond length.
/// Both placeholders are dropped. The inputs are left untouched.
pub fn merge_templates(
    templ1: &JunctionTemplate,
    pos1: usize,
    templ2: &JunctionTemplate,
    pos2: usize,
    bond_lengths: &BondLengthTable,
) -> Result<MergedJunction, ConnectionError> {
    let placeholder = |template: &JunctionTemplate, index: usize| {
        template
            .position(index)
            .filter(|_| index > 0)
            .ok_or(ConnectionError::PlaceholderOutOfRange {
                index,
                len: template.len(),
            })
    };
    let a2 = placeholder(templ1, pos1)?;
    let b1 = placeholder(templ2, pos2)?;
    let (Some(center1), Some(center2)) = (templ1.central(), templ2.central()) else {
        return Err(ConnectionError::PlaceholderOutOfRange { index: 0, len: 0 });
    };
    let a1 = center1.position;
    let b2 = center2.position;

    let length = bond_lengths
        .get(&center1.element, &center2.element)
        .ok_or_else(|| ConnectionError::MissingBondLength {
            key: BondLengthTable::key(&center1.element, &center2.element),
        })?;

    let origin = Point3::origin();
    let mut first = templ1.clone();
    let mut second = templ2.clone();
    second.transform(&match_points([&b1, &b2, &origin], [&a1, &a2, &origin]));

    let anchor1 = a1;
    let anchor2 = second.position(0).unwrap_or(a2);
    let direction = (anchor2 - anchor1)
        .try_normalize(DEGENERACY_EPSILON)
        .or_else(|| (a2 - a1).try_normalize(DEGENERACY_EPSILON))
        .unwrap_or_else(Vector3::x);
    second.translate(&(anchor1 + direction * length - anchor2));

    first.remove(pos1);
    second.remove(pos2);
    Ok(MergedJunction { first, second })
}

/// Joins fragments pairwise using junction templates.
pub struct FragmentConnector<'a> {
    junctions: &'a dyn TemplateSource<JunctionTemplate>,
    bond_lengths: &'a BondLengthTable,
    alignment: &'a AlignmentConfig,
}

impl<'a> FragmentConnector<'a> {
    pub fn new(
        junctions: &'a dyn TemplateSource<JunctionTemplate>,
        bond_lengths: &'a BondLengthTable,
        alignment: &'a AlignmentConfig,
    ) -> Self {
        Self {
            junctions,
            bond_lengths,
            alignment,
        }
    }

    /// Processes `connections` in order, then moves the surviving fragment into
    /// `molecule`.
    #[instrument(skip_all, name = "connect_fragments")]
    pub fn connect_all(
        &self,
        system: &mut MolecularSystem,
        molecule: FragmentId,
        connections: &[(AtomId, AtomId)],
        reporter: &ProgressReporter,
    ) -> Result<Vec<Bridge>, AssemblyError> {
        info!(connections = connections.len(), "Connecting fragments.");
        let total = connections.len();
        let mut bridges = Vec::with_capacity(total);

        for (index, &(atom1, atom2)) in connections.iter().enumerate() {
            let bridge = self
                .connect(system, atom1, atom2)
                .map_err(|source| AssemblyError::Connection {
                    index,
                    atom1,
                    atom2,
                    source,
                })?;
            bridges.push(bridge);
            reporter.report(Progress::ConnectionFormed { index, total });
        }

        if let Some(last) = bridges.last() {
            let survivor = system
                .fragment_of(last.atom1)
                .ok_or(AssemblyError::FragmentNotFound(molecule))?;
            if survivor != molecule {
                system
                    .transfer_atoms(survivor, molecule)
                    .ok_or(AssemblyError::FragmentNotFound(molecule))?;
            }
        }
        Ok(bridges)
    }

    /// Forms the bond `atom1 - atom2` between two distinct fragments.
    ///
    /// On success the two fragments have become one and the new bond is marked rotatable.
    pub fn connect(
        &self,
        system: &mut MolecularSystem,
        atom1: AtomId,
        atom2: AtomId,
    ) -> Result<Bridge, ConnectionError> {
        let frag1 = system
            .fragment_of(atom1)
            .ok_or(ConnectionError::AtomNotFound(atom1))?;
        let frag2 = system
            .fragment_of(atom2)
            .ok_or(ConnectionError::AtomNotFound(atom2))?;
        if frag1 == frag2 {
            return Err(ConnectionError::SameFragment);
        }

        let size = |fid| system.fragment(fid).map_or(0, |f| f.len());
        let (size1, size2) = (size(frag1), size(frag2));
        if size1 == 1 || size2 == 1 {
            self.connect_simple(system, atom1, atom2, size1, size2)?;
        } else {
            self.connect_general(system, atom1, atom2, frag1, frag2)?;
        }
        Ok(Bridge { atom1, atom2 })
    }

    fn junction(&self, site: &ConnectionSite) -> Result<JunctionTemplate, ConnectionError> {
        let template = self
            .junctions
            .lookup(&site.key)
            .ok_or_else(|| ConnectionError::MissingTemplate {
                key: site.key.clone(),
            })?;
        if template.len() != site.template_len() {
            return Err(ConnectionError::TemplateMismatch {
                key: site.key.clone(),
                expected: site.template_len(),
                found: template.len(),
            });
        }
        Ok(template.clone())
    }

    fn bond_length(&self, system: &MolecularSystem, atom1: AtomId, atom2: AtomId) -> Result<f64, ConnectionError> {
        let element = |id| {
            system
                .atom(id)
                .map(|atom| atom.element.as_str())
                .ok_or(ConnectionError::AtomNotFound(id))
        };
        let (e1, e2) = (element(atom1)?, element(atom2)?);
        self.bond_lengths
            .get(e1, e2)
            .ok_or_else(|| ConnectionError::MissingBondLength {
                key: BondLengthTable::key(e1, e2),
            })
    }

    fn connect_simple(
        &self,
        system: &mut MolecularSystem,
        atom1: AtomId,
        atom2: AtomId,
        size1: usize,
        size2: usize,
    ) -> Result<(), ConnectionError> {
        if size1 == 1 && size2 == 1 {
            let length = self.bond_length(system, atom1, atom2)?;
            set_position(system, atom1, Point3::origin())?;
            set_position(system, atom2, Point3::new(length, 0.0, 0.0))?;
            form_bridge(system, atom1, atom2)?;
            let into = system
                .fragment_of(atom1)
                .ok_or(ConnectionError::AtomNotFound(atom1))?;
            system
                .move_atom(atom2, into)
                .ok_or(ConnectionError::AtomNotFound(atom2))?;
            debug!(length, "Joined two single atoms.");
            return Ok(());
        }

        let (anchor, lone) = if size1 == 1 { (atom2, atom1) } else { (atom1, atom2) };
        let anchor_fragment = system
            .fragment_of(anchor)
            .ok_or(ConnectionError::AtomNotFound(anchor))?;

        let site = locate_site(system, anchor, lone)?;
        let mut template = self.junction(&site)?;
        let placeholder = template
            .remove(site.partner_index)
            .ok_or(ConnectionError::PlaceholderOutOfRange {
                index: site.partner_index,
                len: site.template_len(),
            })?;
        let alignment = align_site(system, &site, &template.positions(), self.alignment)?;
        debug!(key = %site.key, pos = site.partner_index, strategy = ?alignment.strategy, "Attaching single atom.");

        system
            .transform_fragment(anchor_fragment, &alignment.transform)
            .ok_or(ConnectionError::AtomNotFound(anchor))?;
        set_position(system, lone, placeholder.position)?;
        form_bridge(system, atom1, atom2)?;
        system
            .move_atom(lone, anchor_fragment)
            .ok_or(ConnectionError::AtomNotFound(lone))?;
        Ok(())
    }

    fn connect_general(
        &self,
        system: &mut MolecularSystem,
        atom1: AtomId,
        atom2: AtomId,
        frag1: FragmentId,
        frag2: FragmentId,
    ) -> Result<(), ConnectionError> {
        let site1 = locate_site(system, atom1, atom2)?;
        let site2 = locate_site(system, atom2, atom1)?;
        let templ1 = self.junction(&site1)?;
        let templ2 = self.junction(&site2)?;
        debug!(
            key1 = %site1.key,
            pos1 = site1.partner_index,
            key2 = %site2.key,
            pos2 = site2.partner_index,
            "Merging junction templates."
        );

        let merged = merge_templates(
            &templ1,
            site1.partner_index,
            &templ2,
            site2.partner_index,
            self.bond_lengths,
        )?;
        let alignment1 = align_site(system, &site1, &merged.first.positions(), self.alignment)?;
        let alignment2 = align_site(system, &site2, &merged.second.positions(), self.alignment)?;

        system
            .transform_fragment(frag1, &alignment1.transform)
            .ok_or(ConnectionError::AtomNotFound(atom1))?;
        system
            .transform_fragment(frag2, &alignment2.transform)
            .ok_or(ConnectionError::AtomNotFound(atom2))?;
        form_bridge(system, atom1, atom2)?;
        system
            .transfer_atoms(frag2, frag1)
            .ok_or(ConnectionError::AtomNotFound(atom2))?;
        Ok(())
    }
}

fn set_position(system: &mut MolecularSystem, atom_id: AtomId, position: Point3<f64>) -> Result<(), ConnectionError> {
    system
        .atom_mut(atom_id)
        .ok_or(ConnectionError::AtomNotFound(atom_id))?
        .position = position;
    Ok(())
}

fn form_bridge(system: &mut MolecularSystem, atom1: AtomId, atom2: AtomId) -> Result<(), ConnectionError> {
    system
        .add_bond(atom1, atom2, BondOrder::Single)
        .and_then(|_| system.set_rotatable(atom1, atom2, true))
        .ok_or(ConnectionError::AtomNotFound(atom1))
}
