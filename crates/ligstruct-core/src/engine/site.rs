use super::error::ConnectionError;
use crate::core::models::ids::AtomId;
use crate::core::models::system::MolecularSystem;
use crate::core::models::topology::BondOrder;
use tracing::trace;

/// Local bonding environment of an atom about to form a new bond.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSite {
    /// Central atom first, then its bonded neighbors in tag order.
    pub atoms: Vec<AtomId>,
    /// Central element followed by the sorted neighbor tags, the pending bond included.
    pub key: String,
    /// Index of the partner placeholder in a junction template for `key`.
    pub partner_index: usize,
}

impl ConnectionSite {
    pub fn center(&self) -> AtomId {
        self.atoms[0]
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Atom count a junction template for this site must have.
    pub fn template_len(&self) -> usize {
        self.atoms.len() + 1
    }
}

/// Element symbol followed by the numeric bond order, e.g. `O2`.
pub fn neighbor_tag(system: &MolecularSystem, center: AtomId, neighbor: AtomId) -> Option<String> {
    let element = &system.atom(neighbor)?.element;
    let order = system.bond_between(center, neighbor)?.order;
    Some(tag(element, order))
}

fn tag(element: &str, order: BondOrder) -> String {
    format!("{}{}", element, order.numeric())
}

pub fn locate_site(
    system: &MolecularSystem,
    atom_id: AtomId,
    partner_id: AtomId,
) -> Result<ConnectionSite, ConnectionError> {
    let center = system
        .atom(atom_id)
        .ok_or(ConnectionError::AtomNotFound(atom_id))?;
    let partner = system
        .atom(partner_id)
        .ok_or(ConnectionError::AtomNotFound(partner_id))?;
    let neighbors = system
        .get_bonded_neighbors(atom_id)
        .ok_or(ConnectionError::AtomNotFound(atom_id))?;

    let mut entries: Vec<(String, Option<AtomId>)> = Vec::with_capacity(neighbors.len() + 1);
    for &neighbor in neighbors {
        let label = neighbor_tag(system, atom_id, neighbor)
            .ok_or(ConnectionError::AtomNotFound(neighbor))?;
        entries.push((label, Some(neighbor)));
    }
    entries.push((tag(&partner.element, BondOrder::Single), None));
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    let mut key = center.element.clone();
    let mut atoms = vec![atom_id];
    let mut partner_index = 0;
    for (i, (entry_tag, neighbor)) in entries.iter().enumerate() {
        key.push_str(entry_tag);
        match neighbor {
            Some(id) => atoms.push(*id),
            None => partner_index = i + 1,
        }
    }

    trace!(key = %key, partner_index, "Located connection site.");
    Ok(ConnectionSite {
        atoms,
        key,
        partner_index,
    })
}
