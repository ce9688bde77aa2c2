use crate::mol::Conformer;
use crate::Molecule;

/// Reactant, agent and product molecules of one reaction scheme.
///
/// Each component is drawn from its own coordinates; a reaction drawing
/// lays them out left to right around the arrow.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Reaction {
    pub(crate) reactant_templates: Vec<Molecule>,
    pub(crate) product_templates: Vec<Molecule>,
    pub(crate) agent_templates: Vec<Molecule>,
}

impl Reaction {
    pub fn new(reactants: Vec<Molecule>, agents: Vec<Molecule>, products: Vec<Molecule>) -> Self {
        Self {
            reactant_templates: reactants,
            product_templates: products,
            agent_templates: agents,
        }
    }

    pub fn reactant_templates(&self) -> &[Molecule] {
        &self.reactant_templates
    }

    pub fn product_templates(&self) -> &[Molecule] {
        &self.product_templates
    }

    pub fn agent_templates(&self) -> &[Molecule] {
        &self.agent_templates
    }

    pub fn add_reactant(&mut self, mol: Molecule) {
        self.reactant_templates.push(mol);
    }

    pub fn add_agent(&mut self, mol: Molecule) {
        self.agent_templates.push(mol);
    }

    pub fn add_product(&mut self, mol: Molecule) {
        self.product_templates.push(mol);
    }

    /// Components in conformer-id order: reactants, then agents, then
    /// products.
    pub fn components(&self) -> impl Iterator<Item = &Molecule> {
        self.reactant_templates
            .iter()
            .chain(&self.agent_templates)
            .chain(&self.product_templates)
    }

    pub fn num_components(&self) -> usize {
        self.reactant_templates.len() + self.agent_templates.len() + self.product_templates.len()
    }

    /// Whether every component has coordinates for its conformer.
    pub fn has_coordinates(&self, conf_ids: Option<&[Option<usize>]>) -> bool {
        self.components().enumerate().all(|(i, mol)| {
            let id = conf_ids.and_then(|ids| ids.get(i).copied()).flatten();
            mol.conformer(id).is_some_and(|c: &Conformer| c.len() == mol.atom_count())
        })
    }
}
