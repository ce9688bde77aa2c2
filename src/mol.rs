use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

use crate::sgroup::{LinkNode, StereoGroup, SubstanceGroup};

/// One set of atom coordinates, indexed like the molecule's atoms.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Conformer {
    positions: Vec<[f64; 3]>,
}

impl Conformer {
    pub fn new(positions: Vec<[f64; 3]>) -> Self {
        Self { positions }
    }

    pub fn from_2d(positions: &[[f64; 2]]) -> Self {
        Self {
            positions: positions.iter().map(|p| [p[0], p[1], 0.0]).collect(),
        }
    }

    pub fn positions(&self) -> &[[f64; 3]] {
        &self.positions
    }

    pub fn position(&self, idx: NodeIndex) -> Option<[f64; 3]> {
        self.positions.get(idx.index()).copied()
    }

    pub fn set_position(&mut self, idx: NodeIndex, pos: [f64; 3]) {
        if let Some(p) = self.positions.get_mut(idx.index()) {
            *p = pos;
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

pub struct Mol<A, B> {
    graph: UnGraph<A, B>,
    conformers: Vec<Conformer>,
    stereo_groups: Vec<StereoGroup>,
    substance_groups: Vec<SubstanceGroup>,
    link_nodes: Vec<LinkNode>,
    note: Option<String>,
    chiral_flag: bool,
    centroid: Option<[f64; 2]>,
}

impl<A, B> Mol<A, B> {
    pub fn new() -> Self {
        Self {
            graph: UnGraph::default(),
            conformers: Vec::new(),
            stereo_groups: Vec::new(),
            substance_groups: Vec::new(),
            link_nodes: Vec::new(),
            note: None,
            chiral_flag: false,
            centroid: None,
        }
    }

    pub fn graph(&self) -> &UnGraph<A, B> {
        &self.graph
    }

    pub fn atom(&self, idx: NodeIndex) -> &A {
        &self.graph[idx]
    }

    pub fn atom_mut(&mut self, idx: NodeIndex) -> &mut A {
        &mut self.graph[idx]
    }

    pub fn bond(&self, idx: EdgeIndex) -> &B {
        &self.graph[idx]
    }

    pub fn bond_mut(&mut self, idx: EdgeIndex) -> &mut B {
        &mut self.graph[idx]
    }

    pub fn add_atom(&mut self, atom: A) -> NodeIndex {
        self.graph.add_node(atom)
    }

    pub fn add_bond(&mut self, a: NodeIndex, b: NodeIndex, bond: B) -> EdgeIndex {
        self.graph.add_edge(a, b, bond)
    }

    pub fn atom_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn bond_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn degree(&self, idx: NodeIndex) -> usize {
        self.graph.edges(idx).count()
    }

    pub fn neighbors(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors(idx)
    }

    pub fn bonds_of(&self, idx: NodeIndex) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.graph.edges(idx).map(|e| e.id())
    }

    pub fn atoms(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    pub fn bonds(&self) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.graph.edge_indices()
    }

    pub fn bond_between(&self, a: NodeIndex, b: NodeIndex) -> Option<EdgeIndex> {
        self.graph.find_edge(a, b)
    }

    /// (begin, end) atoms of a bond, in the order the bond was added.
    pub fn bond_endpoints(&self, idx: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
        self.graph.edge_endpoints(idx)
    }

    pub fn other_atom(&self, bond: EdgeIndex, atom: NodeIndex) -> Option<NodeIndex> {
        let (a, b) = self.bond_endpoints(bond)?;
        if a == atom {
            Some(b)
        } else if b == atom {
            Some(a)
        } else {
            None
        }
    }

    pub fn conformers(&self) -> &[Conformer] {
        &self.conformers
    }

    /// Conformer by id; `None` picks the first one.
    pub fn conformer(&self, id: Option<usize>) -> Option<&Conformer> {
        self.conformers.get(id.unwrap_or(0))
    }

    pub fn conformer_mut(&mut self, id: Option<usize>) -> Option<&mut Conformer> {
        self.conformers.get_mut(id.unwrap_or(0))
    }

    pub fn add_conformer(&mut self, conformer: Conformer) -> usize {
        self.conformers.push(conformer);
        self.conformers.len() - 1
    }

    pub fn stereo_groups(&self) -> &[StereoGroup] {
        &self.stereo_groups
    }

    pub fn set_stereo_groups(&mut self, groups: Vec<StereoGroup>) {
        self.stereo_groups = groups;
    }

    pub fn substance_groups(&self) -> &[SubstanceGroup] {
        &self.substance_groups
    }

    pub fn add_substance_group(&mut self, group: SubstanceGroup) {
        self.substance_groups.push(group);
    }

    pub fn link_nodes(&self) -> &[LinkNode] {
        &self.link_nodes
    }

    pub fn add_link_node(&mut self, node: LinkNode) {
        self.link_nodes.push(node);
    }

    /// Note drawn for the molecule as a whole.
    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    pub fn set_note(&mut self, note: Option<String>) {
        self.note = note;
    }

    /// Molfile chiral flag: the drawn stereo is absolute.
    pub fn chiral_flag(&self) -> bool {
        self.chiral_flag
    }

    pub fn set_chiral_flag(&mut self, flag: bool) {
        self.chiral_flag = flag;
    }

    /// Reference point for absolutely placed data-group labels.
    pub fn centroid(&self) -> Option<[f64; 2]> {
        self.centroid
    }

    pub fn set_centroid(&mut self, centroid: Option<[f64; 2]>) {
        self.centroid = centroid;
    }

    /// Append `other` as a disconnected fragment. Conformer `conf` of each
    /// molecule is merged; returns the index offset of the appended atoms.
    pub fn insert_mol(&mut self, other: &Mol<A, B>, conf: Option<usize>) -> usize
    where
        A: Clone,
        B: Clone,
    {
        let offset = self.atom_count();
        for idx in other.atoms() {
            self.graph.add_node(other.atom(idx).clone());
        }
        for e in other.bonds() {
            if let Some((a, b)) = other.bond_endpoints(e) {
                self.graph.add_edge(
                    NodeIndex::new(a.index() + offset),
                    NodeIndex::new(b.index() + offset),
                    other.bond(e).clone(),
                );
            }
        }
        let extra: Vec<[f64; 3]> = match other.conformer(conf) {
            Some(c) => c.positions().to_vec(),
            None => vec![[0.0; 3]; other.atom_count()],
        };
        match self.conformers.first_mut() {
            Some(c) => {
                c.positions.resize(offset, [0.0; 3]);
                c.positions.extend(extra);
            }
            None => {
                let mut positions = vec![[0.0; 3]; offset];
                positions.extend(extra);
                self.conformers.push(Conformer::new(positions));
            }
        }
        offset
    }

    /// Connected-fragment number of every atom. Fragments are numbered in
    /// order of their lowest atom index.
    pub fn fragment_ids(&self) -> Vec<usize> {
        let mut ids = vec![usize::MAX; self.atom_count()];
        let mut next = 0;
        for node in self.atoms() {
            if ids[node.index()] != usize::MAX {
                continue;
            }
            let mut stack = vec![node];
            while let Some(current) = stack.pop() {
                if ids[current.index()] != usize::MAX {
                    continue;
                }
                ids[current.index()] = next;
                stack.extend(self.neighbors(current).filter(|n| ids[n.index()] == usize::MAX));
            }
            next += 1;
        }
        ids
    }
}

impl<A: Clone, B: Clone> Clone for Mol<A, B> {
    fn clone(&self) -> Self {
        Self {
            graph: self.graph.clone(),
            conformers: self.conformers.clone(),
            stereo_groups: self.stereo_groups.clone(),
            substance_groups: self.substance_groups.clone(),
            link_nodes: self.link_nodes.clone(),
            note: self.note.clone(),
            chiral_flag: self.chiral_flag,
            centroid: self.centroid,
        }
    }
}

impl<A, B> Default for Mol<A, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: PartialEq, B: PartialEq> PartialEq for Mol<A, B> {
    fn eq(&self, other: &Self) -> bool {
        if self.atom_count() != other.atom_count() || self.bond_count() != other.bond_count() {
            return false;
        }
        if self.atoms().any(|idx| self.atom(idx) != other.atom(idx)) {
            return false;
        }
        for idx in self.bonds() {
            if self.bond(idx) != other.bond(idx)
                || self.bond_endpoints(idx) != other.bond_endpoints(idx)
            {
                return false;
            }
        }
        self.conformers == other.conformers
            && self.stereo_groups == other.stereo_groups
            && self.substance_groups == other.substance_groups
            && self.link_nodes == other.link_nodes
            && self.note == other.note
            && self.chiral_flag == other.chiral_flag
    }
}

impl<A: std::fmt::Debug, B: std::fmt::Debug> std::fmt::Debug for Mol<A, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mol")
            .field("atom_count", &self.atom_count())
            .field("bond_count", &self.bond_count())
            .field("conformers", &self.conformers.len())
            .field("note", &self.note)
            .finish()
    }
}
